#![forbid(unsafe_code)]

//! Component instances: hook slots plus the render/commit lifecycle.
//!
//! # Design
//!
//! An [`Instance`] owns the per-instance storage that a stateless render
//! function needs to persist across renders. Every hook call made through the
//! [`RenderCx`] claims the next slot by call order, so a render function must
//! call the same hooks in the same order on every render.
//!
//! ```text
//!   render(props) ──► hooks read/write slots, effects queued
//!        │
//!        ├── commit()  ──► memo results promoted, queued effects run in order
//!        └── discard() ──► queued effects dropped, speculative memos dropped
//! ```
//!
//! # Phases
//!
//! - **Render**: synchronous, may be repeated or thrown away. Hooks may write
//!   instance cells (`use_ref`) but never run effects.
//! - **Commit**: runs the effects of the latest render whose dependencies
//!   changed since the last commit that ran them. The only phase in which an
//!   effect (and therefore a notification) fires.
//!
//! # Invariants
//!
//! 1. A slot created by a hook keeps its identity until unmount.
//! 2. Effects queued by a render run at most once, and only on commit.
//! 3. A newer render supersedes the queued effects of an uncommitted one.
//! 4. An effect's previous cleanup runs before the effect runs again, and
//!    every outstanding cleanup runs on unmount.
//!
//! # Failure Modes
//!
//! | Mode | Condition | Behavior |
//! |------|-----------|----------|
//! | Hook order changed | Different slot kind at an index | `HookError::SlotTypeMismatch` |
//! | Hook count changed | More/fewer hooks than the first render | `HookError::HookCountChanged` |
//! | Render after unmount | `unmount()` already ran | `HookError::Unmounted` |
//! | Effect panics | Bug in the effect | Propagates out of `commit()` |

use std::any::{Any, type_name};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use frp_core::EmitterConfig;
use tracing::{debug, debug_span, trace};

use crate::cell::Ref;
use crate::deps::changed_by_eq;
use crate::error::HookError;

/// Cleanup returned by an effect; runs before the effect re-runs and on
/// unmount.
pub type Cleanup = Box<dyn FnOnce()>;

type PendingEffect = Box<dyn FnOnce()>;
type RenderFn<P, R> = Box<dyn FnMut(&mut RenderCx<'_>, &P) -> Result<R, HookError>>;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for an [`Instance`].
#[derive(Debug, Clone)]
pub struct InstanceConfig {
    /// Name used in tracing spans.
    pub label: String,
    /// Config for emitters created by hooks of this instance.
    pub emitter: EmitterConfig,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            label: "component".to_string(),
            emitter: EmitterConfig::default(),
        }
    }
}

impl InstanceConfig {
    /// Default configuration with a custom label.
    #[must_use]
    pub fn labeled(label: impl Into<String>) -> Self {
        Self::default().with_label(label)
    }

    /// Set the tracing label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the config for emitters created by hooks.
    #[must_use]
    pub fn with_emitter(mut self, emitter: EmitterConfig) -> Self {
        self.emitter = emitter;
        self
    }
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

trait HookSlot: 'static {
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// The render that touched this slot was committed.
    fn promote(&mut self) {}
    /// The render that touched this slot was thrown away.
    fn discard(&mut self) {}
    /// The instance is going away.
    fn teardown(&mut self) {}
}

struct RefSlot<T> {
    cell: Ref<T>,
}

impl<T: 'static> HookSlot for RefSlot<T> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct MemoSlot<D, T> {
    committed: Option<(D, T)>,
    pending: Option<(D, T)>,
}

impl<D: 'static, T: 'static> HookSlot for MemoSlot<D, T> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn promote(&mut self) {
        if let Some(entry) = self.pending.take() {
            self.committed = Some(entry);
        }
    }

    fn discard(&mut self) {
        // Before the first commit the pending value is the only one, and the
        // ref slots next to it survive the discard too.
        if self.committed.is_some() {
            self.pending = None;
        }
    }
}

struct StateSlot<T> {
    cell: Rc<RefCell<T>>,
}

impl<T: 'static> HookSlot for StateSlot<T> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct EffectState<D> {
    /// Dependencies of the last commit that ran the effect.
    deps: Option<D>,
    cleanup: Option<Cleanup>,
}

struct EffectSlot<D> {
    state: Rc<RefCell<EffectState<D>>>,
}

impl<D> EffectSlot<D> {
    fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(EffectState {
                deps: None,
                cleanup: None,
            })),
        }
    }
}

impl<D: 'static> HookSlot for EffectSlot<D> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn teardown(&mut self) {
        let cleanup = self.state.borrow_mut().cleanup.take();
        if let Some(cleanup) = cleanup {
            cleanup();
        }
    }
}

// ---------------------------------------------------------------------------
// State setter
// ---------------------------------------------------------------------------

/// Writes a `use_state` slot and requests a re-render of its instance.
pub struct StateSetter<T> {
    cell: Rc<RefCell<T>>,
    dirty: Rc<Cell<bool>>,
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
            dirty: Rc::clone(&self.dirty),
        }
    }
}

impl<T> fmt::Debug for StateSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSetter")
            .field("dirty", &self.dirty.get())
            .finish_non_exhaustive()
    }
}

impl<T: PartialEq> StateSetter<T> {
    /// Store `value`. Requests a re-render only if it differs from the
    /// stored value.
    pub fn set(&self, value: T) {
        let changed = {
            let mut cell = self.cell.borrow_mut();
            if *cell == value {
                false
            } else {
                *cell = value;
                true
            }
        };
        if changed {
            trace!("state changed, re-render requested");
            self.dirty.set(true);
        }
    }
}

// ---------------------------------------------------------------------------
// Render context
// ---------------------------------------------------------------------------

/// Hook API available to a render function.
pub struct RenderCx<'a> {
    slots: &'a mut Vec<Box<dyn HookSlot>>,
    pending: &'a mut Vec<PendingEffect>,
    dirty: &'a Rc<Cell<bool>>,
    config: &'a InstanceConfig,
    cursor: usize,
    sealed: bool,
}

impl fmt::Debug for RenderCx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCx")
            .field("instance", &self.config.label)
            .field("cursor", &self.cursor)
            .field("slots", &self.slots.len())
            .finish()
    }
}

impl RenderCx<'_> {
    /// Configuration of the instance being rendered.
    #[must_use]
    pub fn config(&self) -> &InstanceConfig {
        self.config
    }

    /// Claim the next slot, creating it on the first render.
    fn slot<S: HookSlot>(&mut self, init: impl FnOnce() -> S) -> Result<&mut S, HookError> {
        let index = self.cursor;
        self.cursor += 1;
        if index == self.slots.len() {
            if self.sealed {
                return Err(HookError::HookCountChanged {
                    expected: self.slots.len(),
                    found: index + 1,
                });
            }
            self.slots.push(Box::new(init()));
        }
        self.slots[index]
            .as_any_mut()
            .downcast_mut::<S>()
            .ok_or(HookError::SlotTypeMismatch {
                index,
                expected: type_name::<S>(),
            })
    }

    /// A mutable cell created once and handed back on every render.
    ///
    /// `init` only runs on the first render.
    pub fn use_ref<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Result<Ref<T>, HookError> {
        let slot = self.slot(|| RefSlot {
            cell: Ref::new(init()),
        })?;
        Ok(slot.cell.clone())
    }

    /// A value recomputed only when `deps` changed since the last commit.
    ///
    /// A slot that has never been committed keeps reusing its speculative
    /// value while the deps stay equal, so repeated renders before the first
    /// commit agree on identity.
    pub fn use_memo<D, T>(&mut self, deps: D, compute: impl FnOnce() -> T) -> Result<T, HookError>
    where
        D: PartialEq + 'static,
        T: Clone + 'static,
    {
        let slot = self.slot(|| MemoSlot::<D, T> {
            committed: None,
            pending: None,
        })?;

        if let Some((previous, value)) = &slot.committed {
            if *previous == deps {
                let value = value.clone();
                slot.pending = None;
                return Ok(value);
            }
        } else if let Some((previous, value)) = &slot.pending {
            if *previous == deps {
                return Ok(value.clone());
            }
        }

        let value = compute();
        slot.pending = Some((deps, value.clone()));
        Ok(value)
    }

    /// Instance state. Setting a different value flags the instance for
    /// re-render (see [`Instance::needs_render`]).
    pub fn use_state<T>(
        &mut self,
        init: impl FnOnce() -> T,
    ) -> Result<(T, StateSetter<T>), HookError>
    where
        T: Clone + PartialEq + 'static,
    {
        let dirty = Rc::clone(self.dirty);
        let slot = self.slot(|| StateSlot {
            cell: Rc::new(RefCell::new(init())),
        })?;
        let value = slot.cell.borrow().clone();
        Ok((
            value,
            StateSetter {
                cell: Rc::clone(&slot.cell),
                dirty,
            },
        ))
    }

    /// Run `effect` on commit when `deps` changed by `PartialEq` (always on
    /// the first commit).
    pub fn use_effect<D>(&mut self, deps: D, effect: impl FnOnce() + 'static) -> Result<(), HookError>
    where
        D: PartialEq + 'static,
    {
        self.schedule_effect(deps, changed_by_eq, move || {
            effect();
            None
        })
    }

    /// Like [`use_effect`](Self::use_effect), with a cleanup that runs before
    /// the next run and on unmount.
    pub fn use_effect_with_cleanup<D, C>(
        &mut self,
        deps: D,
        effect: impl FnOnce() -> C + 'static,
    ) -> Result<(), HookError>
    where
        D: PartialEq + 'static,
        C: FnOnce() + 'static,
    {
        self.schedule_effect(deps, changed_by_eq, move || {
            let cleanup: Cleanup = Box::new(effect());
            Some(cleanup)
        })
    }

    /// Like [`use_effect`](Self::use_effect), with a caller-supplied change
    /// predicate instead of `PartialEq`.
    pub fn use_effect_when<D>(
        &mut self,
        deps: D,
        changed: impl Fn(&D, &D) -> bool,
        effect: impl FnOnce() + 'static,
    ) -> Result<(), HookError>
    where
        D: 'static,
    {
        self.schedule_effect(deps, changed, move || {
            effect();
            None
        })
    }

    fn schedule_effect<D: 'static>(
        &mut self,
        deps: D,
        changed: impl Fn(&D, &D) -> bool,
        effect: impl FnOnce() -> Option<Cleanup> + 'static,
    ) -> Result<(), HookError> {
        let index = self.cursor;
        let slot = self.slot(EffectSlot::<D>::new)?;
        let due = match &slot.state.borrow().deps {
            None => true,
            Some(previous) => changed(previous, &deps),
        };
        if !due {
            trace!(hook = index, "effect skipped, deps unchanged");
            return Ok(());
        }

        let state = Rc::clone(&slot.state);
        self.pending.push(Box::new(move || {
            let previous = state.borrow_mut().cleanup.take();
            if let Some(cleanup) = previous {
                cleanup();
            }
            let cleanup = effect();
            let mut state = state.borrow_mut();
            state.deps = Some(deps);
            state.cleanup = cleanup;
        }));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Instance
// ---------------------------------------------------------------------------

/// Outcome of [`Instance::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitReport {
    /// 1-based index of this commit.
    pub commit: u64,
    /// Number of effects that ran.
    pub effects_run: usize,
}

/// One mounted component: a render function plus its hook slots.
pub struct Instance<P, R> {
    render_fn: RenderFn<P, R>,
    slots: Vec<Box<dyn HookSlot>>,
    pending: Vec<PendingEffect>,
    dirty: Rc<Cell<bool>>,
    config: InstanceConfig,
    sealed: bool,
    unmounted: bool,
    renders: u64,
    commits: u64,
}

impl<P, R> fmt::Debug for Instance<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("label", &self.config.label)
            .field("slots", &self.slots.len())
            .field("pending_effects", &self.pending.len())
            .field("renders", &self.renders)
            .field("commits", &self.commits)
            .field("unmounted", &self.unmounted)
            .finish()
    }
}

impl<P, R> Instance<P, R> {
    /// Create an instance with the default config.
    pub fn new(
        render: impl FnMut(&mut RenderCx<'_>, &P) -> Result<R, HookError> + 'static,
    ) -> Self {
        Self::with_config(render, InstanceConfig::default())
    }

    /// Create an instance with an explicit config.
    pub fn with_config(
        render: impl FnMut(&mut RenderCx<'_>, &P) -> Result<R, HookError> + 'static,
        config: InstanceConfig,
    ) -> Self {
        Self {
            render_fn: Box::new(render),
            slots: Vec::new(),
            pending: Vec::new(),
            dirty: Rc::new(Cell::new(false)),
            config,
            sealed: false,
            unmounted: false,
            renders: 0,
            commits: 0,
        }
    }

    /// Run the render phase with `props`.
    ///
    /// Effects are queued, not run; call [`commit`](Self::commit) to apply
    /// them or [`discard`](Self::discard) to throw the render away.
    pub fn render(&mut self, props: &P) -> Result<R, HookError> {
        if self.unmounted {
            return Err(HookError::Unmounted);
        }
        self.renders += 1;
        let _span = debug_span!(
            "render",
            instance = %self.config.label,
            render = self.renders
        )
        .entered();

        if !self.pending.is_empty() {
            trace!(dropped = self.pending.len(), "superseding uncommitted render");
            self.pending.clear();
        }
        self.dirty.set(false);

        let mut cx = RenderCx {
            slots: &mut self.slots,
            pending: &mut self.pending,
            dirty: &self.dirty,
            config: &self.config,
            cursor: 0,
            sealed: self.sealed,
        };
        let result = (self.render_fn)(&mut cx, props);
        let used = cx.cursor;

        let outcome = result.and_then(|out| {
            if self.sealed && used != self.slots.len() {
                Err(HookError::HookCountChanged {
                    expected: self.slots.len(),
                    found: used,
                })
            } else {
                Ok(out)
            }
        });

        match outcome {
            Ok(out) => {
                self.sealed = true;
                trace!(hooks = used, effects = self.pending.len(), "render complete");
                Ok(out)
            }
            Err(err) => {
                debug!(%err, "render failed");
                self.pending.clear();
                if !self.sealed {
                    // Nothing was ever established; start over next time.
                    for slot in self.slots.iter_mut().rev() {
                        slot.teardown();
                    }
                    self.slots.clear();
                }
                Err(err)
            }
        }
    }

    /// Run the commit phase for the latest render.
    pub fn commit(&mut self) -> CommitReport {
        self.commits += 1;
        let _span = debug_span!(
            "commit",
            instance = %self.config.label,
            commit = self.commits
        )
        .entered();

        for slot in &mut self.slots {
            slot.promote();
        }
        let effects = std::mem::take(&mut self.pending);
        let effects_run = effects.len();
        for effect in effects {
            effect();
        }

        debug!(effects_run, "commit complete");
        CommitReport {
            commit: self.commits,
            effects_run,
        }
    }

    /// Render and immediately commit.
    pub fn update(&mut self, props: &P) -> Result<R, HookError> {
        let out = self.render(props)?;
        self.commit();
        Ok(out)
    }

    /// Throw away the latest uncommitted render.
    pub fn discard(&mut self) {
        trace!(
            instance = %self.config.label,
            dropped = self.pending.len(),
            "render discarded"
        );
        self.pending.clear();
        for slot in &mut self.slots {
            slot.discard();
        }
    }

    /// Run every outstanding effect cleanup and release all slots.
    ///
    /// Idempotent; also performed on drop.
    pub fn unmount(&mut self) {
        if self.unmounted {
            return;
        }
        self.unmounted = true;
        let _span = debug_span!("unmount", instance = %self.config.label).entered();
        self.pending.clear();
        for slot in self.slots.iter_mut().rev() {
            slot.teardown();
        }
        self.slots.clear();
        debug!("instance unmounted");
    }

    /// Whether state owned by this instance changed since its last render.
    #[must_use]
    pub fn needs_render(&self) -> bool {
        self.dirty.get()
    }

    /// Whether a rendered-but-uncommitted render has queued effects.
    #[must_use]
    pub fn has_pending_effects(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Whether at least one commit happened and the instance is still alive.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.commits > 0 && !self.unmounted
    }

    /// Number of renders started.
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    /// Number of commits performed.
    #[must_use]
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    /// Instance configuration.
    #[must_use]
    pub fn config(&self) -> &InstanceConfig {
        &self.config
    }
}

impl<P, R> Drop for Instance<P, R> {
    fn drop(&mut self) {
        self.unmount();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
