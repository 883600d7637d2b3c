#![forbid(unsafe_code)]

//! Payload-free, synchronous multi-subscriber push channel.
//!
//! # Design
//!
//! [`Emitter`] keeps its observers in shared, reference-counted storage
//! (`Rc<RefCell<..>>`), keyed by a per-emitter subscription id. A
//! notification pass snapshots the registered observers, releases the borrow,
//! and then calls each one, so observers are free to subscribe, unsubscribe,
//! read properties or even emit again while the pass is running.
//!
//! # Delivery rules
//!
//! | Situation | Behavior |
//! |-----------|----------|
//! | No subscribers | Event dropped, nothing queued |
//! | Observer subscribed during a pass | Not called in that pass |
//! | Observer unsubscribed during a pass, before its turn | Skipped |
//! | Observer unsubscribes itself | Current call completes, no further calls |
//! | Observer emits re-entrantly | Nested pass runs to completion first |
//!
//! Delivery order follows subscription order, but callers must only rely on
//! "every current subscriber is called exactly once".
//!
//! # Failure Modes
//!
//! - **Observer panics**: governed by [`PanicPolicy`]. With
//!   [`PanicPolicy::Isolate`] (default) the panic is caught, logged at
//!   `error` level and the remaining observers still run. With
//!   [`PanicPolicy::Propagate`] the panic unwinds out of [`Emitter::next`]
//!   and the rest of that pass is skipped. The subscriber table is never
//!   borrowed while an observer runs, so the emitter stays usable either way.
//! - **Unsubscribe after drop**: subscriptions hold a `Weak` reference; once
//!   the emitter is gone, unsubscribing is a no-op.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};

use tracing::{error, trace};

use crate::observer::{Observer, Subscription};
use crate::time::Time;

type ObserverRc = Rc<dyn Observer<Time>>;

/// What [`Emitter::next`] does when an observer panics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PanicPolicy {
    /// Catch the panic, log it and keep notifying the other observers.
    #[default]
    Isolate,
    /// Let the panic unwind to the caller of `next`.
    Propagate,
}

/// Configuration for an [`Emitter`].
#[derive(Debug, Clone, Default)]
pub struct EmitterConfig {
    /// Behavior when an observer panics during notification.
    pub panic_policy: PanicPolicy,
}

impl EmitterConfig {
    /// Default configuration: isolate observer panics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the observer panic policy.
    #[must_use]
    pub fn with_panic_policy(mut self, policy: PanicPolicy) -> Self {
        self.panic_policy = policy;
        self
    }
}

struct EmitterInner {
    next_id: u64,
    observers: BTreeMap<u64, ObserverRc>,
    config: EmitterConfig,
}

/// A synchronous, unbuffered push channel carrying [`Time`] tokens.
///
/// Cloning an `Emitter` creates a new handle to the **same** channel.
pub struct Emitter {
    inner: Rc<RefCell<EmitterInner>>,
}

impl Clone for Emitter {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Emitter")
            .field("subscriber_count", &inner.observers.len())
            .field("panic_policy", &inner.config.panic_policy)
            .finish()
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter {
    /// Create an emitter with no subscribers and the default config.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EmitterConfig::default())
    }

    /// Create an emitter with an explicit config.
    #[must_use]
    pub fn with_config(config: EmitterConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(EmitterInner {
                next_id: 0,
                observers: BTreeMap::new(),
                config,
            })),
        }
    }

    /// Register a callback for future notifications.
    pub fn subscribe(&self, callback: impl Fn(Time) + 'static) -> Subscription {
        self.subscribe_observer(Rc::new(callback))
    }

    /// Register an already shared observer for future notifications.
    pub fn subscribe_observer(&self, observer: Rc<dyn Observer<Time>>) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.observers.insert(id, observer);
            id
        };
        trace!(id, "emitter subscribe");

        let weak: Weak<RefCell<EmitterInner>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                if inner.borrow_mut().observers.remove(&id).is_some() {
                    trace!(id, "emitter unsubscribe");
                }
            }
        })
    }

    /// Notify every currently registered observer with `time`.
    pub fn next(&self, time: Time) {
        let (snapshot, policy) = {
            let inner = self.inner.borrow();
            let snapshot: Vec<(u64, ObserverRc)> = inner
                .observers
                .iter()
                .map(|(id, observer)| (*id, Rc::clone(observer)))
                .collect();
            (snapshot, inner.config.panic_policy)
        };

        if snapshot.is_empty() {
            trace!(%time, "emitter next dropped, no subscribers");
            return;
        }
        trace!(%time, subscribers = snapshot.len(), "emitter next");

        for (id, observer) in snapshot {
            // Unsubscribed earlier in this pass.
            if !self.inner.borrow().observers.contains_key(&id) {
                continue;
            }
            match policy {
                PanicPolicy::Propagate => observer.next(time),
                PanicPolicy::Isolate => {
                    let result = catch_unwind(AssertUnwindSafe(|| observer.next(time)));
                    if let Err(payload) = result {
                        error!(
                            id,
                            %time,
                            panic = %panic_message(payload.as_ref()),
                            "observer panicked during notification"
                        );
                    }
                }
            }
        }
    }

    /// Number of registered observers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    /// Whether no observer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().observers.is_empty()
    }

    /// Whether two handles refer to the same channel.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
