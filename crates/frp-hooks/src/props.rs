#![forbid(unsafe_code)]

//! Props → [`Property`] adapter.
//!
//! [`use_property_from_props`] turns a value re-supplied on every render into
//! one stable [`Property`] for the lifetime of the instance.
//!
//! # Mechanics
//!
//! Five hook slots, in this order:
//!
//! 1. mount flag (`use_ref`), [`MountState::NotYetCommitted`] until the first
//!    commit;
//! 2. the [`Emitter`] (`use_ref`), created once;
//! 3. the value cell (`use_ref`), overwritten with `value` on **every**
//!    render before anything can read it;
//! 4. an effect keyed by `value`: the first commit only flips the mount
//!    flag, every later commit that sees a changed `value` emits once;
//! 5. the property itself (`use_memo` with no deps), reading the value cell
//!    and subscribing through the emitter.
//!
//! ```text
//! NotYetCommitted ──first commit──► Committed            (no emit)
//! Committed ──commit, value changed──► Committed         (emit next(now()))
//! ```
//!
//! # Guarantees
//!
//! - `get()` during a render returns that render's `value`, even before its
//!   commit.
//! - No notification on mount.
//! - Exactly one notification per commit whose `value` changed, and none for
//!   renders with an unchanged value (the effect does not run at all).
//! - The value cell is written before the effect emits, so observers calling
//!   `get()` from their callback see the new value.
//! - The returned property is the same object on every render.

use frp_core::{Emitter, Property, now};
use tracing::debug;

use crate::deps::changed_by_eq;
use crate::error::HookError;
use crate::instance::RenderCx;

/// Mount flag of a props adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    /// No commit has run yet.
    NotYetCommitted,
    /// The first commit ran. Never goes back.
    Committed,
}

/// Bridge `value` into a stable [`Property`], notifying subscribers once per
/// committed change (by `PartialEq`), never on mount.
pub fn use_property_from_props<V>(cx: &mut RenderCx<'_>, value: V) -> Result<Property<V>, HookError>
where
    V: Clone + PartialEq + 'static,
{
    use_property_from_props_with(cx, value, changed_by_eq)
}

/// [`use_property_from_props`] with a caller-supplied change predicate.
///
/// `changed(previous, next)` decides whether a commit notifies. Use it to
/// compare by identity (`Rc::ptr_eq`) or by a key instead of `PartialEq`.
pub fn use_property_from_props_with<V>(
    cx: &mut RenderCx<'_>,
    value: V,
    changed: impl Fn(&V, &V) -> bool,
) -> Result<Property<V>, HookError>
where
    V: Clone + 'static,
{
    let emitter_config = cx.config().emitter.clone();
    let label = cx.config().label.clone();

    let mount = cx.use_ref(|| MountState::NotYetCommitted)?;
    let emitter = cx.use_ref(|| Emitter::with_config(emitter_config))?;
    let cell = cx.use_ref(|| value.clone())?;
    cell.set(value.clone());

    let notifier = emitter.get();
    cx.use_effect_when(value, changed, move || match mount.get() {
        MountState::NotYetCommitted => {
            mount.set(MountState::Committed);
            debug!(instance = %label, "props property mounted");
        }
        MountState::Committed => {
            let time = now();
            debug!(
                instance = %label,
                %time,
                subscribers = notifier.subscriber_count(),
                "props value changed, notifying"
            );
            notifier.next(time);
        }
    })?;

    let source = emitter.get();
    cx.use_memo((), move || Property::from_emitter(move || cell.get(), &source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use frp_core::Subscription;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use tracing_test::traced_test;

    fn adapter() -> Instance<i32, Property<i32>> {
        Instance::new(|cx, value: &i32| use_property_from_props(cx, *value))
    }

    fn count_notifications(property: &Property<i32>) -> (Rc<RefCell<Vec<i32>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let reader = property.clone();
        let sub = property.subscribe(move |_| seen_clone.borrow_mut().push(reader.get()));
        (seen, sub)
    }

    #[test]
    fn initial_value_is_readable_immediately() {
        let mut instance = adapter();
        let property = instance.render(&1).unwrap();
        assert_eq!(property.get(), 1);
        instance.commit();
        assert_eq!(property.get(), 1);
    }

    #[test]
    fn mount_does_not_notify() {
        let mut instance = adapter();
        let property = instance.render(&1).unwrap();
        let (seen, _sub) = count_notifications(&property);
        instance.commit();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn change_notifies_once_with_new_value_visible() {
        let mut instance = adapter();
        let property = instance.update(&1).unwrap();
        let (seen, _sub) = count_notifications(&property);

        instance.update(&2).unwrap();
        assert_eq!(*seen.borrow(), vec![2]);

        instance.update(&2).unwrap();
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn get_reflects_render_before_commit() {
        let mut instance = adapter();
        let property = instance.update(&1).unwrap();
        let (seen, _sub) = count_notifications(&property);

        let during = instance.render(&5).unwrap();
        assert_eq!(during.get(), 5);
        assert!(seen.borrow().is_empty(), "render phase never notifies");
        instance.commit();
        assert_eq!(*seen.borrow(), vec![5]);
    }

    #[test]
    fn identity_is_stable_across_renders() {
        let mut instance = adapter();
        let first = instance.update(&1).unwrap();
        for v in [2, 2, 3, 1] {
            let next = instance.update(&v).unwrap();
            assert!(Property::ptr_eq(&first, &next));
        }
    }

    #[test]
    fn discarded_render_never_notifies() {
        let mut instance = adapter();
        let property = instance.update(&1).unwrap();
        let (seen, _sub) = count_notifications(&property);

        instance.render(&9).unwrap();
        instance.discard();
        instance.commit();
        assert!(seen.borrow().is_empty());
        // The abandoned render's write stays in the cell until the next render.
        assert_eq!(property.get(), 9);
        instance.update(&1).unwrap();
        assert_eq!(property.get(), 1);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn discarded_first_render_keeps_identity() {
        let mut instance = adapter();
        let first = instance.render(&1).unwrap();
        let (seen, _sub) = count_notifications(&first);
        instance.discard();

        let second = instance.render(&2).unwrap();
        instance.commit();
        assert!(Property::ptr_eq(&first, &second));
        assert_eq!(first.get(), 2);
        assert!(seen.borrow().is_empty(), "mount never notifies");

        instance.update(&3).unwrap();
        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn superseded_render_back_to_committed_value_is_silent() {
        let mut instance = adapter();
        let property = instance.update(&1).unwrap();
        let (seen, _sub) = count_notifications(&property);

        assert_eq!(instance.render(&2).unwrap().get(), 2);
        assert_eq!(instance.render(&1).unwrap().get(), 1);
        instance.commit();
        assert!(seen.borrow().is_empty());
        assert_eq!(property.get(), 1);
    }

    #[test]
    fn custom_predicate_controls_notification() {
        // Only notify when the tens digit changes.
        let mut instance = Instance::new(|cx, value: &i32| {
            use_property_from_props_with(cx, *value, |a: &i32, b: &i32| a / 10 != b / 10)
        });
        let property = instance.update(&11).unwrap();
        let (seen, _sub) = count_notifications(&property);

        instance.update(&15).unwrap();
        assert!(seen.borrow().is_empty());
        assert_eq!(property.get(), 15);

        instance.update(&21).unwrap();
        assert_eq!(*seen.borrow(), vec![21]);
    }

    #[test]
    fn hooks_after_the_adapter_stay_aligned() {
        let calls = Rc::new(Cell::new(0usize));
        let calls_in = Rc::clone(&calls);
        let mut instance = Instance::new(move |cx, value: &i32| {
            calls_in.set(calls_in.get() + 1);
            let property = use_property_from_props(cx, *value)?;
            // A hook after the adapter still lines up on later renders.
            let extra = cx.use_ref(|| 0u8)?;
            extra.set(1);
            Ok(property)
        });
        instance.update(&1).unwrap();
        instance.update(&2).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[traced_test]
    #[test]
    fn logs_mount_and_change() {
        let mut instance = adapter();
        let property = instance.update(&1).unwrap();
        assert!(logs_contain("props property mounted"));
        let (_seen, _sub) = count_notifications(&property);
        instance.update(&2).unwrap();
        assert!(logs_contain("props value changed, notifying"));
    }
}
