#![forbid(unsafe_code)]

//! Reading a [`Property`] from a component.
//!
//! [`use_property`] is the consumer side of the bridge: it returns the value
//! to display and keeps the instance subscribed while it is mounted. A
//! notification stores the re-read value in instance state, which flags the
//! instance for re-render; equal re-reads are ignored.
//!
//! The subscription is made on commit, never during render. Right after
//! subscribing the property is read once more, so a change that happened
//! between this render and its commit is not lost.

use frp_core::Property;
use tracing::trace;

use crate::error::HookError;
use crate::instance::RenderCx;

/// Subscribe the rendering instance to `property` and return the value to
/// display.
///
/// Passing a different property (by identity) on a later render moves the
/// subscription to it on the next commit.
pub fn use_property<V>(cx: &mut RenderCx<'_>, property: &Property<V>) -> Result<V, HookError>
where
    V: Clone + PartialEq + 'static,
{
    let initial = property.clone();
    let (value, set_value) = cx.use_state(move || initial.get())?;

    let source = property.clone();
    cx.use_effect_with_cleanup(property.clone(), move || {
        let reader = source.clone();
        let on_change = set_value.clone();
        let mut subscription = source.subscribe(move |time| {
            trace!(%time, "consumer notified");
            on_change.set(reader.get());
        });
        // Catch up with anything that changed before the subscription existed.
        set_value.set(source.get());
        move || subscription.unsubscribe()
    })?;

    Ok(value)
}
