#![forbid(unsafe_code)]

//! Observer callbacks and the unsubscribe capability handed back by
//! `subscribe`.

use std::fmt;

/// Receiver of push notifications.
///
/// Implemented for every `Fn(A)`, so plain closures can be passed wherever an
/// observer is expected.
pub trait Observer<A> {
    /// Deliver one notification.
    fn next(&self, value: A);
}

impl<A, F> Observer<A> for F
where
    F: Fn(A),
{
    fn next(&self, value: A) {
        self(value)
    }
}

/// RAII unsubscribe capability.
///
/// Dropping a `Subscription` unsubscribes the observer. [`unsubscribe`]
/// does the same explicitly and is idempotent: a second call, or a call after
/// the source has been dropped, does nothing. Call [`detach`] to keep the
/// observer registered for as long as its source lives.
///
/// [`unsubscribe`]: Subscription::unsubscribe
/// [`detach`]: Subscription::detach
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap an unsubscribe action. It runs at most once.
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// A subscription to a source that never notifies.
    #[must_use]
    pub fn empty() -> Self {
        Self { teardown: None }
    }

    /// Whether the unsubscribe action is still pending.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.teardown.is_some()
    }

    /// Stop receiving notifications. Safe to call any number of times.
    pub fn unsubscribe(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }

    /// Give up the ability to unsubscribe. The observer stays registered
    /// until its source is dropped.
    pub fn detach(mut self) {
        self.teardown = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
