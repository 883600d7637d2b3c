#![forbid(unsafe_code)]

//! Settable property.
//!
//! [`Atom<A>`] owns a value cell and an [`Emitter`], and exposes them as a
//! [`Property`]. `set` writes the cell first and only then emits, so a
//! subscriber reading the property from its callback always sees the new
//! value. Setting a value equal to the current one (by `PartialEq`) is a
//! no-op.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::emitter::{Emitter, EmitterConfig};
use crate::observer::Subscription;
use crate::property::Property;
use crate::time::{Time, now};

/// A mutable value source with change notification.
///
/// Cloning an `Atom` creates a new handle to the **same** value.
pub struct Atom<A> {
    cell: Rc<RefCell<A>>,
    emitter: Emitter,
    property: Property<A>,
}

impl<A> Clone for Atom<A> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
            emitter: self.emitter.clone(),
            property: self.property.clone(),
        }
    }
}

impl<A: fmt::Debug> fmt::Debug for Atom<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Atom")
            .field("value", &*self.cell.borrow())
            .field("subscriber_count", &self.emitter.subscriber_count())
            .finish()
    }
}

impl<A: Clone + PartialEq + 'static> Atom<A> {
    /// Create an atom holding `value`.
    #[must_use]
    pub fn new(value: A) -> Self {
        Self::with_config(value, EmitterConfig::default())
    }

    /// Create an atom whose emitter uses `config`.
    #[must_use]
    pub fn with_config(value: A, config: EmitterConfig) -> Self {
        let cell = Rc::new(RefCell::new(value));
        let emitter = Emitter::with_config(config);
        let reader = Rc::clone(&cell);
        let property = Property::from_emitter(move || reader.borrow().clone(), &emitter);
        Self {
            cell,
            emitter,
            property,
        }
    }

    /// Read the current value.
    #[must_use]
    pub fn get(&self) -> A {
        self.cell.borrow().clone()
    }

    /// Replace the value, notifying subscribers if it changed.
    pub fn set(&self, value: A) {
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
            let time = now();
            trace!(%time, "atom changed");
            self.emitter.next(time);
        }
    }

    /// Compute the next value from the current one.
    pub fn modify(&self, f: impl FnOnce(&A) -> A) {
        let next = f(&self.cell.borrow());
        self.set(next);
    }

    /// Register a callback for change notifications.
    pub fn subscribe(&self, callback: impl Fn(Time) + 'static) -> Subscription {
        self.emitter.subscribe(callback)
    }

    /// The read-only view of this atom. Always the same property.
    #[must_use]
    pub fn as_property(&self) -> Property<A> {
        self.property.clone()
    }
}
