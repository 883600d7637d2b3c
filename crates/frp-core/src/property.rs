#![forbid(unsafe_code)]

//! Pull accessor plus push subscription, behind one stable handle.
//!
//! # Design
//!
//! A [`Property<A>`] pairs a zero-argument accessor with a subscribe
//! capability, typically the one of an [`Emitter`]. Notifications carry no
//! value: an observer that wants the new value calls [`Property::get`] from
//! inside its callback. Keeping "something changed" and "what it is now" as
//! two capabilities means the accessor is always the single source of truth.
//!
//! # Invariants
//!
//! 1. `get()` is a pure read. It never notifies and never touches the
//!    subscriber table, so it is safe inside notification callbacks.
//! 2. Whoever fires the underlying emitter updates what `get()` reads first;
//!    a `get()` issued from a notification sees the new value.
//! 3. Clones share identity. Equality between properties is identity
//!    ([`Property::ptr_eq`]), never value equality.

use std::fmt;
use std::rc::Rc;

use crate::emitter::Emitter;
use crate::observer::{Observer, Subscription};
use crate::time::Time;

type Getter<A> = dyn Fn() -> A;
type Subscribe = dyn Fn(Rc<dyn Observer<Time>>) -> Subscription;

struct PropertyInner<A> {
    get: Box<Getter<A>>,
    subscribe: Box<Subscribe>,
}

/// A reactive value: pull with [`get`](Property::get), get told about
/// changes with [`subscribe`](Property::subscribe).
pub struct Property<A> {
    inner: Rc<PropertyInner<A>>,
}

impl<A> Clone for Property<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> PartialEq for Property<A> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<A> Eq for Property<A> {}

impl<A: fmt::Debug> fmt::Debug for Property<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}

impl<A> Property<A> {
    /// Build a property from an accessor and a subscribe function.
    pub fn new(
        get: impl Fn() -> A + 'static,
        subscribe: impl Fn(Rc<dyn Observer<Time>>) -> Subscription + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(PropertyInner {
                get: Box::new(get),
                subscribe: Box::new(subscribe),
            }),
        }
    }

    /// Build a property whose subscribers are the emitter's subscribers.
    pub fn from_emitter(get: impl Fn() -> A + 'static, emitter: &Emitter) -> Self {
        let emitter = emitter.clone();
        Self::new(get, move |observer| emitter.subscribe_observer(observer))
    }

    /// Read the current value.
    #[must_use]
    pub fn get(&self) -> A {
        (self.inner.get)()
    }

    /// Register a callback for change notifications.
    pub fn subscribe(&self, callback: impl Fn(Time) + 'static) -> Subscription {
        (self.inner.subscribe)(Rc::new(callback))
    }

    /// Register an already shared observer for change notifications.
    pub fn subscribe_observer(&self, observer: Rc<dyn Observer<Time>>) -> Subscription {
        (self.inner.subscribe)(observer)
    }

    /// Whether two handles are the same property.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }
}

impl<A: 'static> Property<A> {
    /// Derive a property that reads `f(self.get())` and notifies whenever
    /// `self` does.
    pub fn map<B>(&self, f: impl Fn(A) -> B + 'static) -> Property<B> {
        let source = self.clone();
        let notifier = self.clone();
        Property::new(
            move || f(source.get()),
            move |observer| notifier.subscribe_observer(observer),
        )
    }
}

impl<A: Clone + 'static> Property<A> {
    /// A property that always reads `value` and never notifies.
    #[must_use]
    pub fn constant(value: A) -> Self {
        Self::new(move || value.clone(), |_| Subscription::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;
    use std::cell::{Cell, RefCell};

    fn cell_property(initial: i32) -> (Rc<Cell<i32>>, Emitter, Property<i32>) {
        let cell = Rc::new(Cell::new(initial));
        let emitter = Emitter::new();
        let reader = Rc::clone(&cell);
        let property = Property::from_emitter(move || reader.get(), &emitter);
        (cell, emitter, property)
    }

    #[test]
    fn get_reads_accessor() {
        let (cell, _emitter, property) = cell_property(1);
        assert_eq!(property.get(), 1);
        cell.set(5);
        assert_eq!(property.get(), 5);
    }

    #[test]
    fn get_has_no_side_effects() {
        let (_cell, emitter, property) = cell_property(1);
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let _sub = property.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        for _ in 0..10 {
            let _ = property.get();
        }
        assert_eq!(count.get(), 0);
        assert_eq!(emitter.subscriber_count(), 1);
    }

    #[test]
    fn subscribe_delegates_to_emitter() {
        let (_cell, emitter, property) = cell_property(0);
        let mut sub = property.subscribe(|_| {});
        assert_eq!(emitter.subscriber_count(), 1);
        sub.unsubscribe();
        assert!(emitter.is_empty());
    }

    #[test]
    fn get_inside_notification_sees_new_value() {
        let (cell, emitter, property) = cell_property(1);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_clone = Rc::clone(&seen);
        let reader = property.clone();
        let _sub = property.subscribe(move |_| seen_clone.borrow_mut().push(reader.get()));

        cell.set(2);
        emitter.next(now());
        cell.set(3);
        emitter.next(now());

        assert_eq!(*seen.borrow(), vec![2, 3]);
    }

    #[test]
    fn identity_equality() {
        let (_cell, _emitter, property) = cell_property(1);
        let (_other_cell, _other_emitter, other) = cell_property(1);
        let clone = property.clone();

        assert_eq!(property, clone);
        assert!(Property::ptr_eq(&property, &clone));
        // Same value, different property.
        assert_ne!(property, other);
    }

    #[test]
    fn map_reads_through_and_shares_notifications() {
        let (cell, emitter, property) = cell_property(2);
        let doubled = property.map(|v| v * 2);
        assert_eq!(doubled.get(), 4);

        let seen = Rc::new(Cell::new(0));
        let seen_clone = Rc::clone(&seen);
        let reader = doubled.clone();
        let _sub = doubled.subscribe(move |_| seen_clone.set(reader.get()));
        assert_eq!(emitter.subscriber_count(), 1);

        cell.set(10);
        emitter.next(now());
        assert_eq!(seen.get(), 20);
    }

    #[test]
    fn constant_never_notifies() {
        let property = Property::constant("fixed");
        let sub = property.subscribe(|_| panic!("constant notified"));
        assert!(!sub.is_active());
        assert_eq!(property.get(), "fixed");
    }

    #[test]
    fn debug_shows_value() {
        let property = Property::constant(42);
        let dbg = format!("{property:?}");
        assert!(dbg.contains("Property"));
        assert!(dbg.contains("42"));
    }
}
