#![forbid(unsafe_code)]

//! Instance-scoped mutable cells returned by `use_ref`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A mutable slot owned by one component instance.
///
/// The same `Ref` (same identity) is handed back on every render of the
/// instance. Writes are visible immediately to every clone; nothing is
/// scheduled and nobody is notified.
pub struct Ref<T> {
    cell: Rc<RefCell<T>>,
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ref").field(&*self.cell.borrow()).finish()
    }
}

impl<T> Ref<T> {
    /// Create a cell holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            cell: Rc::new(RefCell::new(value)),
        }
    }

    /// Overwrite the contents.
    pub fn set(&self, value: T) {
        *self.cell.borrow_mut() = value;
    }

    /// Overwrite the contents, returning the previous value.
    pub fn replace(&self, value: T) -> T {
        self.cell.replace(value)
    }

    /// Access the contents by reference.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.borrow())
    }

    /// Mutate the contents in place.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.cell.borrow_mut())
    }

    /// Whether two handles are the same cell.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.cell, &b.cell)
    }
}

impl<T: Clone> Ref<T> {
    /// Clone the contents out.
    #[must_use]
    pub fn get(&self) -> T {
        self.cell.borrow().clone()
    }
}
