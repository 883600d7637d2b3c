#![forbid(unsafe_code)]

//! Opaque event tokens.
//!
//! A [`Time`] is what an [`Emitter`](crate::Emitter) hands its observers. It
//! carries no payload; receiving one only means "re-read the property".
//! Tokens are strictly increasing per thread so two notifications can be told
//! apart in logs and tests, but nothing in this workspace branches on them.

use std::cell::Cell;
use std::fmt;

thread_local! {
    static CLOCK: Cell<u64> = const { Cell::new(0) };
}

/// Opaque notification token produced by [`now`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(u64);

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Produce a fresh event token, later than every token previously produced
/// on this thread.
#[must_use]
pub fn now() -> Time {
    CLOCK.with(|clock| {
        let tick = clock.get() + 1;
        clock.set(tick);
        Time(tick)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_strictly_increasing() {
        let a = now();
        let b = now();
        let c = now();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn display_is_compact() {
        let t = now();
        assert!(t.to_string().starts_with('t'));
    }
}
