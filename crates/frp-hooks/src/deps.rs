#![forbid(unsafe_code)]

//! Change predicates deciding whether a commit-phase effect re-runs.
//!
//! A predicate receives the dependencies recorded at the last commit that ran
//! the effect and the dependencies of the current render, and returns `true`
//! when the effect should run again. Any `Fn(&D, &D) -> bool` works; the two
//! below cover the common cases.

/// Re-run when the dependencies differ by `PartialEq`.
///
/// This is the default used by `use_effect` and `use_memo`.
#[must_use]
pub fn changed_by_eq<D: PartialEq>(previous: &D, next: &D) -> bool {
    previous != next
}

/// Re-run on every committed render.
#[must_use]
pub fn changed_always<D>(_previous: &D, _next: &D) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn eq_predicate() {
        assert!(!changed_by_eq(&1, &1));
        assert!(changed_by_eq(&1, &2));
        assert!(!changed_by_eq(&"a".to_string(), &"a".to_string()));
    }

    #[test]
    fn always_predicate() {
        assert!(changed_always(&1, &1));
    }

    #[test]
    fn identity_predicate_via_closure() {
        let by_identity = |a: &Rc<i32>, b: &Rc<i32>| !Rc::ptr_eq(a, b);
        let a = Rc::new(1);
        let b = Rc::new(1);
        assert!(by_identity(&a, &b));
        assert!(!by_identity(&a, &Rc::clone(&a)));
        // Value equality would have said "unchanged".
        assert!(!changed_by_eq(&a, &b));
    }
}
