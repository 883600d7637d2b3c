#![forbid(unsafe_code)]

//! Errors raised by the hook lifecycle.
//!
//! All of them indicate a misuse of the render contract (hooks called
//! conditionally, or an instance rendered after unmount). None is raised by
//! ordinary value changes.

/// Errors from rendering an [`Instance`](crate::Instance).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// The hook at `index` is not of the kind it was on previous renders.
    SlotTypeMismatch {
        /// Zero-based call position of the offending hook.
        index: usize,
        /// Slot type the hook expected to find.
        expected: &'static str,
    },
    /// A render called a different number of hooks than the first render.
    HookCountChanged {
        /// Hooks registered by earlier renders.
        expected: usize,
        /// Hooks called by this render.
        found: usize,
    },
    /// The instance was unmounted; its slots are gone.
    Unmounted,
}

impl std::fmt::Display for HookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SlotTypeMismatch { index, expected } => {
                write!(f, "hook #{index} changed kind between renders (expected {expected})")
            }
            Self::HookCountChanged { expected, found } => {
                write!(f, "render called {found} hooks, previous renders called {expected}")
            }
            Self::Unmounted => write!(f, "render on an unmounted instance"),
        }
    }
}

impl std::error::Error for HookError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = HookError::SlotTypeMismatch {
            index: 2,
            expected: "RefSlot<u8>",
        };
        assert_eq!(
            err.to_string(),
            "hook #2 changed kind between renders (expected RefSlot<u8>)"
        );
        let err = HookError::HookCountChanged {
            expected: 3,
            found: 4,
        };
        assert_eq!(
            err.to_string(),
            "render called 4 hooks, previous renders called 3"
        );
        assert_eq!(
            HookError::Unmounted.to_string(),
            "render on an unmounted instance"
        );
    }
}
