//! Handling priority used to rank operations competing for one request.

use std::fmt;

/// Rank an operation reports for a request.
///
/// Ordering is total: `CANNOT_HANDLE` sorts below every real priority, and
/// real priorities compare by their numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlingPriority(Option<i32>);

impl HandlingPriority {
    /// The operation is not a candidate for the request.
    pub const CANNOT_HANDLE: Self = Self(None);

    /// Lowest real priority. Built-in operations and most backend operations use it.
    pub const HANDLE_WITH_DEFAULT_PRIORITY: Self = Self(Some(i32::MIN));

    /// Highest priority an operation can report.
    pub const HANDLE_WITH_MAX_PRIORITY: Self = Self(Some(i32::MAX));

    #[must_use]
    pub const fn of(priority: i32) -> Self {
        Self(Some(priority))
    }

    /// Numeric priority, or `None` for `CANNOT_HANDLE`.
    #[must_use]
    pub const fn priority(self) -> Option<i32> {
        self.0
    }

    #[must_use]
    pub const fn can_handle(self) -> bool {
        self.0.is_some()
    }

    /// Returns a priority `by` steps higher, saturating at the maximum.
    ///
    /// `CANNOT_HANDLE` stays `CANNOT_HANDLE`.
    #[must_use]
    pub fn increase_priority(self, by: u32) -> Self {
        Self(self.0.map(|p| {
            let raised = i64::from(p) + i64::from(by);
            i32::try_from(raised).unwrap_or(i32::MAX)
        }))
    }
}

impl Default for HandlingPriority {
    fn default() -> Self {
        Self::CANNOT_HANDLE
    }
}

impl From<i32> for HandlingPriority {
    fn from(priority: i32) -> Self {
        Self::of(priority)
    }
}

impl fmt::Display for HandlingPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(p) => write!(f, "{p}"),
            None => f.write_str("cannot-handle"),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn cannot_handle_is_below_default() {
        assert!(HandlingPriority::CANNOT_HANDLE < HandlingPriority::HANDLE_WITH_DEFAULT_PRIORITY);
        assert!(HandlingPriority::HANDLE_WITH_DEFAULT_PRIORITY < HandlingPriority::of(0));
        assert!(HandlingPriority::of(0) < HandlingPriority::HANDLE_WITH_MAX_PRIORITY);
    }

    #[test]
    fn sentinel_reports_no_priority() {
        assert!(!HandlingPriority::CANNOT_HANDLE.can_handle());
        assert_eq!(HandlingPriority::CANNOT_HANDLE.priority(), None);
        assert_eq!(HandlingPriority::default(), HandlingPriority::CANNOT_HANDLE);
        assert_eq!(HandlingPriority::of(7).priority(), Some(7));
    }

    #[test]
    fn increase_priority_saturates_and_keeps_sentinel() {
        assert_eq!(
            HandlingPriority::HANDLE_WITH_DEFAULT_PRIORITY.increase_priority(1),
            HandlingPriority::of(i32::MIN + 1)
        );
        assert_eq!(
            HandlingPriority::of(i32::MAX - 1).increase_priority(10),
            HandlingPriority::HANDLE_WITH_MAX_PRIORITY
        );
        assert_eq!(
            HandlingPriority::CANNOT_HANDLE.increase_priority(5),
            HandlingPriority::CANNOT_HANDLE
        );
    }

    #[test]
    fn display() {
        assert_eq!(HandlingPriority::of(5).to_string(), "5");
        assert_eq!(HandlingPriority::CANNOT_HANDLE.to_string(), "cannot-handle");
    }

    proptest! {
        #[test]
        fn ordering_matches_numeric_order(a in any::<i32>(), b in any::<i32>()) {
            let pa = HandlingPriority::of(a);
            let pb = HandlingPriority::of(b);
            prop_assert_eq!(pa.cmp(&pb), a.cmp(&b));
            prop_assert!(HandlingPriority::CANNOT_HANDLE < pa);
        }

        #[test]
        fn increase_never_lowers(p in any::<i32>(), by in any::<u32>()) {
            let base = HandlingPriority::of(p);
            prop_assert!(base.increase_priority(by) >= base);
        }
    }
}
