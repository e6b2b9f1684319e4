//! Custom assertions for timing-sensitive tests

use std::time::Duration;

/// Assert that `min <= actual <= max`
///
/// # Examples
///
/// ```rust,ignore
/// use std::time::Duration;
///
/// use campus_common::testing::assert_duration_between;
///
/// let gap = Duration::from_millis(980);
/// assert_duration_between(gap, Duration::from_millis(750), Duration::from_millis(1250));
/// ```
pub fn assert_duration_between(actual: Duration, min: Duration, max: Duration) {
    assert!(
        actual >= min && actual <= max,
        "Duration {:?} not in range [{:?}, {:?}]",
        actual,
        min,
        max
    );
}
