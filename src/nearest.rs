//! Nearest-timestamp lookup on a sorted timeline.
//!
//! `find_nearest(seq, v)`:
//!   idx = first position with seq[idx] >= v     (left-biased insertion point)
//!   idx == 0       → 0
//!   idx == len     → len - 1
//!   otherwise      → argmin(|v - seq[idx-1]|, |v - seq[idx]|), ties → idx - 1

/// Closest element of the non-decreasing sequence `seq` to `value`, as
/// `(element, index)`.  Runs in `O(log n)`.
///
/// On an exact midpoint the lower index wins.  This is intentional: tables
/// produced with an upper-index rule differ by one row at such midpoints.
///
/// # Panics
///
/// Panics if `seq` is empty.  Callers own the non-empty guarantee.
///
/// # Examples
///
/// ```
/// use gazeprep::nearest::find_nearest;
///
/// let t = [10.0, 20.0, 30.0];
/// assert_eq!(find_nearest(&t, 15.0), (10.0, 0));
/// assert_eq!(find_nearest(&t, 26.0), (30.0, 2));
/// assert_eq!(find_nearest(&t, -5.0), (10.0, 0));
/// ```
pub fn find_nearest(seq: &[f64], value: f64) -> (f64, usize) {
    assert!(!seq.is_empty(), "find_nearest on an empty timeline");
    let idx = seq.partition_point(|&x| x < value);
    if idx == 0 {
        return (seq[0], 0);
    }
    if idx == seq.len() {
        return (seq[idx - 1], idx - 1);
    }
    if (value - seq[idx - 1]).abs() <= (seq[idx] - value).abs() {
        (seq[idx - 1], idx - 1)
    } else {
        (seq[idx], idx)
    }
}
