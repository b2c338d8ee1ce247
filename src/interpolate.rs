//! Linear gap filling over a 1-D series.
//!
//! Gaps are `NaN` runs.  Interior runs are filled on the straight line between
//! the bounding valid values (by row position, not by timestamp); leading and
//! trailing runs repeat the nearest valid value.  An all-`NaN` series is left
//! untouched.
use ndarray::Array1;

/// Fill `NaN` gaps in place.  Returns the number of filled elements.
pub fn fill_gaps_linear(x: &mut Array1<f64>) -> usize {
    let valid: Vec<usize> = x
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .map(|(i, _)| i)
        .collect();
    let (Some(&first), Some(&last)) = (valid.first(), valid.last()) else {
        return 0;
    };

    let mut filled = first + (x.len() - 1 - last);
    let (head, tail) = (x[first], x[last]);
    x.slice_mut(ndarray::s![..first]).fill(head);
    x.slice_mut(ndarray::s![last + 1..]).fill(tail);

    for pair in valid.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b - a < 2 {
            continue;
        }
        let (ya, yb) = (x[a], x[b]);
        let span = (b - a) as f64;
        for i in a + 1..b {
            x[i] = ya + (yb - ya) * (i - a) as f64 / span;
        }
        filled += b - a - 1;
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn interior_gap_is_linear() {
        let mut x = array![4.0, f64::NAN, f64::NAN, f64::NAN, 8.0];
        assert_eq!(fill_gaps_linear(&mut x), 3);
        for (got, exp) in x.iter().zip([4.0, 5.0, 6.0, 7.0, 8.0]) {
            assert_abs_diff_eq!(*got, exp, epsilon = 1e-12);
        }
    }

    #[test]
    fn edges_extend_nearest_valid() {
        let mut x = array![f64::NAN, f64::NAN, 3.0, 5.0, f64::NAN];
        assert_eq!(fill_gaps_linear(&mut x), 3);
        assert_eq!(x.to_vec(), vec![3.0, 3.0, 3.0, 5.0, 5.0]);
    }

    #[test]
    fn all_missing_untouched() {
        let mut x = array![f64::NAN, f64::NAN];
        assert_eq!(fill_gaps_linear(&mut x), 0);
        assert!(x.iter().all(|v| v.is_nan()));

        let mut empty = Array1::<f64>::zeros(0);
        assert_eq!(fill_gaps_linear(&mut empty), 0);
    }

    #[test]
    fn no_gaps_is_identity() {
        let mut x = array![1.0, 2.0, 9.0];
        assert_eq!(fill_gaps_linear(&mut x), 0);
        assert_eq!(x.to_vec(), vec![1.0, 2.0, 9.0]);
    }
}
