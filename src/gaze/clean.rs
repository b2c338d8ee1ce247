//! Post-merge cleaning: outlier filters and pupil-size derivation.
use super::records::{Fixation, Saccade, Sample};
use crate::config::{FixationLimits, SaccadeLimits};
use crate::interpolate::fill_gaps_linear;
use ndarray::Array1;

/// Keep saccades inside every (strict) bound of `lim`.
pub fn filter_saccades(rows: Vec<Saccade>, lim: &SaccadeLimits) -> Vec<Saccade> {
    let n_in = rows.len();
    let out: Vec<Saccade> = rows
        .into_iter()
        .filter(|s| {
            s.amp_deg > lim.min_amp_deg
                && lim.min_v_peak < s.v_peak
                && s.v_peak < lim.max_v_peak
                && s.amp_deg < lim.max_amp_deg
                && s.duration < lim.max_duration
        })
        .collect();
    tracing::debug!(n_in, n_kept = out.len(), "clean: saccade outliers removed");
    out
}

/// Keep fixations with `min_duration < duration < max_duration`.
pub fn filter_fixations(rows: Vec<Fixation>, lim: &FixationLimits) -> Vec<Fixation> {
    let n_in = rows.len();
    let out: Vec<Fixation> = rows
        .into_iter()
        .filter(|f| lim.min_duration < f.duration && f.duration < lim.max_duration)
        .collect();
    tracing::debug!(n_in, n_kept = out.len(), "clean: fixation outliers removed");
    out
}

/// Derive `pupil_size` for every sample and fill its gaps.
///
/// Per row the right channel is taken when strictly smaller than the left,
/// otherwise the left one (a missing channel compares as `NaN`, so a missing
/// right channel yields the left value and a missing left channel yields a
/// gap).  Zero readings are dropouts and become gaps.  Gaps are then filled by
/// [`fill_gaps_linear`] in row order.
pub fn fill_pupil_size(samples: &mut [Sample]) {
    let mut pupil: Array1<f64> = samples
        .iter()
        .map(|s| {
            let r = s.r_pupil.unwrap_or(f64::NAN);
            let l = s.l_pupil.unwrap_or(f64::NAN);
            let p = if r < l { r } else { l };
            if p == 0.0 { f64::NAN } else { p }
        })
        .collect();

    let filled = fill_gaps_linear(&mut pupil);
    tracing::debug!(n_samples = samples.len(), n_filled = filled, "clean: pupil gaps interpolated");

    for (s, &p) in samples.iter_mut().zip(pupil.iter()) {
        s.pupil_size = (!p.is_nan()).then_some(p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sac(amp_deg: f64, v_peak: f64, duration: f64) -> Saccade {
        Saccade { amp_deg, v_peak, duration, ..Default::default() }
    }

    fn sample(r: Option<f64>, l: Option<f64>) -> Sample {
        Sample { r_pupil: r, l_pupil: l, ..Default::default() }
    }

    #[test]
    fn saccade_bounds_are_strict() {
        let lim = SaccadeLimits::default();
        let rows = vec![
            sac(1.0, 5.0, 20.0),    // vPeak at lower bound
            sac(1.0, 1000.0, 20.0), // vPeak at upper bound
            sac(0.0, 100.0, 20.0),  // zero amplitude
            sac(20.0, 100.0, 20.0), // amplitude at bound
            sac(1.0, 100.0, 600.0), // duration at bound
            sac(1.0, 5.5, 599.0),   // kept
        ];
        let kept = filter_saccades(rows, &lim);
        assert_eq!(kept, vec![sac(1.0, 5.5, 599.0)]);
    }

    #[test]
    fn fixation_bounds_are_strict() {
        let fix = |d: f64| Fixation { duration: d, ..Default::default() };
        let kept = filter_fixations(
            vec![fix(40.0), fix(41.0), fix(999.0), fix(1000.0)],
            &FixationLimits::default(),
        );
        let d: Vec<f64> = kept.iter().map(|f| f.duration).collect();
        assert_eq!(d, vec![41.0, 999.0]);
    }

    #[test]
    fn pupil_takes_smaller_channel() {
        let mut s = vec![sample(Some(3.0), Some(5.0)), sample(Some(7.0), Some(6.0))];
        fill_pupil_size(&mut s);
        assert_eq!(s[0].pupil_size, Some(3.0));
        assert_eq!(s[1].pupil_size, Some(6.0));
    }

    #[test]
    fn interior_zero_is_interpolated() {
        let mut s = vec![
            sample(Some(4.0), Some(9.0)),
            sample(Some(0.0), Some(9.0)),
            sample(Some(6.0), Some(9.0)),
        ];
        fill_pupil_size(&mut s);
        let mid = s[1].pupil_size.unwrap();
        assert!(mid > 4.0 && mid < 6.0);
        assert_abs_diff_eq!(mid, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn leading_zeros_take_first_valid() {
        let mut s = vec![
            sample(Some(0.0), Some(0.0)),
            sample(Some(0.0), Some(3.0)),
            sample(Some(4.5), Some(8.0)),
            sample(Some(5.0), Some(8.0)),
        ];
        fill_pupil_size(&mut s);
        assert_eq!(s[0].pupil_size, Some(4.5));
        assert_eq!(s[1].pupil_size, Some(4.5));
    }

    #[test]
    fn missing_channels() {
        // Missing right → left; missing left → gap (filled from neighbours).
        let mut s = vec![sample(None, Some(2.0)), sample(Some(1.0), None), sample(Some(4.0), Some(4.0))];
        fill_pupil_size(&mut s);
        assert_eq!(s[0].pupil_size, Some(2.0));
        assert_abs_diff_eq!(s[1].pupil_size.unwrap(), 3.0, epsilon = 1e-12);

        let mut none = vec![sample(None, None)];
        fill_pupil_size(&mut none);
        assert_eq!(none[0].pupil_size, None);
    }
}
