//! Control chart unbiasing constants.
//!
//! The d2 constant is the expected value of the relative range `R / sigma`
//! of `n` independent normal observations. Dividing an average range by d2
//! yields an unbiased estimate of the process standard deviation.
//!
//! # References
//!
//! - ASTM E2587 — Standard Practice for Use of Control Charts
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.,
//!   Appendix Table VI.

/// Largest window size the d2 table covers.
pub const MAX_WINDOW: usize = 50;

/// d2 factors indexed by window size n=2..=50. Index 0 corresponds to n=2.
const D2: [f64; 49] = [
    1.128, 1.693, 2.059, 2.326, 2.534, 2.704, 2.847, 2.970, 3.078, // n=2..10
    3.173, 3.258, 3.336, 3.407, 3.472, 3.532, 3.588, 3.640, 3.689, 3.735, // n=11..20
    3.778, 3.819, 3.858, 3.895, 3.931, 3.964, 3.997, 4.027, 4.057, 4.086, // n=21..30
    4.113, 4.139, 4.165, 4.189, 4.213, 4.236, 4.259, 4.280, 4.301, 4.322, // n=31..40
    4.341, 4.361, 4.379, 4.398, 4.415, 4.433, 4.450, 4.466, 4.482, 4.498, // n=41..50
];

/// Look up the d2 constant for a moving-range window of `n` points.
///
/// - `n <= 1` returns `1.0` (no range to unbias).
/// - `n > 50` saturates at the `n = 50` value.
///
/// # Examples
///
/// ```
/// use u_spc::spc::d2;
///
/// assert!((d2(2) - 1.128).abs() < f64::EPSILON);
/// assert!((d2(5) - 2.326).abs() < f64::EPSILON);
/// assert!((d2(0) - 1.0).abs() < f64::EPSILON);
/// ```
pub fn d2(n: i64) -> f64 {
    if n <= 1 {
        return 1.0;
    }
    let n = (n as usize).min(MAX_WINDOW);
    D2[n - 2]
}
