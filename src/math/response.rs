//! The decaying-exponential enrollment response curve and its inverse.
//!
//! Enrollment as a function of incentive `x`:
//!
//! - `e(x) = L + (U - L) · (1 - exp(-β·x))`
//!
//! and the incentive needed to reach enrollment `e`:
//!
//! - `x(e) = -ln(1 - s) / β` with `s = (e - L) / (U - L)`
//!
//! Numerical notes:
//! - `1 - exp(-βx)` is computed as `-expm1(-βx)` and `ln(1 - s)` as `ln_1p(-s)`,
//!   which keeps small incentives and low enrollments exact.
//! - Once `s ≥ 1` the curve is saturated and the required incentive is zero.

/// Enrollment reached at `incentive` on a curve with decay `rate`.
pub fn enrollment_at(incentive: f64, rate: f64, lower: f64, upper: f64) -> f64 {
    lower + (upper - lower) * -(-rate * incentive).exp_m1()
}

/// Incentive required to reach `enrollment` on a curve with decay `rate`.
pub fn incentive_for(enrollment: f64, rate: f64, lower: f64, upper: f64) -> f64 {
    let share = (enrollment - lower) / (upper - lower);
    // NaN (degenerate U = L) falls through as saturated.
    if !(share < 1.0) {
        return 0.0;
    }
    -(-share).ln_1p() / rate
}

/// Argument of the logarithm that calibrates `β` through an anchor point.
///
/// Equals `1 - s(anchor)`; it lies in `(0, 1)` exactly when the anchor sits
/// strictly between the lower and upper limits.
pub fn anchor_log_argument(anchor: f64, lower: f64, upper: f64) -> f64 {
    (anchor - upper) / (lower - upper)
}

/// `n` enrollment levels `i · upper / n` for `i = 0..n`.
pub fn linear_levels(upper: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64 * (upper / n as f64)).collect()
}
