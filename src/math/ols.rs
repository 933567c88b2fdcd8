//! Closed-form simple linear least squares.
//!
//! Every curve model in this crate is linear in its parameters after a fixed
//! transform of `x` (for the logarithmic model, `u = ln(x)`), so fitting
//! reduces to the normal equations for `y = slope·u + intercept`:
//!
//! ```text
//! slope     = Σ(u_i - ū)(y_i - ȳ) / Σ(u_i - ū)²
//! intercept = ȳ - slope·ū
//! ```

use nalgebra::DVector;

/// Rounding slack, in ulps of the largest `|u|`, allowed in each centered `u`.
const CENTERING_ULPS: f64 = 4.0;

/// Result of a simple linear fit, with the sums of squares needed for R².
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    /// `Σ(y_i - ŷ_i)²`
    pub ss_res: f64,
    /// `Σ(y_i - ȳ)²`
    pub ss_tot: f64,
    pub n: usize,
}

/// Fit `y = slope·u + intercept`.
///
/// Returns `None` if the inputs are empty, mismatched in length, or `u` has no
/// variance (the slope is undefined).
pub fn fit_line(u: &DVector<f64>, y: &DVector<f64>) -> Option<LineFit> {
    let n = u.len();
    if n == 0 || y.len() != n {
        return None;
    }

    let u_bar = u.mean();
    let y_bar = y.mean();
    let u_c = u.add_scalar(-u_bar);
    let y_c = y.add_scalar(-y_bar);

    // Identical `u` values only leave centering round-off behind; anything
    // above that floor is real spread, however small.
    let sxx = u_c.norm_squared();
    let noise = CENTERING_ULPS * f64::EPSILON * u.amax().max(1.0);
    if !(sxx.is_finite() && sxx > n as f64 * noise * noise) {
        return None;
    }

    let slope = u_c.dot(&y_c) / sxx;
    let intercept = y_bar - slope * u_bar;

    let fitted = u.map(|ui| slope * ui + intercept);
    let ss_res = (y - fitted).norm_squared();
    let ss_tot = y_c.norm_squared();

    Some(LineFit {
        slope,
        intercept,
        ss_res,
        ss_tot,
        n,
    })
}
