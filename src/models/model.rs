//! Model evaluation for discovery-curve fits.
//!
//! The fitter relies on two primitive operations:
//! - transform `x` into the linear regressor `u` (for OLS)
//! - predict `y(x)` given fitted parameters (for residuals, projections, reports)

use crate::domain::{CurveFitResult, CurveModelKind};

/// Regressor for sample position `x` (1-based, so `x ≥ 1`).
pub fn regressor(model: CurveModelKind, x: f64) -> f64 {
    match model {
        CurveModelKind::Logarithmic => x.ln(),
    }
}

/// Predict cumulative species at `x`.
pub fn predict(model: CurveModelKind, x: f64, a: f64, b: f64) -> f64 {
    a * regressor(model, x) + b
}

/// Predict using a fitted result.
pub fn predict_fit(fit: &CurveFitResult, x: f64) -> f64 {
    predict(fit.model, x, fit.a, fit.b)
}
