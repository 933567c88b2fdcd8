//! Reporting utilities: per-sample residuals and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{CurveFitResult, RarefactionDataPoint};
use crate::error::AppError;
use crate::models::predict_fit;

/// Observed vs fitted cumulative species at one sample.
#[derive(Debug, Clone)]
pub struct PointResidual {
    pub point: RarefactionDataPoint,
    pub y_fit: f64,
    pub residual: f64,
}

/// Compute fitted values and residuals for each point of the curve.
pub fn compute_residuals(points: &[RarefactionDataPoint], fit: &CurveFitResult) -> Result<Vec<PointResidual>, AppError> {
    let mut out = Vec::with_capacity(points.len());
    for p in points {
        let y_fit = predict_fit(fit, p.x());
        if !y_fit.is_finite() {
            return Err(AppError::new(4, "Non-finite model prediction during residual computation."));
        }
        out.push(PointResidual {
            point: p.clone(),
            y_fit,
            residual: p.y() - y_fit,
        });
    }
    Ok(out)
}
