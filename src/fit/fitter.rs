//! Least-squares fitting of a curve model to a discovery curve.
//!
//! Given data points with `x_i = sample_index + 1` and
//! `y_i = cumulative_species`, we:
//! - transform `x` to the model regressor (`ln(x)` for the logarithmic model)
//! - solve the closed-form normal equations for `(a, b)`
//! - report R² and the residual standard error
//!
//! Outcomes the caller must branch on:
//! - fewer than two points: `Ok(None)` (nothing to fit yet)
//! - no variance in `x`: `Err(DegenerateFit)`

use nalgebra::DVector;
use tracing::{debug, warn};

use crate::domain::{CurveFitResult, CurveModelKind, RSquared, RarefactionDataPoint};
use crate::error::RarefactionError;
use crate::math::fit_line;
use crate::models::regressor;

/// Minimum number of points to solve for two parameters.
pub const MIN_FIT_POINTS: usize = 2;

/// Fit `model` to the discovery curve.
pub fn fit(
    points: &[RarefactionDataPoint],
    model: CurveModelKind,
) -> Result<Option<CurveFitResult>, RarefactionError> {
    let xy: Vec<(f64, f64)> = points.iter().map(|p| (p.x(), p.y())).collect();
    fit_xy(&xy, model)
}

/// Like [`fit`], but a degenerate fit is reported as "no fit available".
pub fn fit_or_none(points: &[RarefactionDataPoint], model: CurveModelKind) -> Option<CurveFitResult> {
    match fit(points, model) {
        Ok(fit) => fit,
        Err(e) => {
            warn!("curve fit unavailable: {e}");
            None
        }
    }
}

/// Fit `model` to raw `(x, y)` pairs. Every `x` must be finite and positive.
///
/// The fit is degenerate only when the transformed `x` values carry no spread
/// beyond floating-point round-off, so distinct but close values still fit.
pub fn fit_xy(xy: &[(f64, f64)], model: CurveModelKind) -> Result<Option<CurveFitResult>, RarefactionError> {
    let n = xy.len();
    if n < MIN_FIT_POINTS {
        debug!(n, "not enough points to fit {}", model.display_name());
        return Ok(None);
    }

    if let Some(idx) = xy.iter().position(|&(x, y)| !(x.is_finite() && x > 0.0 && y.is_finite())) {
        return Err(RarefactionError::invalid_input(
            idx,
            format!("fit point ({}, {}) is outside the model domain", xy[idx].0, xy[idx].1),
        ));
    }

    let u = DVector::from_iterator(n, xy.iter().map(|&(x, _)| regressor(model, x)));
    let y = DVector::from_iterator(n, xy.iter().map(|&(_, y)| y));

    let line = fit_line(&u, &y).ok_or(RarefactionError::DegenerateFit)?;

    let r2 = r_squared(line.ss_res, line.ss_tot);
    let residual_std_error = if n > model.param_count() {
        Some((line.ss_res / (n - model.param_count()) as f64).sqrt())
    } else {
        None
    };

    debug!(
        n,
        a = line.slope,
        b = line.intercept,
        "fitted {}",
        model.display_name()
    );

    Ok(Some(CurveFitResult {
        model,
        a: line.slope,
        b: line.intercept,
        r2,
        residual_std_error,
        n,
    }))
}

/// Tolerance for treating a sum of squares as exactly zero.
const SS_ZERO: f64 = 1e-12;

fn r_squared(ss_res: f64, ss_tot: f64) -> RSquared {
    if ss_tot <= SS_ZERO {
        if ss_res <= SS_ZERO {
            RSquared::Perfect
        } else {
            RSquared::Undefined
        }
    } else {
        RSquared::Value(1.0 - ss_res / ss_tot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::compute_curve;
    use crate::domain::SampleOccurrence;
    use crate::models::predict;

    fn points_from_y(ys: &[usize]) -> Vec<RarefactionDataPoint> {
        let mut prev = 0;
        ys.iter()
            .enumerate()
            .map(|(i, &y)| {
                let p = RarefactionDataPoint {
                    sample_index: i,
                    sample_name: format!("S{}", i + 1),
                    new_species: y.saturating_sub(prev),
                    cumulative_species: y,
                };
                prev = y;
                p
            })
            .collect()
    }

    #[test]
    fn recovers_noise_free_logarithmic_parameters() {
        let (a0, b0) = (12.5, 3.0);
        let xy: Vec<(f64, f64)> = (1..=8)
            .map(|x| {
                let x = x as f64;
                (x, predict(CurveModelKind::Logarithmic, x, a0, b0))
            })
            .collect();

        let fit = fit_xy(&xy, CurveModelKind::Logarithmic).unwrap().unwrap();
        assert!((fit.a - a0).abs() < 1e-9, "a={}", fit.a);
        assert!((fit.b - b0).abs() < 1e-9, "b={}", fit.b);
        let r2 = fit.r2.as_f64().unwrap();
        assert!((r2 - 1.0).abs() < 1e-12, "r2={r2}");
        assert!(fit.residual_std_error.unwrap() < 1e-6);
        assert_eq!(fit.n, 8);
    }

    #[test]
    fn fewer_than_two_points_is_absent() {
        assert_eq!(fit(&[], CurveModelKind::Logarithmic).unwrap(), None);
        assert_eq!(fit(&points_from_y(&[4]), CurveModelKind::Logarithmic).unwrap(), None);
    }

    #[test]
    fn empty_survey_has_no_fit() {
        let curve = compute_curve(&[]).unwrap();
        assert!(fit(&curve.data_points, CurveModelKind::Logarithmic).unwrap().is_none());
    }

    #[test]
    fn identical_x_is_degenerate() {
        let xy = [(3.0, 5.0), (3.0, 7.0), (3.0, 9.0)];
        let err = fit_xy(&xy, CurveModelKind::Logarithmic).unwrap_err();
        assert_eq!(err, RarefactionError::DegenerateFit);
    }

    #[test]
    fn closely_spaced_x_still_fits() {
        let xy = [(1e6, 1.0), (1e6 + 1.0, 2.0), (1e6 + 2.0, 3.0)];
        let fit = fit_xy(&xy, CurveModelKind::Logarithmic).unwrap().unwrap();

        assert!(fit.a > 0.0);
        assert!(fit.r2.as_f64().unwrap() > 0.999);
    }

    #[test]
    fn non_positive_x_is_rejected() {
        let xy = [(0.0, 1.0), (1.0, 2.0)];
        let err = fit_xy(&xy, CurveModelKind::Logarithmic).unwrap_err();
        assert!(matches!(err, RarefactionError::InvalidInput { index: 0, .. }));
    }

    #[test]
    fn two_points_fit_exactly_without_standard_error() {
        let fit = fit(&points_from_y(&[3, 7]), CurveModelKind::Logarithmic)
            .unwrap()
            .unwrap();
        assert!((fit.b - 3.0).abs() < 1e-12);
        assert!((fit.a - 4.0 / 2f64.ln()).abs() < 1e-9);
        assert!(fit.residual_std_error.is_none());
    }

    #[test]
    fn flat_curve_reports_perfect_r2() {
        let fit = fit(&points_from_y(&[5, 5, 5, 5]), CurveModelKind::Logarithmic)
            .unwrap()
            .unwrap();
        assert!(fit.a.abs() < 1e-12);
        assert!((fit.b - 5.0).abs() < 1e-12);
        assert_eq!(fit.r2, RSquared::Perfect);
    }

    #[test]
    fn r_squared_edge_cases() {
        assert_eq!(r_squared(0.0, 0.0), RSquared::Perfect);
        assert_eq!(r_squared(2.0, 0.0), RSquared::Undefined);
        assert_eq!(r_squared(1.0, 4.0), RSquared::Value(0.75));
    }

    #[test]
    fn noisy_survey_fit_is_reasonable() {
        let samples: Vec<SampleOccurrence> = [
            vec!["a", "b", "c", "d"],
            vec!["a", "e", "f"],
            vec!["b", "g"],
            vec!["a", "h"],
            vec!["c", "d"],
            vec!["i"],
        ]
        .into_iter()
        .enumerate()
        .map(|(i, sp)| SampleOccurrence::new(format!("S{}", i + 1), sp))
        .collect();
        let curve = compute_curve(&samples).unwrap();

        let fit = fit(&curve.data_points, CurveModelKind::Logarithmic)
            .unwrap()
            .unwrap();
        assert!(fit.a > 0.0);
        let r2 = fit.r2.as_f64().unwrap();
        assert!(r2 > 0.8 && r2 <= 1.0, "r2={r2}");
    }

    #[test]
    fn fit_or_none_passes_through_valid_fits() {
        assert!(fit_or_none(&points_from_y(&[1, 2, 3]), CurveModelKind::Logarithmic).is_some());
        assert!(fit_or_none(&points_from_y(&[1]), CurveModelKind::Logarithmic).is_none());
    }
}
