//! Drawable curves built from a fit: the smooth fitted curve over the observed
//! range, its extrapolation, and a confidence band around both.
//!
//! The band is `ŷ ± se` over the observed range and `ŷ ± se·widen_factor`
//! beyond it, where `se` is the residual standard error of the fit (zero when
//! the fit had too few points to estimate it). Lower bounds are clamped at 0.

use crate::domain::{BandPoint, CurveFitResult, CurveProjection, ProjectionConfig, RarefactionStats};
use crate::error::RarefactionError;
use crate::models::predict_fit;

/// Largest number of samples to extrapolate past the observed range.
pub const MAX_HORIZON: usize = 10_000;

/// Build the fitted and extrapolated curves for `fit`.
pub fn project(
    fit: &CurveFitResult,
    stats: &RarefactionStats,
    config: &ProjectionConfig,
) -> Result<CurveProjection, RarefactionError> {
    validate_config(config)?;
    if stats.total_samples == 0 {
        return Err(RarefactionError::InvalidConfig(
            "cannot project a curve with no observed samples".to_string(),
        ));
    }

    let se = fit.residual_std_error.unwrap_or(0.0);
    let x_max = stats.total_samples as f64;

    let fitted = if stats.total_samples == 1 {
        vec![band_point(fit, 1.0, se)]
    } else {
        let steps = config.grid_points - 1;
        (0..=steps)
            .map(|i| {
                let x = 1.0 + (x_max - 1.0) * i as f64 / steps as f64;
                band_point(fit, x, se)
            })
            .collect()
    };

    let last = stats.total_samples.checked_add(config.horizon).ok_or_else(|| {
        RarefactionError::InvalidConfig(format!("horizon {} overflows the sample axis", config.horizon))
    })?;
    let extrapolated = (stats.total_samples..=last)
        .map(|x| band_point(fit, x as f64, se * config.widen_factor))
        .collect();

    Ok(CurveProjection { fitted, extrapolated })
}

fn validate_config(config: &ProjectionConfig) -> Result<(), RarefactionError> {
    if config.grid_points < 2 {
        return Err(RarefactionError::InvalidConfig(format!(
            "grid_points must be >= 2 (got {})",
            config.grid_points
        )));
    }
    if config.horizon > MAX_HORIZON {
        return Err(RarefactionError::InvalidConfig(format!(
            "horizon must be <= {MAX_HORIZON} (got {})",
            config.horizon
        )));
    }
    if !(config.widen_factor.is_finite() && config.widen_factor >= 1.0) {
        return Err(RarefactionError::InvalidConfig(format!(
            "widen_factor must be finite and >= 1 (got {})",
            config.widen_factor
        )));
    }
    Ok(())
}

fn band_point(fit: &CurveFitResult, x: f64, half_width: f64) -> BandPoint {
    let y = predict_fit(fit, x);
    BandPoint {
        x,
        y,
        lower: (y - half_width).max(0.0),
        upper: y + half_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CurveModelKind, RSquared};

    fn sample_fit(se: Option<f64>) -> CurveFitResult {
        CurveFitResult {
            model: CurveModelKind::Logarithmic,
            a: 10.0,
            b: 5.0,
            r2: RSquared::Value(0.95),
            residual_std_error: se,
            n: 10,
        }
    }

    fn stats(total_samples: usize) -> RarefactionStats {
        RarefactionStats {
            total_samples,
            total_species: 30,
        }
    }

    #[test]
    fn fitted_grid_spans_observed_range() {
        let config = ProjectionConfig::default();
        let proj = project(&sample_fit(Some(2.0)), &stats(10), &config).unwrap();

        assert_eq!(proj.fitted.len(), config.grid_points);
        assert!((proj.fitted[0].x - 1.0).abs() < 1e-12);
        assert!((proj.fitted.last().unwrap().x - 10.0).abs() < 1e-12);
        assert!((proj.fitted[0].y - 5.0).abs() < 1e-12);
        for w in proj.fitted.windows(2) {
            assert!(w[1].x > w[0].x);
        }
    }

    #[test]
    fn extrapolation_uses_horizon_and_wider_band() {
        let config = ProjectionConfig {
            grid_points: 20,
            horizon: 6,
            widen_factor: 1.5,
        };
        let proj = project(&sample_fit(Some(2.0)), &stats(10), &config).unwrap();

        let xs: Vec<f64> = proj.extrapolated.iter().map(|p| p.x).collect();
        assert_eq!(xs, (10..=16).map(|x| x as f64).collect::<Vec<_>>());

        let inner = proj.fitted.last().unwrap();
        let outer = &proj.extrapolated[0];
        assert!((inner.upper - inner.y - 2.0).abs() < 1e-12);
        assert!((outer.upper - outer.y - 3.0).abs() < 1e-12);
        assert!((outer.y - inner.y).abs() < 1e-12);
    }

    #[test]
    fn lower_band_is_clamped_at_zero() {
        let proj = project(&sample_fit(Some(50.0)), &stats(4), &ProjectionConfig::default()).unwrap();
        assert!(proj.fitted.iter().all(|p| p.lower >= 0.0));
        assert_eq!(proj.fitted[0].lower, 0.0);
    }

    #[test]
    fn missing_standard_error_gives_zero_width_band() {
        let proj = project(&sample_fit(None), &stats(2), &ProjectionConfig::default()).unwrap();
        assert!(proj.extrapolated.iter().all(|p| p.lower == p.y && p.upper == p.y));
    }

    #[test]
    fn rejects_bad_config_and_empty_stats() {
        let fit = sample_fit(Some(1.0));
        let bad_grid = ProjectionConfig {
            grid_points: 1,
            ..ProjectionConfig::default()
        };
        assert!(project(&fit, &stats(5), &bad_grid).is_err());

        let bad_widen = ProjectionConfig {
            widen_factor: f64::NAN,
            ..ProjectionConfig::default()
        };
        assert!(project(&fit, &stats(5), &bad_widen).is_err());

        assert!(project(&fit, &stats(0), &ProjectionConfig::default()).is_err());
    }

    #[test]
    fn oversized_horizon_is_rejected() {
        let fit = sample_fit(Some(1.0));
        for horizon in [usize::MAX, MAX_HORIZON + 1] {
            let config = ProjectionConfig {
                horizon,
                ..ProjectionConfig::default()
            };
            let err = project(&fit, &stats(5), &config).unwrap_err();
            assert!(matches!(err, RarefactionError::InvalidConfig(_)), "got {err:?}");
        }

        let at_limit = ProjectionConfig {
            horizon: MAX_HORIZON,
            ..ProjectionConfig::default()
        };
        let proj = project(&fit, &stats(5), &at_limit).unwrap();
        assert_eq!(proj.extrapolated.len(), MAX_HORIZON + 1);
    }

    #[test]
    fn horizon_overflowing_the_sample_axis_is_rejected() {
        let fit = sample_fit(Some(1.0));
        let err = project(&fit, &stats(usize::MAX), &ProjectionConfig::default()).unwrap_err();
        assert!(matches!(err, RarefactionError::InvalidConfig(_)), "got {err:?}");
    }
}
