//! Formatted terminal output.
//!
//! We keep formatting code in one place so the curve/fit code stays clean and
//! output changes are localized.

use crate::cache::CurveAnalysis;
use crate::domain::{CurveFile, CurveFitResult, CurveProjection, RarefactionDataPoint, RarefactionStats};
use crate::report::{PointResidual, compute_residuals};

/// Format the run summary: dataset stats, fit diagnostics and projection endpoints.
pub fn format_run_summary(source: &str, analysis: &CurveAnalysis, projection: Option<&CurveProjection>) -> String {
    let mut out = String::new();

    out.push_str("=== rare - species discovery curve ===\n");
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format_stats(&analysis.stats));
    out.push_str(&format_fit(analysis.fit.as_ref()));
    if let Some(projection) = projection {
        out.push_str(&format_projection(projection));
    }

    out
}

/// Summary for a saved curve file.
pub fn format_curve_file(curve: &CurveFile) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} curve ===\n", curve.tool));
    out.push_str(&format!("Source: {}\n", curve.source));
    out.push_str(&format!("Generated: {}\n", curve.generated_at.to_rfc3339()));
    out.push_str(&format_stats(&curve.stats));
    out.push_str(&format_fit(curve.fit.as_ref()));
    if let Some(projection) = &curve.projection {
        out.push_str(&format_projection(projection));
    }
    out.push('\n');
    let residuals = match &curve.fit {
        Some(fit) => compute_residuals(&curve.data_points, fit).unwrap_or_default(),
        None => Vec::new(),
    };
    out.push_str(&format_curve_table(&curve.data_points, &residuals));

    out
}

/// Per-sample table: new and cumulative species, plus fitted value and residual
/// for points that have one (`residuals` is empty when there is no fit).
pub fn format_curve_table(points: &[RarefactionDataPoint], residuals: &[PointResidual]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>5} {:<24} {:>6} {:>10} {:>10} {:>10}\n",
            "#", "sample", "new", "cumulative", "fitted", "residual"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:->5} {:-<24} {:->6} {:->10} {:->10} {:->10}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for (i, p) in points.iter().enumerate() {
        let (fitted, residual) = match residuals.get(i) {
            Some(r) => (format!("{:.2}", r.y_fit), format!("{:+.2}", r.residual)),
            None => (String::new(), String::new()),
        };
        out.push_str(
            format!(
                "{:>5} {:<24} {:>6} {:>10} {:>10} {:>10}\n",
                p.sample_index + 1,
                truncate(&p.sample_name, 24),
                p.new_species,
                p.cumulative_species,
                fitted,
                residual,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn format_stats(stats: &RarefactionStats) -> String {
    format!(
        "Samples: {} | species: {}\n",
        stats.total_samples, stats.total_species
    )
}

fn format_fit(fit: Option<&CurveFitResult>) -> String {
    let Some(fit) = fit else {
        return "Fit: none (need at least 2 samples)\n".to_string();
    };

    let mut out = String::new();
    out.push_str(&format!("Fit: {} (n={})\n", fit.model.display_name(), fit.n));
    out.push_str(&format!("- a  : {:.6}\n", fit.a));
    out.push_str(&format!("- b  : {:.6}\n", fit.b));
    out.push_str(&format!("- r2 : {}\n", fit.r2));
    match fit.residual_std_error {
        Some(se) => out.push_str(&format!("- se : {se:.4}\n")),
        None => out.push_str("- se : n/a (need at least 3 samples)\n"),
    }
    out
}

fn format_projection(projection: &CurveProjection) -> String {
    let (Some(first), Some(last)) = (projection.extrapolated.first(), projection.extrapolated.last()) else {
        return String::new();
    };
    format!(
        "Projection: x={:.0} -> {:.1} species | x={:.0} -> {:.1} [{:.1}, {:.1}]\n",
        first.x, first.y, last.x, last.y, last.lower, last.upper
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
