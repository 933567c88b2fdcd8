//! Export the per-sample discovery curve to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::RarefactionCurve;
use crate::error::AppError;
use crate::report::PointResidual;

/// Write the discovery curve (plus fitted values and residuals, if any) to a CSV file.
pub fn write_curve_csv(path: &Path, curve: &RarefactionCurve, residuals: &[PointResidual]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_curve_rows(file, curve, residuals)
}

fn write_curve_rows<W: Write>(out: W, curve: &RarefactionCurve, residuals: &[PointResidual]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);

    writer
        .write_record([
            "sample_index",
            "sample_name",
            "new_species",
            "cumulative_species",
            "fitted",
            "residual",
        ])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (i, p) in curve.data_points.iter().enumerate() {
        let (fitted, residual) = residuals
            .get(i)
            .map(|r| (format!("{:.6}", r.y_fit), format!("{:.6}", r.residual)))
            .unwrap_or_default();
        writer
            .write_record([
                p.sample_index.to_string(),
                p.sample_name.clone(),
                p.new_species.to_string(),
                p.cumulative_species.to_string(),
                fitted,
                residual,
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
