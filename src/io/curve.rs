//! Read/write curve JSON files.
//!
//! Curve JSON is the portable representation of an analysed survey:
//! - summary stats and the per-sample discovery curve
//! - the fitted model (if any) and its projection
//! - run metadata (source, timestamp)
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::cache::CurveAnalysis;
use crate::domain::{CurveFile, CurveProjection};
use crate::error::AppError;

/// Assemble the JSON document for an analysis.
pub fn build_curve_file(source: &str, analysis: &CurveAnalysis, projection: Option<&CurveProjection>) -> CurveFile {
    CurveFile {
        tool: "rare".to_string(),
        generated_at: Utc::now(),
        source: source.to_string(),
        stats: analysis.stats,
        fit: analysis.fit.clone(),
        projection: projection.cloned(),
        data_points: analysis.curve.data_points.clone(),
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, curve: &CurveFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, curve)
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;

    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curve: CurveFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))?;
    Ok(curve)
}
