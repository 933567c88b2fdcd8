//! Shared "survey pipeline" logic used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> discovery curve -> fit -> projection -> residuals
//!
//! The front-end can then focus on presentation.

use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::cache::{CurveAnalysis, CurveCache};
use crate::domain::{CurveProjection, RunConfig, SampleOccurrence};
use crate::error::AppError;
use crate::fit::project;
use crate::io::ingest::{IngestOptions, IngestedSurvey, load_occurrences};
use crate::report::{PointResidual, compute_residuals};

/// All computed outputs for one survey.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub source: String,
    pub rows_read: usize,
    pub rows_used: usize,
    pub rows_skipped: usize,
    pub analysis: Arc<CurveAnalysis>,
    pub projection: Option<CurveProjection>,
    /// One entry per curve point when a fit exists, otherwise empty.
    pub residuals: Vec<PointResidual>,
}

/// Analyse an in-memory survey.
pub fn run_survey(
    source: &str,
    samples: &[SampleOccurrence],
    config: &RunConfig,
    cache: &mut CurveCache,
) -> Result<RunOutput, AppError> {
    let analysis = cache.get_or_compute(samples, config.model)?;

    let (projection, residuals) = match &analysis.fit {
        Some(fit) => (
            Some(project(fit, &analysis.stats, &config.projection)?),
            compute_residuals(&analysis.curve.data_points, fit)?,
        ),
        None => {
            warn!(source, samples = analysis.stats.total_samples, "not enough samples to fit a curve");
            (None, Vec::new())
        }
    };

    info!(
        source,
        samples = analysis.stats.total_samples,
        species = analysis.stats.total_species,
        "discovery curve built"
    );

    Ok(RunOutput {
        source: source.to_string(),
        rows_read: 0,
        rows_used: 0,
        rows_skipped: 0,
        analysis,
        projection,
        residuals,
    })
}

/// Ingest and analyse several occurrence tables.
///
/// Files are read and parsed in parallel; analyses then go through one cache
/// so identical surveys are only computed once. Results keep input order.
pub fn run_files(paths: &[PathBuf], config: &RunConfig) -> Vec<Result<RunOutput, AppError>> {
    let opts = IngestOptions {
        layout: config.layout,
        threshold: config.threshold,
        sample_columns: config.sample_columns.clone(),
    };

    let ingested: Vec<Result<IngestedSurvey, AppError>> =
        paths.par_iter().map(|path| load_occurrences(path, &opts)).collect();

    let mut cache = CurveCache::new(paths.len());
    ingested
        .into_iter()
        .map(|survey| {
            let survey = survey?;
            let mut run = run_survey(&survey.source, &survey.samples, config, &mut cache)?;
            run.rows_read = survey.rows_read;
            run.rows_used = survey.rows_used;
            run.rows_skipped = survey.row_errors.len();
            Ok(run)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_csv(tag: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("rare_pipeline_{}_{tag}.csv", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn run_survey_fits_and_projects() {
        let samples = vec![
            SampleOccurrence::new("S1", ["A", "B"]),
            SampleOccurrence::new("S2", ["B", "C"]),
            SampleOccurrence::new("S3", ["D"]),
            SampleOccurrence::new("S4", ["A"]),
        ];
        let mut cache = CurveCache::default();
        let run = run_survey("mem", &samples, &RunConfig::default(), &mut cache).unwrap();

        assert_eq!(run.analysis.stats.total_species, 4);
        assert_eq!(run.residuals.len(), 4);
        let projection = run.projection.unwrap();
        assert_eq!(projection.extrapolated.first().unwrap().x, 4.0);
        assert_eq!(projection.extrapolated.last().unwrap().x, 10.0);
    }

    #[test]
    fn single_sample_has_no_projection() {
        let samples = vec![SampleOccurrence::new("S1", ["A"])];
        let mut cache = CurveCache::default();
        let run = run_survey("mem", &samples, &RunConfig::default(), &mut cache).unwrap();
        assert!(run.analysis.fit.is_none());
        assert!(run.projection.is_none());
        assert!(run.residuals.is_empty());
    }

    #[test]
    fn run_files_keeps_order_and_reports_failures() {
        let good = temp_csv("good", "species,s1,s2,s3\nA,1,0,1\nB,0,1,0\nC,0,0,2\n");
        let missing = std::env::temp_dir().join("rare_pipeline_missing_file.csv");

        let results = run_files(&[good.clone(), missing], &RunConfig::default());
        let _ = std::fs::remove_file(&good);

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.analysis.stats.total_samples, 3);
        assert_eq!(first.analysis.stats.total_species, 3);
        assert_eq!(first.rows_used, 3);
        assert_eq!(results[1].as_ref().unwrap_err().exit_code(), 2);
    }
}
