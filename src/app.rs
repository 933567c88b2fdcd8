//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - ingests occurrence tables or generates a synthetic survey
//! - builds discovery curves, fits and projections
//! - prints reports
//! - writes optional exports

use std::io;
use std::path::Path;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cache::CurveCache;
use crate::cli::{Command, CurveArgs, DemoArgs, FitArgs, ShowArgs};
use crate::data::{SurveyConfig, generate_survey};
use crate::domain::{ProjectionConfig, RunConfig};
use crate::error::AppError;

pub mod pipeline;

use pipeline::RunOutput;

/// Entry point for the `rare` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Curve(args) => handle_curve(args),
        Command::Demo(args) => handle_demo(args),
        Command::Show(args) => handle_show(args),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn handle_curve(args: CurveArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    if args.inputs.len() > 1 && (config.export_results.is_some() || config.export_curve.is_some()) {
        return Err(AppError::new(2, "Exports require a single `--csv` input."));
    }

    let results = pipeline::run_files(&args.inputs, &config);

    // Report every input before failing so one bad file doesn't hide the rest.
    let mut first_err = None;
    for result in results {
        match result {
            Ok(run) => {
                if run.rows_skipped > 0 {
                    info!(
                        source = %run.source,
                        read = run.rows_read,
                        skipped = run.rows_skipped,
                        "some rows were skipped"
                    );
                }
                emit(&run, &config)?;
            }
            Err(e) => {
                error!("{e}");
                first_err.get_or_insert(e);
            }
        }
    }

    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = run_config_from_fit_args(&args.fit);
    let survey = SurveyConfig {
        sample_count: args.samples,
        species_pool: args.species,
        detections_per_sample: args.detections,
        abundance_sigma: args.sigma,
        seed: args.seed,
    };
    let samples = generate_survey(&survey)?;

    let source = format!("synthetic(seed={}, pool={})", args.seed, args.species);
    let mut cache = CurveCache::new(1);
    let run = pipeline::run_survey(&source, &samples, &config, &mut cache)?;
    emit(&run, &config)
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let curve = crate::io::curve::read_curve_json(&args.curve)?;
    println!("{}", crate::report::format_curve_file(&curve));
    Ok(())
}

/// Print the report for one run and write any requested exports.
fn emit(run: &RunOutput, config: &RunConfig) -> Result<(), AppError> {
    println!(
        "{}",
        crate::report::format_run_summary(&run.source, &run.analysis, run.projection.as_ref())
    );
    if config.table {
        println!(
            "{}",
            crate::report::format_curve_table(&run.analysis.curve.data_points, &run.residuals)
        );
    }

    if let Some(path) = &config.export_results {
        crate::io::export::write_curve_csv(path, &run.analysis.curve, &run.residuals)?;
        log_written(path);
    }
    if let Some(path) = &config.export_curve {
        let doc = crate::io::curve::build_curve_file(&run.source, &run.analysis, run.projection.as_ref());
        crate::io::curve::write_curve_json(path, &doc)?;
        log_written(path);
    }

    Ok(())
}

fn log_written(path: &Path) {
    info!("Wrote {}", path.display());
}

pub fn run_config_from_args(args: &CurveArgs) -> RunConfig {
    RunConfig {
        layout: args.layout,
        threshold: args.threshold,
        sample_columns: args.sample_columns.clone(),
        ..run_config_from_fit_args(&args.fit)
    }
}

pub fn run_config_from_fit_args(fit: &FitArgs) -> RunConfig {
    RunConfig {
        model: fit.model,
        projection: ProjectionConfig {
            grid_points: fit.grid,
            horizon: fit.horizon,
            widen_factor: fit.widen,
        },
        table: fit.table,
        export_results: fit.export.clone(),
        export_curve: fit.export_curve.clone(),
        ..RunConfig::default()
    }
}
