//! Command-line parsing for the `rare` species discovery curve tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the curve/fitting code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{CurveModelKind, TableLayout};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rare", version, about = "Species discovery (rarefaction) curves with logarithmic fits")]
pub struct Cli {
    /// Verbose logging (debug level). `RUST_LOG` overrides this.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build and fit discovery curves from one or more occurrence CSVs.
    Curve(CurveArgs),
    /// Build and fit a curve for a synthetic survey.
    Demo(DemoArgs),
    /// Print a previously exported curve JSON.
    Show(ShowArgs),
}

/// Options for ingesting occurrence tables.
#[derive(Debug, Args, Clone)]
pub struct CurveArgs {
    /// Occurrence CSV file(s). Each file is analysed independently.
    #[arg(long = "csv", value_name = "FILE", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Table layout: `wide` (species rows x sample columns) or `long` (sample,species[,count]).
    #[arg(long, value_enum, default_value_t = TableLayout::Wide)]
    pub layout: TableLayout,

    /// A species is present when its count is strictly above this value.
    #[arg(long, default_value_t = 0.0)]
    pub threshold: f64,

    /// Sample columns to use (wide layout), in order. Default: every numeric column.
    #[arg(long = "samples", value_delimiter = ',')]
    pub sample_columns: Vec<String>,

    #[command(flatten)]
    pub fit: FitArgs,
}

/// Options for the synthetic survey.
#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Number of samples to generate.
    #[arg(short = 'n', long, default_value_t = 30)]
    pub samples: usize,

    /// Size of the species pool.
    #[arg(long, default_value_t = 120)]
    pub species: usize,

    /// Mean detections per sample.
    #[arg(long, default_value_t = 25.0)]
    pub detections: f64,

    /// Log-normal sigma of species abundances.
    #[arg(long, default_value_t = 1.5)]
    pub sigma: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[command(flatten)]
    pub fit: FitArgs,
}

/// Fit, projection and output options shared by `curve` and `demo`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Which model to fit.
    #[arg(long, value_enum, default_value_t = CurveModelKind::Logarithmic)]
    pub model: CurveModelKind,

    /// Samples to extrapolate past the last observed one.
    #[arg(long, default_value_t = 6)]
    pub horizon: usize,

    /// Confidence band multiplier in the extrapolated region.
    #[arg(long, default_value_t = 1.5)]
    pub widen: f64,

    /// Points in the fitted grid over the observed range.
    #[arg(long, default_value_t = 50)]
    pub grid: usize,

    /// Print the per-sample table.
    #[arg(long)]
    pub table: bool,

    /// Export the per-sample curve to CSV (single input only).
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export curve (stats + fit + projection) to JSON (single input only).
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,
}

/// Options for printing a saved curve.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Curve JSON file produced by `--export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_curve_command() {
        let cli = Cli::parse_from([
            "rare", "curve", "--csv", "a.csv", "b.csv", "--layout", "long", "--horizon", "10", "-v",
        ]);
        assert!(cli.verbose);
        let Command::Curve(args) = cli.command else {
            panic!("expected curve command");
        };
        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.layout, TableLayout::Long);
        assert_eq!(args.fit.horizon, 10);
        assert_eq!(args.fit.widen, 1.5);
    }

    #[test]
    fn parses_sample_column_list() {
        let cli = Cli::parse_from(["rare", "curve", "--csv", "a.csv", "--samples", "S1,S2"]);
        let Command::Curve(args) = cli.command else {
            panic!("expected curve command");
        };
        assert_eq!(args.sample_columns, vec!["S1", "S2"]);
    }
}
