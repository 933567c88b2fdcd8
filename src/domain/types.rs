//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during curve construction and fitting
//! - exported to JSON/CSV
//! - reloaded later for `rare show`

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One survey sample: a name and the species identifiers detected in it.
///
/// Species are treated as a set; a repeated identifier counts once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleOccurrence {
    pub name: String,
    pub species: Vec<String>,
}

impl SampleOccurrence {
    pub fn new<S: Into<String>>(name: impl Into<String>, species: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            species: species.into_iter().map(Into::into).collect(),
        }
    }
}

/// One point of the discovery curve (one per input sample, in input order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarefactionDataPoint {
    /// Zero-based position in the input sequence.
    pub sample_index: usize,
    pub sample_name: String,
    /// Species first seen at this sample.
    pub new_species: usize,
    /// Distinct species seen from sample 0 through this one, inclusive.
    pub cumulative_species: usize,
}

impl RarefactionDataPoint {
    /// 1-based x coordinate used for fitting (`ln(x)` is defined for all points).
    pub fn x(&self) -> f64 {
        (self.sample_index + 1) as f64
    }

    pub fn y(&self) -> f64 {
        self.cumulative_species as f64
    }
}

/// Cumulative discovery curve in observed sample order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarefactionCurve {
    pub data_points: Vec<RarefactionDataPoint>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarefactionStats {
    pub total_samples: usize,
    pub total_species: usize,
}

/// Which curve model to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CurveModelKind {
    /// `species(x) = a·ln(x) + b`
    Logarithmic,
}

impl CurveModelKind {
    pub fn display_name(self) -> &'static str {
        match self {
            CurveModelKind::Logarithmic => "a*ln(x) + b",
        }
    }

    /// Number of fitted parameters.
    pub fn param_count(self) -> usize {
        match self {
            CurveModelKind::Logarithmic => 2,
        }
    }
}

/// Coefficient of determination.
///
/// When every observed `y` is identical, `SS_tot = 0` and the usual ratio is
/// undefined. That case is reported as `Perfect` if the fit reproduces the
/// data exactly (`SS_res = 0`) and `Undefined` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RSquared {
    Value(f64),
    Perfect,
    Undefined,
}

impl RSquared {
    /// Numeric value, treating `Perfect` as `1.0`.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            RSquared::Value(v) => Some(v),
            RSquared::Perfect => Some(1.0),
            RSquared::Undefined => None,
        }
    }
}

impl std::fmt::Display for RSquared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RSquared::Value(v) => write!(f, "{v:.4}"),
            RSquared::Perfect => write!(f, "1 (flat, exact)"),
            RSquared::Undefined => write!(f, "undefined (flat y)"),
        }
    }
}

/// Fitted model parameters and quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveFitResult {
    pub model: CurveModelKind,
    pub a: f64,
    pub b: f64,
    pub r2: RSquared,
    /// `sqrt(SS_res / (n - 2))`; absent when fewer than 3 points were fitted.
    pub residual_std_error: Option<f64>,
    /// Number of points used.
    pub n: usize,
}

/// Constants for turning a fit into drawable curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Evenly spaced points over the observed range `[1, total_samples]`.
    pub grid_points: usize,
    /// How many samples past the last observed one to extrapolate.
    pub horizon: usize,
    /// Band multiplier for the extrapolated region.
    pub widen_factor: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            grid_points: 50,
            horizon: 6,
            widen_factor: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPoint {
    pub x: f64,
    pub y: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Fitted curve over the observed range plus its extrapolation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveProjection {
    pub fitted: Vec<BandPoint>,
    pub extrapolated: Vec<BandPoint>,
}

/// Layout of an occurrence CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TableLayout {
    /// One row per species, one count column per sample.
    Wide,
    /// One row per detection: `sample,species[,count]`.
    Long,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub layout: TableLayout,
    /// A species counts as present when its count is strictly above this.
    pub threshold: f64,
    /// Explicit sample columns for the wide layout (empty = infer).
    pub sample_columns: Vec<String>,
    pub model: CurveModelKind,
    pub projection: ProjectionConfig,

    pub table: bool,
    pub export_results: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            layout: TableLayout::Wide,
            threshold: 0.0,
            sample_columns: Vec::new(),
            model: CurveModelKind::Logarithmic,
            projection: ProjectionConfig::default(),
            table: false,
            export_results: None,
            export_curve: None,
        }
    }
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub source: String,
    pub stats: RarefactionStats,
    pub fit: Option<CurveFitResult>,
    pub projection: Option<CurveProjection>,
    pub data_points: Vec<RarefactionDataPoint>,
}
