//! CSV ingest and normalization.
//!
//! This module turns a survey occurrence table into the ordered list of
//! `SampleOccurrence`s the discovery curve is built from.
//!
//! Two layouts are supported:
//! - **wide**: one row per species (name in the first column), one count
//!   column per sample. Sample order is column order.
//! - **long**: one row per detection with `sample`, `species` and an optional
//!   `count` column. Sample order is first-appearance order.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (sample order always follows the file)
//! - **Separation of concerns**: no curve or fitting logic here

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{SampleOccurrence, TableLayout};
use crate::error::AppError;

/// Per-species annotation columns in eDNA haplotype tables (normalized names).
const METADATA_COLUMNS: &[&str] = &["score", "nns", "redlist_status", "phylum"];

/// Ingest settings.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub layout: TableLayout,
    /// A species is present in a sample when its count is strictly above this.
    pub threshold: f64,
    /// Wide layout only: explicit sample columns, in the order to use them.
    /// Empty means "every numeric column after the first, minus metadata".
    pub sample_columns: Vec<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            layout: TableLayout::Wide,
            threshold: 0.0,
            sample_columns: Vec::new(),
        }
    }
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub species: Option<String>,
    pub message: String,
}

/// Ingest output: ordered samples + row errors + counters.
#[derive(Debug, Clone)]
pub struct IngestedSurvey {
    pub source: String,
    pub samples: Vec<SampleOccurrence>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load an occurrence CSV from disk.
pub fn load_occurrences(path: &Path, opts: &IngestOptions) -> Result<IngestedSurvey, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let mut survey = read_occurrences(file, opts)?;
    survey.source = path.display().to_string();
    debug!(
        source = %survey.source,
        samples = survey.samples.len(),
        rows = survey.rows_used,
        "ingested occurrence table"
    );
    Ok(survey)
}

/// Parse an occurrence CSV from any reader.
pub fn read_occurrences<R: Read>(reader: R, opts: &IngestOptions) -> Result<IngestedSurvey, AppError> {
    if !opts.threshold.is_finite() {
        return Err(AppError::new(2, "Presence threshold must be finite."));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and CSV lines are 1-based.
        let line = idx + 2;
        match result {
            Ok(r) => records.push((line, r)),
            Err(e) => row_errors.push(RowError {
                line,
                species: None,
                message: format!("CSV parse error: {e}"),
            }),
        }
    }
    let rows_read = records.len() + row_errors.len();

    let (samples, rows_used) = match opts.layout {
        TableLayout::Wide => parse_wide(&headers, &records, opts, &mut row_errors)?,
        TableLayout::Long => parse_long(&headers, &records, opts, &mut row_errors)?,
    };

    if samples.is_empty() {
        return Err(AppError::new(3, "No samples found in the occurrence table."));
    }
    for e in &row_errors {
        warn!(line = e.line, "skipped row: {}", e.message);
    }

    Ok(IngestedSurvey {
        source: String::from("<reader>"),
        samples,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn parse_wide(
    headers: &StringRecord,
    records: &[(usize, StringRecord)],
    opts: &IngestOptions,
    row_errors: &mut Vec<RowError>,
) -> Result<(Vec<SampleOccurrence>, usize), AppError> {
    if headers.len() < 2 {
        return Err(AppError::new(
            2,
            "Wide layout needs a species column followed by at least one sample column.",
        ));
    }

    let columns = resolve_sample_columns(headers, records, &opts.sample_columns)?;
    let mut species_by_sample: Vec<BTreeSet<String>> = vec![BTreeSet::new(); columns.len()];
    let mut rows_used = 0usize;

    for (line, record) in records {
        let species = record.get(0).unwrap_or("").to_string();
        if species.is_empty() {
            row_errors.push(RowError {
                line: *line,
                species: None,
                message: "Missing species name.".to_string(),
            });
            continue;
        }

        let mut present = Vec::new();
        let mut bad_cell = None;
        for (slot, &col) in columns.iter().enumerate() {
            match parse_count(record.get(col)) {
                Ok(Some(count)) if count > opts.threshold => present.push(slot),
                Ok(_) => {}
                Err(raw) => {
                    bad_cell = Some(format!(
                        "Invalid count '{raw}' in column `{}`.",
                        display_header(headers, col)
                    ));
                    break;
                }
            }
        }

        if let Some(message) = bad_cell {
            row_errors.push(RowError {
                line: *line,
                species: Some(species),
                message,
            });
            continue;
        }

        for slot in present {
            species_by_sample[slot].insert(species.clone());
        }
        rows_used += 1;
    }

    let samples = columns
        .iter()
        .zip(species_by_sample)
        .map(|(&col, species)| SampleOccurrence {
            name: display_header(headers, col),
            species: species.into_iter().collect(),
        })
        .collect();

    Ok((samples, rows_used))
}

fn parse_long(
    headers: &StringRecord,
    records: &[(usize, StringRecord)],
    opts: &IngestOptions,
    row_errors: &mut Vec<RowError>,
) -> Result<(Vec<SampleOccurrence>, usize), AppError> {
    let header_map = build_header_map(headers);
    let sample_col = *header_map
        .get("sample")
        .ok_or_else(|| AppError::new(2, "Missing required column: `sample`"))?;
    let species_col = *header_map
        .get("species")
        .ok_or_else(|| AppError::new(2, "Missing required column: `species`"))?;
    let count_col = header_map.get("count").copied();

    let mut order: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut species_by_sample: Vec<BTreeSet<String>> = Vec::new();
    let mut rows_used = 0usize;

    for (line, record) in records {
        let sample = record.get(sample_col).unwrap_or("");
        let species = record.get(species_col).unwrap_or("");
        if sample.is_empty() {
            row_errors.push(RowError {
                line: *line,
                species: (!species.is_empty()).then(|| species.to_string()),
                message: "Missing sample name.".to_string(),
            });
            continue;
        }

        // Register the sample before looking at the species so samples with
        // only zero counts still appear in order.
        let slot = *index.entry(sample.to_string()).or_insert_with(|| {
            order.push(sample.to_string());
            species_by_sample.push(BTreeSet::new());
            order.len() - 1
        });

        if species.is_empty() {
            row_errors.push(RowError {
                line: *line,
                species: None,
                message: "Missing species name.".to_string(),
            });
            continue;
        }

        let present = match count_col {
            None => true,
            Some(col) => match parse_count(record.get(col)) {
                Ok(Some(count)) => count > opts.threshold,
                Ok(None) => true,
                Err(raw) => {
                    row_errors.push(RowError {
                        line: *line,
                        species: Some(species.to_string()),
                        message: format!("Invalid count '{raw}'."),
                    });
                    continue;
                }
            },
        };

        if present {
            species_by_sample[slot].insert(species.to_string());
        }
        rows_used += 1;
    }

    let samples = order
        .into_iter()
        .zip(species_by_sample)
        .map(|(name, species)| SampleOccurrence {
            name,
            species: species.into_iter().collect(),
        })
        .collect();

    Ok((samples, rows_used))
}

/// Pick the sample columns for the wide layout.
///
/// Explicit names are matched case-insensitively. Otherwise every column after
/// the first is used if all of its non-empty cells parse as numbers; a column
/// left entirely blank is a sample with no detections. Known metadata columns
/// are never samples, even when numeric.
fn resolve_sample_columns(
    headers: &StringRecord,
    records: &[(usize, StringRecord)],
    explicit: &[String],
) -> Result<Vec<usize>, AppError> {
    if !explicit.is_empty() {
        let header_map = build_header_map(headers);
        return explicit
            .iter()
            .map(|name| {
                header_map
                    .get(&normalize_header_name(name))
                    .copied()
                    .filter(|&col| col > 0)
                    .ok_or_else(|| AppError::new(2, format!("Sample column not found: `{name}`")))
            })
            .collect();
    }

    let columns: Vec<usize> = (1..headers.len())
        .filter(|&col| {
            let name = normalize_header_name(headers.get(col).unwrap_or(""));
            !METADATA_COLUMNS.contains(&name.as_str())
                && records
                    .iter()
                    .all(|(_, record)| parse_count(record.get(col)).is_ok())
        })
        .collect();

    if columns.is_empty() {
        return Err(AppError::new(
            2,
            "No numeric sample columns found; pass the sample columns explicitly.",
        ));
    }
    Ok(columns)
}

/// Parse a count cell. Empty and `NA`-style cells are absent; anything else
/// must be a finite number (the raw text is returned on failure).
fn parse_count(cell: Option<&str>) -> Result<Option<f64>, String> {
    let Some(s) = cell.map(str::trim) else {
        return Ok(None);
    };
    if s.is_empty() || s.eq_ignore_ascii_case("na") || s.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(s.to_string()),
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn display_header(headers: &StringRecord, col: usize) -> String {
    headers
        .get(col)
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .unwrap_or_default()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}
