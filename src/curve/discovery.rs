//! Discovery curve construction and summary statistics.

use std::collections::HashSet;

use crate::domain::{RarefactionCurve, RarefactionDataPoint, RarefactionStats, SampleOccurrence};
use crate::error::RarefactionError;

/// Build the cumulative discovery curve for `samples` in the given order.
///
/// A blank sample name or blank species identifier rejects the whole input:
/// every later cumulative count would depend on the bad entry.
pub fn compute_curve(samples: &[SampleOccurrence]) -> Result<RarefactionCurve, RarefactionError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut data_points = Vec::with_capacity(samples.len());

    for (idx, sample) in samples.iter().enumerate() {
        validate_sample(idx, sample)?;

        let mut new_species = 0usize;
        for species in &sample.species {
            if seen.insert(species.trim()) {
                new_species += 1;
            }
        }

        data_points.push(RarefactionDataPoint {
            sample_index: idx,
            sample_name: sample.name.clone(),
            new_species,
            cumulative_species: seen.len(),
        });
    }

    Ok(RarefactionCurve { data_points })
}

/// Summary statistics for a curve.
pub fn compute_stats(curve: &RarefactionCurve) -> RarefactionStats {
    RarefactionStats {
        total_samples: curve.data_points.len(),
        total_species: curve
            .data_points
            .last()
            .map(|p| p.cumulative_species)
            .unwrap_or(0),
    }
}

fn validate_sample(idx: usize, sample: &SampleOccurrence) -> Result<(), RarefactionError> {
    if sample.name.trim().is_empty() {
        return Err(RarefactionError::invalid_input(idx, "sample name is blank"));
    }
    if let Some(pos) = sample.species.iter().position(|s| s.trim().is_empty()) {
        return Err(RarefactionError::invalid_input(
            idx,
            format!("sample '{}' has a blank species identifier at position {pos}", sample.name),
        ));
    }
    Ok(())
}
