//! Caller-owned memoization of curve analyses.
//!
//! Recomputing the discovery curve and fit is cheap but not free; dashboards
//! that redraw often can keep a `CurveCache` and only pay for a recompute when
//! the sample sequence actually changes. Entries are keyed by a content hash of
//! the ordered samples plus the model kind, and the stored samples are compared
//! on lookup so a hash collision can never return the wrong analysis.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::debug;

use crate::curve::{compute_curve, compute_stats};
use crate::domain::{CurveFitResult, CurveModelKind, RarefactionCurve, RarefactionStats, SampleOccurrence};
use crate::error::RarefactionError;
use crate::fit::fit;

/// Everything derived from one sample sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveAnalysis {
    pub curve: RarefactionCurve,
    pub stats: RarefactionStats,
    pub fit: Option<CurveFitResult>,
}

/// Compute the curve, its stats and the model fit in one go.
pub fn analyze(samples: &[SampleOccurrence], model: CurveModelKind) -> Result<CurveAnalysis, RarefactionError> {
    let curve = compute_curve(samples)?;
    let stats = compute_stats(&curve);
    let fit = fit(&curve.data_points, model)?;
    Ok(CurveAnalysis { curve, stats, fit })
}

#[derive(Debug)]
struct Entry {
    samples: Vec<SampleOccurrence>,
    model: CurveModelKind,
    analysis: Arc<CurveAnalysis>,
}

/// Bounded memo of `CurveAnalysis` values; the oldest entry is evicted first.
#[derive(Debug)]
pub struct CurveCache {
    capacity: usize,
    entries: HashMap<u64, Entry>,
    order: VecDeque<u64>,
    hits: u64,
    misses: u64,
}

impl CurveCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached analysis for `samples`, computing it on a miss.
    ///
    /// Errors are not cached.
    pub fn get_or_compute(
        &mut self,
        samples: &[SampleOccurrence],
        model: CurveModelKind,
    ) -> Result<Arc<CurveAnalysis>, RarefactionError> {
        let key = content_key(samples, model);

        if let Some(entry) = self.entries.get(&key) {
            if entry.model == model && entry.samples == samples {
                self.hits += 1;
                return Ok(Arc::clone(&entry.analysis));
            }
        }

        self.misses += 1;
        debug!(key, n = samples.len(), "curve cache miss");
        let analysis = Arc::new(analyze(samples, model)?);

        if self.entries.contains_key(&key) {
            self.order.retain(|k| *k != key);
        } else if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(
            key,
            Entry {
                samples: samples.to_vec(),
                model,
                analysis: Arc::clone(&analysis),
            },
        );
        self.order.push_back(key);

        Ok(analysis)
    }

    /// Drop every cached entry.
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl Default for CurveCache {
    fn default() -> Self {
        Self::new(16)
    }
}

fn content_key(samples: &[SampleOccurrence], model: CurveModelKind) -> u64 {
    let mut hasher = DefaultHasher::new();
    model.hash(&mut hasher);
    samples.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn survey(extra: &str) -> Vec<SampleOccurrence> {
        vec![
            SampleOccurrence::new("S1", ["A", "B"]),
            SampleOccurrence::new("S2", ["B", "C"]),
            SampleOccurrence::new("S3", [extra]),
        ]
    }

    #[test]
    fn equal_content_hits_the_cache() {
        let mut cache = CurveCache::new(4);
        let first = cache.get_or_compute(&survey("D"), CurveModelKind::Logarithmic).unwrap();
        // A fresh but equal sequence must still hit.
        let second = cache.get_or_compute(&survey("D"), CurveModelKind::Logarithmic).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
        assert_eq!(first.stats.total_species, 4);
        assert!(first.fit.is_some());
    }

    #[test]
    fn changed_content_recomputes() {
        let mut cache = CurveCache::new(4);
        let a = cache.get_or_compute(&survey("D"), CurveModelKind::Logarithmic).unwrap();
        let b = cache.get_or_compute(&survey("A"), CurveModelKind::Logarithmic).unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.stats.total_species, 3);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn oldest_entry_is_evicted_and_invalidate_clears() {
        let mut cache = CurveCache::new(1);
        cache.get_or_compute(&survey("D"), CurveModelKind::Logarithmic).unwrap();
        cache.get_or_compute(&survey("E"), CurveModelKind::Logarithmic).unwrap();
        assert_eq!(cache.len(), 1);

        cache.get_or_compute(&survey("D"), CurveModelKind::Logarithmic).unwrap();
        assert_eq!(cache.misses(), 3);

        cache.invalidate();
        assert!(cache.is_empty());
    }

    #[test]
    fn errors_are_not_cached() {
        let mut cache = CurveCache::default();
        let bad = vec![SampleOccurrence::new("", ["A"])];
        assert!(cache.get_or_compute(&bad, CurveModelKind::Logarithmic).is_err());
        assert!(cache.is_empty());
    }
}
