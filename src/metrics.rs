//! Resolution metrics.
//!
//! Counters for URL resolutions, cache effectiveness and the conversion
//! strategy taken. One instance lives in each `Site`.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct ResolutionMetrics {
    /// Number of resolutions attempted
    resolutions: AtomicUsize,

    /// Number of resolutions answered from the cache
    cache_hits: AtomicUsize,

    /// Number of resolutions computed from the route table
    cache_misses: AtomicUsize,

    /// Number of resolutions that addressed nothing
    not_found: AtomicUsize,

    /// Number of conversions through resolve and build
    structural_conversions: AtomicUsize,

    /// Number of conversions by prefix substitution
    literal_conversions: AtomicUsize,
}

impl ResolutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_resolution(&self) {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_structural_conversion(&self) {
        self.structural_conversions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_literal_conversion(&self) {
        self.literal_conversions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total = hits + misses;
        let cache_hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            resolutions: self.resolutions.load(Ordering::Relaxed),
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            not_found: self.not_found.load(Ordering::Relaxed),
            structural_conversions: self.structural_conversions.load(Ordering::Relaxed),
            literal_conversions: self.literal_conversions.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of resolution metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub resolutions: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    /// Percentage (0-100)
    pub cache_hit_rate: f64,
    pub not_found: usize,
    pub structural_conversions: usize,
    pub literal_conversions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_start_at_zero() {
        let report = ResolutionMetrics::new().report();
        assert_eq!(report.resolutions, 0);
        assert_eq!(report.cache_hit_rate, 0.0);
    }

    #[test]
    fn test_cache_hit_rate() {
        let metrics = ResolutionMetrics::new();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_miss();

        let report = metrics.report();
        assert_eq!(report.cache_hits, 3);
        assert_eq!(report.cache_misses, 1);
        assert_eq!(report.cache_hit_rate, 75.0);
    }

    #[test]
    fn test_conversion_counters() {
        let metrics = ResolutionMetrics::new();
        metrics.record_structural_conversion();
        metrics.record_literal_conversion();
        metrics.record_literal_conversion();
        metrics.record_not_found();

        let report = metrics.report();
        assert_eq!(report.structural_conversions, 1);
        assert_eq!(report.literal_conversions, 2);
        assert_eq!(report.not_found, 1);
    }

    #[test]
    fn test_report_serializes() {
        let json = serde_json::to_value(ResolutionMetrics::new().report()).expect("serialize");
        assert!(json.get("cache_hit_rate").is_some());
    }
}
