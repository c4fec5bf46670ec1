// Sentra - Industrial safety telemetry pipeline
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Pipeline configuration.
//!
//! Read once at construction; the pipeline never reloads configuration
//! mid-call.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Physically plausible range for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricBounds {
    pub min: f64,
    pub max: f64,
}

impl MetricBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Per-metric validity bounds.
///
/// Unknown metric names are not rejected by the validator; they pass with
/// `status = warning`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricBoundsTable {
    bounds: HashMap<String, MetricBounds>,
}

impl MetricBoundsTable {
    /// Empty table (every metric is unknown).
    pub fn empty() -> Self {
        Self {
            bounds: HashMap::new(),
        }
    }

    /// Look up the bounds for a metric.
    pub fn lookup(&self, metric_name: &str) -> Option<MetricBounds> {
        self.bounds.get(metric_name).copied()
    }

    /// Insert or replace bounds for a metric.
    pub fn set(&mut self, metric_name: impl Into<String>, bounds: MetricBounds) {
        self.bounds.insert(metric_name.into(), bounds);
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

impl Default for MetricBoundsTable {
    /// Hard physical bounds for the metrics the standard device fleet
    /// reports. Values outside these ranges cannot be real observations.
    fn default() -> Self {
        let mut table = Self::empty();
        table.set("temperature_c", MetricBounds::new(-90.0, 150.0));
        table.set("co_ppm", MetricBounds::new(0.0, 10_000.0));
        table.set("h2s_ppm", MetricBounds::new(0.0, 2_000.0));
        table.set("gas_concentration", MetricBounds::new(0.0, 10_000.0));
        table.set("o2_pct", MetricBounds::new(0.0, 100.0));
        table.set("lel_pct", MetricBounds::new(0.0, 100.0));
        table.set("pressure_kpa", MetricBounds::new(0.0, 5_000.0));
        table.set("humidity_pct", MetricBounds::new(0.0, 100.0));
        table.set("pm25_ugm3", MetricBounds::new(0.0, 1_000.0));
        table.set("co2_ppm", MetricBounds::new(0.0, 50_000.0));
        table.set("battery_pct", MetricBounds::new(0.0, 100.0));
        table
    }
}

/// Retry policy for idempotent store reads.
///
/// Appends are never retried automatically; row-level idempotence makes
/// caller-side retries safe instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Base backoff between attempts; doubles each retry.
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 100,
        }
    }
}

/// Master configuration for the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Reject batches larger than this, whole.
    pub max_batch_size: usize,

    /// Readings older than this at ingestion time count as late.
    pub late_threshold_minutes: i64,

    /// Allowed clock skew into the future.
    pub future_tolerance_minutes: i64,

    /// Safety margin below the batch's minimum timestamp for the
    /// cross-batch duplicate check.
    pub dedup_lookback_minutes: i64,

    /// Retry policy for store reads.
    pub store_retry: RetryConfig,

    /// Per-metric validity bounds.
    pub bounds: MetricBoundsTable,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 1000,
            late_threshold_minutes: 60,
            future_tolerance_minutes: 5,
            dedup_lookback_minutes: 60,
            store_retry: RetryConfig::default(),
            bounds: MetricBoundsTable::default(),
        }
    }
}

impl PipelineConfig {
    /// Builder: set the batch size cap.
    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = max;
        self
    }

    /// Builder: set the late-arrival threshold.
    pub fn with_late_threshold_minutes(mut self, minutes: i64) -> Self {
        self.late_threshold_minutes = minutes;
        self
    }

    /// Builder: set the dedup lookback margin.
    pub fn with_dedup_lookback_minutes(mut self, minutes: i64) -> Self {
        self.dedup_lookback_minutes = minutes;
        self
    }

    /// Builder: replace the bounds table.
    pub fn with_bounds(mut self, bounds: MetricBoundsTable) -> Self {
        self.bounds = bounds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_batch_size, 1000);
        assert_eq!(config.late_threshold_minutes, 60);
        assert_eq!(config.future_tolerance_minutes, 5);
        assert!(!config.bounds.is_empty());
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = MetricBounds::new(-90.0, 150.0);
        assert!(bounds.contains(22.5));
        assert!(bounds.contains(-90.0));
        assert!(bounds.contains(150.0));
        assert!(!bounds.contains(999999.0));
    }

    #[test]
    fn test_default_bounds_cover_fleet_metrics() {
        let table = MetricBoundsTable::default();
        assert!(table.lookup("temperature_c").is_some());
        assert!(table.lookup("co_ppm").is_some());
        assert!(table.lookup("pressure_kpa").is_some());
        assert!(table.lookup("made_up_metric").is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.max_batch_size, parsed.max_batch_size);
        assert_eq!(config.store_retry, parsed.store_retry);
    }

    #[test]
    fn test_builder_methods() {
        let config = PipelineConfig::default()
            .with_max_batch_size(50)
            .with_late_threshold_minutes(30);
        assert_eq!(config.max_batch_size, 50);
        assert_eq!(config.late_threshold_minutes, 30);
    }
}
