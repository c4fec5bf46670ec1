// Sentra Analytics - Anomaly and trend analysis
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Rolling window statistics and feature extraction.
//!
//! Stats are recomputed from the stored window on every invocation; the
//! engines keep no state between calls.

use chrono::{DateTime, Utc};
use sentra::reading::Reading;
use serde::{Deserialize, Serialize};

/// Statistics snapshot for one (equipment, metric) window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// Timestamp of the newest reading in the window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
}

impl WindowStats {
    /// Compute stats over a window of readings.
    pub fn from_readings(readings: &[Reading]) -> Self {
        if readings.is_empty() {
            return Self::default();
        }

        let n = readings.len() as f64;
        let sum: f64 = readings.iter().map(|r| r.metric_value).sum();
        let mean = sum / n;

        let std_dev = if readings.len() > 1 {
            let sum_sq: f64 = readings
                .iter()
                .map(|r| (r.metric_value - mean).powi(2))
                .sum();
            (sum_sq / (n - 1.0)).sqrt()
        } else {
            0.0
        };

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut last_update = readings[0].timestamp;
        for reading in readings {
            min = min.min(reading.metric_value);
            max = max.max(reading.metric_value);
            last_update = last_update.max(reading.timestamp);
        }

        Self {
            count: readings.len(),
            mean,
            std_dev,
            min,
            max,
            last_update: Some(last_update),
        }
    }
}

/// Per-point feature vector for the statistical detector:
/// `(value, rate_of_change_from_previous, rolling_z_score)`.
pub const FEATURE_DIM: usize = 3;

/// Build the feature matrix for a window, assumed ascending by
/// timestamp.
///
/// Rate of change is per second against the previous point (0 for the
/// first point and for repeated timestamps). The rolling z-score is
/// computed against the points strictly before each reading; it is 0
/// until the prefix carries a usable spread.
pub fn feature_matrix(readings: &[Reading]) -> Vec<[f64; FEATURE_DIM]> {
    let mut features = Vec::with_capacity(readings.len());

    // Prefix accumulators for the rolling z-score.
    let mut prefix_sum = 0.0;
    let mut prefix_sum_sq = 0.0;

    for (i, reading) in readings.iter().enumerate() {
        let value = reading.metric_value;

        let rate = if i == 0 {
            0.0
        } else {
            let prev = &readings[i - 1];
            let dt = (reading.timestamp - prev.timestamp).num_milliseconds() as f64 / 1000.0;
            if dt > 0.0 {
                (value - prev.metric_value) / dt
            } else {
                0.0
            }
        };

        let z = if i >= 2 {
            let n = i as f64;
            let mean = prefix_sum / n;
            let variance = (prefix_sum_sq - n * mean * mean) / (n - 1.0);
            let std = variance.max(0.0).sqrt();
            if std > 0.0 {
                (value - mean) / std
            } else {
                0.0
            }
        } else {
            0.0
        };

        features.push([value, rate, z]);

        prefix_sum += value;
        prefix_sum_sq += value * value;
    }

    features
}
