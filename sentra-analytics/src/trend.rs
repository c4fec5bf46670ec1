// Sentra Analytics - Anomaly and trend analysis
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Trend analysis over a rolling window.
//!
//! A least-squares line is fitted to value against elapsed time; the
//! direction compares total drift across the window to the series'
//! standard deviation, so the stability threshold scales with the
//! metric's typical variance.

use crate::config::TrendConfig;
use crate::stats::WindowStats;
use sentra::reading::Reading;
use serde::{Deserialize, Serialize};

/// Classified direction of a fitted trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        }
    }
}

/// Result of one trend fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub direction: TrendDirection,
    /// Fitted slope in value units per hour.
    pub slope_per_hour: f64,
    /// Coefficient of determination of the fit, in `[0, 1]`.
    pub confidence: f64,
    /// Points used for the fit.
    pub points: usize,
}

/// Stateless least-squares trend analyzer.
pub struct TrendAnalyzer {
    config: TrendConfig,
}

impl TrendAnalyzer {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    /// Fit a trend over a window, assumed ascending by timestamp.
    ///
    /// Returns `None` below the configured minimum point count
    /// (insufficient history is a signal, not an error).
    pub fn analyze(&self, window: &[Reading]) -> Option<TrendResult> {
        if window.len() < self.config.min_points {
            return None;
        }

        let t0 = window[0].timestamp;
        let xs: Vec<f64> = window
            .iter()
            .map(|r| (r.timestamp - t0).num_milliseconds() as f64 / 3_600_000.0)
            .collect();
        let ys: Vec<f64> = window.iter().map(|r| r.metric_value).collect();

        let n = xs.len() as f64;
        let mean_x = xs.iter().sum::<f64>() / n;
        let mean_y = ys.iter().sum::<f64>() / n;

        let mut ss_xx = 0.0;
        let mut ss_xy = 0.0;
        for (x, y) in xs.iter().zip(ys.iter()) {
            ss_xx += (x - mean_x) * (x - mean_x);
            ss_xy += (x - mean_x) * (y - mean_y);
        }

        // All readings at one instant: no usable time axis.
        if ss_xx <= 0.0 {
            return None;
        }

        let slope = ss_xy / ss_xx;
        let intercept = mean_y - slope * mean_x;

        let mut ss_res = 0.0;
        let mut ss_tot = 0.0;
        for (x, y) in xs.iter().zip(ys.iter()) {
            let predicted = intercept + slope * x;
            ss_res += (y - predicted) * (y - predicted);
            ss_tot += (y - mean_y) * (y - mean_y);
        }

        // A constant series fits its own mean exactly.
        let confidence = if ss_tot > 0.0 {
            (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let stats = WindowStats::from_readings(window);
        let span_hours = xs.last().copied().unwrap_or(0.0);
        let total_drift = slope.abs() * span_hours;
        let stability_margin = self.config.stable_drift_ratio * stats.std_dev;

        let direction = if total_drift <= stability_margin || slope == 0.0 {
            TrendDirection::Stable
        } else if slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        };

        Some(TrendResult {
            direction,
            slope_per_hour: slope,
            confidence,
            points: window.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn hourly_series(values: &[f64]) -> Vec<Reading> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Reading::new("TEMP-001", "temperature_c", v, ts(i as i64 * 3600)))
            .collect()
    }

    fn analyzer() -> TrendAnalyzer {
        TrendAnalyzer::new(TrendConfig::default())
    }

    #[test]
    fn test_insufficient_history_returns_none() {
        assert!(analyzer().analyze(&hourly_series(&[1.0, 2.0])).is_none());
        assert!(analyzer().analyze(&[]).is_none());
    }

    #[test]
    fn test_perfect_upward_drift() {
        // +2 degrees per hour, exactly linear.
        let result = analyzer()
            .analyze(&hourly_series(&[20.0, 22.0, 24.0, 26.0, 28.0]))
            .unwrap();

        assert_eq!(result.direction, TrendDirection::Increasing);
        assert_relative_eq!(result.slope_per_hour, 2.0, epsilon = 1e-9);
        assert_relative_eq!(result.confidence, 1.0, epsilon = 1e-9);
        assert_eq!(result.points, 5);
    }

    #[test]
    fn test_downward_drift() {
        let result = analyzer()
            .analyze(&hourly_series(&[30.0, 27.0, 24.0, 21.0]))
            .unwrap();
        assert_eq!(result.direction, TrendDirection::Decreasing);
        assert_relative_eq!(result.slope_per_hour, -3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_constant_series_stable() {
        let result = analyzer()
            .analyze(&hourly_series(&[21.0, 21.0, 21.0, 21.0]))
            .unwrap();
        assert_eq!(result.direction, TrendDirection::Stable);
        assert_relative_eq!(result.slope_per_hour, 0.0, epsilon = 1e-9);
        assert_relative_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_noise_without_drift_is_stable() {
        // Oscillation around a level: the per-window drift stays inside
        // the noise band.
        let result = analyzer()
            .analyze(&hourly_series(&[
                20.0, 20.4, 19.8, 20.2, 19.9, 20.3, 20.0, 19.7, 20.1, 20.0,
            ]))
            .unwrap();
        assert_eq!(result.direction, TrendDirection::Stable);
        assert!(result.confidence < 0.5);
    }

    #[test]
    fn test_noisy_drift_still_classified() {
        // Clear upward drift with noise on top.
        let values: Vec<f64> = (0..12)
            .map(|i| 20.0 + i as f64 * 1.5 + if i % 2 == 0 { 0.3 } else { -0.3 })
            .collect();
        let result = analyzer().analyze(&hourly_series(&values)).unwrap();
        assert_eq!(result.direction, TrendDirection::Increasing);
        assert!(result.confidence > 0.9);
    }

    #[test]
    fn test_same_instant_readings_return_none() {
        let readings = vec![
            Reading::new("TEMP-001", "temperature_c", 20.0, ts(0)),
            Reading::new("TEMP-001", "temperature_c", 21.0, ts(0)),
            Reading::new("TEMP-001", "temperature_c", 22.0, ts(0)),
        ];
        assert!(analyzer().analyze(&readings).is_none());
    }
}
