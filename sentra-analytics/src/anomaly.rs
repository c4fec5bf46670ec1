// Sentra Analytics - Anomaly and trend analysis
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Anomaly detection over a stored window.
//!
//! Two complementary detectors run per invocation. The threshold
//! detector compares values against static per-equipment-type bands and
//! works at any history size. The statistical detector fits an isolation
//! forest over per-point features once enough history exists. Findings
//! are unioned; a timestamp flagged by both carries a combined method
//! tag.

use crate::config::{AnalyticsConfig, AnomalyConfig, ThresholdBand, ThresholdTable};
use crate::forest::IsolationForest;
use crate::stats::{feature_matrix, WindowStats};
use chrono::{DateTime, Utc};
use sentra::equipment::Equipment;
use sentra::reading::Reading;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Which detector(s) flagged a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Threshold,
    Statistical,
    ThresholdStatistical,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::Threshold => "threshold",
            DetectionMethod::Statistical => "statistical",
            DetectionMethod::ThresholdStatistical => "threshold+statistical",
        }
    }

    fn combine(self, other: DetectionMethod) -> DetectionMethod {
        if self == other {
            self
        } else {
            DetectionMethod::ThresholdStatistical
        }
    }
}

/// One flagged reading. Ephemeral: consumed by the alert emitter, not a
/// system of record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyFinding {
    pub equipment_id: String,
    pub metric_name: String,
    pub timestamp: DateTime<Utc>,
    /// Detector-specific score in `[0, 1]`; higher is worse.
    pub score: f64,
    pub is_anomaly: bool,
    pub method: DetectionMethod,
}

/// Result of one detection call.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Findings in timestamp order.
    pub findings: Vec<AnomalyFinding>,
    /// True when a deadline expired and the result is partial.
    pub truncated: bool,
    /// Stats snapshot of the window this call saw.
    pub stats: WindowStats,
}

/// Stateless two-detector anomaly engine.
///
/// Re-fit per invocation over the current window; no model state
/// survives between calls, so each call is referentially transparent
/// given the same input window.
pub struct AnomalyDetector {
    thresholds: ThresholdTable,
    config: AnomalyConfig,
}

impl AnomalyDetector {
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            thresholds: config.thresholds.clone(),
            config: config.anomaly.clone(),
        }
    }

    /// Detect anomalies in one (equipment, metric) window, assumed
    /// ascending by timestamp.
    ///
    /// Fewer than 2 points yields an empty result, never an error. A
    /// `deadline` in the past yields whatever was computed before it
    /// expired, with `truncated = true`.
    pub fn detect(
        &self,
        equipment: &Equipment,
        metric_name: &str,
        window: &[Reading],
        deadline: Option<Instant>,
    ) -> Detection {
        let stats = WindowStats::from_readings(window);

        if window.len() < 2 {
            return Detection {
                findings: Vec::new(),
                truncated: false,
                stats,
            };
        }

        let mut flagged: BTreeMap<DateTime<Utc>, AnomalyFinding> = BTreeMap::new();
        let mut truncated = false;

        // Threshold pass: usable at any history size.
        if let Some(band) = self
            .thresholds
            .lookup(equipment.equipment_type, metric_name)
        {
            for reading in window {
                if deadline_expired(deadline) {
                    truncated = true;
                    break;
                }
                if band.breached(reading.metric_value) {
                    flagged.insert(
                        reading.timestamp,
                        AnomalyFinding {
                            equipment_id: reading.equipment_id.clone(),
                            metric_name: reading.metric_name.clone(),
                            timestamp: reading.timestamp,
                            score: band_score(reading.metric_value, band),
                            is_anomaly: true,
                            method: DetectionMethod::Threshold,
                        },
                    );
                }
            }
        }

        // Statistical pass: needs history.
        if !truncated && window.len() >= self.config.min_history {
            if deadline_expired(deadline) {
                truncated = true;
            } else {
                self.statistical_pass(window, &mut flagged);
            }
        }

        let findings = flagged.into_values().collect();
        Detection {
            findings,
            truncated,
            stats,
        }
    }

    fn statistical_pass(
        &self,
        window: &[Reading],
        flagged: &mut BTreeMap<DateTime<Utc>, AnomalyFinding>,
    ) {
        let features = feature_matrix(window);
        let forest = IsolationForest::fit(&self.config.forest, &features);
        let scores = forest.score_all(&features);

        let cutoff = percentile(&scores, self.config.cutoff_percentile)
            .max(self.config.score_floor);

        for (reading, &score) in window.iter().zip(scores.iter()) {
            if score < cutoff {
                continue;
            }
            flagged
                .entry(reading.timestamp)
                .and_modify(|finding| {
                    finding.method = finding.method.combine(DetectionMethod::Statistical);
                    finding.score = finding.score.max(score);
                })
                .or_insert_with(|| AnomalyFinding {
                    equipment_id: reading.equipment_id.clone(),
                    metric_name: reading.metric_name.clone(),
                    timestamp: reading.timestamp,
                    score,
                    is_anomaly: true,
                    method: DetectionMethod::Statistical,
                });
        }
    }
}

fn deadline_expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

/// How far beyond the band a value lies, relative to the band's width,
/// clamped to `[0, 1]`.
fn band_score(value: f64, band: ThresholdBand) -> f64 {
    let width = (band.high - band.low).max(f64::EPSILON);
    let excess = if value > band.high {
        value - band.high
    } else if value < band.low {
        band.low - value
    } else {
        0.0
    };
    (excess / width).min(1.0)
}

/// Value at the given percentile of `scores` (nearest-rank).
fn percentile(scores: &[f64], p: f64) -> f64 {
    if scores.is_empty() {
        return f64::INFINITY;
    }
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = (p.clamp(0.0, 1.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}
