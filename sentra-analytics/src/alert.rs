// Sentra Analytics - Anomaly and trend analysis
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Alert candidate construction.
//!
//! The engines only build candidates; storage, delivery, and suppression
//! of repeats belong to the alert sink's owner. Every candidate carries a
//! stable `alert_type` key so the collaborator can implement that
//! suppression.

use crate::anomaly::{AnomalyFinding, DetectionMethod};
use crate::trend::{TrendDirection, TrendResult};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

/// Severity of an alert candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "info",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
        }
    }
}

/// What produced a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertSource {
    Anomaly(AnomalyFinding),
    Trend {
        metric_name: String,
        result: TrendResult,
    },
}

/// A candidate handed to the alert sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCandidate {
    pub equipment_id: String,
    /// Stable suppression key, e.g. `threshold_breach:co_ppm`.
    pub alert_type: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub source: AlertSource,
}

impl AlertCandidate {
    /// Build a candidate from an anomaly finding.
    pub fn from_finding(finding: AnomalyFinding) -> Self {
        let (kind, severity) = match finding.method {
            DetectionMethod::Threshold | DetectionMethod::ThresholdStatistical => {
                ("threshold_breach", AlertSeverity::Critical)
            }
            DetectionMethod::Statistical => ("statistical_anomaly", AlertSeverity::Warning),
        };

        AlertCandidate {
            equipment_id: finding.equipment_id.clone(),
            alert_type: format!("{}:{}", kind, finding.metric_name),
            severity,
            message: format!(
                "{} on {} at {}: score {:.2} ({})",
                kind.replace('_', " "),
                finding.metric_name,
                finding.timestamp.to_rfc3339(),
                finding.score,
                finding.method.as_str()
            ),
            source: AlertSource::Anomaly(finding),
        }
    }

    /// Build a candidate from a trend result. Returns `None` for stable
    /// trends; there is nothing to alert on.
    pub fn from_trend(
        equipment_id: impl Into<String>,
        metric_name: impl Into<String>,
        result: TrendResult,
    ) -> Option<Self> {
        if result.direction == TrendDirection::Stable {
            return None;
        }

        let metric_name = metric_name.into();
        let severity = if result.confidence >= 0.8 {
            AlertSeverity::Warning
        } else {
            AlertSeverity::Info
        };

        Some(AlertCandidate {
            equipment_id: equipment_id.into(),
            alert_type: format!("trend_drift:{}", metric_name),
            severity,
            message: format!(
                "{} drift on {}: {:+.3}/h over {} points (r2 {:.2})",
                result.direction.as_str(),
                metric_name,
                result.slope_per_hour,
                result.points,
                result.confidence
            ),
            source: AlertSource::Trend {
                metric_name,
                result,
            },
        })
    }
}

/// Opaque handle returned by the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertId(pub String);

/// Alert sink failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlertError {
    /// The sink refused the candidate.
    #[error("Alert sink rejected candidate: {0}")]
    Rejected(String),
}

/// Alert delivery seam; the collaborator owns persistence and repeat
/// suppression.
pub trait AlertSink {
    fn emit(&self, candidate: AlertCandidate) -> std::result::Result<AlertId, AlertError>;
}

/// In-process sink that records emitted candidates. Backs tests and
/// local runs.
#[derive(Debug, Default)]
pub struct MemoryAlertSink {
    emitted: Mutex<Vec<AlertCandidate>>,
}

impl MemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn emitted(&self) -> Vec<AlertCandidate> {
        self.emitted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.emitted.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AlertSink for MemoryAlertSink {
    fn emit(&self, candidate: AlertCandidate) -> std::result::Result<AlertId, AlertError> {
        let mut emitted = self.emitted.lock().unwrap_or_else(|e| e.into_inner());
        let id = AlertId(format!("alert-{}", emitted.len() + 1));
        log::debug!(
            "alert candidate {} [{}] {}",
            id.0,
            candidate.severity.as_str(),
            candidate.alert_type
        );
        emitted.push(candidate);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn finding(method: DetectionMethod) -> AnomalyFinding {
        AnomalyFinding {
            equipment_id: "GAS-001".to_string(),
            metric_name: "co_ppm".to_string(),
            timestamp: Utc.timestamp_opt(1000, 0).unwrap(),
            score: 1.0,
            is_anomaly: true,
            method,
        }
    }

    fn trend(direction: TrendDirection, confidence: f64) -> TrendResult {
        TrendResult {
            direction,
            slope_per_hour: 1.5,
            confidence,
            points: 24,
        }
    }

    #[test]
    fn test_threshold_finding_is_critical() {
        let candidate = AlertCandidate::from_finding(finding(DetectionMethod::Threshold));
        assert_eq!(candidate.severity, AlertSeverity::Critical);
        assert_eq!(candidate.alert_type, "threshold_breach:co_ppm");
        assert_eq!(candidate.equipment_id, "GAS-001");
    }

    #[test]
    fn test_statistical_finding_is_warning() {
        let candidate = AlertCandidate::from_finding(finding(DetectionMethod::Statistical));
        assert_eq!(candidate.severity, AlertSeverity::Warning);
        assert_eq!(candidate.alert_type, "statistical_anomaly:co_ppm");
    }

    #[test]
    fn test_combined_finding_keeps_threshold_type() {
        let candidate =
            AlertCandidate::from_finding(finding(DetectionMethod::ThresholdStatistical));
        assert_eq!(candidate.severity, AlertSeverity::Critical);
        assert_eq!(candidate.alert_type, "threshold_breach:co_ppm");
    }

    #[test]
    fn test_stable_trend_no_candidate() {
        assert!(AlertCandidate::from_trend(
            "TEMP-001",
            "temperature_c",
            trend(TrendDirection::Stable, 0.9)
        )
        .is_none());
    }

    #[test]
    fn test_confident_drift_is_warning() {
        let candidate = AlertCandidate::from_trend(
            "TEMP-001",
            "temperature_c",
            trend(TrendDirection::Increasing, 0.95),
        )
        .unwrap();
        assert_eq!(candidate.severity, AlertSeverity::Warning);
        assert_eq!(candidate.alert_type, "trend_drift:temperature_c");
        assert!(candidate.message.contains("increasing"));
    }

    #[test]
    fn test_weak_drift_is_info() {
        let candidate = AlertCandidate::from_trend(
            "TEMP-001",
            "temperature_c",
            trend(TrendDirection::Decreasing, 0.4),
        )
        .unwrap();
        assert_eq!(candidate.severity, AlertSeverity::Info);
    }

    #[test]
    fn test_memory_sink_records() {
        let sink = MemoryAlertSink::new();
        let id = sink
            .emit(AlertCandidate::from_finding(finding(
                DetectionMethod::Threshold,
            )))
            .unwrap();

        assert_eq!(id, AlertId("alert-1".to_string()));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.emitted()[0].alert_type, "threshold_breach:co_ppm");
    }
}
