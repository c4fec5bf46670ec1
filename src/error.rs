// Sentra - Industrial safety telemetry pipeline
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for the ingestion pipeline.

use crate::quality::QualityReport;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Per-reading validation failure.
///
/// Validation failures are non-fatal: they are recorded in the per-reading
/// outcome list and never abort the batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field is absent.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A field is present but has the wrong type.
    #[error("Field `{field}` has wrong type: {detail}")]
    WrongType { field: &'static str, detail: String },

    /// Equipment is not registered.
    #[error("Unknown equipment: {0}")]
    UnknownEquipment(String),

    /// Value is NaN or infinite.
    #[error("Metric value is not finite")]
    NonFiniteValue,

    /// Value is outside the physically plausible range for its metric.
    #[error("Value {value} outside plausible range [{min}, {max}] for `{metric}`")]
    OutOfRange {
        metric: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Timestamp is further in the future than the clock-skew tolerance.
    #[error("Timestamp {timestamp} exceeds clock-skew tolerance ({tolerance_minutes} min)")]
    FutureTimestamp {
        timestamp: DateTime<Utc>,
        tolerance_minutes: i64,
    },
}

/// Window store failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store did not answer in time. Retryable.
    #[error("Store timeout: {0}")]
    Timeout(String),

    /// The store refused the connection or is down. Retryable.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Permanent backend failure (schema mismatch, corrupt row, ...).
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether the operation may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Timeout(_) | StoreError::Unavailable(_))
    }
}

/// Call-level ingestion failure.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The batch exceeds the configured maximum and is rejected whole,
    /// before any processing.
    #[error("Batch too large: {size} readings (max: {max})")]
    BatchTooLarge { size: usize, max: usize },

    /// The window store failed after the retry budget was exhausted.
    /// Carries whatever quality counters were accumulated before the
    /// failure.
    #[error("Store unavailable after {attempts} attempt(s): {source}")]
    StoreUnavailable {
        attempts: u32,
        source: StoreError,
        partial_report: QualityReport,
    },
}

impl IngestError {
    /// The partial quality report attached to a store-level failure, if any.
    pub fn partial_report(&self) -> Option<&QualityReport> {
        match self {
            IngestError::StoreUnavailable { partial_report, .. } => Some(partial_report),
            _ => None,
        }
    }
}

/// Job runner failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// The runner rejected the submission.
    #[error("Job submission rejected: {0}")]
    Rejected(String),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_retryable() {
        assert!(StoreError::Timeout("read".into()).is_retryable());
        assert!(StoreError::Unavailable("conn refused".into()).is_retryable());
        assert!(!StoreError::Backend("corrupt row".into()).is_retryable());
    }

    #[test]
    fn test_batch_too_large_display() {
        let err = IngestError::BatchTooLarge {
            size: 1500,
            max: 1000,
        };
        let msg = err.to_string();
        assert!(msg.contains("1500"));
        assert!(msg.contains("1000"));
    }

    #[test]
    fn test_partial_report_attached() {
        let report = QualityReport::new(10);
        let err = IngestError::StoreUnavailable {
            attempts: 3,
            source: StoreError::Timeout("range".into()),
            partial_report: report,
        };
        assert_eq!(err.partial_report().unwrap().total, 10);
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::OutOfRange {
            metric: "temperature_c".to_string(),
            value: 999999.0,
            min: -90.0,
            max: 150.0,
        };
        assert!(err.to_string().contains("temperature_c"));
    }
}
