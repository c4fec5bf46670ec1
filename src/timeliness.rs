// Sentra - Industrial safety telemetry pipeline
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Late-arrival classification.
//!
//! Late readings are stored and counted, never rejected; historical
//! backfill is a legitimate use case.

use crate::reading::Reading;
use chrono::{DateTime, Duration, Utc};

/// Arrival classification of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lateness {
    OnTime,
    Late,
}

/// Classifier over a configurable lateness window.
#[derive(Debug, Clone, Copy)]
pub struct TimelinessClassifier {
    late_threshold: Duration,
}

impl TimelinessClassifier {
    pub fn new(late_threshold_minutes: i64) -> Self {
        Self {
            late_threshold: Duration::minutes(late_threshold_minutes),
        }
    }

    /// Classify one reading against its ingestion time.
    pub fn classify(&self, reading: &Reading, ingested_at: DateTime<Utc>) -> Lateness {
        if ingested_at - reading.timestamp > self.late_threshold {
            Lateness::Late
        } else {
            Lateness::OnTime
        }
    }

    /// Convenience predicate.
    pub fn is_late(&self, reading: &Reading, ingested_at: DateTime<Utc>) -> bool {
        self.classify(reading, ingested_at) == Lateness::Late
    }
}
