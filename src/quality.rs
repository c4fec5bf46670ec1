// Sentra - Industrial safety telemetry pipeline
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Per-batch quality accounting.
//!
//! One report per ingestion call, owned by that call; there is no shared
//! process-wide counter state. The tallies are independent: a reading can
//! be both late and a duplicate, so `invalid + duplicate + late` is not a
//! partition of `total`.

use serde::{Deserialize, Serialize};

/// Quality counters for one ingestion call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Size of the submitted batch.
    pub total: usize,
    /// Readings rejected by the validator.
    pub invalid: usize,
    /// Readings dropped as duplicates (intra-batch or against storage).
    pub duplicate: usize,
    /// Stored readings that arrived after the lateness window.
    pub late: usize,
    /// Rows effectively inserted into the window store.
    pub inserted: usize,
    /// Wall-clock processing time for the call.
    pub processing_time_ms: u64,
}

impl QualityReport {
    /// Start a report for a batch of `total` readings.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn record_invalid(&mut self) {
        self.invalid += 1;
    }

    pub fn record_duplicate(&mut self) {
        self.duplicate += 1;
    }

    pub fn record_late(&mut self) {
        self.late += 1;
    }

    pub fn record_inserted(&mut self, count: usize) {
        self.inserted += count;
    }

    /// Finalize with the call's elapsed wall-clock time. The report is
    /// immutable afterward by convention: the pipeline hands it to the
    /// caller by value.
    pub fn finalize(&mut self, processing_time_ms: u64) {
        self.processing_time_ms = processing_time_ms;
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report() {
        let report = QualityReport::new(100);
        assert_eq!(report.total, 100);
        assert_eq!(report.invalid, 0);
        assert_eq!(report.duplicate, 0);
        assert_eq!(report.late, 0);
        assert_eq!(report.inserted, 0);
    }

    #[test]
    fn test_independent_tallies() {
        let mut report = QualityReport::new(2);
        // One reading can hit several counters; nothing enforces a
        // partition.
        report.record_late();
        report.record_duplicate();
        report.record_late();
        assert_eq!(report.late, 2);
        assert_eq!(report.duplicate, 1);
        assert!(report.late + report.duplicate > report.total);
    }

    #[test]
    fn test_finalize_sets_processing_time() {
        let mut report = QualityReport::new(10);
        report.finalize(42);
        assert_eq!(report.processing_time_ms, 42);
    }

    #[test]
    fn test_report_json() {
        let mut report = QualityReport::new(100);
        report.record_invalid();
        report.record_inserted(99);
        let json = report.to_json().unwrap();
        assert!(json.contains("\"total\":100"));
        assert!(json.contains("\"invalid\":1"));
        assert!(json.contains("\"inserted\":99"));
    }
}
