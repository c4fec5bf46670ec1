// Sentra - Industrial safety telemetry pipeline
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Ingestion pipeline orchestration.
//!
//! One `ingest` call runs the whole quality chain over a batch: validate,
//! deduplicate, classify lateness, append, account. Per-reading failures
//! never abort the batch; store failures abort the call and surface with
//! the partial quality report attached.
//!
//! The pipeline is idempotent at the row level: re-submitting a stored
//! reading is a counted duplicate, not an error, which makes client-side
//! retries safe.

use crate::config::PipelineConfig;
use crate::dedup::Deduplicator;
use crate::equipment::EquipmentRegistry;
use crate::error::{IngestError, Result, ValidationError};
use crate::quality::QualityReport;
use crate::reading::{RawReading, Reading};
use crate::store::WindowStore;
use crate::timeliness::TimelinessClassifier;
use crate::validate::Validator;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

/// Per-reading result, in input order.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadingOutcome {
    /// Stored. `late` mirrors the lateness counter.
    Inserted { late: bool },
    /// Dropped as a duplicate, intra-batch or against storage.
    Duplicate,
    /// Rejected by the validator with a recorded reason.
    Rejected { reason: ValidationError },
}

impl ReadingOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, ReadingOutcome::Inserted { .. })
    }
}

/// Result of one ingestion call.
#[derive(Debug)]
pub struct IngestOutcome {
    pub report: QualityReport,
    /// One outcome per submitted reading, input order preserved.
    pub outcomes: Vec<ReadingOutcome>,
}

/// Batch ingestion pipeline over a window store and an equipment
/// registry.
///
/// Calls are independent and may run concurrently; all per-call state
/// lives on the stack. Same-key write races are resolved by the store's
/// conflict-safe append, not here.
pub struct IngestionPipeline<S, R> {
    store: Arc<S>,
    registry: Arc<R>,
    validator: Validator,
    dedup: Deduplicator,
    timeliness: TimelinessClassifier,
    config: PipelineConfig,
}

impl<S: WindowStore, R: EquipmentRegistry> IngestionPipeline<S, R> {
    pub fn new(store: Arc<S>, registry: Arc<R>, config: PipelineConfig) -> Self {
        Self {
            validator: Validator::new(config.clone()),
            dedup: Deduplicator::new(config.dedup_lookback_minutes),
            timeliness: TimelinessClassifier::new(config.late_threshold_minutes),
            store,
            registry,
            config,
        }
    }

    /// Ingest one batch.
    ///
    /// Returns the quality report plus an outcome per reading, in input
    /// order. Fails whole on an oversized batch or an exhausted store.
    pub fn ingest(&self, batch: &[RawReading]) -> Result<IngestOutcome> {
        let started = Instant::now();

        if batch.len() > self.config.max_batch_size {
            return Err(IngestError::BatchTooLarge {
                size: batch.len(),
                max: self.config.max_batch_size,
            });
        }

        let ingested_at = Utc::now();
        let mut report = QualityReport::new(batch.len());
        let mut outcomes: Vec<Option<ReadingOutcome>> = vec![None; batch.len()];

        // Validate each reading independently; failures are isolated.
        let mut valid: Vec<(usize, Reading)> = Vec::with_capacity(batch.len());
        for (position, raw) in batch.iter().enumerate() {
            match self.validator.validate(raw, self.registry.as_ref(), ingested_at) {
                Ok(reading) => valid.push((position, reading)),
                Err(reason) => {
                    report.record_invalid();
                    outcomes[position] = Some(ReadingOutcome::Rejected { reason });
                }
            }
        }

        // Intra-batch dedup: first occurrence wins.
        let intra = self.dedup.dedupe_batch(valid);
        for position in intra.duplicate_positions {
            report.record_duplicate();
            outcomes[position] = Some(ReadingOutcome::Duplicate);
        }

        // Cross-batch dedup against storage (retried reads).
        let cross = match self.dedup.filter_existing(
            intra.kept,
            self.store.as_ref(),
            &self.config.store_retry,
        ) {
            Ok(result) => result,
            Err((attempts, source)) => {
                report.finalize(started.elapsed().as_millis() as u64);
                return Err(IngestError::StoreUnavailable {
                    attempts,
                    source,
                    partial_report: report,
                });
            }
        };
        for position in cross.duplicate_positions {
            report.record_duplicate();
            outcomes[position] = Some(ReadingOutcome::Duplicate);
        }

        // Lateness is counted, never rejected.
        let mut rows = Vec::with_capacity(cross.kept.len());
        for (position, reading) in cross.kept {
            let late = self.timeliness.is_late(&reading, ingested_at);
            if late {
                report.record_late();
            }
            outcomes[position] = Some(ReadingOutcome::Inserted { late });
            rows.push(reading);
        }

        // Bulk append. Appends are never auto-retried: row-level
        // idempotence makes the caller's retry safe instead.
        if !rows.is_empty() {
            match self.store.append(&rows) {
                Ok(inserted) => report.record_inserted(inserted),
                Err(source) => {
                    report.finalize(started.elapsed().as_millis() as u64);
                    return Err(IngestError::StoreUnavailable {
                        attempts: 1,
                        source,
                        partial_report: report,
                    });
                }
            }
        }

        report.finalize(started.elapsed().as_millis() as u64);
        log::info!(
            "ingested batch: total={} inserted={} invalid={} duplicate={} late={} ({}ms)",
            report.total,
            report.inserted,
            report.invalid,
            report.duplicate,
            report.late,
            report.processing_time_ms
        );

        // Every position was assigned exactly once above.
        let outcomes: Vec<ReadingOutcome> = outcomes.into_iter().flatten().collect();
        debug_assert_eq!(outcomes.len(), report.total);

        Ok(IngestOutcome { report, outcomes })
    }

    /// The pipeline's configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::{Equipment, EquipmentType, InMemoryRegistry};
    use crate::store::MemoryStore;
    use chrono::{Duration, Utc};

    fn fixture() -> (Arc<MemoryStore>, Arc<InMemoryRegistry>) {
        let mut registry = InMemoryRegistry::new();
        registry.insert(Equipment::new("GAS-001", EquipmentType::GasDetector));
        registry.insert(Equipment::new("TEMP-001", EquipmentType::TemperatureSensor));
        (Arc::new(MemoryStore::new()), Arc::new(registry))
    }

    fn pipeline(
        store: Arc<MemoryStore>,
        registry: Arc<InMemoryRegistry>,
    ) -> IngestionPipeline<MemoryStore, InMemoryRegistry> {
        IngestionPipeline::new(store, registry, PipelineConfig::default())
    }

    #[test]
    fn test_ingest_valid_batch() {
        let (store, registry) = fixture();
        let pipeline = pipeline(store.clone(), registry);
        let now = Utc::now();

        let batch = vec![
            RawReading::new("GAS-001", "co_ppm", 5.2, now).with_unit("ppm"),
            RawReading::new("TEMP-001", "temperature_c", 22.5, now).with_unit("celsius"),
        ];

        let outcome = pipeline.ingest(&batch).unwrap();
        assert_eq!(outcome.report.total, 2);
        assert_eq!(outcome.report.inserted, 2);
        assert_eq!(outcome.report.invalid, 0);
        assert_eq!(outcome.report.duplicate, 0);
        assert_eq!(store.row_count(), 2);
    }

    #[test]
    fn test_batch_too_large_rejected_before_processing() {
        let (store, registry) = fixture();
        let config = PipelineConfig::default().with_max_batch_size(2);
        let pipeline = IngestionPipeline::new(store.clone(), registry, config);
        let now = Utc::now();

        let batch: Vec<_> = (0..3)
            .map(|i| {
                RawReading::new("GAS-001", "co_ppm", 5.0, now - Duration::seconds(i))
            })
            .collect();

        let err = pipeline.ingest(&batch).unwrap_err();
        assert!(matches!(err, IngestError::BatchTooLarge { size: 3, max: 2 }));
        assert_eq!(store.row_count(), 0);
    }

    #[test]
    fn test_outcome_order_matches_input() {
        let (store, registry) = fixture();
        let pipeline = pipeline(store, registry);
        let now = Utc::now();

        let batch = vec![
            RawReading::new("GAS-001", "co_ppm", 5.0, now),
            RawReading::new("NONEXISTENT", "co_ppm", 5.0, now),
            RawReading::new("GAS-001", "co_ppm", 9.0, now), // dup of [0]
        ];

        let outcome = pipeline.ingest(&batch).unwrap();
        assert_eq!(outcome.outcomes.len(), 3);
        assert!(outcome.outcomes[0].is_inserted());
        assert!(matches!(
            outcome.outcomes[1],
            ReadingOutcome::Rejected { .. }
        ));
        assert_eq!(outcome.outcomes[2], ReadingOutcome::Duplicate);
    }

    #[test]
    fn test_late_readings_stored_and_counted() {
        let (store, registry) = fixture();
        let pipeline = pipeline(store.clone(), registry);
        let now = Utc::now();

        let batch = vec![
            RawReading::new("GAS-001", "co_ppm", 5.0, now - Duration::hours(2)),
            RawReading::new("GAS-001", "co_ppm", 6.0, now),
        ];

        let outcome = pipeline.ingest(&batch).unwrap();
        assert_eq!(outcome.report.late, 1);
        assert_eq!(outcome.report.inserted, 2); // late is not rejected
        assert_eq!(
            outcome.outcomes[0],
            ReadingOutcome::Inserted { late: true }
        );
        assert_eq!(store.row_count(), 2);
    }

    #[test]
    fn test_idempotent_resubmission() {
        let (store, registry) = fixture();
        let pipeline = pipeline(store.clone(), registry);
        let now = Utc::now();

        let batch = vec![
            RawReading::new("GAS-001", "co_ppm", 5.0, now - Duration::seconds(2)),
            RawReading::new("GAS-001", "co_ppm", 6.0, now - Duration::seconds(1)),
        ];

        let first = pipeline.ingest(&batch).unwrap();
        assert_eq!(first.report.inserted, 2);

        let second = pipeline.ingest(&batch).unwrap();
        assert_eq!(second.report.inserted, 0);
        assert_eq!(second.report.duplicate, 2);
        assert_eq!(store.row_count(), 2);
    }
}
