// Sentra - Industrial safety telemetry pipeline
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Two-phase deduplication.
//!
//! Phase one scans the batch in input order and keeps the first occurrence
//! per dedup key (first-wins models "first successful write" as
//! canonical). Phase two checks the survivors against storage with one
//! ranged read per touched (equipment, metric) pair instead of a point
//! lookup per reading.

use crate::config::RetryConfig;
use crate::error::StoreError;
use crate::reading::{Reading, ReadingKey};
use crate::store::{range_with_retry, WindowStore};
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};

/// Result of one dedup phase: surviving readings with their batch
/// positions, and the positions of dropped duplicates.
#[derive(Debug)]
pub struct DedupResult {
    pub kept: Vec<(usize, Reading)>,
    pub duplicate_positions: Vec<usize>,
}

/// Deduplicator over a configurable cross-batch lookback margin.
#[derive(Debug, Clone, Copy)]
pub struct Deduplicator {
    lookback_margin: Duration,
}

impl Deduplicator {
    pub fn new(lookback_minutes: i64) -> Self {
        Self {
            lookback_margin: Duration::minutes(lookback_minutes),
        }
    }

    /// Intra-batch phase: first occurrence per key wins, input order
    /// preserved. Positions refer to the slice passed in.
    pub fn dedupe_batch(&self, readings: Vec<(usize, Reading)>) -> DedupResult {
        let mut seen: HashSet<ReadingKey> = HashSet::with_capacity(readings.len());
        let mut kept = Vec::with_capacity(readings.len());
        let mut duplicate_positions = Vec::new();

        for (position, reading) in readings {
            if seen.insert(reading.key()) {
                kept.push((position, reading));
            } else {
                duplicate_positions.push(position);
            }
        }

        DedupResult {
            kept,
            duplicate_positions,
        }
    }

    /// Cross-batch phase: drop survivors whose key already exists in the
    /// store. One ranged read per (equipment, metric) pair, spanning the
    /// pair's own min timestamp minus the lookback margin up to its max
    /// timestamp.
    ///
    /// This check is a snapshot read and inherently racy against
    /// concurrent writers; the store's conflict-safe append is what makes
    /// the race harmless.
    pub fn filter_existing<S: WindowStore + ?Sized>(
        &self,
        survivors: Vec<(usize, Reading)>,
        store: &S,
        retry: &RetryConfig,
    ) -> std::result::Result<DedupResult, (u32, StoreError)> {
        if survivors.is_empty() {
            return Ok(DedupResult {
                kept: survivors,
                duplicate_positions: Vec::new(),
            });
        }

        // Group the batch's time span per touched pair.
        let mut spans: HashMap<(String, String), (DateTime<Utc>, DateTime<Utc>)> =
            HashMap::new();
        for (_, reading) in &survivors {
            let pair = (reading.equipment_id.clone(), reading.metric_name.clone());
            spans
                .entry(pair)
                .and_modify(|(min, max)| {
                    *min = (*min).min(reading.timestamp);
                    *max = (*max).max(reading.timestamp);
                })
                .or_insert((reading.timestamp, reading.timestamp));
        }

        let mut existing: HashSet<ReadingKey> = HashSet::new();
        for ((equipment_id, metric_name), (min, max)) in &spans {
            let rows = range_with_retry(
                store,
                equipment_id,
                metric_name,
                *min - self.lookback_margin,
                *max,
                retry,
            )?;
            existing.extend(rows.iter().map(Reading::key));
        }

        let mut kept = Vec::with_capacity(survivors.len());
        let mut duplicate_positions = Vec::new();
        for (position, reading) in survivors {
            if existing.contains(&reading.key()) {
                duplicate_positions.push(position);
            } else {
                kept.push((position, reading));
            }
        }

        log::debug!(
            "cross-batch dedup: {} pair(s) checked, {} duplicate(s) dropped",
            spans.len(),
            duplicate_positions.len()
        );

        Ok(DedupResult {
            kept,
            duplicate_positions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn reading(equipment: &str, metric: &str, value: f64, secs: i64) -> Reading {
        Reading::new(equipment, metric, value, ts(secs))
    }

    fn indexed(readings: Vec<Reading>) -> Vec<(usize, Reading)> {
        readings.into_iter().enumerate().collect()
    }

    #[test]
    fn test_intra_batch_first_wins() {
        let dedup = Deduplicator::new(60);
        let result = dedup.dedupe_batch(indexed(vec![
            reading("GAS-001", "co_ppm", 5.0, 100),
            reading("GAS-001", "co_ppm", 9.9, 100), // same key, later value
            reading("GAS-001", "co_ppm", 6.0, 200),
        ]));

        assert_eq!(result.kept.len(), 2);
        assert_eq!(result.kept[0].1.metric_value, 5.0); // first occurrence
        assert_eq!(result.duplicate_positions, vec![1]);
    }

    #[test]
    fn test_intra_batch_preserves_order() {
        let dedup = Deduplicator::new(60);
        let result = dedup.dedupe_batch(indexed(vec![
            reading("GAS-001", "co_ppm", 1.0, 300),
            reading("GAS-001", "co_ppm", 2.0, 100),
            reading("GAS-001", "co_ppm", 3.0, 200),
        ]));

        let positions: Vec<_> = result.kept.iter().map(|(p, _)| *p).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_intra_batch_distinct_metrics_not_duplicates() {
        let dedup = Deduplicator::new(60);
        let result = dedup.dedupe_batch(indexed(vec![
            reading("GAS-001", "co_ppm", 5.0, 100),
            reading("GAS-001", "temperature_c", 22.0, 100),
        ]));

        assert_eq!(result.kept.len(), 2);
        assert!(result.duplicate_positions.is_empty());
    }

    #[test]
    fn test_cross_batch_drops_stored_keys() {
        let dedup = Deduplicator::new(60);
        let store = MemoryStore::new();
        store
            .append(&[reading("GAS-001", "co_ppm", 5.0, 100)])
            .unwrap();

        let result = dedup
            .filter_existing(
                indexed(vec![
                    reading("GAS-001", "co_ppm", 5.0, 100), // already stored
                    reading("GAS-001", "co_ppm", 6.0, 200), // new
                ]),
                &store,
                &RetryConfig::default(),
            )
            .unwrap();

        assert_eq!(result.kept.len(), 1);
        assert_eq!(result.kept[0].1.timestamp, ts(200));
        assert_eq!(result.duplicate_positions, vec![0]);
    }

    #[test]
    fn test_cross_batch_empty_batch() {
        let dedup = Deduplicator::new(60);
        let store = MemoryStore::new();
        let result = dedup
            .filter_existing(Vec::new(), &store, &RetryConfig::default())
            .unwrap();
        assert!(result.kept.is_empty());
    }

    #[test]
    fn test_cross_batch_lookback_covers_margin() {
        // A stored reading slightly older than the batch minimum must
        // still be found thanks to the lookback margin.
        let dedup = Deduplicator::new(60);
        let store = MemoryStore::new();
        let old_secs = 10_000 - 30 * 60; // 30 min before batch min
        store
            .append(&[reading("GAS-001", "co_ppm", 5.0, old_secs)])
            .unwrap();

        let result = dedup
            .filter_existing(
                indexed(vec![
                    reading("GAS-001", "co_ppm", 5.0, old_secs), // resubmitted
                    reading("GAS-001", "co_ppm", 6.0, 10_000),
                ]),
                &store,
                &RetryConfig::default(),
            )
            .unwrap();

        assert_eq!(result.duplicate_positions, vec![0]);
    }

    #[test]
    fn test_cross_batch_same_timestamp_different_equipment() {
        let dedup = Deduplicator::new(60);
        let store = MemoryStore::new();
        store
            .append(&[reading("GAS-001", "co_ppm", 5.0, 100)])
            .unwrap();

        let result = dedup
            .filter_existing(
                indexed(vec![reading("GAS-002", "co_ppm", 5.0, 100)]),
                &store,
                &RetryConfig::default(),
            )
            .unwrap();

        assert_eq!(result.kept.len(), 1);
        assert!(result.duplicate_positions.is_empty());
    }
}
