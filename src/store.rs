// Sentra - Industrial safety telemetry pipeline
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Abstract time-indexed store.
//!
//! The pipeline treats persistent storage as a window store: bulk upsert
//! plus ascending range reads per (equipment, metric) pair. Conflict
//! resolution lives here, not in the pipeline: concurrent submissions of
//! the same dedup key must result in at-most-once effective insertion.

use crate::config::RetryConfig;
use crate::error::StoreError;
use crate::reading::Reading;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::time::Duration;

/// Time-indexed reading store.
pub trait WindowStore {
    /// Bulk insert with upsert-on-conflict semantics keyed by
    /// (equipment_id, metric_name, timestamp). The first write for a key
    /// wins; conflicting rows are ignored. Returns the number of rows
    /// actually inserted.
    fn append(&self, rows: &[Reading]) -> std::result::Result<usize, StoreError>;

    /// All readings for one (equipment, metric) pair in `[t0, t1]`,
    /// ascending by timestamp.
    fn range(
        &self,
        equipment_id: &str,
        metric_name: &str,
        t0: DateTime<Utc>,
        t1: DateTime<Utc>,
    ) -> std::result::Result<Vec<Reading>, StoreError>;
}

/// Retry an idempotent range read with exponential backoff.
///
/// Only retryable errors consume the budget; permanent errors surface
/// immediately. Appends must not go through this path.
pub fn range_with_retry<S: WindowStore + ?Sized>(
    store: &S,
    equipment_id: &str,
    metric_name: &str,
    t0: DateTime<Utc>,
    t1: DateTime<Utc>,
    retry: &RetryConfig,
) -> std::result::Result<Vec<Reading>, (u32, StoreError)> {
    let mut backoff_ms = retry.backoff_ms;
    let mut attempt = 1;

    loop {
        match store.range(equipment_id, metric_name, t0, t1) {
            Ok(rows) => return Ok(rows),
            Err(err) if err.is_retryable() && attempt < retry.max_attempts => {
                log::warn!(
                    "range read failed (attempt {}/{}), retrying in {}ms: {}",
                    attempt,
                    retry.max_attempts,
                    backoff_ms,
                    err
                );
                std::thread::sleep(Duration::from_millis(backoff_ms));
                backoff_ms = backoff_ms.saturating_mul(2);
                attempt += 1;
            }
            Err(err) => return Err((attempt, err)),
        }
    }
}

/// In-process window store.
///
/// One ordered map per (equipment, metric) pair; the outer lock serializes
/// same-key writers, giving the conflict-safe insert the pipeline relies
/// on.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pairs: RwLock<HashMap<(String, String), BTreeMap<DateTime<Utc>, Reading>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total rows across all pairs.
    pub fn row_count(&self) -> usize {
        let pairs = self.pairs.read().unwrap_or_else(|e| e.into_inner());
        pairs.values().map(|rows| rows.len()).sum()
    }

    /// Number of distinct (equipment, metric) pairs.
    pub fn pair_count(&self) -> usize {
        let pairs = self.pairs.read().unwrap_or_else(|e| e.into_inner());
        pairs.len()
    }
}

impl WindowStore for MemoryStore {
    fn append(&self, rows: &[Reading]) -> std::result::Result<usize, StoreError> {
        let mut pairs = self.pairs.write().unwrap_or_else(|e| e.into_inner());
        let mut inserted = 0;

        for reading in rows {
            let pair = pairs
                .entry((reading.equipment_id.clone(), reading.metric_name.clone()))
                .or_default();
            // First write wins; a conflicting key is a no-op.
            if let std::collections::btree_map::Entry::Vacant(slot) =
                pair.entry(reading.timestamp)
            {
                slot.insert(reading.clone());
                inserted += 1;
            }
        }

        Ok(inserted)
    }

    fn range(
        &self,
        equipment_id: &str,
        metric_name: &str,
        t0: DateTime<Utc>,
        t1: DateTime<Utc>,
    ) -> std::result::Result<Vec<Reading>, StoreError> {
        let pairs = self.pairs.read().unwrap_or_else(|e| e.into_inner());
        let key = (equipment_id.to_string(), metric_name.to_string());

        Ok(match pairs.get(&key) {
            Some(rows) => rows.range(t0..=t1).map(|(_, r)| r.clone()).collect(),
            None => Vec::new(),
        })
    }
}
