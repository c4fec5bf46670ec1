// Sentra - Industrial safety telemetry pipeline
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Sentra
//!
//! Ingestion and quality pipeline for industrial safety sensor telemetry.
//!
//! Sentra takes batches of time-stamped readings from safety devices (gas
//! detectors, temperature and pressure sensors, air-quality monitors,
//! location trackers), cleans and deduplicates them, and persists them to
//! a time-indexed store for range queries. The companion
//! `sentra-analytics` crate consumes the stored windows for anomaly and
//! trend analysis.
//!
//! ## Pipeline
//!
//! ```text
//! raw batch -> validate -> dedupe (batch + store) -> lateness -> append
//!                  |             |                      |
//!                  +-------------+----------------------+--> QualityReport
//! ```
//!
//! ## Example
//!
//! ```rust
//! use sentra::equipment::{Equipment, EquipmentType, InMemoryRegistry};
//! use sentra::pipeline::IngestionPipeline;
//! use sentra::reading::RawReading;
//! use sentra::store::MemoryStore;
//! use sentra::PipelineConfig;
//! use std::sync::Arc;
//!
//! let mut registry = InMemoryRegistry::new();
//! registry.insert(Equipment::new("GAS-001", EquipmentType::GasDetector));
//!
//! let store = Arc::new(MemoryStore::new());
//! let pipeline = IngestionPipeline::new(
//!     store.clone(),
//!     Arc::new(registry),
//!     PipelineConfig::default(),
//! );
//!
//! let batch = vec![
//!     RawReading::new("GAS-001", "co_ppm", 5.2, chrono::Utc::now()).with_unit("ppm"),
//! ];
//!
//! let outcome = pipeline.ingest(&batch).unwrap();
//! assert_eq!(outcome.report.inserted, 1);
//! ```
//!
//! ## Guarantees
//!
//! - **Order preservation**: the outcome list matches the input batch,
//!   position by position, whatever validation and dedup decide.
//! - **First write wins**: within a batch and against storage, the first
//!   occurrence of a dedup key is the one persisted.
//! - **Row-level idempotence**: re-submitting a stored reading is a
//!   counted duplicate, not an error, so client retries are safe.
//! - **Late is not invalid**: late arrivals are stored and counted;
//!   backfill is a legitimate use case.

// Core modules
pub mod config;
pub mod dedup;
pub mod equipment;
pub mod error;
pub mod jobs;
pub mod pipeline;
pub mod quality;
pub mod reading;
pub mod store;
pub mod timeliness;
pub mod validate;

// Re-exports for convenience
pub use config::{MetricBounds, MetricBoundsTable, PipelineConfig, RetryConfig};
pub use equipment::{Equipment, EquipmentRegistry, EquipmentStatus, EquipmentType};
pub use error::{IngestError, JobError, Result, StoreError, ValidationError};
pub use pipeline::{IngestOutcome, IngestionPipeline, ReadingOutcome};
pub use quality::QualityReport;
pub use reading::{RawReading, Reading, ReadingKey, ReadingStatus};
pub use store::{MemoryStore, WindowStore};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
