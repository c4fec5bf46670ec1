// Sentra Analytics - Anomaly and trend analysis
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Sentra Analytics
//!
//! Anomaly detection and trend analysis over sensor windows stored by the
//! `sentra` ingestion pipeline.
//!
//! Two detectors run per invocation:
//! - **Threshold**: static per-equipment-type bands, usable at any
//!   history size. A 500 ppm CO reading against a 50 ppm band flags
//!   immediately, with or without history.
//! - **Statistical**: an isolation forest over per-point features
//!   `(value, rate of change, rolling z-score)`, re-fitted from a fixed
//!   seed on every call once enough history exists.
//!
//! The trend engine fits a least-squares line over a rolling window and
//! classifies drift against the metric's typical variance.
//!
//! ## Example
//!
//! ```rust
//! use sentra::equipment::{Equipment, EquipmentType};
//! use sentra::reading::Reading;
//! use sentra_analytics::{AnalyticsConfig, AnomalyDetector};
//!
//! let detector = AnomalyDetector::new(&AnalyticsConfig::default());
//! let equipment = Equipment::new("GAS-001", EquipmentType::GasDetector);
//!
//! let window = vec![
//!     Reading::new("GAS-001", "co_ppm", 5.0, chrono::Utc::now()),
//!     Reading::new("GAS-001", "co_ppm", 500.0, chrono::Utc::now()),
//! ];
//!
//! let detection = detector.detect(&equipment, "co_ppm", &window, None);
//! assert_eq!(detection.findings.len(), 1);
//! ```
//!
//! ## Statelessness
//!
//! Nothing survives between invocations: window stats are recomputed and
//! the forest is re-fitted each call. This trades CPU for the elimination
//! of model-staleness bugs and makes every call referentially transparent
//! given the same input window.

// Core modules
pub mod alert;
pub mod anomaly;
pub mod config;
pub mod engine;
pub mod forest;
pub mod stats;
pub mod trend;

// Re-exports for convenience
pub use alert::{AlertCandidate, AlertError, AlertId, AlertSeverity, AlertSink, AlertSource};
pub use anomaly::{AnomalyDetector, AnomalyFinding, Detection, DetectionMethod};
pub use config::{AnalyticsConfig, AnomalyConfig, ForestConfig, ThresholdBand, TrendConfig};
pub use engine::{AnalyticsEngine, AnalyticsError, ScanSummary};
pub use stats::WindowStats;
pub use trend::{TrendAnalyzer, TrendDirection, TrendResult};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
