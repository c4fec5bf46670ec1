// Sentra Testdata - Synthetic sensor data
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Sentra Testdata
//!
//! Synthetic sensor reading generator for the Sentra ecosystem. Produces
//! reproducible `Reading` series from composable signal patterns, with
//! optional injected anomalies, for integration tests and demos.
//!
//! ```rust
//! use sentra_testdata::{GeneratorConfig, SignalPattern, generate};
//!
//! let config = GeneratorConfig::new("GAS-001", "co_ppm").with_num_samples(30);
//! let readings = generate(
//!     &config,
//!     &SignalPattern::Constant { value: 5.0 },
//!     &[],
//! )
//! .unwrap();
//! assert_eq!(readings.len(), 30);
//! ```

pub mod generator;
pub mod patterns;

pub use generator::{generate, steady_with_spike, GeneratorConfig, GeneratorError, SpikeSpec};
pub use patterns::{PatternState, SignalPattern};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
