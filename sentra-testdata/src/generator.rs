// Sentra Testdata - Core generator
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Reading series generation.
//!
//! Produces `Reading` series from a signal pattern, a sampling grid, and
//! optional injected anomalies, all from a seeded RNG for reproducible
//! fixtures.

use crate::patterns::{measurement_noise, PatternState, SignalPattern};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sentra::reading::Reading;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generator failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    /// The sampling interval must be positive.
    #[error("Invalid sample interval: {0} minutes")]
    InvalidInterval(i64),

    /// At least one sample is required.
    #[error("Empty series requested")]
    EmptySeries,
}

/// An anomaly injected into a generated series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpikeSpec {
    /// Index of the sample to distort.
    pub at_sample: usize,
    /// Added to the pattern value at that sample.
    pub magnitude: f64,
}

/// Generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub equipment_id: String,
    pub metric_name: String,
    /// Start of the series.
    pub start_time: DateTime<Utc>,
    /// Interval between samples in minutes.
    pub interval_minutes: i64,
    /// Number of samples to generate.
    pub num_samples: usize,
    /// Gaussian measurement noise standard deviation.
    pub noise_std: f64,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            equipment_id: "GAS-001".to_string(),
            metric_name: "co_ppm".to_string(),
            // 2026-02-01 00:00:00 UTC
            start_time: Utc.timestamp_opt(1_769_904_000, 0).unwrap(),
            interval_minutes: 1,
            num_samples: 60,
            noise_std: 0.0,
            seed: 1234,
        }
    }
}

impl GeneratorConfig {
    pub fn new(
        equipment_id: impl Into<String>,
        metric_name: impl Into<String>,
    ) -> Self {
        Self {
            equipment_id: equipment_id.into(),
            metric_name: metric_name.into(),
            ..Default::default()
        }
    }

    /// Builder: set the series start.
    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    /// Builder: set the sampling interval.
    pub fn with_interval_minutes(mut self, minutes: i64) -> Self {
        self.interval_minutes = minutes;
        self
    }

    /// Builder: set the sample count.
    pub fn with_num_samples(mut self, n: usize) -> Self {
        self.num_samples = n;
        self
    }

    /// Builder: set the measurement noise level.
    pub fn with_noise_std(mut self, std: f64) -> Self {
        self.noise_std = std;
        self
    }

    /// Builder: set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Generate a reading series from a pattern plus injected spikes.
pub fn generate(
    config: &GeneratorConfig,
    pattern: &SignalPattern,
    spikes: &[SpikeSpec],
) -> Result<Vec<Reading>, GeneratorError> {
    if config.interval_minutes <= 0 {
        return Err(GeneratorError::InvalidInterval(config.interval_minutes));
    }
    if config.num_samples == 0 {
        return Err(GeneratorError::EmptySeries);
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut state = PatternState::default();
    let mut readings = Vec::with_capacity(config.num_samples);

    for i in 0..config.num_samples {
        let elapsed_minutes = (i as i64 * config.interval_minutes) as f64;
        let mut value = pattern.sample(elapsed_minutes, &mut state, &mut rng)
            + measurement_noise(config.noise_std, &mut rng);

        for spike in spikes {
            if spike.at_sample == i {
                value += spike.magnitude;
            }
        }

        let timestamp =
            config.start_time + Duration::minutes(i as i64 * config.interval_minutes);
        readings.push(Reading::new(
            config.equipment_id.clone(),
            config.metric_name.clone(),
            value,
            timestamp,
        ));
    }

    Ok(readings)
}

/// Steady series with one spike near the end; the canonical anomaly
/// fixture.
pub fn steady_with_spike(
    config: &GeneratorConfig,
    level: f64,
    spike_magnitude: f64,
) -> Result<Vec<Reading>, GeneratorError> {
    let spike = SpikeSpec {
        at_sample: config.num_samples.saturating_sub(1),
        magnitude: spike_magnitude,
    };
    generate(
        config,
        &SignalPattern::Constant { value: level },
        &[spike],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_grid() {
        let config = GeneratorConfig::new("GAS-001", "co_ppm")
            .with_num_samples(10)
            .with_interval_minutes(5);
        let readings =
            generate(&config, &SignalPattern::Constant { value: 5.0 }, &[]).unwrap();

        assert_eq!(readings.len(), 10);
        assert_eq!(readings[0].timestamp, config.start_time);
        assert_eq!(
            readings[9].timestamp,
            config.start_time + Duration::minutes(45)
        );
        assert!(readings.iter().all(|r| r.metric_value == 5.0));
    }

    #[test]
    fn test_invalid_interval_rejected() {
        let config = GeneratorConfig::default().with_interval_minutes(0);
        let err = generate(&config, &SignalPattern::Constant { value: 5.0 }, &[]);
        assert_eq!(err, Err(GeneratorError::InvalidInterval(0)));
    }

    #[test]
    fn test_empty_series_rejected() {
        let config = GeneratorConfig::default().with_num_samples(0);
        let err = generate(&config, &SignalPattern::Constant { value: 5.0 }, &[]);
        assert_eq!(err, Err(GeneratorError::EmptySeries));
    }

    #[test]
    fn test_spike_injection() {
        let config = GeneratorConfig::default().with_num_samples(31);
        let readings = steady_with_spike(&config, 20.0, 75.0).unwrap();

        assert_eq!(readings.len(), 31);
        assert_eq!(readings[29].metric_value, 20.0);
        assert_eq!(readings[30].metric_value, 95.0);
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = GeneratorConfig::new("TEMP-001", "temperature_c")
            .with_interval_minutes(5)
            .with_seed(7);
        let json = config.to_json().unwrap();
        let parsed = GeneratorConfig::from_json(&json).unwrap();
        assert_eq!(parsed.equipment_id, "TEMP-001");
        assert_eq!(parsed.interval_minutes, 5);
        assert_eq!(parsed.seed, 7);
    }

    #[test]
    fn test_same_seed_reproducible() {
        let config = GeneratorConfig::default().with_noise_std(0.5).with_seed(99);
        let pattern = SignalPattern::RandomWalk {
            start: 50.0,
            step_std: 1.0,
        };

        let a = generate(&config, &pattern, &[]).unwrap();
        let b = generate(&config, &pattern, &[]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_linear_drift_series() {
        let config = GeneratorConfig::new("TEMP-001", "temperature_c")
            .with_interval_minutes(60)
            .with_num_samples(24);
        let pattern = SignalPattern::Linear {
            start: 20.0,
            slope_per_hour: 0.5,
        };

        let readings = generate(&config, &pattern, &[]).unwrap();
        assert_eq!(readings[0].metric_value, 20.0);
        assert!((readings[23].metric_value - 31.5).abs() < 1e-9);
    }
}
