// Sentra Analytics - Anomaly and trend analysis
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Analytics configuration.

use sentra::equipment::EquipmentType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Static alerting band for one (equipment type, metric) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBand {
    pub low: f64,
    pub high: f64,
}

impl ThresholdBand {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Whether a value breaches the band.
    pub fn breached(&self, value: f64) -> bool {
        value < self.low || value > self.high
    }
}

/// Per-equipment-type, per-metric threshold bands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdTable {
    bands: HashMap<String, ThresholdBand>,
}

impl ThresholdTable {
    pub fn empty() -> Self {
        Self {
            bands: HashMap::new(),
        }
    }

    fn key(equipment_type: EquipmentType, metric_name: &str) -> String {
        format!("{}/{}", equipment_type.as_str(), metric_name)
    }

    /// Look up the band for a pair.
    pub fn lookup(
        &self,
        equipment_type: EquipmentType,
        metric_name: &str,
    ) -> Option<ThresholdBand> {
        self.bands
            .get(&Self::key(equipment_type, metric_name))
            .copied()
    }

    /// Insert or replace a band.
    pub fn set(
        &mut self,
        equipment_type: EquipmentType,
        metric_name: impl AsRef<str>,
        band: ThresholdBand,
    ) {
        self.bands
            .insert(Self::key(equipment_type, metric_name.as_ref()), band);
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

impl Default for ThresholdTable {
    /// Alerting bands for the standard fleet. Tighter than the
    /// validator's physical bounds: a value can be real and still
    /// dangerous.
    fn default() -> Self {
        let mut table = Self::empty();
        table.set(
            EquipmentType::GasDetector,
            "co_ppm",
            ThresholdBand::new(0.0, 50.0),
        );
        table.set(
            EquipmentType::GasDetector,
            "gas_concentration",
            ThresholdBand::new(0.0, 50.0),
        );
        table.set(
            EquipmentType::GasDetector,
            "h2s_ppm",
            ThresholdBand::new(0.0, 10.0),
        );
        table.set(
            EquipmentType::GasDetector,
            "o2_pct",
            ThresholdBand::new(19.5, 23.5),
        );
        table.set(
            EquipmentType::GasDetector,
            "lel_pct",
            ThresholdBand::new(0.0, 10.0),
        );
        table.set(
            EquipmentType::TemperatureSensor,
            "temperature_c",
            ThresholdBand::new(-20.0, 85.0),
        );
        table.set(
            EquipmentType::PressureSensor,
            "pressure_kpa",
            ThresholdBand::new(0.0, 4_000.0),
        );
        table.set(
            EquipmentType::AirQualityMonitor,
            "pm25_ugm3",
            ThresholdBand::new(0.0, 150.0),
        );
        table.set(
            EquipmentType::AirQualityMonitor,
            "co2_ppm",
            ThresholdBand::new(0.0, 5_000.0),
        );
        table
    }
}

/// Isolation forest parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the ensemble.
    pub num_trees: usize,
    /// Subsample size per tree (capped at the window size).
    pub sample_size: usize,
    /// Seed for the forest's RNG. Fixed so that identical windows give
    /// identical scores.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            num_trees: 100,
            sample_size: 64,
            seed: 42,
        }
    }
}

/// Anomaly detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyConfig {
    /// Minimum history before the statistical detector runs. Below this
    /// only the threshold detector is used.
    pub min_history: usize,

    /// Fraction of the window's scores that must lie below a point's
    /// score for it to be anomalous (default 0.95: top 5% most
    /// isolated).
    pub cutoff_percentile: f64,

    /// Absolute isolation-score floor. Keeps an all-nominal window from
    /// flagging its top 5% anyway.
    pub score_floor: f64,

    /// Forest parameters.
    pub forest: ForestConfig,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            min_history: 10,
            cutoff_percentile: 0.95,
            score_floor: 0.6,
            forest: ForestConfig::default(),
        }
    }
}

/// Trend analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Rolling window length in hours.
    pub window_hours: i64,

    /// Minimum points for a fit.
    pub min_points: usize,

    /// A trend is stable while the total drift across the window stays
    /// under this multiple of the series' standard deviation.
    pub stable_drift_ratio: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            window_hours: 24,
            min_points: 3,
            stable_drift_ratio: 1.0,
        }
    }
}

/// Master configuration for the analytics engines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Threshold bands.
    pub thresholds: ThresholdTable,

    /// Anomaly detection settings.
    pub anomaly: AnomalyConfig,

    /// Trend analysis settings.
    pub trend: TrendConfig,
}

impl AnalyticsConfig {
    /// Builder: replace the threshold table.
    pub fn with_thresholds(mut self, thresholds: ThresholdTable) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Builder: set the statistical detector's minimum history.
    pub fn with_min_history(mut self, min_history: usize) -> Self {
        self.anomaly.min_history = min_history;
        self
    }

    /// Builder: set the trend window length.
    pub fn with_trend_window_hours(mut self, hours: i64) -> Self {
        self.trend.window_hours = hours;
        self
    }
}
