// Sentra - Industrial safety telemetry pipeline
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Sensor reading model.
//!
//! Two shapes exist on purpose: [`RawReading`] is the loosely-typed record
//! accepted at the ingestion boundary (any field may be missing, the value
//! may be any JSON type), and [`Reading`] is the typed record that flows
//! through the pipeline. The only way to turn one into the other is the
//! validator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Derived status of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    Normal,
    Warning,
    Critical,
    Offline,
}

impl ReadingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::Normal => "normal",
            ReadingStatus::Warning => "warning",
            ReadingStatus::Critical => "critical",
            ReadingStatus::Offline => "offline",
        }
    }

    /// Parse a status string from a raw record.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(ReadingStatus::Normal),
            "warning" => Some(ReadingStatus::Warning),
            "critical" => Some(ReadingStatus::Critical),
            "offline" => Some(ReadingStatus::Offline),
            _ => None,
        }
    }
}

/// Deduplication key: one row per (equipment, metric, timestamp).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReadingKey {
    pub equipment_id: String,
    pub metric_name: String,
    pub timestamp: DateTime<Utc>,
}

/// A validated sensor observation.
///
/// Immutable once persisted: rows are never updated, only superseded by
/// later-timestamped readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub equipment_id: String,
    pub metric_name: String,
    pub metric_value: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub status: ReadingStatus,
}

impl Reading {
    pub fn new(
        equipment_id: impl Into<String>,
        metric_name: impl Into<String>,
        metric_value: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            equipment_id: equipment_id.into(),
            metric_name: metric_name.into(),
            metric_value,
            timestamp,
            unit: None,
            status: ReadingStatus::Normal,
        }
    }

    /// Builder: set the unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Builder: set the status.
    pub fn with_status(mut self, status: ReadingStatus) -> Self {
        self.status = status;
        self
    }

    /// The dedup key for this reading.
    pub fn key(&self) -> ReadingKey {
        ReadingKey {
            equipment_id: self.equipment_id.clone(),
            metric_name: self.metric_name.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// Value slot of a raw reading.
///
/// Untagged so JSON numbers land in `Number` and everything else (strings,
/// nulls, objects) is kept for the validator to reject with a precise
/// reason. In-process producers can also hand over NaN/infinity here,
/// which JSON itself cannot carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Other(serde_json::Value),
}

impl RawValue {
    /// The numeric value, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(v) => Some(*v),
            RawValue::Other(v) => v.as_f64(),
        }
    }

    /// JSON type name, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Number(_) => "number",
            RawValue::Other(serde_json::Value::Null) => "null",
            RawValue::Other(serde_json::Value::Bool(_)) => "bool",
            RawValue::Other(serde_json::Value::Number(_)) => "number",
            RawValue::Other(serde_json::Value::String(_)) => "string",
            RawValue::Other(serde_json::Value::Array(_)) => "array",
            RawValue::Other(serde_json::Value::Object(_)) => "object",
        }
    }
}

/// An unvalidated reading as submitted by a device or collector.
///
/// Example JSON:
/// ```json
/// {
///   "equipment_id": "GAS-001",
///   "metric_name": "co_ppm",
///   "metric_value": 5.2,
///   "timestamp": "2026-02-01T08:30:00Z",
///   "unit": "ppm",
///   "status": "normal"
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawReading {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,

    /// Any JSON value; the validator rejects non-numeric shapes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_value: Option<RawValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl RawReading {
    /// Create a well-formed raw reading (the common case in tests and
    /// collectors that already hold typed values).
    pub fn new(
        equipment_id: impl Into<String>,
        metric_name: impl Into<String>,
        metric_value: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            equipment_id: Some(equipment_id.into()),
            metric_name: Some(metric_name.into()),
            metric_value: Some(RawValue::Number(metric_value)),
            timestamp: Some(timestamp),
            unit: None,
            status: None,
        }
    }

    /// Builder: set the unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Builder: set the status string.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Builder: replace the value with an arbitrary JSON value.
    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.metric_value = Some(RawValue::Other(value));
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

impl From<Reading> for RawReading {
    fn from(r: Reading) -> Self {
        RawReading {
            equipment_id: Some(r.equipment_id),
            metric_name: Some(r.metric_name),
            metric_value: Some(RawValue::Number(r.metric_value)),
            timestamp: Some(r.timestamp),
            unit: r.unit,
            status: Some(r.status.as_str().to_string()),
        }
    }
}
