// Sentra - Industrial safety telemetry pipeline
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Equipment registry types.
//!
//! Equipment is owned by an external registry; the pipeline only performs
//! read-only lookups for validation bounds and alert context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of safety device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    GasDetector,
    TemperatureSensor,
    PressureSensor,
    AirQualityMonitor,
    LocationTracker,
}

impl EquipmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentType::GasDetector => "gas_detector",
            EquipmentType::TemperatureSensor => "temperature_sensor",
            EquipmentType::PressureSensor => "pressure_sensor",
            EquipmentType::AirQualityMonitor => "air_quality_monitor",
            EquipmentType::LocationTracker => "location_tracker",
        }
    }
}

/// Operational status of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    Active,
    Inactive,
    Maintenance,
    CalibrationNeeded,
    Retired,
}

/// Registry entry for one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub equipment_id: String,
    pub equipment_type: EquipmentType,
    pub status: EquipmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_calibration: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_calibration_due: Option<DateTime<Utc>>,
}

impl Equipment {
    pub fn new(equipment_id: impl Into<String>, equipment_type: EquipmentType) -> Self {
        Self {
            equipment_id: equipment_id.into(),
            equipment_type,
            status: EquipmentStatus::Active,
            location: None,
            last_calibration: None,
            next_calibration_due: None,
        }
    }

    /// Builder: set the status.
    pub fn with_status(mut self, status: EquipmentStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder: set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder: set calibration timestamps.
    pub fn with_calibration(
        mut self,
        last: DateTime<Utc>,
        next_due: DateTime<Utc>,
    ) -> Self {
        self.last_calibration = Some(last);
        self.next_calibration_due = Some(next_due);
        self
    }

    /// Whether the device's calibration is overdue at `now`, or the
    /// registry has already marked it as needing calibration.
    pub fn calibration_overdue(&self, now: DateTime<Utc>) -> bool {
        if self.status == EquipmentStatus::CalibrationNeeded {
            return true;
        }
        match self.next_calibration_due {
            Some(due) => due < now,
            None => false,
        }
    }
}

/// Read-only lookup into the equipment registry.
pub trait EquipmentRegistry {
    /// Look up a device by id. `None` means unknown equipment.
    fn lookup(&self, equipment_id: &str) -> Option<Equipment>;
}

/// In-process registry backed by a map. Used by tests, demos, and
/// deployments that preload the device fleet at startup.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    devices: HashMap<String, Equipment>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device, replacing any previous entry with the same id.
    pub fn insert(&mut self, equipment: Equipment) {
        self.devices
            .insert(equipment.equipment_id.clone(), equipment);
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl EquipmentRegistry for InMemoryRegistry {
    fn lookup(&self, equipment_id: &str) -> Option<Equipment> {
        self.devices.get(equipment_id).cloned()
    }
}
