// Sentra - Industrial safety telemetry pipeline
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Reading validation.
//!
//! Checks run in a fixed order and short-circuit on the first failure:
//! required fields, known equipment, finite value, physical bounds,
//! future-timestamp tolerance. A rejected reading never reaches storage.

use crate::config::PipelineConfig;
use crate::equipment::EquipmentRegistry;
use crate::error::ValidationError;
use crate::reading::{RawReading, Reading, ReadingStatus};
use chrono::{DateTime, Duration, Utc};

/// Stateless validator over a bounds table.
pub struct Validator {
    config: PipelineConfig,
}

impl Validator {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Validate one raw reading against the registry at `ingested_at`.
    ///
    /// On success the returned [`Reading`] carries a derived status:
    /// `warning` for unknown metrics and calibration-overdue equipment,
    /// otherwise the submitted status (default `normal`).
    pub fn validate(
        &self,
        raw: &RawReading,
        registry: &dyn EquipmentRegistry,
        ingested_at: DateTime<Utc>,
    ) -> std::result::Result<Reading, ValidationError> {
        // 1. Required fields, correctly typed.
        let equipment_id = raw
            .equipment_id
            .as_deref()
            .ok_or(ValidationError::MissingField("equipment_id"))?;
        let metric_name = raw
            .metric_name
            .as_deref()
            .ok_or(ValidationError::MissingField("metric_name"))?;
        let timestamp = raw
            .timestamp
            .ok_or(ValidationError::MissingField("timestamp"))?;
        let raw_value = raw
            .metric_value
            .as_ref()
            .ok_or(ValidationError::MissingField("metric_value"))?;
        let metric_value = raw_value
            .as_f64()
            .ok_or_else(|| ValidationError::WrongType {
                field: "metric_value",
                detail: format!("expected number, got {}", raw_value.type_name()),
            })?;
        let submitted_status = match raw.status.as_deref() {
            Some(s) => Some(ReadingStatus::parse(s).ok_or_else(|| {
                ValidationError::WrongType {
                    field: "status",
                    detail: format!("unrecognized status `{}`", s),
                }
            })?),
            None => None,
        };

        // 2. Equipment must exist.
        let equipment = registry
            .lookup(equipment_id)
            .ok_or_else(|| ValidationError::UnknownEquipment(equipment_id.to_string()))?;

        // 3. Finite value.
        if !metric_value.is_finite() {
            return Err(ValidationError::NonFiniteValue);
        }

        // 4. Physical bounds. Unknown metrics pass with a warning status.
        let mut derived_status = submitted_status.unwrap_or(ReadingStatus::Normal);
        match self.config.bounds.lookup(metric_name) {
            Some(bounds) => {
                if !bounds.contains(metric_value) {
                    return Err(ValidationError::OutOfRange {
                        metric: metric_name.to_string(),
                        value: metric_value,
                        min: bounds.min,
                        max: bounds.max,
                    });
                }
            }
            None => {
                log::debug!(
                    "no bounds configured for metric `{}`, flagging as warning",
                    metric_name
                );
                derived_status = ReadingStatus::Warning;
            }
        }

        // 5. Clock-skew tolerance.
        let tolerance = Duration::minutes(self.config.future_tolerance_minutes);
        if timestamp > ingested_at + tolerance {
            return Err(ValidationError::FutureTimestamp {
                timestamp,
                tolerance_minutes: self.config.future_tolerance_minutes,
            });
        }

        // A device past its calibration date reports with reduced trust.
        if derived_status == ReadingStatus::Normal && equipment.calibration_overdue(ingested_at)
        {
            derived_status = ReadingStatus::Warning;
        }

        let mut reading = Reading::new(equipment_id, metric_name, metric_value, timestamp)
            .with_status(derived_status);
        reading.unit = raw.unit.clone();
        Ok(reading)
    }
}
