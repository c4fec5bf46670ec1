// Sentra Testdata - Signal patterns
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Signal pattern generators for realistic sensor behavior.

use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Signal pattern definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SignalPattern {
    /// Constant level.
    Constant { value: f64 },

    /// Linear drift.
    ///
    /// `value = start + slope_per_hour * t_hours`
    Linear { start: f64, slope_per_hour: f64 },

    /// Sinusoidal cycle (e.g. diurnal temperature).
    ///
    /// `value = offset + amplitude * sin(2*PI*t/period)`
    Sine {
        amplitude: f64,
        period_minutes: u64,
        offset: f64,
    },

    /// Random walk (Brownian motion).
    RandomWalk { start: f64, step_std: f64 },
}

/// Mutable state carried across samples of one pattern.
#[derive(Debug, Clone, Default)]
pub struct PatternState {
    walk_value: Option<f64>,
}

impl SignalPattern {
    /// Value at `elapsed_minutes` since series start.
    pub fn sample(
        &self,
        elapsed_minutes: f64,
        state: &mut PatternState,
        rng: &mut StdRng,
    ) -> f64 {
        match self {
            SignalPattern::Constant { value } => *value,
            SignalPattern::Linear {
                start,
                slope_per_hour,
            } => start + slope_per_hour * elapsed_minutes / 60.0,
            SignalPattern::Sine {
                amplitude,
                period_minutes,
                offset,
            } => {
                let period = (*period_minutes).max(1) as f64;
                offset + amplitude * (2.0 * PI * elapsed_minutes / period).sin()
            }
            SignalPattern::RandomWalk { start, step_std } => {
                let current = state.walk_value.unwrap_or(*start);
                let step = if *step_std > 0.0 {
                    match Normal::new(0.0, *step_std) {
                        Ok(dist) => dist.sample(rng),
                        Err(_) => 0.0,
                    }
                } else {
                    0.0
                };
                let next = current + step;
                state.walk_value = Some(next);
                next
            }
        }
    }
}

/// Gaussian measurement noise added on top of a pattern.
pub fn measurement_noise(std: f64, rng: &mut StdRng) -> f64 {
    if std <= 0.0 {
        return 0.0;
    }
    match Normal::new(0.0, std) {
        Ok(dist) => dist.sample(rng),
        Err(_) => 0.0,
    }
}
