//! Wind speed to rotational speed conversion.
//!
//! Two formulas are supported and selected through configuration:
//!
//! | Model | Formula |
//! |-------|---------|
//! | Tip-speed ratio | `rpm = (tsr * wind) / (pi * diameter) * 60` |
//! | Simplified | `rpm = wind / (pi * diameter) * 60` |
//!
//! The simplified model is the tip-speed-ratio model with `tsr = 1`. No
//! clamping is applied; the sampler is responsible for rejecting readings
//! that are not finite or are negative.

use std::f64::consts::PI;

use crate::config::{RotationConfig, RotationKind};

/// Seconds per minute, used to turn revolutions per second into RPM.
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// A pure mapping from wind speed (m/s) to rotor speed (RPM).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationModel {
    /// Fast-spinning unloaded rotor with an explicit tip-speed ratio.
    TipSpeedRatio {
        /// Ratio of blade tip speed to wind speed.
        tip_speed_ratio: f64,
        /// Rotor diameter in meters.
        diameter_m: f64,
    },
    /// Rotor whose tip moves at wind speed.
    Simplified {
        /// Rotor diameter in meters.
        diameter_m: f64,
    },
}

impl RotationModel {
    /// Build the model selected by configuration.
    pub const fn from_config(config: &RotationConfig) -> Self {
        match config.model {
            RotationKind::TipSpeedRatio => Self::TipSpeedRatio {
                tip_speed_ratio: config.tip_speed_ratio,
                diameter_m: config.diameter_m,
            },
            RotationKind::Simplified => Self::Simplified {
                diameter_m: config.diameter_m,
            },
        }
    }

    /// Tip-speed ratio in effect (1.0 for the simplified model).
    pub const fn tip_speed_ratio(&self) -> f64 {
        match *self {
            Self::TipSpeedRatio {
                tip_speed_ratio, ..
            } => tip_speed_ratio,
            Self::Simplified { .. } => 1.0,
        }
    }

    /// Rotor diameter in meters.
    pub const fn diameter_m(&self) -> f64 {
        match *self {
            Self::TipSpeedRatio { diameter_m, .. } | Self::Simplified { diameter_m } => diameter_m,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TipSpeedRatio { .. } => "tip-speed-ratio",
            Self::Simplified { .. } => "simplified",
        }
    }

    /// Rotational speed in revolutions per minute for `wind_speed` m/s.
    pub const fn rpm(&self, wind_speed: f64) -> f64 {
        (self.tip_speed_ratio() * wind_speed) / (PI * self.diameter_m()) * SECONDS_PER_MINUTE
    }
}

impl Default for RotationModel {
    fn default() -> Self {
        Self::from_config(&RotationConfig::default())
    }
}
