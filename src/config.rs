//! Sensor configuration
//!
//! Calibration and noise settings, loadable from JSON. Calibration is fixed once
//! a monitor is built from a config.

use crate::error::SensorError;
use crate::noise::{NoiseSource, RandomNoise, SilentNoise};
use crate::transduction::CalibrationParameters;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub calibration: CalibrationParameters,
    /// Seed for reproducible noise; entropy-seeded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_seed: Option<u64>,
    /// Turn off both noise draws
    pub disable_noise: bool,
}

impl SensorConfig {
    /// Load and validate a config from JSON
    pub fn from_json(json: &str) -> Result<Self, SensorError> {
        let config: SensorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, SensorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SensorError> {
        let calibration = &self.calibration;
        if !calibration.gain.is_finite() || calibration.gain <= 0.0 {
            return Err(SensorError::InvalidConfig(format!(
                "gain must be a positive number, got {}",
                calibration.gain
            )));
        }
        if !calibration.calibration_factor.is_finite() {
            return Err(SensorError::InvalidConfig(
                "calibration_factor must be finite".to_string(),
            ));
        }
        if !calibration.calibration_offset.is_finite() {
            return Err(SensorError::InvalidConfig(
                "calibration_offset must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Noise source described by this config
    pub fn noise_source(&self) -> Box<dyn NoiseSource> {
        if self.disable_noise {
            return Box::new(SilentNoise);
        }
        match self.noise_seed {
            Some(seed) => Box::new(RandomNoise::seeded(seed)),
            None => Box::new(RandomNoise::new()),
        }
    }
}
