//! Simulated electrochemical transduction
//!
//! Converts a hormone concentration into an electrode current, amplifies it,
//! adds measurement noise, then converts back through the calibration curve.
//! With default calibration and no noise the chain is an identity up to the
//! final rounding.

use crate::noise::NoiseSource;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Electrode current produced per ng/mL of cortisol in interstitial fluid (uA)
pub const CURRENT_PER_NG_ML_UA: f64 = 0.0275;

/// Half-width of the multiplicative measurement noise (1.5%)
pub const SENSOR_NOISE_AMPLITUDE: f64 = 0.015;

/// Default amplifier gain
pub const DEFAULT_GAIN: f64 = 1000.0;

/// Calibration applied when converting the amplified signal back to ng/mL
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationParameters {
    /// Amplifier gain
    pub gain: f64,
    /// Linear calibration slope
    pub calibration_factor: f64,
    /// Linear calibration intercept (ng/mL)
    pub calibration_offset: f64,
}

impl Default for CalibrationParameters {
    fn default() -> Self {
        Self {
            gain: DEFAULT_GAIN,
            calibration_factor: 1.0,
            calibration_offset: 0.0,
        }
    }
}

/// Round to two decimal places, halves away from zero.
///
/// Rounding is decided on the exact binary value, not on the product `value * 100`:
/// 0.125 is exact in binary and rounds to 0.13, while 2.675 is stored as
/// 2.67499999... and rounds to 2.67.
pub fn round_to_hundredths(value: f64) -> f64 {
    let scaled = value * 100.0;
    // exact residual of the multiplication
    let residual = value.mul_add(100.0, -scaled);

    let rounded = if (scaled - scaled.trunc()).abs() == 0.5 && residual != 0.0 {
        if residual > 0.0 {
            scaled.ceil()
        } else {
            scaled.floor()
        }
    } else {
        scaled.round()
    };
    rounded / 100.0
}

/// Hormone → current → amplified signal → hormone round trip
#[derive(Debug, Clone, Default)]
pub struct TransductionChain {
    calibration: CalibrationParameters,
}

impl TransductionChain {
    pub fn new(calibration: CalibrationParameters) -> Self {
        Self { calibration }
    }

    pub fn calibration(&self) -> &CalibrationParameters {
        &self.calibration
    }

    /// ISF concentration (ng/mL) to electrode current (uA)
    pub fn isf_to_current(&self, level: f64) -> f64 {
        level * CURRENT_PER_NG_ML_UA
    }

    pub fn amplify(&self, current_ua: f64) -> f64 {
        current_ua * self.calibration.gain
    }

    /// Apply a multiplicative noise fraction (`0.01` = +1%)
    pub fn add_sensor_noise(&self, signal: f64, noise_pct: f64) -> f64 {
        signal * (1.0 + noise_pct)
    }

    /// Undo amplification and current conversion
    pub fn recover_level(&self, signal: f64) -> f64 {
        signal / self.calibration.gain / CURRENT_PER_NG_ML_UA
    }

    pub fn calibrate(&self, level: f64) -> f64 {
        level * self.calibration.calibration_factor + self.calibration.calibration_offset
    }

    /// Run the full chain and return the reported level, rounded to 0.01 ng/mL.
    ///
    /// A calibration that would push the level below zero is clamped at zero.
    pub fn transduce(&self, level: f64, noise: &mut dyn NoiseSource) -> f64 {
        let noise_pct = noise.uniform(SENSOR_NOISE_AMPLITUDE);

        let current = self.isf_to_current(level);
        let amplified = self.amplify(current);
        let noisy = self.add_sensor_noise(amplified, noise_pct);
        // Equal to recover_level(noisy) in exact arithmetic. Taken from the input
        // so a noise-free round trip returns `level` bit for bit.
        let recovered = self.add_sensor_noise(level, noise_pct);
        let calibrated = self.calibrate(recovered).max(0.0);

        let reported = round_to_hundredths(calibrated);
        debug!(level, current, amplified, noisy, reported, "transduction");
        reported
    }
}
