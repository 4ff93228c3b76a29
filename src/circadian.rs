//! Circadian cortisol model
//!
//! Produces the time-of-day baseline the simulated sensor measures. Cortisol
//! follows a cosine over 24 hours, peaking at 07:00 and bottoming out at 19:00,
//! with a slowly wandering variation layered on top.

use crate::noise::NoiseSource;
use chrono::Timelike;
use std::f64::consts::TAU;
use tracing::debug;

/// Mean of the circadian curve (ng/mL)
pub const CIRCADIAN_MEAN_NG_ML: f64 = 10.0;

/// Amplitude of the circadian curve (ng/mL)
pub const CIRCADIAN_AMPLITUDE_NG_ML: f64 = 8.0;

/// Hour of day at which the curve peaks
pub const PEAK_HOUR: f64 = 7.0;

/// Half-width of the uniform draw feeding the variation
pub const VARIATION_AMPLITUDE: f64 = 0.2;

/// Share of the previous variation kept on each step
pub const VARIATION_DECAY: f64 = 0.85;

/// Weight of the fresh draw on each step
pub const VARIATION_WEIGHT: f64 = 0.15;

/// Lowest baseline the model will report (ng/mL)
pub const BASELINE_FLOOR_NG_ML: f64 = 2.0;

/// Circadian baseline generator with exponentially smoothed variation
#[derive(Debug, Clone, Default)]
pub struct CircadianModel {
    last_variation: f64,
}

impl CircadianModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current smoothed variation (ng/mL)
    pub fn last_variation(&self) -> f64 {
        self.last_variation
    }

    /// Noise-free circadian curve at `time`.
    ///
    /// Only hour and minute are considered; seconds are ignored.
    pub fn circadian_value<T: Timelike>(time: &T) -> f64 {
        let time_decimal = time.hour() as f64 + time.minute() as f64 / 60.0;
        let phase = (time_decimal - PEAK_HOUR) / 24.0 * TAU;
        CIRCADIAN_MEAN_NG_ML + CIRCADIAN_AMPLITUDE_NG_ML * phase.cos()
    }

    /// Advance the variation by one step and return the baseline at `time`.
    ///
    /// Draws exactly once from `noise`. The result never drops below
    /// [`BASELINE_FLOOR_NG_ML`].
    pub fn next_baseline<T: Timelike>(&mut self, time: &T, noise: &mut dyn NoiseSource) -> f64 {
        let circadian = Self::circadian_value(time);

        let delta = noise.uniform(VARIATION_AMPLITUDE);
        self.last_variation = self.last_variation * VARIATION_DECAY + delta * VARIATION_WEIGHT;

        let baseline = (circadian + self.last_variation).max(BASELINE_FLOOR_NG_ML);
        debug!(
            circadian,
            variation = self.last_variation,
            baseline,
            "circadian baseline"
        );
        baseline
    }
}
