//! Simulated cortisol sensor
//!
//! Wires the circadian model into the transduction chain:
//! 1. CircadianModel - time-of-day baseline with smoothed variation
//! 2. TransductionChain - current conversion, amplification, noise, calibration

use crate::circadian::CircadianModel;
use crate::noise::{NoiseSource, RandomNoise};
use crate::transduction::{CalibrationParameters, TransductionChain};
use chrono::Timelike;

/// One simulated wearable cortisol sensor
pub struct Sensor {
    circadian: CircadianModel,
    chain: TransductionChain,
    noise: Box<dyn NoiseSource>,
}

impl Default for Sensor {
    fn default() -> Self {
        Self::new(CalibrationParameters::default(), Box::new(RandomNoise::new()))
    }
}

impl std::fmt::Debug for Sensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sensor")
            .field("circadian", &self.circadian)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

impl Sensor {
    pub fn new(calibration: CalibrationParameters, noise: Box<dyn NoiseSource>) -> Self {
        Self {
            circadian: CircadianModel::new(),
            chain: TransductionChain::new(calibration),
            noise,
        }
    }

    pub fn calibration(&self) -> &CalibrationParameters {
        self.chain.calibration()
    }

    /// Smoothed variation carried between readings
    pub fn last_variation(&self) -> f64 {
        self.circadian.last_variation()
    }

    /// Take one reading at `time` (ng/mL, two decimals).
    ///
    /// The circadian draw is always taken before the measurement-noise draw.
    pub fn reading<T: Timelike>(&mut self, time: &T) -> f64 {
        let baseline = self.circadian.next_baseline(time, self.noise.as_mut());
        self.chain.transduce(baseline, self.noise.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{ScriptedNoise, SilentNoise};
    use chrono::NaiveTime;

    fn silent_sensor() -> Sensor {
        Sensor::new(CalibrationParameters::default(), Box::new(SilentNoise))
    }

    #[test]
    fn test_deterministic_without_noise() {
        let time = NaiveTime::from_hms_opt(10, 30, 0).unwrap();
        let first = silent_sensor().reading(&time);
        let second = silent_sensor().reading(&time);
        assert_eq!(first, second);

        let mut sensor = silent_sensor();
        assert_eq!(sensor.reading(&time), sensor.reading(&time));
    }

    #[test]
    fn test_peak_and_trough_readings() {
        let mut sensor = silent_sensor();
        assert_eq!(sensor.reading(&NaiveTime::from_hms_opt(7, 0, 0).unwrap()), 18.0);
        assert_eq!(sensor.reading(&NaiveTime::from_hms_opt(19, 0, 0).unwrap()), 2.0);
    }

    #[test]
    fn test_draw_order() {
        // First draw feeds the circadian variation, second the measurement noise
        let noise = ScriptedNoise::new(vec![0.2, 0.0]);
        let mut sensor = Sensor::new(CalibrationParameters::default(), Box::new(noise));
        let reading = sensor.reading(&NaiveTime::from_hms_opt(7, 0, 0).unwrap());
        assert!((sensor.last_variation() - 0.03).abs() < 1e-12);
        assert_eq!(reading, 18.03);
    }

    #[test]
    fn test_seeded_sensors_agree() {
        let time = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
        let mut a = Sensor::new(
            CalibrationParameters::default(),
            Box::new(RandomNoise::seeded(99)),
        );
        let mut b = Sensor::new(
            CalibrationParameters::default(),
            Box::new(RandomNoise::seeded(99)),
        );
        for _ in 0..20 {
            assert_eq!(a.reading(&time), b.reading(&time));
        }
    }

    #[test]
    fn test_noisy_readings_stay_near_curve() {
        let time = NaiveTime::from_hms_opt(7, 0, 0).unwrap();
        let mut sensor = Sensor::default();
        for _ in 0..200 {
            let reading = sensor.reading(&time);
            // 18 +/- 0.2 variation, then +/- 1.5%
            assert!(reading > 17.5 && reading < 18.6, "{reading}");
        }
    }
}
