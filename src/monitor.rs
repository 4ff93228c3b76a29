//! Cortisol monitor
//!
//! The composing object a host builds once and shares across requests. It owns
//! the sensor (and with it the circadian smoothing state) and the reading mode
//! switch, each behind its own lock.
//!
//! Lock order is always `state` then `sensor`. Automatic readings hold the
//! state read lock while sampling, so an override cannot slip in between the
//! mode check and the sample.

use crate::clock::{Clock, SystemClock};
use crate::config::SensorConfig;
use crate::error::SensorError;
use crate::recommendation::RecommendationEngine;
use crate::sensor::Sensor;
use crate::state::{parse_override_payload, ReadingMode, ReadingState};
use crate::types::{format_timestamp, CortisolReading, OverrideOutcome, ResetAck, CORTISOL_UNIT};
use chrono::{DateTime, FixedOffset};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Thread-safe cortisol monitor
pub struct CortisolMonitor {
    sensor: Mutex<Sensor>,
    state: RwLock<ReadingState>,
    clock: Box<dyn Clock>,
    instance_id: String,
}

impl Default for CortisolMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl CortisolMonitor {
    /// Monitor with default calibration, random noise and the system clock
    pub fn new() -> Self {
        Self::with_components(Sensor::default(), Box::new(SystemClock))
    }

    /// Build a monitor from a validated config, using the system clock
    pub fn from_config(config: &SensorConfig) -> Result<Self, SensorError> {
        config.validate()?;
        let sensor = Sensor::new(config.calibration, config.noise_source());
        Ok(Self::with_components(sensor, Box::new(SystemClock)))
    }

    /// Build a monitor from explicit parts
    pub fn with_components(sensor: Sensor, clock: Box<dyn Clock>) -> Self {
        Self {
            sensor: Mutex::new(sensor),
            state: RwLock::new(ReadingState::default()),
            clock,
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn mode(&self) -> ReadingMode {
        self.read_state().mode()
    }

    /// Current reading at the clock's time
    pub fn current_reading(&self) -> CortisolReading {
        self.current_reading_at(self.clock.now())
    }

    /// Current reading at `now`.
    ///
    /// Manual mode returns the stored override untouched; Automatic mode takes
    /// a fresh sensor reading.
    pub fn current_reading_at(&self, now: DateTime<FixedOffset>) -> CortisolReading {
        let state = self.read_state();
        let value = match *state {
            ReadingState::Manual { value } => value,
            ReadingState::Automatic => self.lock_sensor().reading(&now),
        };
        let mode = state.mode();
        drop(state);

        CortisolReading {
            value,
            unit: CORTISOL_UNIT.to_string(),
            timestamp: format_timestamp(&now),
            mode,
            instance_id: self.instance_id.clone(),
        }
    }

    /// Validate and store an override, then classify it.
    ///
    /// A rejected value leaves the mode and any earlier override unchanged.
    pub fn submit_override(&self, raw: f64) -> Result<OverrideOutcome, SensorError> {
        let stored = {
            let mut state = self.write_state();
            state.set_override(raw)
        };

        match stored {
            Ok(value) => {
                info!(value, "manual override engaged");
                Ok(OverrideOutcome {
                    value,
                    unit: CORTISOL_UNIT.to_string(),
                    mode: ReadingMode::Manual,
                    recommendations: RecommendationEngine::recommend(value),
                })
            }
            Err(e) => {
                warn!(raw, error = %e, "override rejected");
                Err(e.into())
            }
        }
    }

    /// Parse a JSON request body (`{"cortisol": ..}`) and submit it
    pub fn submit_override_json(&self, body: &str) -> Result<OverrideOutcome, SensorError> {
        let raw = parse_override_payload(body).map_err(|e| {
            warn!(error = %e, "override payload rejected");
            SensorError::from(e)
        })?;
        self.submit_override(raw)
    }

    /// Submit an override and serialise the outcome.
    ///
    /// Anything other than a validation failure is logged and reported as
    /// [`SensorError::Unexpected`].
    pub fn submit_override_to_json(&self, body: &str) -> Result<String, SensorError> {
        let outcome = self.submit_override_json(body)?;
        serde_json::to_string(&outcome).map_err(|e| {
            error!(error = %e, "failed to encode override outcome");
            SensorError::Unexpected(e.to_string())
        })
    }

    /// Clear any override and go back to simulated readings. Idempotent.
    pub fn reset_to_automatic(&self) -> ResetAck {
        let previous = {
            let mut state = self.write_state();
            let previous = state.mode();
            state.reset();
            previous
        };
        if previous == ReadingMode::Manual {
            info!("returned to automatic readings");
        }
        ResetAck::automatic()
    }

    // Writers replace the state or sensor fields wholesale, so a panic in another
    // holder cannot leave them half-written; poisoning is safe to ignore.

    fn read_state(&self) -> RwLockReadGuard<'_, ReadingState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ReadingState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_sensor(&self) -> MutexGuard<'_, Sensor> {
        self.sensor.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::noise::SilentNoise;
    use crate::recommendation::RecommendationTier;
    use crate::transduction::CalibrationParameters;
    use chrono::Duration;
    use std::sync::Arc;
    use std::thread;

    fn silent_monitor() -> CortisolMonitor {
        let sensor = Sensor::new(CalibrationParameters::default(), Box::new(SilentNoise));
        let clock = FixedClock::at_hms(7, 0, 0).unwrap();
        CortisolMonitor::with_components(sensor, Box::new(clock))
    }

    #[test]
    fn test_automatic_reading() {
        let monitor = silent_monitor();
        let reading = monitor.current_reading();
        assert_eq!(reading.value, 18.0);
        assert_eq!(reading.unit, "ng/mL");
        assert_eq!(reading.timestamp, "2024-01-15 07:00:00");
        assert_eq!(reading.mode, ReadingMode::Automatic);
        assert_eq!(reading.instance_id, monitor.instance_id());
    }

    #[test]
    fn test_reading_follows_time() {
        let monitor = silent_monitor();
        let evening = FixedClock::at_hms(19, 0, 0).unwrap().now();
        assert_eq!(monitor.current_reading_at(evening).value, 2.0);
    }

    #[test]
    fn test_override_roundtrip() {
        let monitor = silent_monitor();
        let outcome = monitor.submit_override(12.34).unwrap();
        assert_eq!(outcome.value, 12.34);
        assert_eq!(outcome.mode, ReadingMode::Manual);
        assert_eq!(outcome.recommendations.tier, RecommendationTier::Normal);

        let start = FixedClock::at_hms(7, 0, 0).unwrap().now();
        for hours in [0, 3, 12, 30, 500] {
            let reading = monitor.current_reading_at(start + Duration::hours(hours));
            assert_eq!(reading.value, 12.34);
            assert_eq!(reading.mode, ReadingMode::Manual);
        }
    }

    #[test]
    fn test_validation_rejection() {
        let monitor = silent_monitor();
        for raw in [-1.0, 50.01] {
            let err = monitor.submit_override(raw).unwrap_err();
            assert!(err.is_validation(), "{raw}");
        }
        assert_eq!(monitor.mode(), ReadingMode::Automatic);

        assert!(monitor.submit_override(0.0).is_ok());
        assert!(monitor.submit_override(50.0).is_ok());
        assert_eq!(monitor.current_reading().value, 50.0);
    }

    #[test]
    fn test_rejection_keeps_previous_override() {
        let monitor = silent_monitor();
        monitor.submit_override(4.0).unwrap();
        assert!(monitor.submit_override(99.0).is_err());
        assert_eq!(monitor.current_reading().value, 4.0);
    }

    #[test]
    fn test_override_json() {
        let monitor = silent_monitor();
        let outcome = monitor.submit_override_json(r#"{"cortisol": "22.5"}"#).unwrap();
        assert_eq!(outcome.value, 22.5);
        assert_eq!(outcome.recommendations.status, "High Cortisol");

        let err = monitor.submit_override_json(r#"{"level": 3}"#).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.public_message(), "Missing cortisol value");
    }

    #[test]
    fn test_override_to_json() {
        let monitor = silent_monitor();
        let json = monitor.submit_override_to_json(r#"{"cortisol": 3}"#).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["cortisol"], 3.0);
        assert_eq!(value["mode"], "manual");
        assert_eq!(value["recommendations"]["tier"], "low");
    }

    #[test]
    fn test_reset_idempotence() {
        let monitor = silent_monitor();
        monitor.submit_override(30.0).unwrap();

        let first = monitor.reset_to_automatic();
        let second = monitor.reset_to_automatic();
        assert_eq!(first, second);
        assert_eq!(monitor.mode(), ReadingMode::Automatic);

        let reading = monitor.current_reading();
        assert_eq!(reading.mode, ReadingMode::Automatic);
        assert_eq!(reading.value, 18.0);
    }

    #[test]
    fn test_from_config() {
        let config = SensorConfig {
            disable_noise: true,
            ..Default::default()
        };
        let monitor = CortisolMonitor::from_config(&config).unwrap();
        let value = monitor.current_reading().value;
        assert!((2.0..=18.0).contains(&value));
    }

    #[test]
    fn test_instances_have_distinct_ids() {
        assert_ne!(
            silent_monitor().instance_id(),
            silent_monitor().instance_id()
        );
    }

    #[test]
    fn test_concurrent_access() {
        let monitor = Arc::new(CortisolMonitor::new());
        let mut handles = Vec::new();

        for worker in 0..8 {
            let monitor = Arc::clone(&monitor);
            handles.push(thread::spawn(move || {
                for i in 0..200 {
                    match (worker + i) % 4 {
                        0 => {
                            monitor.submit_override(10.0 + worker as f64).unwrap();
                        }
                        1 => {
                            monitor.reset_to_automatic();
                        }
                        _ => {
                            let reading = monitor.current_reading();
                            assert!((0.0..=50.0).contains(&reading.value));
                            if reading.mode == ReadingMode::Manual {
                                // Only values some worker submitted can show up
                                assert!((10.0..18.0).contains(&reading.value));
                                assert_eq!(reading.value.fract(), 0.0);
                            }
                        }
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        monitor.reset_to_automatic();
        assert_eq!(monitor.mode(), ReadingMode::Automatic);
    }
}
