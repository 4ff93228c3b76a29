//! Reading mode switch
//!
//! The monitor either reports fresh sensor readings (Automatic) or a value a
//! caller injected (Manual). The override value lives inside the Manual variant,
//! so a stored value without Manual mode cannot be represented.

use crate::error::ValidationError;
use crate::transduction::round_to_hundredths;
use serde::{Deserialize, Serialize};

/// Smallest accepted override (ng/mL)
pub const MIN_OVERRIDE_NG_ML: f64 = 0.0;

/// Largest accepted override (ng/mL)
pub const MAX_OVERRIDE_NG_ML: f64 = 50.0;

/// JSON key carrying the override value
pub const OVERRIDE_FIELD: &str = "cortisol";

/// Where the current value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingMode {
    Automatic,
    Manual,
}

/// Shared mode switch with its optional override
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ReadingState {
    #[default]
    Automatic,
    Manual {
        value: f64,
    },
}

impl ReadingState {
    pub fn mode(&self) -> ReadingMode {
        match self {
            ReadingState::Automatic => ReadingMode::Automatic,
            ReadingState::Manual { .. } => ReadingMode::Manual,
        }
    }

    /// Stored override, present only in Manual mode
    pub fn override_value(&self) -> Option<f64> {
        match self {
            ReadingState::Automatic => None,
            ReadingState::Manual { value } => Some(*value),
        }
    }

    /// Validate `raw`, store it rounded to 0.01 and switch to Manual.
    ///
    /// An invalid value leaves the state untouched.
    pub fn set_override(&mut self, raw: f64) -> Result<f64, ValidationError> {
        let value = validate_override(raw)?;
        *self = ReadingState::Manual { value };
        Ok(value)
    }

    /// Drop any override and return to Automatic
    pub fn reset(&mut self) {
        *self = ReadingState::Automatic;
    }
}

/// Check an override against the accepted range and round it.
///
/// The range is checked on the raw value, so 50.004 is rejected rather than
/// rounded into range.
pub fn validate_override(raw: f64) -> Result<f64, ValidationError> {
    if !raw.is_finite() {
        return Err(ValidationError::NonNumeric(raw.to_string()));
    }
    if !(MIN_OVERRIDE_NG_ML..=MAX_OVERRIDE_NG_ML).contains(&raw) {
        return Err(ValidationError::OutOfRange(raw));
    }
    // -0.0 passes the range check; normalise it
    Ok(round_to_hundredths(raw) + 0.0)
}

/// Extract the raw override number from a JSON request body.
///
/// Accepts `{"cortisol": 12.3}` and numeric strings such as
/// `{"cortisol": " 12.3 "}`. Range checking is left to [`validate_override`].
pub fn parse_override_payload(body: &str) -> Result<f64, ValidationError> {
    let payload: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ValidationError::MalformedPayload(e.to_string()))?;

    let object = payload.as_object().ok_or_else(|| {
        ValidationError::MalformedPayload("expected a JSON object".to_string())
    })?;

    match object.get(OVERRIDE_FIELD) {
        None | Some(serde_json::Value::Null) => Err(ValidationError::MissingValue),
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ValidationError::NonNumeric(n.to_string())),
        Some(serde_json::Value::String(s)) => {
            let trimmed = s.trim();
            match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(ValidationError::NonNumeric(format!("{:?}", s))),
            }
        }
        Some(other) => Err(ValidationError::NonNumeric(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_initial_state_is_automatic() {
        let state = ReadingState::default();
        assert_eq!(state.mode(), ReadingMode::Automatic);
        assert_eq!(state.override_value(), None);
    }

    #[test]
    fn test_override_switches_to_manual() {
        let mut state = ReadingState::default();
        assert_eq!(state.set_override(12.346), Ok(12.35));
        assert_eq!(state.mode(), ReadingMode::Manual);
        assert_eq!(state.override_value(), Some(12.35));
    }

    #[test]
    fn test_override_rounding_at_ties() {
        // exact binary halves round away from zero
        assert_eq!(validate_override(0.125), Ok(0.13));
        assert_eq!(validate_override(12.625), Ok(12.63));
        assert_eq!(validate_override(49.875), Ok(49.88));
        // decimal halves stored just below the half round down
        assert_eq!(validate_override(2.675), Ok(2.67));
        assert_eq!(validate_override(1.005), Ok(1.0));
        for k in 0..=10_000 {
            let raw = k as f64 * 0.005;
            assert_eq!(validate_override(raw), Ok(round_to_hundredths(raw)), "raw {raw}");
        }
    }

    #[test]
    fn test_inclusive_bounds() {
        assert_eq!(validate_override(0.0), Ok(0.0));
        assert_eq!(validate_override(50.0), Ok(50.0));
        assert_eq!(validate_override(-1.0), Err(ValidationError::OutOfRange(-1.0)));
        assert_eq!(
            validate_override(50.01),
            Err(ValidationError::OutOfRange(50.01))
        );
        assert_eq!(
            validate_override(50.004),
            Err(ValidationError::OutOfRange(50.004))
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(matches!(
            validate_override(f64::NAN),
            Err(ValidationError::NonNumeric(_))
        ));
        assert!(matches!(
            validate_override(f64::INFINITY),
            Err(ValidationError::NonNumeric(_))
        ));
    }

    #[test]
    fn test_invalid_override_keeps_state() {
        let mut state = ReadingState::default();
        state.set_override(8.0).unwrap();
        assert!(state.set_override(75.0).is_err());
        assert_eq!(state, ReadingState::Manual { value: 8.0 });

        let mut state = ReadingState::default();
        assert!(state.set_override(-3.0).is_err());
        assert_eq!(state, ReadingState::Automatic);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut state = ReadingState::default();
        state.set_override(20.0).unwrap();
        state.reset();
        let once = state;
        state.reset();
        assert_eq!(state, once);
        assert_eq!(state, ReadingState::Automatic);
    }

    #[test]
    fn test_parse_numeric_payloads() {
        assert_eq!(parse_override_payload(r#"{"cortisol": 12.34}"#), Ok(12.34));
        assert_eq!(parse_override_payload(r#"{"cortisol": 7}"#), Ok(7.0));
        assert_eq!(parse_override_payload(r#"{"cortisol": " 9.5 "}"#), Ok(9.5));
    }

    #[test]
    fn test_parse_missing_value() {
        assert_eq!(
            parse_override_payload(r#"{}"#),
            Err(ValidationError::MissingValue)
        );
        assert_eq!(
            parse_override_payload(r#"{"cortisol": null}"#),
            Err(ValidationError::MissingValue)
        );
    }

    #[test]
    fn test_parse_non_numeric() {
        assert!(matches!(
            parse_override_payload(r#"{"cortisol": "high"}"#),
            Err(ValidationError::NonNumeric(_))
        ));
        assert!(matches!(
            parse_override_payload(r#"{"cortisol": "NaN"}"#),
            Err(ValidationError::NonNumeric(_))
        ));
        assert!(matches!(
            parse_override_payload(r#"{"cortisol": [1]}"#),
            Err(ValidationError::NonNumeric(_))
        ));
        assert!(matches!(
            parse_override_payload(r#"{"cortisol": true}"#),
            Err(ValidationError::NonNumeric(_))
        ));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_override_payload("not json"),
            Err(ValidationError::MalformedPayload(_))
        ));
        assert!(matches!(
            parse_override_payload("12.5"),
            Err(ValidationError::MalformedPayload(_))
        ));
    }
}
