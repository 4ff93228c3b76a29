//! Boundary records
//!
//! These are the values the monitor hands to its host (web layer, FFI, CLI).

use crate::recommendation::Recommendation;
use crate::state::ReadingMode;
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Unit of every reported level
pub const CORTISOL_UNIT: &str = "ng/mL";

/// Format of reading timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a timestamp the way readings report it
pub fn format_timestamp<Tz: TimeZone>(instant: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Current cortisol value as seen by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CortisolReading {
    /// Level in ng/mL, two decimals
    #[serde(rename = "cortisol")]
    pub value: f64,
    pub unit: String,
    /// Local wall time, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
    pub mode: ReadingMode,
    /// Monitor instance that produced the reading
    pub instance_id: String,
}

/// Result of an accepted override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideOutcome {
    #[serde(rename = "cortisol")]
    pub value: f64,
    pub unit: String,
    pub mode: ReadingMode,
    pub recommendations: Recommendation,
}

/// Acknowledgement of a reset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetAck {
    pub status: String,
    pub mode: ReadingMode,
}

impl ResetAck {
    pub fn automatic() -> Self {
        Self {
            status: "ok".to_string(),
            mode: ReadingMode::Automatic,
        }
    }
}
