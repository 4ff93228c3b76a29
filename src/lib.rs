//! Synheart Cortisol - Simulated wearable cortisol sensor
//!
//! Cortisol produces synthetic cortisol readings through a deterministic-under-test
//! pipeline: circadian baseline → electrode current → amplification → noise →
//! calibration. A monitor switches between simulated readings and a manually
//! injected value, and maps any level to tiered dietary and lifestyle guidance.
//!
//! ## Modules
//!
//! - **Simulation**: `circadian`, `transduction`, `sensor`
//! - **Monitor**: mode switch and the thread-safe host-facing API
//! - **Guidance**: tier classification and static recommendation content

pub mod circadian;
pub mod clock;
pub mod config;
pub mod error;
pub mod monitor;
pub mod noise;
pub mod recommendation;
pub mod sensor;
pub mod state;
pub mod transduction;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::SensorConfig;
pub use error::{SensorError, ValidationError};
pub use monitor::CortisolMonitor;
pub use noise::{NoiseSource, RandomNoise, ScriptedNoise, SilentNoise};
pub use recommendation::{Recommendation, RecommendationEngine, RecommendationTier};
pub use sensor::Sensor;
pub use state::{ReadingMode, ReadingState};
pub use transduction::{CalibrationParameters, TransductionChain};
pub use types::{CortisolReading, OverrideOutcome, ResetAck, CORTISOL_UNIT};

/// Library version
pub const CORTISOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by host surfaces
pub const PRODUCER_NAME: &str = "synheart-cortisol";
