//! # Rigtune Common
//!
//! Shared types and errors for the Rigtune mining optimizer.
//!
//! ## Core Types
//!
//! - [`Sample`]: One telemetry reading plus the price quote taken with it
//! - [`Action`]: Discrete advisory outcome of the decision stage
//! - [`MiningMode`]: Eco / balanced / performance operating mode
//!
//! ## Errors
//!
//! - [`SourceError`]: Telemetry or price retrieval failed (cycle skipped)
//! - [`AnalysisError`]: Not enough data, or a degenerate share window
//! - [`RigtuneError`]: Unified error carrying the failing cycle stage

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{AnalysisError, RigtuneError, Result, SourceComponent, SourceError};
pub use types::{
    action::Action,
    mode::MiningMode,
    sample::{estimate_profitability, Sample},
};

/// Rigtune version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// BTC/day earned per GH/s in the simplified profitability model
pub const PROFITABILITY_PER_GHS: f64 = 0.0001;

/// Maximum overclock percentage
pub const MAX_OVERCLOCK_PCT: u8 = 15;

/// Minimum overclock percentage
pub const MIN_OVERCLOCK_PCT: u8 = 0;

/// Maximum power limit percentage
pub const MAX_POWER_LIMIT_PCT: u8 = 100;

/// Minimum power limit percentage
pub const MIN_POWER_LIMIT_PCT: u8 = 80;

/// Hard cap on retained history samples
pub const HISTORY_CAPACITY: usize = 100;

/// Samples kept when history overflows
pub const HISTORY_RETAIN: usize = 50;

/// Samples considered for the rejection rate
pub const REJECTION_WINDOW: usize = 10;
