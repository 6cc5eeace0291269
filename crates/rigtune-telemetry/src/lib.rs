//! # Rigtune Telemetry
//!
//! The sampling boundary of the optimizer: one call produces one
//! [`Sample`](rigtune_common::Sample), or fails with
//! [`SourceError`](rigtune_common::SourceError) and the cycle is skipped.
//!
//! ## Components
//!
//! - [`TelemetryReader`]: raw rig readings (hashrate, power, temperature, shares)
//! - [`PriceFeed`]: spot price for a named asset
//! - [`RigSampleSource`]: combines both under per-call timeouts
//!
//! ```text
//! TelemetryReader ──┐
//!                   ├──> RigSampleSource::sample() ──> Sample
//! PriceFeed ────────┘        (timeout = unavailable)
//! ```

pub mod price;
pub mod reader;
pub mod source;

use serde::{Deserialize, Serialize};

pub use price::{CoinGeckoPriceFeed, FixedPriceFeed, PriceFeed};
pub use reader::{RigReading, SimulatedRig, TelemetryReader};
pub use source::{RigSampleSource, SampleSource};

/// Default CoinGecko simple-price endpoint
pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

/// Sample source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Asset identifier passed to the price feed
    pub asset: String,
    /// Quote currency
    pub currency: String,
    /// Price API endpoint
    pub price_api_url: String,
    /// Deadline for one telemetry read
    pub telemetry_timeout_ms: u64,
    /// Deadline for one price quote
    pub price_timeout_ms: u64,
    /// Use this price instead of querying the API
    pub fixed_price: Option<f64>,
    /// Seed for the simulated rig (random if unset)
    pub seed: Option<u64>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            asset: "bitcoin".to_string(),
            currency: "usd".to_string(),
            price_api_url: DEFAULT_PRICE_API_URL.to_string(),
            telemetry_timeout_ms: 5000,
            price_timeout_ms: 5000,
            fixed_price: None,
            seed: None,
        }
    }
}
