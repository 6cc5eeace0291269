//! # Rigtune Optimizer
//!
//! Closed-loop tuning advisor for mining rigs.
//!
//! ## Cycle
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ SampleSource │──>│ HistoryStore │──>│   Analyzer   │
//! └──────────────┘   └──────┬───────┘   └──────┬───────┘
//!                           │ trim             │ Analysis
//!                    ┌──────┴───────┐   ┌──────┴───────┐
//!                    │   Actuator   │<──│DecisionEngine│──> AuditLog
//!                    │ ControlState │   └──────────────┘
//!                    └──────────────┘
//! ```
//!
//! ## Decision Rules
//!
//! | Rule          | Condition                           | Action            |
//! |---------------|-------------------------------------|-------------------|
//! | Hashrate low  | mean < 0.9 × 100 MH/s               | IncreaseHashrate  |
//! | Hashrate high | mean > 1.1 × 100 MH/s               | ReducePower       |
//! | Temperature   | mean > 75 °C                        | ReduceHeat        |
//! | Efficiency    | mean(hashrate/power) < 0.12         | ImproveEfficiency |
//! | Rejection     | last-10 rejection rate > 5%         | CheckConnection   |
//! | Profitability | latest profitability × price < 0.05 | SwitchCoin        |

pub mod config;
pub mod cycle;
pub mod engine;
pub mod metrics;
pub mod runner;
pub mod store;

use std::time::Duration;

use rigtune_common::Result;
use rigtune_telemetry::{
    CoinGeckoPriceFeed, FixedPriceFeed, PriceFeed, RigSampleSource, SampleSource, SimulatedRig,
    SourceSettings,
};

pub use config::{DegenerateRejectionPolicy, RigtuneConfig};
pub use cycle::{CycleReport, Optimizer};
pub use engine::{Actuator, Analysis, Analyzer, ControlState, DecisionEngine};
pub use metrics::CycleMetrics;
pub use runner::{RunSummary, Runner};
pub use store::{AuditLog, AuditSink, DecisionRecord, HistoryStore, TracingAuditSink};

/// Build the sample source described by `settings`.
///
/// Telemetry comes from the simulated rig; prices from `fixed_price` if set,
/// otherwise from the HTTP price API.
pub fn build_sample_source(settings: &SourceSettings) -> Result<Box<dyn SampleSource>> {
    let reader = match settings.seed {
        Some(seed) => SimulatedRig::seeded(seed),
        None => SimulatedRig::new(),
    };

    let price_feed: Box<dyn PriceFeed> = match settings.fixed_price {
        Some(price) => Box::new(FixedPriceFeed::new(price)),
        None => Box::new(CoinGeckoPriceFeed::new(
            &settings.price_api_url,
            Duration::from_millis(settings.price_timeout_ms),
        )?),
    };

    Ok(Box::new(RigSampleSource::new(
        Box::new(reader),
        price_feed,
        settings,
    )))
}
