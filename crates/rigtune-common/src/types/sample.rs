//! Sample - one telemetry reading from the rig
//!
//! A sample pairs the rig's raw readings with the spot price taken in the
//! same call, plus the derived profitability estimate. Samples are never
//! modified after construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::PROFITABILITY_PER_GHS;

/// Simplified profitability model: BTC/day for a hashrate in MH/s
#[inline]
pub fn estimate_profitability(hashrate_mhs: f64) -> f64 {
    (hashrate_mhs / 1000.0) * PROFITABILITY_PER_GHS
}

/// Telemetry sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// When the reading was taken
    pub timestamp: DateTime<Utc>,

    /// Hashrate (MH/s)
    pub hashrate: f64,

    /// Power draw (W)
    pub power_usage: f64,

    /// Temperature (°C)
    pub temperature: f64,

    /// Shares accepted by the pool since the previous reading
    pub accepted_shares: u32,

    /// Shares rejected by the pool since the previous reading
    pub rejected_shares: u32,

    /// Blocks found locally since the previous reading
    pub local_block_count: u32,

    /// Estimated earnings (BTC/day)
    pub profitability: f64,

    /// Spot price of the mined asset
    pub price: f64,
}

impl Sample {
    /// Create a sample stamped with the current time
    pub fn new(
        hashrate: f64,
        power_usage: f64,
        temperature: f64,
        accepted_shares: u32,
        rejected_shares: u32,
        price: f64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            hashrate,
            power_usage,
            temperature,
            accepted_shares,
            rejected_shares,
            local_block_count: 0,
            profitability: estimate_profitability(hashrate),
            price,
        }
    }

    /// Override the timestamp
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set locally found blocks
    pub fn with_local_blocks(mut self, count: u32) -> Self {
        self.local_block_count = count;
        self
    }

    /// Hashrate per watt (MH/s/W)
    #[inline]
    pub fn efficiency(&self) -> f64 {
        self.hashrate / self.power_usage
    }

    /// Profitability expressed in the quote currency
    #[inline]
    pub fn profitability_value(&self) -> f64 {
        self.profitability * self.price
    }

    /// Accepted plus rejected shares
    #[inline]
    pub fn total_shares(&self) -> u64 {
        self.accepted_shares as u64 + self.rejected_shares as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profitability_is_derived() {
        let sample = Sample::new(100.0, 800.0, 70.0, 20, 1, 60_000.0);
        assert!((sample.profitability - 0.00001).abs() < 1e-12);
        assert!((sample.profitability_value() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_efficiency() {
        let sample = Sample::new(120.0, 800.0, 70.0, 20, 1, 1.0);
        assert!((sample.efficiency() - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_total_shares_does_not_overflow() {
        let sample = Sample::new(1.0, 1.0, 1.0, u32::MAX, u32::MAX, 1.0);
        assert_eq!(sample.total_shares(), 2 * u32::MAX as u64);
    }
}
