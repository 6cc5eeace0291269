//! Rig telemetry readers
//!
//! A reader returns one raw reading per call. [`SimulatedRig`] stands in
//! for real sensors during development.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rigtune_common::SourceError;
use serde::{Deserialize, Serialize};

/// Raw reading from the rig, before pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigReading {
    /// Hashrate (MH/s)
    pub hashrate: f64,
    /// Power draw (W)
    pub power_usage: f64,
    /// Temperature (°C)
    pub temperature: f64,
    /// Accepted shares
    pub accepted_shares: u32,
    /// Rejected shares
    pub rejected_shares: u32,
    /// Locally found blocks
    pub local_block_count: u32,
}

impl RigReading {
    /// Reject readings that cannot describe a running rig
    pub fn validate(&self) -> Result<(), SourceError> {
        if !(self.hashrate.is_finite() && self.hashrate > 0.0) {
            return Err(SourceError::telemetry(format!(
                "malformed reading: hashrate {}",
                self.hashrate
            )));
        }
        if !(self.power_usage.is_finite() && self.power_usage > 0.0) {
            return Err(SourceError::telemetry(format!(
                "malformed reading: power_usage {}",
                self.power_usage
            )));
        }
        if !self.temperature.is_finite() {
            return Err(SourceError::telemetry(format!(
                "malformed reading: temperature {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

/// Source of raw rig readings
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TelemetryReader: Send + Sync {
    /// Take one reading
    async fn read(&self) -> Result<RigReading, SourceError>;
}

/// Random readings in the ranges a mid-size GPU rig reports
pub struct SimulatedRig {
    rng: Mutex<StdRng>,
}

impl SimulatedRig {
    /// Create a rig seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a reproducible rig
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for SimulatedRig {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TelemetryReader for SimulatedRig {
    async fn read(&self) -> Result<RigReading, SourceError> {
        let mut rng = self.rng.lock();
        Ok(RigReading {
            hashrate: rng.gen_range(80.0..120.0),
            power_usage: rng.gen_range(700.0..900.0),
            temperature: rng.gen_range(60.0..85.0),
            accepted_shares: rng.gen_range(10..=30),
            rejected_shares: rng.gen_range(0..=3),
            local_block_count: rng.gen_range(0..=2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_ranges() {
        let rig = SimulatedRig::seeded(7);
        for _ in 0..200 {
            let r = rig.read().await.unwrap();
            assert!((80.0..120.0).contains(&r.hashrate));
            assert!((700.0..900.0).contains(&r.power_usage));
            assert!((60.0..85.0).contains(&r.temperature));
            assert!((10..=30).contains(&r.accepted_shares));
            assert!(r.rejected_shares <= 3);
            assert!(r.local_block_count <= 2);
            assert!(r.validate().is_ok());
        }
    }

    #[tokio::test]
    async fn test_seeded_rigs_agree() {
        let a = SimulatedRig::seeded(42);
        let b = SimulatedRig::seeded(42);
        assert_eq!(a.read().await.unwrap(), b.read().await.unwrap());
    }

    #[test]
    fn test_validate_rejects_zero_power() {
        let reading = RigReading {
            hashrate: 100.0,
            power_usage: 0.0,
            temperature: 70.0,
            accepted_shares: 10,
            rejected_shares: 0,
            local_block_count: 0,
        };
        let err = reading.validate().unwrap_err();
        assert!(err.to_string().contains("power_usage"));
    }
}
