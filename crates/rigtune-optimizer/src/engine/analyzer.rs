//! Performance analysis over the sample history
//!
//! ```text
//! efficiency     = mean(hashrate_i / power_i)
//! rejection_rate = Σ rejected / Σ (accepted + rejected)   over the last W samples
//! ```
//!
//! Efficiency averages per-sample ratios; it is not
//! `mean(hashrate) / mean(power)`.

use rigtune_common::{AnalysisError, Sample, REJECTION_WINDOW};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Aggregate statistics for one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Mean hashrate (MH/s)
    pub hashrate_mean: f64,
    /// Population standard deviation of hashrate (MH/s)
    pub hashrate_stddev: f64,
    /// Mean power draw (W)
    pub power_mean: f64,
    /// Mean temperature (°C)
    pub temp_mean: f64,
    /// Mean profitability (BTC/day)
    pub profitability_mean: f64,
    /// Mean of per-sample hashrate/power (MH/s/W)
    pub efficiency: f64,
    /// Rejected share fraction over the recent window
    pub rejection_rate: f64,
    /// Samples the means were taken over
    pub sample_count: usize,
}

/// Computes [`Analysis`] snapshots
#[derive(Debug, Clone)]
pub struct Analyzer {
    rejection_window: usize,
}

impl Analyzer {
    pub fn new(rejection_window: usize) -> Self {
        Self { rejection_window }
    }

    /// Analyze the full history.
    ///
    /// Fails with `InsufficientData` on an empty history and with
    /// `DivisionUndefined` when the recent window holds no shares.
    pub fn analyze(&self, history: &[Sample]) -> Result<Analysis, AnalysisError> {
        if history.is_empty() {
            return Err(AnalysisError::InsufficientData);
        }
        let rejection_rate = self.rejection_rate(history)?;
        Ok(self.summarize(history, rejection_rate))
    }

    /// Like [`analyze`](Self::analyze), substituting `fallback` for an
    /// undefined rejection rate
    pub fn analyze_or(&self, history: &[Sample], fallback: f64) -> Result<Analysis, AnalysisError> {
        if history.is_empty() {
            return Err(AnalysisError::InsufficientData);
        }
        let rejection_rate = match self.rejection_rate(history) {
            Ok(rate) => rate,
            Err(AnalysisError::DivisionUndefined { .. }) => fallback,
            Err(e) => return Err(e),
        };
        Ok(self.summarize(history, rejection_rate))
    }

    /// Rejected fraction of shares over the last `rejection_window` samples
    pub fn rejection_rate(&self, history: &[Sample]) -> Result<f64, AnalysisError> {
        let start = history.len().saturating_sub(self.rejection_window);
        let window = &history[start..];

        let rejected: u64 = window.iter().map(|s| s.rejected_shares as u64).sum();
        let total: u64 = window.iter().map(Sample::total_shares).sum();

        if total == 0 {
            return Err(AnalysisError::DivisionUndefined {
                window: window.len(),
            });
        }
        Ok(rejected as f64 / total as f64)
    }

    fn summarize(&self, history: &[Sample], rejection_rate: f64) -> Analysis {
        let n = history.len() as f64;
        let mean = |f: fn(&Sample) -> f64| history.iter().map(f).sum::<f64>() / n;

        let hashrate_mean = mean(|s| s.hashrate);
        let variance = history
            .iter()
            .map(|s| (s.hashrate - hashrate_mean).powi(2))
            .sum::<f64>()
            / n;

        let analysis = Analysis {
            hashrate_mean,
            hashrate_stddev: variance.sqrt(),
            power_mean: mean(|s| s.power_usage),
            temp_mean: mean(|s| s.temperature),
            profitability_mean: mean(|s| s.profitability),
            efficiency: mean(Sample::efficiency),
            rejection_rate,
            sample_count: history.len(),
        };

        info!(
            "Avg Hashrate: {:.2} ± {:.2} MH/s | Avg Power: {:.2} W | Avg Temp: {:.2}°C | \
             Efficiency: {:.4} MH/s/W | Rejection: {:.2}%",
            analysis.hashrate_mean,
            analysis.hashrate_stddev,
            analysis.power_mean,
            analysis.temp_mean,
            analysis.efficiency,
            analysis.rejection_rate * 100.0,
        );

        analysis
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(REJECTION_WINDOW)
    }
}
