//! Rigtune configuration
//!
//! Layered as: built-in defaults, then an optional TOML/YAML/JSON file
//! (`RIGTUNE_CONFIG`, default `rigtune.toml`), then `RIGTUNE_*` environment
//! variables with `__` between sections, e.g.
//! `RIGTUNE_RUNNER__INTERVAL_SECS=60`.

use rigtune_common::{Result, RigtuneError, HISTORY_CAPACITY, HISTORY_RETAIN, REJECTION_WINDOW};
use rigtune_telemetry::SourceSettings;
use serde::{Deserialize, Serialize};

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "rigtune.toml";

/// Longest accepted audit retention age (100 years)
pub const MAX_AUDIT_AGE_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Full optimizer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RigtuneConfig {
    /// Decision thresholds
    pub thresholds: ThresholdSettings,
    /// History retention
    pub history: HistorySettings,
    /// Audit log retention and export
    pub audit: AuditSettings,
    /// Telemetry and price sources
    pub source: SourceSettings,
    /// Cycle scheduling
    pub runner: RunnerSettings,
    /// What to do when the rejection-rate window holds no shares
    pub degenerate_rejection: DegenerateRejectionPolicy,
}

impl RigtuneConfig {
    /// Load configuration from `.env`, the config file and the environment
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let path =
            std::env::var("RIGTUNE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let cfg: Self = config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(
                config::Environment::with_prefix("RIGTUNE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| RigtuneError::Config(e.to_string()))?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the optimizer cannot run with
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        let positive = [
            ("thresholds.hashrate", t.hashrate),
            ("thresholds.temperature", t.temperature),
            ("thresholds.power", t.power),
            ("thresholds.profitability", t.profitability),
            ("thresholds.efficiency", t.efficiency),
            ("thresholds.rejection_rate", t.rejection_rate),
            ("thresholds.hashrate_low_factor", t.hashrate_low_factor),
            ("thresholds.hashrate_high_factor", t.hashrate_high_factor),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(RigtuneError::Config(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if t.hashrate_low_factor >= t.hashrate_high_factor {
            return Err(RigtuneError::Config(
                "thresholds.hashrate_low_factor must be below hashrate_high_factor".into(),
            ));
        }

        let h = &self.history;
        if h.capacity == 0 || h.retain == 0 {
            return Err(RigtuneError::Config(
                "history.capacity and history.retain must be non-zero".into(),
            ));
        }
        if h.retain > h.capacity {
            return Err(RigtuneError::Config(format!(
                "history.retain ({}) exceeds history.capacity ({})",
                h.retain, h.capacity
            )));
        }
        if h.rejection_window == 0 {
            return Err(RigtuneError::Config(
                "history.rejection_window must be non-zero".into(),
            ));
        }

        let a = &self.audit;
        if a.max_records == 0 || a.buffer_size == 0 {
            return Err(RigtuneError::Config(
                "audit.max_records and audit.buffer_size must be non-zero".into(),
            ));
        }
        if let Some(secs) = a.max_age_secs {
            if secs > MAX_AUDIT_AGE_SECS {
                return Err(RigtuneError::Config(format!(
                    "audit.max_age_secs must be at most {}, got {}",
                    MAX_AUDIT_AGE_SECS, secs
                )));
            }
        }

        if self.runner.continuous && self.runner.interval_secs == 0 {
            return Err(RigtuneError::Config(
                "runner.interval_secs must be non-zero when running continuously".into(),
            ));
        }

        let s = &self.source;
        if s.telemetry_timeout_ms == 0 || s.price_timeout_ms == 0 {
            return Err(RigtuneError::Config(
                "source timeouts must be non-zero".into(),
            ));
        }
        if let Some(price) = s.fixed_price {
            if !(price.is_finite() && price > 0.0) {
                return Err(RigtuneError::Config(format!(
                    "source.fixed_price must be positive, got {}",
                    price
                )));
            }
        }

        Ok(())
    }
}

/// Threshold constants for the decision rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdSettings {
    /// Target hashrate (MH/s)
    pub hashrate: f64,
    /// Maximum average temperature (°C)
    pub temperature: f64,
    /// Power budget (W); exceeding it is logged, not acted on
    pub power: f64,
    /// Minimum earnings in quote currency per day
    pub profitability: f64,
    /// Minimum hashrate per watt (MH/s/W)
    pub efficiency: f64,
    /// Maximum share rejection rate
    pub rejection_rate: f64,
    /// Below `hashrate * low_factor` the hashrate is too low
    pub hashrate_low_factor: f64,
    /// Above `hashrate * high_factor` the hashrate is too high
    pub hashrate_high_factor: f64,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            hashrate: 100.0,
            temperature: 75.0,
            power: 800.0,
            profitability: 0.05,
            efficiency: 0.12,
            rejection_rate: 0.05,
            hashrate_low_factor: 0.9,
            hashrate_high_factor: 1.1,
        }
    }
}

/// Sample history retention
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Trim once the history grows past this many samples
    pub capacity: usize,
    /// Samples kept after a trim
    pub retain: usize,
    /// Most recent samples used for the rejection rate
    pub rejection_window: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            capacity: HISTORY_CAPACITY,
            retain: HISTORY_RETAIN,
            rejection_window: REJECTION_WINDOW,
        }
    }
}

/// Audit log retention and export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    /// Oldest records are evicted past this count
    pub max_records: usize,
    /// Records older than this are evicted (seconds)
    pub max_age_secs: Option<u64>,
    /// Append each record as a JSON line to this file
    pub export_path: Option<String>,
    /// Records buffered before each write to `export_path`
    pub buffer_size: usize,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            max_records: 1000,
            max_age_secs: None,
            export_path: None,
            buffer_size: 1,
        }
    }
}

/// Cycle scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSettings {
    /// Delay between cycles
    pub interval_secs: u64,
    /// Keep running until interrupted; otherwise run a single cycle
    pub continuous: bool,
    /// Stop after this many cycles
    pub max_cycles: Option<u64>,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            interval_secs: 15 * 60,
            continuous: false,
            max_cycles: None,
        }
    }
}

/// Handling of a rejection-rate window with zero shares
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateRejectionPolicy {
    /// Use 0.0, so the connection rule cannot fire
    #[default]
    TreatAsZero,
    /// Abort the cycle
    SkipCycle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = RigtuneConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.history.capacity, 100);
        assert_eq!(cfg.history.retain, 50);
        assert_eq!(cfg.runner.interval_secs, 900);
        assert_eq!(cfg.degenerate_rejection, DegenerateRejectionPolicy::TreatAsZero);
    }

    #[test]
    fn test_retain_above_capacity_rejected() {
        let mut cfg = RigtuneConfig::default();
        cfg.history.retain = 200;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("history.retain"));
    }

    #[test]
    fn test_non_positive_threshold_rejected() {
        let mut cfg = RigtuneConfig::default();
        cfg.thresholds.temperature = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = RigtuneConfig::default();
        cfg.thresholds.efficiency = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut cfg = RigtuneConfig::default();
        cfg.source.price_timeout_ms = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_audit_max_age_bounded() {
        let mut cfg = RigtuneConfig::default();
        cfg.audit.max_age_secs = Some(MAX_AUDIT_AGE_SECS);
        assert!(cfg.validate().is_ok());

        for secs in [MAX_AUDIT_AGE_SECS + 1, 10_000_000_000_000, u64::MAX] {
            cfg.audit.max_age_secs = Some(secs);
            let err = cfg.validate().unwrap_err();
            assert!(err.to_string().contains("audit.max_age_secs"));
        }
    }

    #[test]
    fn test_zero_audit_buffer_rejected() {
        let mut cfg = RigtuneConfig::default();
        cfg.audit.buffer_size = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_interval_rejected_when_continuous() {
        let mut cfg = RigtuneConfig::default();
        cfg.runner.interval_secs = 0;
        // A single cycle never waits
        assert!(cfg.validate().is_ok());

        cfg.runner.continuous = true;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("runner.interval_secs"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: RigtuneConfig = serde_json::from_str(
            r#"{ "runner": { "continuous": true }, "degenerate_rejection": "skip_cycle" }"#,
        )
        .unwrap();
        assert!(cfg.runner.continuous);
        assert_eq!(cfg.runner.interval_secs, 900);
        assert_eq!(cfg.thresholds.hashrate, 100.0);
        assert_eq!(cfg.degenerate_rejection, DegenerateRejectionPolicy::SkipCycle);
    }
}
