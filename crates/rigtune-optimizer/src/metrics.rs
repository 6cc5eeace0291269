//! Prometheus metrics for the optimization cycle

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use rigtune_common::{Action, Result, RigtuneError};

use crate::engine::ControlState;

/// Cycle counters and control-state gauges
pub struct CycleMetrics {
    registry: Registry,
    pub cycles_total: IntCounter,
    pub cycles_skipped: IntCounterVec,
    pub actions_total: IntCounterVec,
    pub overclock_pct: IntGauge,
    pub power_limit_pct: IntGauge,
    pub history_len: IntGauge,
    pub audit_records: IntGauge,
    pub audit_evicted: IntGauge,
}

impl CycleMetrics {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            cycles_total: IntCounter::new("rigtune_cycles_total", "Cycles that ran to completion")
                .unwrap(),
            cycles_skipped: IntCounterVec::new(
                Opts::new("rigtune_cycles_skipped_total", "Cycles aborted, by failing stage"),
                &["stage"],
            )
            .unwrap(),
            actions_total: IntCounterVec::new(
                Opts::new("rigtune_actions_total", "Actions decided, by kind"),
                &["action"],
            )
            .unwrap(),
            overclock_pct: IntGauge::new("rigtune_overclock_pct", "Current overclock percentage")
                .unwrap(),
            power_limit_pct: IntGauge::new(
                "rigtune_power_limit_pct",
                "Current power limit percentage",
            )
            .unwrap(),
            history_len: IntGauge::new("rigtune_history_len", "Samples held in history")
                .unwrap(),
            audit_records: IntGauge::new("rigtune_audit_records", "Decision records retained")
                .unwrap(),
            audit_evicted: IntGauge::new(
                "rigtune_audit_evicted_records",
                "Decision records dropped by retention",
            )
            .unwrap(),
        }
    }

    /// Create and register with the internal registry
    pub fn registered() -> Result<Self> {
        let metrics = Self::new();
        metrics.register(&metrics.registry)?;
        Ok(metrics)
    }

    pub fn register(&self, registry: &Registry) -> Result<()> {
        let collectors: [Box<dyn prometheus::core::Collector>; 8] = [
            Box::new(self.cycles_total.clone()),
            Box::new(self.cycles_skipped.clone()),
            Box::new(self.actions_total.clone()),
            Box::new(self.overclock_pct.clone()),
            Box::new(self.power_limit_pct.clone()),
            Box::new(self.history_len.clone()),
            Box::new(self.audit_records.clone()),
            Box::new(self.audit_evicted.clone()),
        ];
        for collector in collectors {
            registry
                .register(collector)
                .map_err(|e| RigtuneError::Internal(format!("metric registration: {}", e)))?;
        }
        Ok(())
    }

    pub fn record_skip(&self, stage: &str) {
        self.cycles_skipped.with_label_values(&[stage]).inc();
    }

    pub fn record_actions(&self, actions: &[Action]) {
        for action in actions {
            self.actions_total.with_label_values(&[action.as_str()]).inc();
        }
    }

    pub fn record_state(&self, state: &ControlState) {
        self.overclock_pct.set(state.overclock_pct() as i64);
        self.power_limit_pct.set(state.power_limit_pct() as i64);
    }

    /// Render the registry in the text exposition format
    pub fn encode(&self) -> Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buf)
            .map_err(|e| RigtuneError::Internal(format!("metric encoding: {}", e)))?;
        String::from_utf8(buf).map_err(|e| RigtuneError::Internal(e.to_string()))
    }
}

impl Default for CycleMetrics {
    fn default() -> Self {
        Self::new()
    }
}
