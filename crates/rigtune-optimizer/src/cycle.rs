//! One optimization cycle
//!
//! ```text
//! sample -> history.append -> analyze -> decide (+audit) -> apply -> history.trim
//! ```
//!
//! A failure in any stage aborts the cycle: control state is untouched and
//! the next cycle starts from the same state.

use rigtune_common::{Action, AnalysisError, Result, RigtuneError, Sample};
use rigtune_telemetry::SampleSource;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::{DegenerateRejectionPolicy, RigtuneConfig};
use crate::engine::{Actuator, Analysis, Analyzer, ControlState, DecisionEngine};
use crate::metrics::CycleMetrics;
use crate::store::{AuditLog, AuditSink, HistoryStore};

/// Outcome of a completed cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// 1-based cycle number
    pub cycle: u64,
    /// Sample gathered this cycle
    pub sample: Sample,
    /// Analysis the decision used
    pub analysis: Analysis,
    /// Actions, in the order applied
    pub actions: Vec<Action>,
    /// Control state before applying
    pub state_before: ControlState,
    /// Control state after applying
    pub state_after: ControlState,
    /// Samples discarded by the trim
    pub trimmed: usize,
}

/// The decision loop and the state it owns
pub struct Optimizer {
    source: Box<dyn SampleSource>,
    history: HistoryStore,
    analyzer: Analyzer,
    engine: DecisionEngine,
    actuator: Actuator,
    state: ControlState,
    audit: AuditLog,
    metrics: CycleMetrics,
    degenerate_rejection: DegenerateRejectionPolicy,
    cycles: u64,
}

impl Optimizer {
    pub fn new(config: &RigtuneConfig, source: Box<dyn SampleSource>) -> Result<Self> {
        config.validate()?;

        let metrics = CycleMetrics::registered()?;
        let state = ControlState::default();
        metrics.record_state(&state);

        Ok(Self {
            source,
            history: HistoryStore::from_settings(&config.history),
            analyzer: Analyzer::new(config.history.rejection_window),
            engine: DecisionEngine::new(config.thresholds.clone()),
            actuator: Actuator::new(),
            state,
            audit: AuditLog::from_settings(&config.audit),
            metrics,
            degenerate_rejection: config.degenerate_rejection,
            cycles: 0,
        })
    }

    /// Start from a state other than the default
    #[cfg(test)]
    pub(crate) fn with_state(mut self, state: ControlState) -> Self {
        self.state = state;
        self.metrics.record_state(&state);
        self
    }

    /// Add an audit sink
    pub fn add_audit_sink(&mut self, sink: Box<dyn AuditSink>) {
        self.audit.add_sink(sink);
    }

    /// Run one full cycle.
    ///
    /// On error the failing stage is logged and counted; the caller should
    /// carry on with the next cycle.
    #[instrument(skip(self), fields(cycle = self.cycles + 1))]
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        self.cycles += 1;
        info!("Starting optimization cycle at {}", chrono::Utc::now());

        let result = self.execute().await;

        // After analysis, so the analysis saw the untrimmed history
        let trimmed = self.history.trim();
        self.metrics.history_len.set(self.history.len() as i64);
        self.metrics.audit_records.set(self.audit.len() as i64);
        self.metrics.audit_evicted.set(self.audit.evicted() as i64);

        match result {
            Ok(mut report) => {
                report.trimmed = trimmed;
                self.metrics.cycles_total.inc();
                Ok(report)
            }
            Err(e) => {
                warn!(stage = e.stage(), "Cycle skipped: {}", e);
                self.metrics.record_skip(e.stage());
                Err(e)
            }
        }
    }

    async fn execute(&mut self) -> Result<CycleReport> {
        let sample = self.source.sample().await?;
        self.history.append(sample.clone());

        let analysis = self.analyze()?;

        let power_budget = self.engine.thresholds().power;
        if analysis.power_mean > power_budget {
            warn!(
                power_mean = analysis.power_mean,
                budget = power_budget,
                "Average power draw above budget"
            );
        }

        let actions = self
            .engine
            .decide(&analysis, self.history.latest(), &mut self.audit);
        self.metrics.record_actions(&actions);

        let state_before = self.state;
        self.state = self.actuator.apply(&actions, state_before);
        self.metrics.record_state(&self.state);

        Ok(CycleReport {
            cycle: self.cycles,
            sample,
            analysis,
            actions,
            state_before,
            state_after: self.state,
            trimmed: 0,
        })
    }

    fn analyze(&self) -> Result<Analysis> {
        let history = self.history.samples();
        match self.analyzer.analyze(history) {
            Ok(analysis) => Ok(analysis),
            Err(AnalysisError::DivisionUndefined { window })
                if self.degenerate_rejection == DegenerateRejectionPolicy::TreatAsZero =>
            {
                warn!(window, "No shares in rejection window; treating rejection rate as 0");
                Ok(self.analyzer.analyze_or(history, 0.0)?)
            }
            Err(e) => Err(RigtuneError::Analysis(e)),
        }
    }

    /// Current control state (read-only)
    pub fn control_state(&self) -> &ControlState {
        &self.state
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    pub fn metrics(&self) -> &CycleMetrics {
        &self.metrics
    }

    /// Cycles started so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}
