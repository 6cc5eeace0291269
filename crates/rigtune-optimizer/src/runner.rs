//! Repeated cycle execution
//!
//! Cycles run back to back with a fixed delay between them. Shutdown is only
//! observed during that delay, never in the middle of a cycle.

use std::future::Future;
use std::time::Duration;

use tracing::info;

use crate::config::RunnerSettings;
use crate::cycle::Optimizer;

/// Totals for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles that completed
    pub completed: u64,
    /// Cycles aborted by an error
    pub skipped: u64,
    /// Whether the run ended on a shutdown signal
    pub interrupted: bool,
}

/// Drives an [`Optimizer`] on a schedule
pub struct Runner {
    optimizer: Optimizer,
    interval: Duration,
    max_cycles: Option<u64>,
}

impl Runner {
    pub fn new(optimizer: Optimizer, interval: Duration, max_cycles: Option<u64>) -> Self {
        Self {
            optimizer,
            interval,
            max_cycles,
        }
    }

    /// Non-continuous settings run exactly one cycle
    pub fn from_settings(optimizer: Optimizer, settings: &RunnerSettings) -> Self {
        let max_cycles = if settings.continuous {
            settings.max_cycles
        } else {
            Some(1)
        };
        Self::new(optimizer, Duration::from_secs(settings.interval_secs), max_cycles)
    }

    /// Run cycles until `max_cycles` is reached or `shutdown` resolves
    pub async fn run_until<F>(&mut self, shutdown: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut summary = RunSummary::default();

        info!("Starting continuous optimization process...");
        loop {
            match self.optimizer.run_cycle().await {
                Ok(_) => summary.completed += 1,
                Err(_) => summary.skipped += 1,
            }

            if let Some(max) = self.max_cycles {
                if summary.completed + summary.skipped >= max {
                    break;
                }
            }

            info!(
                "Waiting {} seconds until next cycle...",
                self.interval.as_secs()
            );
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Optimization process stopped by user");
                    summary.interrupted = true;
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!(
            completed = summary.completed,
            skipped = summary.skipped,
            "Optimization run finished"
        );
        summary
    }

    pub fn optimizer(&self) -> &Optimizer {
        &self.optimizer
    }

    pub fn into_optimizer(self) -> Optimizer {
        self.optimizer
    }
}
