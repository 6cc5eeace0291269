//! Threshold rules: Analysis -> ordered actions
//!
//! Rules are independent and all of them run, always in this order:
//!
//! 1. hashrate low / high (at most one fires)
//! 2. temperature
//! 3. efficiency
//! 4. rejection rate
//! 5. profitability of the latest sample
//!
//! When none fires the result is `[Noop]`.

use rigtune_common::{Action, Sample};
use tracing::{info, instrument};

use super::analyzer::Analysis;
use crate::config::ThresholdSettings;
use crate::store::{AuditLog, DecisionRecord};

/// Maps analyses to advisory actions
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    thresholds: ThresholdSettings,
}

impl DecisionEngine {
    pub fn new(thresholds: ThresholdSettings) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ThresholdSettings {
        &self.thresholds
    }

    /// Decide, and record the decision in `audit`
    #[instrument(skip_all)]
    pub fn decide(
        &self,
        analysis: &Analysis,
        latest: Option<&Sample>,
        audit: &mut AuditLog,
    ) -> Vec<Action> {
        let actions = self.evaluate(analysis, latest);

        for (i, action) in actions.iter().enumerate() {
            info!("{}. {}", i + 1, action);
        }

        audit.append(DecisionRecord::new(analysis.clone(), actions.clone()));
        actions
    }

    /// Run the rules without recording anything
    pub fn evaluate(&self, analysis: &Analysis, latest: Option<&Sample>) -> Vec<Action> {
        let t = &self.thresholds;
        let mut actions = Vec::new();

        if analysis.hashrate_mean < t.hashrate * t.hashrate_low_factor {
            actions.push(Action::IncreaseHashrate);
        } else if analysis.hashrate_mean > t.hashrate * t.hashrate_high_factor {
            actions.push(Action::ReducePower);
        }

        if analysis.temp_mean > t.temperature {
            actions.push(Action::ReduceHeat);
        }

        if analysis.efficiency < t.efficiency {
            actions.push(Action::ImproveEfficiency);
        }

        if analysis.rejection_rate > t.rejection_rate {
            actions.push(Action::CheckConnection);
        }

        // Skipped, not failed, without a sample
        if let Some(sample) = latest {
            if sample.profitability_value() < t.profitability {
                actions.push(Action::SwitchCoin);
            }
        }

        if actions.is_empty() {
            actions.push(Action::Noop);
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> Analysis {
        Analysis {
            hashrate_mean: 100.0,
            hashrate_stddev: 0.0,
            power_mean: 700.0,
            temp_mean: 70.0,
            profitability_mean: 0.00001,
            efficiency: 0.14,
            rejection_rate: 0.01,
            sample_count: 1,
        }
    }

    /// Sample whose profitability × price equals `value`
    fn sample_worth(value: f64) -> Sample {
        let sample = Sample::new(100.0, 700.0, 70.0, 20, 0, 1.0);
        let price = value / sample.profitability;
        Sample::new(100.0, 700.0, 70.0, 20, 0, price)
    }

    #[test]
    fn test_no_rule_fires_is_noop() {
        let engine = DecisionEngine::default();
        let actions = engine.evaluate(&healthy(), Some(&sample_worth(1.0)));
        assert_eq!(actions, vec![Action::Noop]);
    }

    #[test]
    fn test_hashrate_rules_are_exclusive() {
        let engine = DecisionEngine::default();

        let low = Analysis { hashrate_mean: 89.9, ..healthy() };
        assert_eq!(engine.evaluate(&low, None), vec![Action::IncreaseHashrate]);

        let high = Analysis { hashrate_mean: 110.1, ..healthy() };
        assert_eq!(engine.evaluate(&high, None), vec![Action::ReducePower]);

        let edge = Analysis { hashrate_mean: 90.0, ..healthy() };
        assert_eq!(engine.evaluate(&edge, None), vec![Action::Noop]);
    }

    #[test]
    fn test_all_rules_fire_in_order() {
        let engine = DecisionEngine::default();
        let analysis = Analysis {
            hashrate_mean: 70.0,
            temp_mean: 80.0,
            efficiency: 0.10,
            rejection_rate: 0.08,
            ..healthy()
        };
        let actions = engine.evaluate(&analysis, Some(&sample_worth(0.03)));
        assert_eq!(
            actions,
            vec![
                Action::IncreaseHashrate,
                Action::ReduceHeat,
                Action::ImproveEfficiency,
                Action::CheckConnection,
                Action::SwitchCoin,
            ]
        );
    }

    #[test]
    fn test_profitability_rule_skipped_without_sample() {
        let engine = DecisionEngine::default();
        assert_eq!(engine.evaluate(&healthy(), None), vec![Action::Noop]);
        assert_eq!(
            engine.evaluate(&healthy(), Some(&sample_worth(0.01))),
            vec![Action::SwitchCoin]
        );
    }

    #[test]
    fn test_decide_appends_audit_record() {
        let engine = DecisionEngine::default();
        let mut audit = AuditLog::default();
        let analysis = Analysis { temp_mean: 90.0, ..healthy() };

        let actions = engine.decide(&analysis, None, &mut audit);

        assert_eq!(actions, vec![Action::ReduceHeat]);
        assert_eq!(audit.len(), 1);
        let record = audit.latest().unwrap();
        assert_eq!(record.actions, actions);
        assert_eq!(record.analysis, analysis);
    }

    #[test]
    fn test_custom_thresholds() {
        let engine = DecisionEngine::new(ThresholdSettings {
            temperature: 65.0,
            ..ThresholdSettings::default()
        });
        assert_eq!(engine.evaluate(&healthy(), None), vec![Action::ReduceHeat]);
    }
}
