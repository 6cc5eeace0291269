//! Advisory actions produced by the decision stage

use serde::{Deserialize, Serialize};

/// Discrete advisory outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Average hashrate well below target
    IncreaseHashrate,
    /// Average hashrate well above target
    ReducePower,
    /// Average temperature above threshold
    ReduceHeat,
    /// Hashrate per watt below threshold
    ImproveEfficiency,
    /// Too many rejected shares recently
    CheckConnection,
    /// Current earnings below threshold
    SwitchCoin,
    /// Nothing to do
    Noop,
}

impl Action {
    /// All actions, in rule order
    pub const ALL: [Action; 7] = [
        Action::IncreaseHashrate,
        Action::ReducePower,
        Action::ReduceHeat,
        Action::ImproveEfficiency,
        Action::CheckConnection,
        Action::SwitchCoin,
        Action::Noop,
    ];

    /// Stable label for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::IncreaseHashrate => "increase_hashrate",
            Action::ReducePower => "reduce_power",
            Action::ReduceHeat => "reduce_heat",
            Action::ImproveEfficiency => "improve_efficiency",
            Action::CheckConnection => "check_connection",
            Action::SwitchCoin => "switch_coin",
            Action::Noop => "noop",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let advisory = match self {
            Action::IncreaseHashrate => "Increase hashrate by optimizing GPU settings",
            Action::ReducePower => "Hashrate above target - consider reducing power",
            Action::ReduceHeat => "Temperature too high - increase cooling or reduce load",
            Action::ImproveEfficiency => "Low efficiency - adjust power limits or clock speeds",
            Action::CheckConnection => "High rejection rate - check connection stability",
            Action::SwitchCoin => "Profitability low - consider switching coins/algorithms",
            Action::Noop => "No optimization needed - maintain current settings",
        };
        f.write_str(advisory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_labels_match_as_str() {
        for action in Action::ALL {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }
}
