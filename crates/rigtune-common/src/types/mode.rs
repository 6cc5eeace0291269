//! Mining operating mode

use serde::{Deserialize, Serialize};

/// Rig operating mode, ordered from coolest to hottest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MiningMode {
    Eco,
    #[default]
    Balanced,
    Performance,
}

impl MiningMode {
    /// One step toward `Eco`; `Eco` stays put
    pub fn cooler(self) -> Self {
        match self {
            MiningMode::Performance => MiningMode::Balanced,
            MiningMode::Balanced | MiningMode::Eco => MiningMode::Eco,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MiningMode::Eco => "eco",
            MiningMode::Balanced => "balanced",
            MiningMode::Performance => "performance",
        }
    }
}

impl std::fmt::Display for MiningMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
