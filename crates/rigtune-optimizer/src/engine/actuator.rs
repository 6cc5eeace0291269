//! Bounded control-state transitions
//!
//! | Action             | Guard                 | Effect                         |
//! |--------------------|-----------------------|--------------------------------|
//! | IncreaseHashrate   | overclock < 15        | overclock += 5 (max 15)        |
//! | ReducePower        | power_limit > 80      | power_limit -= 5 (min 80)      |
//! | ReduceHeat         | mode != eco           | one step cooler                |
//! | ImproveEfficiency  | overclock > 5         | overclock -= 2, power -= 3 (min 80) |
//! | CheckConnection, SwitchCoin, Noop | -      | none                           |
//!
//! Every guard saturates; applying an action never fails.

use rigtune_common::{
    Action, MiningMode, MAX_OVERCLOCK_PCT, MAX_POWER_LIMIT_PCT, MIN_OVERCLOCK_PCT,
    MIN_POWER_LIMIT_PCT,
};
use serde::{Deserialize, Serialize};
use tracing::info;

const OVERCLOCK_STEP: u8 = 5;
const POWER_STEP: u8 = 5;
const EFFICIENCY_OVERCLOCK_STEP: u8 = 2;
const EFFICIENCY_POWER_STEP: u8 = 3;
/// ImproveEfficiency only backs off overclocks above this
const EFFICIENCY_OVERCLOCK_GUARD: u8 = 5;

/// Rig control parameters
///
/// Fields are read-only outside this module; only [`Actuator`] changes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    overclock_pct: u8,
    power_limit_pct: u8,
    mode: MiningMode,
}

impl ControlState {
    /// Create a state, clamping values into their valid ranges
    pub fn new(overclock_pct: u8, power_limit_pct: u8, mode: MiningMode) -> Self {
        Self {
            overclock_pct: overclock_pct.clamp(MIN_OVERCLOCK_PCT, MAX_OVERCLOCK_PCT),
            power_limit_pct: power_limit_pct.clamp(MIN_POWER_LIMIT_PCT, MAX_POWER_LIMIT_PCT),
            mode,
        }
    }

    pub fn overclock_pct(&self) -> u8 {
        self.overclock_pct
    }

    pub fn power_limit_pct(&self) -> u8 {
        self.power_limit_pct
    }

    pub fn mode(&self) -> MiningMode {
        self.mode
    }
}

impl Default for ControlState {
    /// No overclock, full power, balanced
    fn default() -> Self {
        Self {
            overclock_pct: MIN_OVERCLOCK_PCT,
            power_limit_pct: MAX_POWER_LIMIT_PCT,
            mode: MiningMode::Balanced,
        }
    }
}

impl std::fmt::Display for ControlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} mode, OC: {}%, Power Limit: {}%",
            self.mode, self.overclock_pct, self.power_limit_pct
        )
    }
}

/// Applies actions to a [`ControlState`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Actuator;

impl Actuator {
    pub fn new() -> Self {
        Self
    }

    /// Apply `actions` in order; later actions see earlier effects
    pub fn apply(&self, actions: &[Action], state: ControlState) -> ControlState {
        let state = actions
            .iter()
            .fold(state, |state, action| self.apply_one(*action, state));
        info!("Current configuration: {}", state);
        state
    }

    /// Apply a single action
    pub fn apply_one(&self, action: Action, mut state: ControlState) -> ControlState {
        match action {
            Action::IncreaseHashrate => {
                if state.overclock_pct < MAX_OVERCLOCK_PCT {
                    state.overclock_pct =
                        (state.overclock_pct + OVERCLOCK_STEP).min(MAX_OVERCLOCK_PCT);
                    info!("Increasing overclock to {}%", state.overclock_pct);
                }
            }
            Action::ReducePower => {
                if state.power_limit_pct > MIN_POWER_LIMIT_PCT {
                    state.power_limit_pct = state
                        .power_limit_pct
                        .saturating_sub(POWER_STEP)
                        .max(MIN_POWER_LIMIT_PCT);
                    info!("Reducing power limit to {}%", state.power_limit_pct);
                }
            }
            Action::ReduceHeat => {
                if state.mode != MiningMode::Eco {
                    state.mode = state.mode.cooler();
                    info!("Switching to {} mode to reduce heat", state.mode);
                }
            }
            Action::ImproveEfficiency => {
                if state.overclock_pct > EFFICIENCY_OVERCLOCK_GUARD {
                    state.overclock_pct -= EFFICIENCY_OVERCLOCK_STEP;
                    // Floor-clamped, unlike a bare subtraction
                    state.power_limit_pct = state
                        .power_limit_pct
                        .saturating_sub(EFFICIENCY_POWER_STEP)
                        .max(MIN_POWER_LIMIT_PCT);
                    info!(
                        "Adjusting for efficiency: OC {}%, Power {}%",
                        state.overclock_pct, state.power_limit_pct
                    );
                }
            }
            Action::CheckConnection => {
                info!("Resetting mining connection and checking pool stability");
            }
            Action::SwitchCoin => {
                info!("Evaluating alternative coins for better profitability");
            }
            Action::Noop => {}
        }
        state
    }
}
