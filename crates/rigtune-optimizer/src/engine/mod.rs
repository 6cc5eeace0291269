//! Decision loop stages
//!
//! - Analyzer: aggregate statistics over history
//! - DecisionEngine: threshold rules producing ordered actions
//! - Actuator: bounded control-state transitions

pub mod actuator;
pub mod analyzer;
pub mod decision;

pub use actuator::{Actuator, ControlState};
pub use analyzer::{Analysis, Analyzer};
pub use decision::DecisionEngine;
