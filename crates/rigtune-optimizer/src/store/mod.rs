//! In-memory stores
//!
//! - HistoryStore: bounded sample history
//! - AuditLog: retained decision records with optional export sinks

pub mod audit;
pub mod history;

pub use audit::{AuditLog, AuditSink, DecisionRecord, JsonLinesAuditSink, TracingAuditSink};
pub use history::HistoryStore;
