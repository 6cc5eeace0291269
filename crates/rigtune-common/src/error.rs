//! Error types for Rigtune
//!
//! Every error aborts only the current optimization cycle. The variants are
//! grouped by the cycle stage that raised them so the caller can report
//! which stage failed.

use thiserror::Error;

/// Result type alias using RigtuneError
pub type Result<T> = std::result::Result<T, RigtuneError>;

/// Unified error type for Rigtune operations
#[derive(Debug, Error)]
pub enum RigtuneError {
    // Sampling errors
    #[error("Sample source unavailable: {0}")]
    Source(#[from] SourceError),

    // Analysis errors
    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Storage errors (audit export)
    #[error("Storage error: {0}")]
    Storage(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RigtuneError {
    /// Cycle stage that raised this error, used in log lines and metric labels
    pub fn stage(&self) -> &'static str {
        match self {
            RigtuneError::Source(_) => "sample",
            RigtuneError::Analysis(_) => "analyze",
            RigtuneError::Config(_) => "config",
            RigtuneError::Serialization(_) | RigtuneError::Storage(_) => "audit",
            RigtuneError::Internal(_) => "internal",
        }
    }
}

/// Which external collaborator failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceComponent {
    /// Rig telemetry reader
    Telemetry,
    /// Spot price feed
    Price,
}

impl std::fmt::Display for SourceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceComponent::Telemetry => write!(f, "telemetry"),
            SourceComponent::Price => write!(f, "price"),
        }
    }
}

/// Sample retrieval errors
///
/// Network faults, malformed responses and timeouts all collapse into
/// `Unavailable`: a partial sample is never returned.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{component} source unavailable: {reason}")]
    Unavailable {
        component: SourceComponent,
        reason: String,
    },
}

impl SourceError {
    /// Telemetry reader failed
    pub fn telemetry(reason: impl Into<String>) -> Self {
        SourceError::Unavailable {
            component: SourceComponent::Telemetry,
            reason: reason.into(),
        }
    }

    /// Price feed failed
    pub fn price(reason: impl Into<String>) -> Self {
        SourceError::Unavailable {
            component: SourceComponent::Price,
            reason: reason.into(),
        }
    }

    /// A call did not finish within its deadline
    pub fn timeout(component: SourceComponent, limit_ms: u64) -> Self {
        SourceError::Unavailable {
            component,
            reason: format!("timed out after {}ms", limit_ms),
        }
    }

    pub fn component(&self) -> SourceComponent {
        match self {
            SourceError::Unavailable { component, .. } => *component,
        }
    }
}

/// Analysis errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Insufficient data: history is empty")]
    InsufficientData,

    #[error("Rejection rate undefined: no shares in the last {window} samples")]
    DivisionUndefined { window: usize },
}

impl From<serde_json::Error> for RigtuneError {
    fn from(err: serde_json::Error) -> Self {
        RigtuneError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for RigtuneError {
    fn from(err: std::io::Error) -> Self {
        RigtuneError::Storage(err.to_string())
    }
}

impl From<anyhow::Error> for RigtuneError {
    fn from(err: anyhow::Error) -> Self {
        RigtuneError::Internal(err.to_string())
    }
}
