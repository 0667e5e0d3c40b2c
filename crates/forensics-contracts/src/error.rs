//! Error types for the forensics pipeline.
//!
//! All fallible operations return `ForensicsResult<T>`. Variants carry the
//! service, key, or prefix involved so a logged failure is actionable on its
//! own. Unparsable duration tokens are not errors and have no variant here.

use thiserror::Error;

/// The unified error type for every pipeline stage.
#[derive(Debug, Error)]
pub enum ForensicsError {
    /// A call to the log store, metadata service, identity service, or blob
    /// store failed.
    #[error("{service} unavailable: {reason}")]
    UpstreamUnavailable { service: String, reason: String },

    /// No artifacts exist under a namespace prefix a stage requires.
    #[error("no artifacts found under prefix '{prefix}'")]
    NotFound { prefix: String },

    /// A caller-supplied argument violates its constraint.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A stored artifact could not be decoded or is inconsistent with its
    /// siblings.
    #[error("corrupt artifact '{key}': {reason}")]
    CorruptArtifact { key: String, reason: String },

    /// A bundle's stored digest does not match the recomputed digest.
    #[error("integrity mismatch: stored {expected}, recomputed {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    /// The anomaly verdict could not be stored or loaded between stages.
    #[error("verdict hand-off failed: {reason}")]
    HandoffFailed { reason: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

impl ForensicsError {
    /// Shorthand for an `UpstreamUnavailable` error.
    pub fn upstream(service: impl Into<String>, reason: impl ToString) -> Self {
        Self::UpstreamUnavailable {
            service: service.into(),
            reason: reason.to_string(),
        }
    }

    /// Shorthand for a `CorruptArtifact` error.
    pub fn corrupt(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::CorruptArtifact {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience alias used throughout the forensics crates.
pub type ForensicsResult<T> = Result<T, ForensicsError>;
