//! Error types for icurisk
//!
//! One error enum for the whole library. Startup failures (`ArtifactLoad`,
//! `Config`) are fatal; everything else is a per-request error that the
//! front end renders without tearing down the session.

use thiserror::Error;

/// Main error type for risk evaluation and advisory requests
#[derive(Error, Debug)]
pub enum RiskError {
    /// Model or threshold artifact missing, unreadable or malformed
    #[error("Failed to load artifact {path}: {reason}")]
    ArtifactLoad { path: String, reason: String },

    /// Scoring service could not produce a probability
    #[error("Scoring failed: {0}")]
    Scoring(String),

    /// Local generation endpoint failed or answered with something unusable
    #[error("Advisory request failed: {0}")]
    Advisory(String),

    /// Form value missing, non-numeric or outside its domain
    #[error("Invalid value for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// Session state machine misuse
    #[error("Invalid session transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RiskError {
    pub(crate) fn artifact(path: impl Into<String>, reason: impl Into<String>) -> Self {
        RiskError::ArtifactLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RiskError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error must abort startup rather than be shown to the user
    pub fn is_fatal(&self) -> bool {
        matches!(self, RiskError::ArtifactLoad { .. } | RiskError::Config(_))
    }
}

/// Result type alias for icurisk operations
pub type Result<T> = std::result::Result<T, RiskError>;
