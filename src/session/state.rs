//! Interaction state machine
//!
//! Valid transitions:
//! 1. Idle      → Evaluated (on: Evaluated)
//! 2. Evaluated → Evaluated (on: Evaluated, replaces the held result)
//! 3. Evaluated → Advised   (on: Advised)
//! 4. Advised   → Evaluated (on: Evaluated)
//! 5. Advised   → Advised   (on: Advised, replaces the held reply)
//!
//! There is no way back to Idle short of a new session.

use crate::errors::{RiskError, Result};
use crate::types::{FeatureRecord, RiskAssessment};
use serde::Serialize;

/// What the front end currently holds
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// Nothing submitted yet
    Idle,

    /// A risk assessment is held and re-rendered on demand
    Evaluated {
        record: FeatureRecord,
        assessment: RiskAssessment,
    },

    /// An advisory reply is held alongside the assessment
    Advised {
        record: FeatureRecord,
        assessment: RiskAssessment,
        prompt: String,
        reply: String,
    },
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Form submitted and scored
    Evaluated {
        record: FeatureRecord,
        assessment: RiskAssessment,
    },

    /// Follow-up question answered
    Advised { prompt: String, reply: String },
}

impl SessionEvent {
    fn name(&self) -> &'static str {
        match self {
            SessionEvent::Evaluated { .. } => "Evaluated",
            SessionEvent::Advised { .. } => "Advised",
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle
    }
}

impl SessionState {
    /// Attempt state transition with validation
    pub fn transition(&self, event: SessionEvent) -> Result<SessionState> {
        match (self, event) {
            (_, SessionEvent::Evaluated { record, assessment }) => {
                Ok(SessionState::Evaluated { record, assessment })
            }

            (SessionState::Idle, event) => Err(RiskError::InvalidTransition {
                from: self.display_name().to_string(),
                event: event.name().to_string(),
            }),

            (
                SessionState::Evaluated { record, assessment }
                | SessionState::Advised {
                    record, assessment, ..
                },
                SessionEvent::Advised { prompt, reply },
            ) => Ok(SessionState::Advised {
                record: *record,
                assessment: *assessment,
                prompt,
                reply,
            }),
        }
    }

    /// Held assessment, if any
    pub fn assessment(&self) -> Option<&RiskAssessment> {
        match self {
            SessionState::Idle => None,
            SessionState::Evaluated { assessment, .. } | SessionState::Advised { assessment, .. } => {
                Some(assessment)
            }
        }
    }

    /// Record behind the held assessment, if any
    pub fn record(&self) -> Option<&FeatureRecord> {
        match self {
            SessionState::Idle => None,
            SessionState::Evaluated { record, .. } | SessionState::Advised { record, .. } => {
                Some(record)
            }
        }
    }

    /// Held advisory reply, if any
    pub fn reply(&self) -> Option<&str> {
        match self {
            SessionState::Advised { reply, .. } => Some(reply),
            _ => None,
        }
    }

    /// Human-readable state name
    pub fn display_name(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Evaluated { .. } => "Evaluated",
            SessionState::Advised { .. } => "Advised",
        }
    }
}
