//! Interaction session
//!
//! Owns the evaluator, the advisor and the held [`SessionState`]. Each user
//! action runs one evaluation or one advisory request. Failures are returned
//! to the caller and never disturb an assessment that is already held.

pub mod state;

use crate::advisory::{prompt, Advisor};
use crate::errors::{RiskError, Result};
use crate::evaluator::RiskEvaluator;
use crate::types::{FeatureRecord, RiskAssessment};

// Re-export key types
pub use state::{SessionEvent, SessionState};

/// Single-user session driving the evaluate → advise flow
pub struct Session {
    evaluator: RiskEvaluator,
    advisor: Box<dyn Advisor>,
    state: SessionState,
}

impl Session {
    pub fn new(evaluator: RiskEvaluator, advisor: Box<dyn Advisor>) -> Self {
        Self {
            evaluator,
            advisor,
            state: SessionState::Idle,
        }
    }

    /// Evaluate a submitted form and hold the result
    ///
    /// On failure the previous state is kept as is.
    pub fn submit(&mut self, record: FeatureRecord) -> Result<RiskAssessment> {
        let assessment = self.evaluator.evaluate(&record)?;
        self.state = self
            .state
            .transition(SessionEvent::Evaluated { record, assessment })?;
        Ok(assessment)
    }

    /// Prompt offered to the user for editing before [`Session::ask`]
    pub fn prefilled_prompt(&self, question: &str) -> Result<String> {
        match (self.state.record(), self.state.assessment()) {
            (Some(record), Some(assessment)) => {
                Ok(prompt::build_prompt(record, assessment, question))
            }
            _ => Err(self.no_assessment()),
        }
    }

    /// Send the (possibly edited) prompt to the advisor
    ///
    /// Requires a held assessment. A failed call leaves the state untouched.
    pub async fn ask(&mut self, prompt: &str) -> Result<String> {
        if self.state.assessment().is_none() {
            return Err(self.no_assessment());
        }

        let reply = match self.advisor.ask(prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "advisory request failed, keeping assessment");
                return Err(e);
            }
        };

        self.state = self.state.transition(SessionEvent::Advised {
            prompt: prompt.to_string(),
            reply: reply.clone(),
        })?;
        Ok(reply)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn evaluator(&self) -> &RiskEvaluator {
        &self.evaluator
    }

    fn no_assessment(&self) -> RiskError {
        RiskError::InvalidTransition {
            from: self.state.display_name().to_string(),
            event: "Advised".to_string(),
        }
    }
}
