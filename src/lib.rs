//! icurisk - ICU mortality risk prediction with a local model advisor
//!
//! Scores a four-feature patient record with a pre-trained classifier,
//! labels it against a decision threshold, and lets the user ask a local
//! Ollama model to explain the result.
//!
//! # Architecture
//!
//! - **scoring**: model and threshold artifacts, loaded once at startup
//! - **evaluator**: record → probability → label
//! - **advisory**: single-shot `/api/generate` client
//! - **session**: Idle → Evaluated → Advised state machine
//! - **repl** / **cli**: interactive form and one-shot commands

pub mod errors;
pub mod types;
pub mod scoring;
pub mod evaluator;
pub mod advisory;
pub mod session;

// Interface layer
pub mod cli;
pub mod repl;
pub mod doctor;

// Re-export commonly used types
pub use errors::{RiskError, Result};
pub use evaluator::RiskEvaluator;
pub use session::{Session, SessionState};
pub use types::{FeatureRecord, Gender, RiskAssessment, RiskLabel};
