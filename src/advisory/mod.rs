//! Advisory module
//!
//! Forwards a prediction and a free-text question to a locally hosted
//! language model and returns its reply. No conversation history is kept.

pub mod client;
pub mod prompt;

use crate::errors::Result;
use async_trait::async_trait;

// Re-export commonly used types
pub use client::{AdvisoryClient, DEFAULT_MODEL, DEFAULT_TIMEOUT};
pub use prompt::build_prompt;

/// Anything that can answer a single prompt
#[async_trait]
pub trait Advisor: Send + Sync {
    /// One request, one reply; failures are `RiskError::Advisory`
    async fn ask(&self, prompt: &str) -> Result<String>;
}
