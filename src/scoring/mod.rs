//! Scoring service module
//!
//! Pre-trained classifier and decision threshold, loaded once and shared
//! read-only for the life of the process.

pub mod artifact;
pub mod model;

use crate::errors::Result;

// Re-export commonly used types
pub use artifact::ScoringArtifacts;
pub use model::{LogisticModel, ModelArtifact, TreeEnsemble};

/// Binary classifier exposing a class-1 probability
///
/// `row` is positional and must follow the order of [`Scorer::feature_names`].
/// Implementations must be deterministic and side-effect free.
pub trait Scorer: Send + Sync {
    /// Class-1 probability for a single row
    fn predict_proba(&self, row: &[f64]) -> Result<f64>;

    /// Feature names the model was fit on, in row order
    fn feature_names(&self) -> &[String];
}
