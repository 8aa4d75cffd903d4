//! Type definitions module
//!
//! Per-request values passed between the evaluator, the advisory client
//! and the front end.

pub mod assessment;
pub mod features;

// Re-export commonly used types
pub use assessment::{RiskAssessment, RiskLabel};
pub use features::{FeatureRecord, Gender, FEATURE_COUNT, FEATURE_NAMES};
