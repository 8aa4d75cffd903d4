//! Pre-filled advisory prompt
//!
//! The prompt shown to the user for editing embeds the inputs and the
//! assessment so the model answers about this patient. It is kept on one
//! line so it can be edited in place.

use crate::types::{FeatureRecord, RiskAssessment};

/// Question used when the user does not type one
pub const DEFAULT_QUESTION: &str =
    "Please explain what this result means and which factors may be contributing.";

/// Context block describing the patient and the prediction
pub fn context_block(record: &FeatureRecord, assessment: &RiskAssessment) -> String {
    format!(
        "An ICU mortality risk model produced the following prediction. \
         Patient: gender {}, admission age {}, ICU length of stay {} days, white-cell count {}. \
         Predicted mortality probability: {:.3} (decision threshold {:.3}). \
         Risk label: {}.",
        record.gender,
        record.admission_age,
        record.los_icu,
        record.wbc,
        assessment.probability,
        assessment.threshold,
        assessment.label,
    )
}

/// Full prompt: context block followed by the question
pub fn build_prompt(record: &FeatureRecord, assessment: &RiskAssessment, question: &str) -> String {
    let question = question.trim();
    let question = if question.is_empty() {
        DEFAULT_QUESTION
    } else {
        question
    };
    format!("{} {}", context_block(record, assessment), question)
}
