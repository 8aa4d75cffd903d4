//! Risk evaluator
//!
//! Turns a [`FeatureRecord`] into a [`RiskAssessment`] by scoring it and
//! comparing the probability to the loaded threshold. A probability equal
//! to the threshold is labelled high risk.

use crate::errors::{RiskError, Result};
use crate::scoring::model::checked_probability;
use crate::scoring::ScoringArtifacts;
use crate::types::{FeatureRecord, RiskAssessment};
use std::sync::Arc;

/// Stateless evaluator over shared, immutable artifacts
#[derive(Debug, Clone)]
pub struct RiskEvaluator {
    artifacts: Arc<ScoringArtifacts>,
}

impl RiskEvaluator {
    pub fn new(artifacts: Arc<ScoringArtifacts>) -> Self {
        Self { artifacts }
    }

    /// Score one record
    ///
    /// Scorer failures come back as [`RiskError::Scoring`] unchanged; they are
    /// deterministic for a given record so nothing is retried.
    pub fn evaluate(&self, record: &FeatureRecord) -> Result<RiskAssessment> {
        record.validate()?;

        let row = record.to_row();
        let probability = self
            .artifacts
            .scorer()
            .predict_proba(&row)
            .and_then(checked_probability)
            .map_err(|e| match e {
                RiskError::Scoring(_) => e,
                other => RiskError::Scoring(other.to_string()),
            })?;

        let assessment = RiskAssessment::new(probability, self.artifacts.threshold());
        tracing::debug!(
            probability = assessment.probability,
            threshold = assessment.threshold,
            label = assessment.label.code(),
            "record evaluated"
        );
        Ok(assessment)
    }

    pub fn threshold(&self) -> f64 {
        self.artifacts.threshold()
    }
}
