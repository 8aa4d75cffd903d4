//! Risk assessment produced by one evaluation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary risk label derived from the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    Low,
    High,
}

impl RiskLabel {
    /// High iff `probability >= threshold`
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        if probability >= threshold {
            RiskLabel::High
        } else {
            RiskLabel::Low
        }
    }

    /// 1 for high risk, 0 for low risk
    pub fn code(&self) -> u8 {
        match self {
            RiskLabel::Low => 0,
            RiskLabel::High => 1,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskLabel::Low => "Low risk patient",
            RiskLabel::High => "High risk patient",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Output of one evaluation; immutable once produced
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Class-1 probability in [0, 1]
    pub probability: f64,
    /// Decision threshold in [0, 1], constant for the process
    pub threshold: f64,
    pub label: RiskLabel,
}

impl RiskAssessment {
    pub fn new(probability: f64, threshold: f64) -> Self {
        Self {
            probability,
            threshold,
            label: RiskLabel::from_probability(probability, threshold),
        }
    }

    pub fn is_high_risk(&self) -> bool {
        self.label == RiskLabel::High
    }
}

impl fmt::Display for RiskAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (probability {:.3}, threshold {:.3})",
            self.label, self.probability, self.threshold
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_at_threshold_is_high() {
        assert_eq!(RiskLabel::from_probability(0.4, 0.4), RiskLabel::High);
        assert_eq!(RiskLabel::from_probability(0.399, 0.4), RiskLabel::Low);
    }

    #[test]
    fn test_label_codes() {
        assert_eq!(RiskLabel::High.code(), 1);
        assert_eq!(RiskLabel::Low.code(), 0);
    }

    #[test]
    fn test_assessment_display() {
        let assessment = RiskAssessment::new(0.42, 0.40);
        assert_eq!(
            assessment.to_string(),
            "High risk patient (probability 0.420, threshold 0.400)"
        );
    }

    #[test]
    fn test_assessment_serialization() {
        let assessment = RiskAssessment::new(0.1, 0.4);
        let json = serde_json::to_value(assessment).unwrap();
        assert_eq!(json["label"], "low");
        assert_eq!(json["threshold"], 0.4);
    }
}
