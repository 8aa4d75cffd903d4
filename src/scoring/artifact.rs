//! Load-once scoring artifacts
//!
//! The classifier and its decision threshold live in two files. Both are
//! read at startup into an immutable [`ScoringArtifacts`] handle; any
//! problem here is fatal.

use crate::errors::{RiskError, Result};
use crate::scoring::model::ModelArtifact;
use crate::scoring::Scorer;
use crate::types::FEATURE_NAMES;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Classifier plus threshold, read-only after load
pub struct ScoringArtifacts {
    scorer: Box<dyn Scorer>,
    threshold: f64,
}

/// Threshold file contents: a bare number or `{ "threshold": x }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ThresholdFile {
    Bare(f64),
    Wrapped { threshold: f64 },
}

impl ThresholdFile {
    fn value(&self) -> f64 {
        match self {
            ThresholdFile::Bare(t) => *t,
            ThresholdFile::Wrapped { threshold } => *threshold,
        }
    }
}

impl ScoringArtifacts {
    /// Load model and threshold from disk
    pub fn load(model_path: &Path, threshold_path: &Path) -> Result<Self> {
        let model = load_model(model_path)?;
        let threshold = load_threshold(threshold_path)?;

        tracing::info!(
            model = %model_path.display(),
            threshold,
            "scoring artifacts loaded"
        );

        Self::from_parts(model.into_scorer(), threshold)
    }

    /// Assemble from an already-built scorer, checking the schema and threshold
    pub fn from_parts(scorer: Box<dyn Scorer>, threshold: f64) -> Result<Self> {
        check_schema(scorer.feature_names()).map_err(|e| RiskError::artifact("model", e))?;
        check_threshold(threshold).map_err(|e| RiskError::artifact("threshold", e))?;
        Ok(Self { scorer, threshold })
    }

    pub fn scorer(&self) -> &dyn Scorer {
        self.scorer.as_ref()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl fmt::Debug for ScoringArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoringArtifacts")
            .field("features", &self.scorer.feature_names())
            .field("threshold", &self.threshold)
            .finish()
    }
}

fn read_artifact(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| RiskError::artifact(path.display().to_string(), e.to_string()))
}

fn load_model(path: &Path) -> Result<ModelArtifact> {
    let contents = read_artifact(path)?;
    let shown = path.display().to_string();

    let model: ModelArtifact = serde_json::from_str(&contents)
        .map_err(|e| RiskError::artifact(&shown, format!("invalid model: {}", e)))?;

    model
        .validate()
        .map_err(|e| RiskError::artifact(&shown, e))?;
    check_schema(model.feature_names()).map_err(|e| RiskError::artifact(&shown, e))?;

    tracing::debug!(path = %shown, "model artifact validated");
    Ok(model)
}

fn load_threshold(path: &Path) -> Result<f64> {
    let contents = read_artifact(path)?;
    let shown = path.display().to_string();

    let file: ThresholdFile = serde_json::from_str(contents.trim())
        .map_err(|e| RiskError::artifact(&shown, format!("invalid threshold: {}", e)))?;

    let threshold = file.value();
    check_threshold(threshold).map_err(|e| RiskError::artifact(&shown, e))?;
    Ok(threshold)
}

/// The model must have been fit on exactly our features, in our order
fn check_schema(names: &[String]) -> std::result::Result<(), String> {
    if names.len() != FEATURE_NAMES.len()
        || names.iter().zip(FEATURE_NAMES.iter()).any(|(a, b)| a != b)
    {
        return Err(format!(
            "model was fit on {:?}, expected {:?}",
            names, FEATURE_NAMES
        ));
    }
    Ok(())
}

fn check_threshold(threshold: f64) -> std::result::Result<(), String> {
    if threshold.is_finite() && (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(format!("threshold {} outside [0, 1]", threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LOGISTIC: &str = r#"{
        "kind": "logistic",
        "feature_names": ["gender", "admission_age", "los_icu", "wbc"],
        "intercept": -4.0,
        "coefficients": [0.2, 0.03, 0.1, 0.05]
    }"#;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_success() {
        let model = write_temp(LOGISTIC);
        let threshold = write_temp("0.4\n");

        let artifacts = ScoringArtifacts::load(model.path(), threshold.path()).unwrap();
        assert_eq!(artifacts.threshold(), 0.4);
        assert_eq!(artifacts.scorer().feature_names().len(), 4);
    }

    #[test]
    fn test_wrapped_threshold() {
        let model = write_temp(LOGISTIC);
        let threshold = write_temp(r#"{"threshold": 0.35}"#);

        let artifacts = ScoringArtifacts::load(model.path(), threshold.path()).unwrap();
        assert_eq!(artifacts.threshold(), 0.35);
    }

    #[test]
    fn test_missing_model_is_artifact_error() {
        let threshold = write_temp("0.4");
        let err = ScoringArtifacts::load(Path::new("/nonexistent/model.json"), threshold.path())
            .unwrap_err();
        assert!(matches!(err, RiskError::ArtifactLoad { .. }));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let model = write_temp(LOGISTIC);
        let threshold = write_temp("1.5");
        let err = ScoringArtifacts::load(model.path(), threshold.path()).unwrap_err();
        assert!(err.to_string().contains("outside [0, 1]"));
    }

    #[test]
    fn test_feature_order_mismatch_rejected() {
        let swapped = LOGISTIC.replace(
            r#"["gender", "admission_age", "los_icu", "wbc"]"#,
            r#"["gender", "los_icu", "admission_age", "wbc"]"#,
        );
        let model = write_temp(&swapped);
        let threshold = write_temp("0.4");

        let err = ScoringArtifacts::load(model.path(), threshold.path()).unwrap_err();
        assert!(matches!(err, RiskError::ArtifactLoad { .. }));
        assert!(err.to_string().contains("expected"));
    }

    #[test]
    fn test_garbage_model_rejected() {
        let model = write_temp("not json at all");
        let threshold = write_temp("0.4");
        assert!(ScoringArtifacts::load(model.path(), threshold.path()).is_err());
    }
}
