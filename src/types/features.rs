//! Patient feature record
//!
//! The four inputs the classifier was fit on, held as named fields so the
//! row handed to the scorer is always built in training order.

use crate::errors::{RiskError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Feature names in the order the classifier was fit on
pub const FEATURE_NAMES: [&str; 4] = ["gender", "admission_age", "los_icu", "wbc"];

/// Number of features per row
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Upper bound of the admission age domain (years)
pub const MAX_ADMISSION_AGE: f64 = 90.0;

/// Patient gender, encoded as 0/1 for the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Numeric code fed to the classifier
    pub fn code(&self) -> u8 {
        match self {
            Gender::Female => 0,
            Gender::Male => 1,
        }
    }

    /// Inverse of [`Gender::code`]
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Gender::Female),
            1 => Ok(Gender::Male),
            other => Err(RiskError::invalid(
                "gender",
                format!("code must be 0 or 1, got {}", other),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = RiskError;

    /// Accepts the display names, their initials, or the numeric codes
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "1" => Ok(Gender::Male),
            "female" | "f" | "0" => Ok(Gender::Female),
            other => Err(RiskError::invalid(
                "gender",
                format!("expected male/female (or 1/0), got '{}'", other),
            )),
        }
    }
}

/// One evaluation's input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub gender: Gender,
    /// Age at admission in years, 0..=90
    pub admission_age: f64,
    /// Length of ICU stay in days
    pub los_icu: f64,
    /// White-cell count
    pub wbc: f64,
}

impl FeatureRecord {
    /// Build a record, rejecting values outside the form's domain
    pub fn new(gender: Gender, admission_age: f64, los_icu: f64, wbc: f64) -> Result<Self> {
        let record = Self {
            gender,
            admission_age,
            los_icu,
            wbc,
        };
        record.validate()?;
        Ok(record)
    }

    /// Check every field against its domain constraint
    pub fn validate(&self) -> Result<()> {
        check_range("admission_age", self.admission_age, 0.0, MAX_ADMISSION_AGE)?;
        check_non_negative("los_icu", self.los_icu)?;
        check_non_negative("wbc", self.wbc)?;
        Ok(())
    }

    /// Single row in [`FEATURE_NAMES`] order
    pub fn to_row(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.gender.code()),
            self.admission_age,
            self.los_icu,
            self.wbc,
        ]
    }
}

/// Parse a numeric form field; empty input is an error, never a default
pub fn parse_number(field: &str, raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RiskError::invalid(field, "a value is required"));
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| RiskError::invalid(field, format!("'{}' is not a number", trimmed)))?;

    check_finite(field, value)?;
    Ok(value)
}

fn check_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RiskError::invalid(field, "must be a finite number"))
    }
}

/// Reject negatives and non-finite values
pub fn check_non_negative(field: &str, value: f64) -> Result<()> {
    check_finite(field, value)?;
    if value < 0.0 {
        return Err(RiskError::invalid(
            field,
            format!("must be non-negative, got {}", value),
        ));
    }
    Ok(())
}

/// Reject values outside `min..=max`
pub fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    check_finite(field, value)?;
    if value < min || value > max {
        return Err(RiskError::invalid(
            field,
            format!("must be between {} and {}, got {}", min, max, value),
        ));
    }
    Ok(())
}
