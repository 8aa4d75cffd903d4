//! Display manager for terminal output
//!
//! Renders assessments, advisory replies and errors. Errors are printed
//! below whatever is already on screen, never instead of it.

use crate::session::SessionState;
use crate::types::{FeatureRecord, RiskAssessment};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Display manager for the interactive form and one-shot predictions
pub struct DisplayManager {
    show_progress: bool,
    tick_interval: Duration,
}

impl DisplayManager {
    pub fn new(show_progress: bool) -> Self {
        DisplayManager {
            show_progress,
            tick_interval: Duration::from_millis(100),
        }
    }

    /// Show welcome banner
    pub fn show_banner(&self, version: &str, model: &str, threshold: f64) {
        let width = 64;
        let rule = "=".repeat(width);
        let title = format!("  icurisk {} - ICU Mortality Risk Prediction", version);
        let info = format!("  Advisor model: {} | Threshold (Youden): {:.3}", model, threshold);

        println!("\n{}", rule.cyan());
        println!("{}", title.bold().cyan());
        println!("{}", info.dimmed());
        println!("{}\n", rule.cyan());
        println!(
            "Enter the patient features to get a prediction ({} for commands, {} to quit)\n",
            "/help".green(),
            "/exit".green()
        );
    }

    /// Show the prediction result
    pub fn show_assessment(&self, assessment: &RiskAssessment) {
        println!("\n{}", "Prediction".bold().cyan());
        println!("{}", "-".repeat(40).cyan());
        for line in assessment_lines(assessment) {
            println!("{}", line);
        }

        let label = assessment.label.description();
        if assessment.is_high_risk() {
            println!("{} {}\n", "●".red(), label.red().bold());
        } else {
            println!("{} {}\n", "●".green(), label.green().bold());
        }
    }

    /// Show the inputs behind an assessment
    pub fn show_record(&self, record: &FeatureRecord) {
        println!(
            "{} gender={} admission_age={} los_icu={} wbc={}",
            "Input:".dimmed(),
            record.gender,
            record.admission_age,
            record.los_icu,
            record.wbc
        );
    }

    /// Show the model's reply
    pub fn show_reply(&self, reply: &str) {
        println!("\n{}", "Advisor".bold().cyan());
        println!("{}", "-".repeat(40).cyan());
        println!("{}\n", reply.trim());
    }

    /// Re-render whatever the session holds, without recomputing
    pub fn show_state(&self, state: &SessionState) {
        match state {
            SessionState::Idle => self.show_info("No prediction yet. Use /predict."),
            SessionState::Evaluated { record, assessment } => {
                self.show_record(record);
                self.show_assessment(assessment);
            }
            SessionState::Advised {
                record,
                assessment,
                reply,
                ..
            } => {
                self.show_record(record);
                self.show_assessment(assessment);
                self.show_reply(reply);
            }
        }
    }

    /// Spinner shown while waiting on the local model
    pub fn start_waiting(&self, message: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(self.tick_interval);
        pb
    }

    /// Display error message
    pub fn show_error(&self, error: &str) {
        println!("{} {}", "Error:".red().bold(), error.red());
    }

    /// Display warning message
    pub fn show_warning(&self, warning: &str) {
        println!("{} {}", "Warning:".yellow().bold(), warning.yellow());
    }

    /// Display info message
    pub fn show_info(&self, info: &str) {
        println!("{} {}", "Info:".cyan(), info);
    }
}

/// Plain-text lines for probability and threshold
pub fn assessment_lines(assessment: &RiskAssessment) -> Vec<String> {
    vec![
        format!("Predicted mortality probability: {:.3}", assessment.probability),
        format!("Model threshold (Youden):        {:.3}", assessment.threshold),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assessment_lines_three_decimals() {
        let lines = assessment_lines(&RiskAssessment::new(0.41666, 0.4));
        assert_eq!(lines[0], "Predicted mortality probability: 0.417");
        assert!(lines[1].ends_with("0.400"));
    }

    #[test]
    fn test_hidden_spinner_when_quiet() {
        let display = DisplayManager::new(false);
        let pb = display.start_waiting("Asking");
        assert!(pb.is_hidden());
    }
}
