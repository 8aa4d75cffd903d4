//! Interactive form
//!
//! Walks the user through the four features, shows the prediction, then
//! offers a pre-filled prompt for a follow-up question to the local model.
//! Free text typed at the main prompt is treated as a follow-up question.

pub mod commands;
pub mod display;
pub mod input;

use crate::errors::RiskError;
use crate::session::Session;
use crate::types::features::{check_non_negative, check_range, parse_number, MAX_ADMISSION_AGE};
use crate::types::{FeatureRecord, Gender};
use anyhow::Result;
use colored::*;
use std::path::PathBuf;

use crate::repl::commands::{is_command, Command};
pub use crate::repl::display::DisplayManager;
use crate::repl::input::InputHandler;

const MAIN_PROMPT: &str = "icurisk> ";

/// Interactive session coordinator
pub struct ReplSession {
    input: InputHandler,
    display: DisplayManager,
    session: Session,
}

impl ReplSession {
    pub fn new(session: Session, display: DisplayManager, history: Option<PathBuf>) -> Result<Self> {
        let input = match history {
            Some(path) => InputHandler::with_history(path)?,
            None => InputHandler::new()?,
        };

        Ok(ReplSession {
            input,
            display,
            session,
        })
    }

    /// Run until /exit or EOF
    pub async fn run(&mut self, version: &str, model: &str) -> Result<()> {
        self.display
            .show_banner(version, model, self.session.evaluator().threshold());

        // Start straight in the form
        self.predict().await?;

        loop {
            let line = match self.input.read_line(MAIN_PROMPT) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) if is_interrupt(&e) => {
                    println!("\nUse /exit to quit");
                    continue;
                }
                Err(e) => return Err(e),
            };

            if line.is_empty() {
                continue;
            }

            if !is_command(&line) {
                self.ask(Some(line)).await?;
                continue;
            }

            match commands::parse(&line) {
                Command::Predict => self.predict().await?,
                Command::Ask => self.ask(None).await?,
                Command::Show => self.display.show_state(self.session.state()),
                Command::Help => commands::show_help(),
                Command::Exit => break,
                Command::Unknown { input } => {
                    println!("{}", format!("Unknown command: {}", input).red());
                    println!("Type {} for available commands", "/help".cyan());
                }
            }
        }

        println!("{}", "Goodbye!".green());
        self.input.save_history()?;
        Ok(())
    }

    /// Collect a full record and evaluate it
    async fn predict(&mut self) -> Result<()> {
        let record = match self.read_record()? {
            Some(record) => record,
            None => {
                self.display.show_info("Form cancelled");
                return Ok(());
            }
        };

        match self.session.submit(record) {
            Ok(assessment) => {
                self.display.show_assessment(&assessment);
                println!(
                    "Type a question about this result, {} to edit the full prompt, or {} for a new patient.",
                    "/ask".green(),
                    "/predict".green()
                );
            }
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                tracing::error!(error = %e, "evaluation failed");
                self.display.show_error(&e.to_string());
            }
        }
        Ok(())
    }

    /// Prompt for each field until valid; `None` on EOF
    fn read_record(&mut self) -> Result<Option<FeatureRecord>> {
        let gender = match self.read_field("gender (male/female)", |raw| raw.parse::<Gender>())? {
            Some(gender) => gender,
            None => return Ok(None),
        };

        let admission_age = match self.read_field("admission_age (0-90 years)", |raw| {
            let value = parse_number("admission_age", raw)?;
            check_range("admission_age", value, 0.0, MAX_ADMISSION_AGE)?;
            Ok(value)
        })? {
            Some(value) => value,
            None => return Ok(None),
        };

        let los_icu = match self.read_field("los_icu (days)", non_negative("los_icu"))? {
            Some(value) => value,
            None => return Ok(None),
        };

        let wbc = match self.read_field("wbc (white-cell count)", non_negative("wbc"))? {
            Some(value) => value,
            None => return Ok(None),
        };

        Ok(Some(FeatureRecord::new(gender, admission_age, los_icu, wbc)?))
    }

    fn read_field<T>(
        &mut self,
        label: &str,
        parse: impl Fn(&str) -> std::result::Result<T, RiskError>,
    ) -> Result<Option<T>> {
        let prompt = format!("  {}: ", label);
        loop {
            let raw = match self.input.read_line(&prompt) {
                Ok(Some(raw)) => raw,
                Ok(None) => return Ok(None),
                Err(e) if is_interrupt(&e) => return Ok(None),
                Err(e) => return Err(e),
            };

            match parse(&raw) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => self.display.show_error(&e.to_string()),
            }
        }
    }

    /// Ask the advisor about the held prediction
    ///
    /// The assessment stays on screen whether or not the call succeeds.
    async fn ask(&mut self, question: Option<String>) -> Result<()> {
        let prefilled = match self.session.prefilled_prompt(question.as_deref().unwrap_or("")) {
            Ok(prompt) => prompt,
            Err(_) => {
                self.display
                    .show_warning("Make a prediction first (/predict)");
                return Ok(());
            }
        };

        let edited = match self.input.read_prefilled("prompt> ", &prefilled) {
            Err(e) if is_interrupt(&e) => None,
            other => other?,
        };
        let prompt = match edited {
            Some(prompt) if !prompt.is_empty() => prompt,
            _ => {
                self.display.show_info("Question cancelled");
                return Ok(());
            }
        };

        let pb = self.display.start_waiting("Asking the local model (Ctrl-C to cancel)");
        let outcome = tokio::select! {
            result = self.session.ask(&prompt) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };
        pb.finish_and_clear();

        match outcome {
            Some(Ok(reply)) => self.display.show_reply(&reply),
            Some(Err(e)) => {
                self.display.show_error(&e.to_string());
                if let Some(assessment) = self.session.state().assessment() {
                    self.display.show_assessment(assessment);
                }
            }
            None => self.display.show_warning("Request cancelled"),
        }
        Ok(())
    }
}

fn is_interrupt(e: &anyhow::Error) -> bool {
    e.to_string() == "Interrupted"
}

fn non_negative(field: &'static str) -> impl Fn(&str) -> std::result::Result<f64, RiskError> {
    move |raw| {
        let value = parse_number(field, raw)?;
        check_non_negative(field, value)?;
        Ok(value)
    }
}
