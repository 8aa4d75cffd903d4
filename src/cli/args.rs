//! Command-line argument parsing for icurisk
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use crate::cli::config::Config;
use crate::types::Gender;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// icurisk - ICU mortality risk prediction with a local model advisor
#[derive(Parser, Debug)]
#[command(name = "icurisk")]
#[command(version)]
#[command(about = "Predict ICU mortality risk and ask a local Ollama model about the result", long_about = None)]
pub struct Args {
    /// Configuration file path (default: ~/.icurisk/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Ollama model used for follow-up questions
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Ollama host
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Ollama port
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Classifier artifact (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub model_artifact: Option<PathBuf>,

    /// Decision threshold artifact (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub threshold_artifact: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress all output except the result)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate one patient and optionally ask a follow-up question
    Predict(PredictArgs),

    /// Start the interactive form
    Start,

    /// Check artifacts and Ollama reachability
    Doctor,

    /// Display current configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

/// Patient features for a one-shot prediction
#[derive(ClapArgs, Debug, Clone)]
pub struct PredictArgs {
    /// male/female (or 1/0)
    #[arg(long, value_parser = parse_gender)]
    pub gender: Gender,

    /// Age at admission in years (0-90)
    #[arg(long = "age", visible_alias = "admission-age")]
    pub admission_age: f64,

    /// ICU length of stay in days
    #[arg(long)]
    pub los_icu: f64,

    /// White-cell count
    #[arg(long)]
    pub wbc: f64,

    /// Follow-up question for the local model
    #[arg(long)]
    pub ask: Option<String>,

    /// Print the assessment (and reply) as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_gender(raw: &str) -> Result<Gender, String> {
    raw.parse::<Gender>().map_err(|e| e.to_string())
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Verbosity from flags, falling back to the configured level
    pub fn verbosity(&self, config: &Config) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::from_name(&config.display.verbosity),
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Apply command-line overrides on top of the file configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref model) = self.model {
            config.ollama.model = model.clone();
        }
        if let Some(ref host) = self.host {
            config.ollama.host = host.clone();
        }
        if let Some(port) = self.port {
            config.ollama.port = port;
        }
        if let Some(ref path) = self.model_artifact {
            config.artifacts.model_path = path.to_string_lossy().into_owned();
        }
        if let Some(ref path) = self.threshold_artifact {
            config.artifacts.threshold_path = path.to_string_lossy().into_owned();
        }
    }
}

impl Verbosity {
    /// Parse a configured level; unknown names fall back to normal
    pub fn from_name(name: &str) -> Self {
        match name {
            "quiet" => Verbosity::Quiet,
            "verbose" => Verbosity::Verbose,
            "very_verbose" => Verbosity::VeryVerbose,
            _ => Verbosity::Normal,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Default tracing filter for this level
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "icurisk=info",
            Verbosity::VeryVerbose => "icurisk=debug",
        }
    }

    /// Check if should show progress spinners
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}
