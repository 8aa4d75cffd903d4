//! Configuration management for icurisk
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.icurisk/config.toml

use crate::advisory::{DEFAULT_MODEL, DEFAULT_TIMEOUT};
use crate::errors::{RiskError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete configuration for icurisk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Ollama connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub port: u16,
    pub model: String,
    pub timeout_secs: u64,
}

/// Scoring artifact locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub model_path: String,
    pub threshold_path: String,
}

/// Terminal output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub verbosity: String,
    pub color: bool,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 11434,
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            model_path: "model.json".to_string(),
            threshold_path: "threshold.json".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            verbosity: "normal".to_string(),
            color: true,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RiskError::Config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| RiskError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Standard config location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".icurisk").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.ollama.host.trim().is_empty() {
            return Err(RiskError::Config("ollama.host must not be empty".to_string()));
        }

        if self.ollama.port == 0 {
            return Err(RiskError::Config("ollama.port must be greater than 0".to_string()));
        }

        if self.ollama.model.trim().is_empty() {
            return Err(RiskError::Config("ollama.model must not be empty".to_string()));
        }

        if self.ollama.timeout_secs == 0 {
            return Err(RiskError::Config(
                "ollama.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.artifacts.model_path.trim().is_empty()
            || self.artifacts.threshold_path.trim().is_empty()
        {
            return Err(RiskError::Config("artifact paths must not be empty".to_string()));
        }

        match self.display.verbosity.as_str() {
            "quiet" | "normal" | "verbose" | "very_verbose" => {}
            _ => {
                return Err(RiskError::Config(format!(
                    "Invalid verbosity level: {}",
                    self.display.verbosity
                )))
            }
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| RiskError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RiskError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| RiskError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Get Ollama base URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.ollama.timeout_secs)
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    pub fn model_path(&self) -> PathBuf {
        Self::expand_path(&self.artifacts.model_path)
    }

    pub fn threshold_path(&self) -> PathBuf {
        Self::expand_path(&self.artifacts.threshold_path)
    }
}
