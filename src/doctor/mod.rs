//! Doctor command for system diagnostics
//!
//! Checks that the scoring artifacts load and that the local Ollama server
//! answers with the configured model installed.

use crate::advisory::AdvisoryClient;
use crate::cli::Config;
use crate::scoring::ScoringArtifacts;
use colored::*;

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass,
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
        }
    }
}

/// Doctor diagnostics system
pub struct Doctor {
    config: Config,
}

impl Doctor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run all health checks
    pub async fn run_diagnostics(&self) -> Vec<HealthCheck> {
        let mut checks = vec![self.check_artifacts()];

        match AdvisoryClient::with_config(
            &self.config.ollama_url(),
            &self.config.ollama.model,
            self.config.request_timeout(),
        ) {
            Ok(client) => {
                let api = Self::check_ollama_api(&client).await;
                let reachable = api.status == HealthStatus::Pass;
                checks.push(api);
                if reachable {
                    checks.push(Self::check_model_available(&client).await);
                }
            }
            Err(e) => checks.push(HealthCheck::new("Ollama API", HealthStatus::Fail(e.to_string()))),
        }

        checks
    }

    /// Check 1: model and threshold artifacts load
    pub fn check_artifacts(&self) -> HealthCheck {
        match ScoringArtifacts::load(&self.config.model_path(), &self.config.threshold_path()) {
            Ok(artifacts) => {
                tracing::debug!(?artifacts, "artifacts healthy");
                HealthCheck::new("Scoring Artifacts", HealthStatus::Pass)
            }
            Err(e) => HealthCheck::new("Scoring Artifacts", HealthStatus::Fail(e.to_string())),
        }
    }

    /// Check 2: Ollama API reachable
    async fn check_ollama_api(client: &AdvisoryClient) -> HealthCheck {
        if client.health_check().await {
            HealthCheck::new("Ollama API", HealthStatus::Pass)
        } else {
            HealthCheck::new(
                "Ollama API",
                HealthStatus::Fail(format!(
                    "Not reachable at {} (start with: ollama serve)",
                    client.base_url()
                )),
            )
        }
    }

    /// Check 3: configured model installed; advisory is optional so this only warns
    async fn check_model_available(client: &AdvisoryClient) -> HealthCheck {
        match client.list_models().await {
            Ok(models) if models.iter().any(|m| same_model(m, client.model())) => {
                HealthCheck::new("Advisor Model", HealthStatus::Pass)
            }
            Ok(_) => HealthCheck::new(
                "Advisor Model",
                HealthStatus::Warn(format!(
                    "{} not installed (ollama pull {})",
                    client.model(),
                    client.model()
                )),
            ),
            Err(e) => HealthCheck::new("Advisor Model", HealthStatus::Warn(e.to_string())),
        }
    }

    /// Display diagnostics results
    pub fn display_results(checks: &[HealthCheck]) {
        println!("\n{}\n", "icurisk diagnostics".bold().cyan());
        println!("{:<20} Status", "Check");
        println!("{}", "=".repeat(50));

        for check in checks {
            let status = match &check.status {
                HealthStatus::Pass => "PASS".green().to_string(),
                HealthStatus::Warn(msg) => format!("WARN: {}", msg).yellow().to_string(),
                HealthStatus::Fail(msg) => format!("FAIL: {}", msg).red().to_string(),
            };
            println!("{:<20} {}", check.name, status);
        }

        println!();
    }

    /// Get overall health status
    pub fn overall_status(checks: &[HealthCheck]) -> bool {
        !checks.iter().any(|c| matches!(c.status, HealthStatus::Fail(_)))
    }
}

/// Ollama lists untagged models as `name:latest`
fn same_model(installed: &str, configured: &str) -> bool {
    fn with_tag(name: &str) -> String {
        if name.contains(':') {
            name.to_string()
        } else {
            format!("{}:latest", name)
        }
    }
    with_tag(installed) == with_tag(configured)
}
