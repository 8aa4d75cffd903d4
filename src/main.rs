//! icurisk - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use icurisk::{
    advisory::AdvisoryClient,
    cli::{Args, Commands, Config, PredictArgs, Verbosity},
    doctor::Doctor,
    evaluator::RiskEvaluator,
    repl::{DisplayManager, ReplSession},
    scoring::ScoringArtifacts,
    session::Session,
    types::FeatureRecord,
};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match (&args.command, args.config.as_deref()) {
        // `config --init` may be creating the file
        (Some(Commands::Config { init: true }), Some(path)) if !path.exists() => Config::default(),
        (_, path) => Config::load(path).context("Failed to load configuration")?,
    };
    args.apply_overrides(&mut config);
    config.validate()?;

    let verbosity = args.verbosity(&config);
    init_tracing(verbosity);

    if !config.display.color {
        colored::control::set_override(false);
    }

    match &args.command {
        Some(Commands::Predict(predict)) => {
            run_predict(&config, verbosity, predict).await?;
        }
        Some(Commands::Start) => {
            run_repl(&config, verbosity).await?;
        }
        Some(Commands::Doctor) => {
            run_doctor(config).await?;
        }
        Some(Commands::Config { init }) => {
            if *init {
                write_config(&config, args.config.as_deref())?;
            } else {
                show_config(&config, verbosity);
            }
        }
        None => {
            println!("icurisk {} - ICU mortality risk prediction", env!("CARGO_PKG_VERSION"));
            println!("\nUsage:");
            println!("  icurisk start                 Interactive form");
            println!("  icurisk predict [features]    Evaluate one patient");
            println!("  icurisk doctor                Check artifacts and Ollama");
            println!("  icurisk config [--init]       Show or write configuration");
            println!("\nExample:");
            println!("  icurisk predict --gender male --age 60 --los-icu 3 --wbc 8 --ask \"Why?\"");
            println!();
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays clean for results; RUST_LOG wins over -v/-q
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load both artifacts and wire up a session; artifacts are required
fn build_session(config: &Config) -> Result<Session> {
    let artifacts = ScoringArtifacts::load(&config.model_path(), &config.threshold_path())
        .context("Cannot start without the scoring artifacts (run `icurisk doctor`)")?;
    let evaluator = RiskEvaluator::new(Arc::new(artifacts));

    let advisor = AdvisoryClient::with_config(
        &config.ollama_url(),
        &config.ollama.model,
        config.request_timeout(),
    )?;

    Ok(Session::new(evaluator, Box::new(advisor)))
}

async fn run_predict(config: &Config, verbosity: Verbosity, predict: &PredictArgs) -> Result<()> {
    let mut session = build_session(config)?;
    let display = DisplayManager::new(verbosity.show_progress() && !predict.json);

    let record = FeatureRecord::new(
        predict.gender,
        predict.admission_age,
        predict.los_icu,
        predict.wbc,
    )?;
    let assessment = match session.submit(record) {
        Ok(assessment) => assessment,
        Err(e) if e.is_fatal() => return Err(e.into()),
        Err(e) => {
            display.show_error(&e.to_string());
            std::process::exit(2);
        }
    };

    let Some(question) = predict.ask.as_deref() else {
        if predict.json {
            println!("{}", serde_json::to_string_pretty(session.state())?);
        } else if matches!(verbosity, Verbosity::Quiet) {
            println!("{}", assessment);
        } else {
            display.show_assessment(&assessment);
        }
        return Ok(());
    };

    // The assessment is reported before the advisory call so a failure cannot hide it
    if !predict.json {
        display.show_assessment(&assessment);
    }

    let prompt = session.prefilled_prompt(question)?;
    let pb = display.start_waiting("Asking the local model");
    let result = session.ask(&prompt).await;
    pb.finish_and_clear();

    match result {
        Ok(reply) => {
            if predict.json {
                println!("{}", serde_json::to_string_pretty(session.state())?);
            } else {
                display.show_reply(&reply);
            }
            Ok(())
        }
        Err(e) => {
            if predict.json {
                // State is still Evaluated here
                let output = json!({ "session": session.state(), "advisory_error": e.to_string() });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                display.show_error(&e.to_string());
                eprintln!("Is Ollama running? Start with: ollama serve");
            }
            std::process::exit(3);
        }
    }
}

async fn run_repl(config: &Config, verbosity: Verbosity) -> Result<()> {
    let session = build_session(config)?;
    let display = DisplayManager::new(verbosity.show_progress());
    let history = dirs::home_dir().map(|home| home.join(".icurisk").join("history"));

    let mut repl = ReplSession::new(session, display, history)?;
    repl.run(env!("CARGO_PKG_VERSION"), &config.ollama.model).await
}

async fn run_doctor(config: Config) -> Result<()> {
    let doctor = Doctor::new(config);

    let checks = doctor.run_diagnostics().await;
    Doctor::display_results(&checks);

    std::process::exit(if Doctor::overall_status(&checks) { 0 } else { 1 });
}

/// Persist the effective configuration, CLI overrides included
fn write_config(config: &Config, explicit: Option<&Path>) -> Result<()> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(Config::default_path)
        .context("No home directory; pass --config <path>")?;

    config.save(&path)?;
    println!("{} {}", "Wrote".green(), path.display());
    Ok(())
}

fn show_config(config: &Config, verbosity: Verbosity) {
    println!("\n{}\n", "icurisk configuration".bold().cyan());

    println!("Ollama:");
    println!("  URL:      {}", config.ollama_url());
    println!("  Model:    {}", config.ollama.model);
    println!("  Timeout:  {}s", config.ollama.timeout_secs);
    println!();

    println!("Artifacts:");
    println!("  Model:     {}", config.model_path().display());
    println!("  Threshold: {}", config.threshold_path().display());
    println!();

    println!("Display:");
    println!("  Verbosity: {}", verbosity.as_str());
    println!("  Color:     {}", config.display.color);
    println!();

    match Config::default_path() {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (no home directory)"),
    }
    println!();
}
