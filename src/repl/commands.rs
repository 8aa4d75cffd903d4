//! Built-in commands for the interactive form

use colored::*;

/// REPL command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fill in the form and evaluate
    Predict,
    /// Ask the advisor about the held prediction
    Ask,
    /// Re-render the held result
    Show,
    Help,
    Exit,
    Unknown { input: String },
}

/// Check if input is a command
pub fn is_command(input: &str) -> bool {
    input.trim_start().starts_with('/')
}

/// Parse input string into a command
pub fn parse(input: &str) -> Command {
    let trimmed = input.trim();

    let name = match trimmed.strip_prefix('/') {
        Some(rest) => rest.split_whitespace().next().unwrap_or(""),
        None => return Command::Unknown { input: input.to_string() },
    };

    match name.to_lowercase().as_str() {
        "predict" | "p" => Command::Predict,
        "ask" | "a" => Command::Ask,
        "show" | "s" => Command::Show,
        "help" | "h" => Command::Help,
        "exit" | "quit" | "q" => Command::Exit,
        _ => Command::Unknown { input: input.to_string() },
    }
}

/// Display help information
pub fn show_help() {
    println!("\n{}", "Available Commands:".bold().cyan());
    println!("{}", "=".repeat(60).cyan());

    let commands = [
        ("/predict, /p", "Enter patient features and predict risk"),
        ("/ask, /a", "Ask the local model about the current prediction"),
        ("/show, /s", "Show the current prediction and reply"),
        ("/help, /h", "Show this help message"),
        ("/exit, /quit, /q", "Exit"),
    ];

    for (cmd, desc) in commands {
        println!("  {:<20} {}", cmd.green(), desc);
    }
    println!();
}
