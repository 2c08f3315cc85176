mod commands;
pub mod exit_codes;
pub mod output;

pub use commands::{Cli, Commands, ConfigCommands};

use thiserror::Error;

use crate::op::OperatorError;
use crate::rule::RuleError;
use output::OutputMode;

/// command failure carrying the exit code it maps to
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CliError {
    pub code: i32,
    pub message: String,
    pub suggestions: Vec<String>,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self::with_suggestions(code, message, Vec::new())
    }

    pub fn with_suggestions(code: i32, message: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            code,
            message: message.into(),
            suggestions,
        }
    }
}

/// run a parsed command line and return the process exit code
pub fn run(cli: Cli) -> i32 {
    let output_mode = OutputMode::from_flags(cli.json, cli.no_json, cli.quiet, false);

    match commands::execute(cli, output_mode) {
        Ok(code) => code,
        Err(err) => {
            let (code, suggestions) = classify(&err);
            tracing::debug!(code, error = %format!("{:#}", err), "command failed");

            if output_mode.is_json() {
                output::print_json_error_with_suggestions(code, &format!("{:#}", err), suggestions);
            } else {
                eprintln!("error: {:#}", err);
                if !suggestions.is_empty() {
                    eprintln!("  did you mean: {}", suggestions.join(", "));
                }
            }
            code
        }
    }
}

/// map an error chain to an exit code and suggestions
pub fn classify(err: &anyhow::Error) -> (i32, Vec<String>) {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<CliError>() {
            return (e.code, e.suggestions.clone());
        }
        if let Some(e) = cause.downcast_ref::<RuleError>() {
            let code = match e {
                RuleError::UnknownOperator(_) => exit_codes::UNKNOWN_OPERATOR,
                _ => exit_codes::INVALID_ARGS,
            };
            return (code, Vec::new());
        }
        if cause.downcast_ref::<OperatorError>().is_some() {
            return (exit_codes::INVALID_ARGS, Vec::new());
        }
    }
    (exit_codes::ERROR, Vec::new())
}
