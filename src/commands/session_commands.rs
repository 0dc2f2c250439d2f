//! Command parser for the interactive session
//!
//! Each input line is one command. Keywords are case-insensitive and may be
//! written with a leading `/`; the path argument of `select` is kept as typed.

use colored::Colorize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing a session command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType 'help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an argument it does not take
    #[error("{command} takes no arguments\n\nType 'help' to see valid usage")]
    UnexpectedArgument { command: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Commands understood by the interactive session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Select an image file
    Select(PathBuf),
    /// Classify the selected image
    Predict,
    /// Drop the selection and result
    Reset,
    /// Show the session state
    Status,
    /// Show the prediction history
    History,
    /// Erase the prediction history
    ClearHistory,
    /// Show help
    Help,
    /// Leave the session
    Exit,
    /// Blank line
    Empty,
}

/// Parse one input line
///
/// # Errors
///
/// Returns `CommandError` for unknown commands and bad arguments
///
/// # Examples
///
/// ```
/// use neuralens::commands::session_commands::{parse_session_command, SessionCommand};
/// use std::path::PathBuf;
///
/// let cmd = parse_session_command("select signs/Stop.png").unwrap();
/// assert_eq!(cmd, SessionCommand::Select(PathBuf::from("signs/Stop.png")));
///
/// assert_eq!(parse_session_command("PREDICT").unwrap(), SessionCommand::Predict);
/// assert!(parse_session_command("dance").is_err());
/// ```
pub fn parse_session_command(input: &str) -> Result<SessionCommand, CommandError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(SessionCommand::Empty);
    }

    let (keyword, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (trimmed, ""),
    };
    let keyword = keyword.trim_start_matches('/').to_lowercase();

    let command = match keyword.as_str() {
        "select" | "open" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "select".to_string(),
                    usage: "select <path>".to_string(),
                });
            }
            return Ok(SessionCommand::Select(PathBuf::from(rest)));
        }
        "predict" | "analyze" => SessionCommand::Predict,
        "reset" => SessionCommand::Reset,
        "status" => SessionCommand::Status,
        "history" => SessionCommand::History,
        "clear" => SessionCommand::ClearHistory,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Exit,
        _ => return Err(CommandError::UnknownCommand(trimmed.to_string())),
    };

    if !rest.is_empty() {
        return Err(CommandError::UnexpectedArgument { command: keyword });
    }
    Ok(command)
}

/// Print the session help text
pub fn print_help() {
    println!("{}", "Session commands:".bold());
    println!("  {}  choose a JPG, PNG or WEBP image", "select <path>".cyan());
    println!("  {}        classify the selected image", "predict".cyan());
    println!("  {}          start over with a new image", "reset".cyan());
    println!("  {}         show the current state", "status".cyan());
    println!("  {}        list recent predictions", "history".cyan());
    println!("  {}          erase the prediction history", "clear".cyan());
    println!("  {}           show this help", "help".cyan());
    println!("  {}           leave the session", "quit".cyan());
    println!();
}
