//! Interactive session
//!
//! A readline loop over one [`SessionController`]. Each line is parsed by
//! [`parse_session_command`] and applied to the controller; the outcome is
//! rendered after every action.

use crate::client::{Classifier, PredictionClient};
use crate::commands::history::print_entries;
use crate::commands::render;
use crate::commands::session_commands::{parse_session_command, print_help, SessionCommand};
use crate::config::Config;
use crate::error::Result;
use crate::history::HistoryStore;
use crate::session::{SessionController, SessionState};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Whether the loop keeps running after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line
    Continue,
    /// Leave the session
    Exit,
}

/// Start the interactive session
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
pub async fn run_session(config: Config) -> Result<()> {
    let client = PredictionClient::from_config(&config.api)?;
    let history = HistoryStore::open(&config.history);
    let mut session = SessionController::new(client, &config, history);

    let mut rl = DefaultEditor::new()?;
    print_welcome_banner(&session);

    loop {
        let prompt = format!("{} ", format!("[{}]>", session.state()).cyan());
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;

                match parse_session_command(trimmed) {
                    Ok(command) => {
                        if apply_command(&mut session, command).await? == Flow::Exit {
                            break;
                        }
                    }
                    Err(e) => render::print_error(&e.to_string()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                tracing::error!("Readline error: {}", e);
                break;
            }
        }
    }

    println!(
        "Analyzed {} image(s) this session. Goodbye!",
        session.total_predictions()
    );
    Ok(())
}

/// Apply one parsed command to the session and print the outcome
///
/// # Errors
///
/// Returns error only for failures outside the session's own error
/// handling; rejected files and failed predictions are printed instead
pub async fn apply_command<C: Classifier>(
    session: &mut SessionController<C>,
    command: SessionCommand,
) -> Result<Flow> {
    match command {
        SessionCommand::Select(path) => {
            if session.state() == SessionState::Predicting {
                render::print_error("A prediction is in progress.");
                return Ok(Flow::Continue);
            }
            match session.select_path(&path).await? {
                SessionState::FileSelected => {
                    if let Some(image) = session.selected() {
                        println!(
                            "{} {} ({} bytes, {})",
                            "Selected".green(),
                            image.file_name,
                            image.size(),
                            image.mime_type
                        );
                    }
                    println!("Type {} to classify it.", "predict".cyan());
                }
                _ => print_session_error(session),
            }
        }
        SessionCommand::Predict => {
            if !session.state().can_predict() {
                render::print_error("Select an image first (select <path>).");
                return Ok(Flow::Continue);
            }
            println!("{}", "Analyzing...".dimmed());
            match session.predict().await? {
                SessionState::Resulted => {
                    if let Some(result) = session.result() {
                        render::print_result(result, session.is_celebrating());
                    }
                }
                _ => print_session_error(session),
            }
        }
        SessionCommand::Reset => {
            session.reset();
            println!("{}", "Ready for a new image.".green());
        }
        SessionCommand::Status => {
            println!(
                "{}",
                render::format_state(
                    session.state(),
                    session.selected().map(|s| s.file_name.as_str()),
                    session.total_predictions(),
                )
            );
            if let Some(message) = session.error() {
                render::print_error(message);
            }
        }
        SessionCommand::History => print_entries(&session.history().load()),
        SessionCommand::ClearHistory => {
            session.history().clear();
            println!("{}", "Prediction history cleared.".green());
        }
        SessionCommand::Help => print_help(),
        SessionCommand::Exit => return Ok(Flow::Exit),
        SessionCommand::Empty => {}
    }

    Ok(Flow::Continue)
}

fn print_session_error<C: Classifier>(session: &SessionController<C>) {
    if let Some(message) = session.error() {
        render::print_error(message);
    }
}

fn print_welcome_banner<C: Classifier>(session: &SessionController<C>) {
    println!();
    println!("{}", "NeuraLens: traffic sign recognition".bold());
    if !session.history().is_available() {
        println!(
            "{}",
            "Prediction history is unavailable; results will not be saved.".yellow()
        );
    }
    println!("Type {} for commands.", "help".cyan());
    println!();
}
