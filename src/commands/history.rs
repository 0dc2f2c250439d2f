use crate::cli::HistoryCommand;
use crate::commands::render::format_processing_time;
use crate::config::Config;
use crate::error::Result;
use crate::history::{HistoryEntry, HistoryStore};
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history commands
pub fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    let history = HistoryStore::open(&config.history);
    if !history.is_available() {
        tracing::warn!("Prediction history is unavailable (disabled or could not be opened)");
    }

    match command {
        HistoryCommand::List { json } => {
            let entries = history.load();
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print_entries(&entries);
            }
        }
        HistoryCommand::Clear => {
            history.clear();
            println!("{}", "Prediction history cleared.".green());
        }
    }

    Ok(())
}

/// Print history entries as a table, newest first
pub fn print_entries(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("{}", "No predictions yet.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Label".bold(),
        "Confidence".bold(),
        "Time".bold(),
        "Recorded".bold()
    ]);

    for entry in entries {
        let id = entry.id.to_string();
        let id_short = &id[id.len() - 8..];
        let confidence = entry
            .confidence
            .map(|c| format!("{}%", (c * 100.0).round() as u32))
            .unwrap_or_else(|| "-".to_string());
        let time = entry
            .processing_time
            .map(|t| format_processing_time(Some(t)))
            .unwrap_or_else(|| "-".to_string());
        let recorded = entry
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();

        table.add_row(prettytable::row![
            id_short.cyan(),
            truncate_label(&entry.label, 40),
            confidence,
            time,
            recorded
        ]);
    }

    println!("\nRecent Predictions:");
    table.printstd();
    println!();
}

fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() > max_chars {
        let head: String = label.chars().take(max_chars - 3).collect();
        format!("{}...", head)
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_label_short() {
        assert_eq!(truncate_label("Stop", 40), "Stop");
    }

    #[test]
    fn test_truncate_label_long() {
        let label = "Speed limit (120km/h) ahead with an unusually long description";
        let short = truncate_label(label, 20);
        assert_eq!(short.chars().count(), 20);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn test_truncate_label_multibyte() {
        let label = "Überholverbot für Kraftfahrzeuge über 3,5 t";
        let short = truncate_label(label, 10);
        assert_eq!(short, "Überhol...");
    }

    #[test]
    fn test_handle_history_with_disabled_store() {
        let mut config = Config::default();
        config.history.enabled = false;
        assert!(handle_history(&config, HistoryCommand::List { json: true }).is_ok());
        assert!(handle_history(&config, HistoryCommand::Clear).is_ok());
    }

    #[test]
    fn test_print_entries_handles_empty_and_missing_fields() {
        print_entries(&[]);
        let history = HistoryStore::in_memory();
        let entries = history.record("Yield", None, String::new(), None);
        print_entries(&entries);
    }
}
