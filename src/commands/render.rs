//! Terminal rendering of prediction results
//!
//! Formatting helpers return plain strings so they can be tested; the
//! `print_*` wrappers add color and write to stdout.

use crate::client::PredictionResult;
use crate::session::SessionState;
use colored::Colorize;

/// Shown instead of a duration when the server reported no timing
pub const NO_TIMING_TEXT: &str = "⚡ Lightning fast!";

/// Shown under a result that triggered the celebration
pub const CELEBRATION_TEXT: &str = "🎉 Excellent! High confidence prediction! 🎉";

/// Format a processing time in seconds
///
/// Below one second the value is shown in whole milliseconds, otherwise in
/// seconds with two decimals.
///
/// # Examples
///
/// ```
/// use neuralens::commands::render::format_processing_time;
///
/// assert_eq!(format_processing_time(Some(0.25)), "250ms");
/// assert_eq!(format_processing_time(Some(1.5)), "1.50s");
/// ```
pub fn format_processing_time(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) if s < 1.0 => format!("{}ms", (s * 1000.0).round() as u64),
        Some(s) => format!("{:.2}s", s),
        None => NO_TIMING_TEXT.to_string(),
    }
}

/// Format the confidence line, e.g. `92% (Very High)`
pub fn format_confidence(result: &PredictionResult) -> String {
    match (result.confidence_percent(), result.tier()) {
        (Some(percent), Some(tier)) => format!("{}% ({})", percent, tier.label()),
        _ => "unknown".to_string(),
    }
}

/// Result card
///
/// With `color` set the label, confidence, and celebration line carry
/// terminal colors; the text is the same either way.
pub fn format_result(result: &PredictionResult, celebrating: bool, color: bool) -> String {
    let confidence = format_confidence(result);
    let (label, confidence, celebration) = if color {
        let confidence = match result.confidence {
            Some(c) if c >= 0.8 => confidence.green(),
            Some(c) if c >= 0.6 => confidence.yellow(),
            Some(_) => confidence.red(),
            None => confidence.dimmed(),
        };
        (
            result.label.cyan().bold().to_string(),
            confidence.to_string(),
            CELEBRATION_TEXT.magenta().bold().to_string(),
        )
    } else {
        (
            result.label.clone(),
            confidence,
            CELEBRATION_TEXT.to_string(),
        )
    };

    let mut out = String::new();
    out.push_str(&format!("Prediction:      {}\n", label));
    out.push_str(&format!("Confidence:      {}\n", confidence));
    out.push_str(&format!(
        "Processing time: {}\n",
        format_processing_time(result.processing_time)
    ));
    if celebrating {
        out.push_str(&celebration);
        out.push('\n');
    }
    out
}

/// Print a colored result card to stdout
pub fn print_result(result: &PredictionResult, celebrating: bool) {
    println!();
    println!("{}", format_result(result, celebrating, true));
}

/// Print an error message in red
pub fn print_error(message: &str) {
    println!("{}", message.red());
}

/// One-line summary of a session state
pub fn format_state(state: SessionState, file_name: Option<&str>, analyzed: usize) -> String {
    match file_name {
        Some(name) => format!(
            "State: {} | File: {} | Images analyzed: {}",
            state, name, analyzed
        ),
        None => format!("State: {} | Images analyzed: {}", state, analyzed),
    }
}
