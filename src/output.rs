// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports human-readable and JSON output modes.

use serde::Serialize;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly key/value lines
    Normal,
    /// One JSON document per result, for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    /// Print a result: `lines` in normal mode, `value` as JSON otherwise.
    pub fn result<T: Serialize>(&self, value: &T, lines: &[(&str, String)]) {
        match self.mode {
            OutputMode::Normal => {
                let width = lines.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
                for (key, val) in lines {
                    println!("{key:<width$}  {val}");
                }
            }
            OutputMode::Json => match serde_json::to_string(value) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("Error: failed to encode result: {e}"),
            },
        }
    }

    /// Print a progress or confirmation message (suppressed in JSON mode).
    pub fn message(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Error: {message}"),
            OutputMode::Json => {
                let event = JsonError {
                    event: "error",
                    message,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }
}

#[derive(Serialize)]
struct JsonError<'a> {
    event: &'a str,
    message: &'a str,
}
