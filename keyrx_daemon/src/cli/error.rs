//! Formats a [`DaemonError`] for CLI output, either colored text or JSON.

use colored::Colorize;
use serde::Serialize;

use crate::error::{ConfigError, DaemonError, IpcError, PlatformError};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct JsonErrorResponse {
    pub success: bool,
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

pub fn format_cli_error(error: &DaemonError, json: bool) -> String {
    if json {
        format_json_error(error)
    } else {
        format_human_error(error)
    }
}

pub fn format_json_error(error: &DaemonError) -> String {
    let response = JsonErrorResponse {
        success: false,
        error_type: error_type(error).to_string(),
        message: error.to_string(),
    };
    serde_json::to_string(&response)
        .unwrap_or_else(|_| r#"{"success":false,"type":"internal","message":"failed to serialize error"}"#.to_string())
}

pub fn format_human_error(error: &DaemonError) -> String {
    let mut output = format!("{} [{}]\n  {}\n", "Error:".red().bold(), error_type(error).yellow(), error);
    if let Some(suggestion) = suggestion(error) {
        output.push_str(&format!("\n{}\n  {}\n", "Suggestion:".green().bold(), suggestion));
    }
    output
}

fn error_type(error: &DaemonError) -> &'static str {
    match error {
        DaemonError::Platform(_) => "platform",
        DaemonError::Config(_) => "config",
        DaemonError::Ipc(_) => "ipc",
        DaemonError::Signal(_) => "signal",
        DaemonError::Runtime(_) => "runtime",
        _ => "unknown",
    }
}

fn suggestion(error: &DaemonError) -> Option<&'static str> {
    match error {
        DaemonError::Platform(PlatformError::PermissionDenied(_)) => {
            Some("add your user to the 'input' group, or run with elevated privileges")
        }
        DaemonError::Config(ConfigError::NotFound(_)) => {
            Some("compile a configuration with `keyrx-compiler` first, or pass --config")
        }
        DaemonError::Ipc(IpcError::SocketNotFound(_)) => Some("is the daemon running? start it with `keyrx run`"),
        _ => None,
    }
}
