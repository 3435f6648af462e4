//! Common CLI output utilities.
//!
//! This module provides centralized output formatting for CLI commands,
//! supporting both JSON and human-readable text formats.

use serde::{Deserialize, Serialize};

/// JSON output for errors.
///
/// This structure is used to serialize error messages to JSON format
/// for machine-readable output.
///
/// # Examples
///
/// ```
/// use keyrx_daemon::cli::common::ErrorOutput;
/// use serde_json;
///
/// let error = ErrorOutput {
///     success: false,
///     error: "File not found".to_string(),
///     code: 404,
/// };
/// let json = serde_json::to_string(&error).unwrap();
/// assert!(json.contains("\"success\":false"));
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorOutput {
    /// Whether the operation succeeded
    pub success: bool,
    /// Error message
    pub error: String,
    /// Error code
    pub code: u32,
}

/// Output a successful result.
///
/// When `json` is true, outputs the data as JSON to stdout.
/// When `json` is false, the caller is responsible for formatting
/// and outputting human-readable text.
///
/// # Arguments
///
/// * `data` - The data to output (must implement Serialize)
/// * `json` - Whether to output as JSON
///
/// # Examples
///
/// ```
/// use keyrx_daemon::cli::common::output_success;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Result {
///     status: String,
/// }
///
/// let result = Result { status: "ok".to_string() };
/// output_success(&result, true);  // Outputs JSON to stdout
/// ```
///
/// # Panics
///
/// Panics if serialization fails, which should only happen if the data
/// structure contains non-serializable types.
pub fn output_success<T: Serialize>(data: &T, json: bool) {
    if json {
        // Serialize to JSON and output to stdout
        match serde_json::to_string(data) {
            Ok(json_str) => println!("{}", json_str),
            Err(e) => {
                // This should never happen with proper Serialize implementations
                eprintln!("Internal error: Failed to serialize output: {}", e);
                std::process::exit(1);
            }
        }
    }
    // For non-JSON mode, caller handles formatting and output
}

/// Output an error message.
///
/// When `json` is true, outputs an ErrorOutput structure as JSON to stdout.
/// When `json` is false, outputs the error message to stderr with "Error: " prefix.
///
/// # Arguments
///
/// * `message` - The error message to display
/// * `code` - Error code (used in JSON output)
/// * `json` - Whether to output as JSON
///
/// # Examples
///
/// ```
/// use keyrx_daemon::cli::common::output_error;
///
/// output_error("Configuration file not found", 404, false);
/// // Outputs to stderr: Error: Configuration file not found
///
/// output_error("Configuration file not found", 404, true);
/// // Outputs to stdout: {"success":false,"error":"Configuration file not found","code":404}
/// ```
pub fn output_error(message: &str, code: u32, json: bool) {
    if json {
        let output = ErrorOutput {
            success: false,
            error: message.to_string(),
            code,
        };
        // Output to stdout for consistency with success outputs
        match serde_json::to_string(&output) {
            Ok(json_str) => println!("{}", json_str),
            Err(_) => {
                // Fallback to plain text if JSON serialization fails
                eprintln!("Error: {}", message);
            }
        }
    } else {
        eprintln!("Error: {}", message);
    }
}

/// Output a list of items.
///
/// When `json` is true, outputs the items as a JSON array to stdout.
/// When `json` is false, the caller is responsible for formatting
/// and outputting human-readable text.
///
/// # Arguments
///
/// * `items` - Vector of items to output (must implement Serialize)
/// * `json` - Whether to output as JSON
///
/// # Examples
///
/// ```
/// use keyrx_daemon::cli::common::output_list;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Item {
///     name: String,
///     value: i32,
/// }
///
/// let items = vec![
///     Item { name: "first".to_string(), value: 1 },
///     Item { name: "second".to_string(), value: 2 },
/// ];
/// output_list(&items, true);  // Outputs JSON array to stdout
/// ```
///
/// # Panics
///
/// Panics if serialization fails, which should only happen if the item
/// structure contains non-serializable types.
pub fn output_list<T: Serialize>(items: &[T], json: bool) {
    if json {
        // Serialize the entire list as a JSON array
        match serde_json::to_string(items) {
            Ok(json_str) => println!("{}", json_str),
            Err(e) => {
                // This should never happen with proper Serialize implementations
                eprintln!("Internal error: Failed to serialize output: {}", e);
                std::process::exit(1);
            }
        }
    }
    // For non-JSON mode, caller handles formatting and output
}
