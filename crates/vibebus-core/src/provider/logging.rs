//! LLM request/response logging utilities
//!
//! Set the `LLM_LOG_FILE` environment variable to enable detailed logging
//! of all LLM requests and responses to a JSON-lines file.
//!
//! Example: `LLM_LOG_FILE=/tmp/llm.log vibebus`

use serde_json::json;
use std::io::Write;
use tracing::{debug, warn};

use super::Completion;
use crate::session::Message;
use crate::tools::ToolDefinition;

pub const LOG_FILE_ENV: &str = "LLM_LOG_FILE";

/// Configuration for what to include in the log entry
#[derive(Default)]
pub struct LogConfig<'a> {
    /// The model used for this request
    pub model: &'a str,
    /// Messages in the request
    pub messages: &'a [Message],
    /// Tools available for the request
    pub tools: Option<&'a [ToolDefinition]>,
    /// Parsed completion result
    pub result: Option<&'a Completion>,
    /// Error message if the request failed
    pub error: Option<&'a str>,
}

/// Build the JSON entry for one interaction
pub fn log_entry(config: &LogConfig<'_>) -> serde_json::Value {
    json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "model": config.model,
        "request": {
            "messages": config.messages,
            "message_count": config.messages.len(),
            "tools": config.tools.map(|t| t.iter().map(|tool| json!({
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters
            })).collect::<Vec<_>>()),
            "tool_count": config.tools.map(|t| t.len()).unwrap_or(0),
        },
        "response": config.result.map(|r| json!({
            "type": if r.has_tool_calls() { "tool_calls" } else { "message" },
            "content": r.content,
            "tool_calls": r.tool_calls,
        })),
        "error": config.error,
    })
}

/// Log an LLM request/response interaction to file if LLM_LOG_FILE is set
pub fn log_llm_interaction(config: LogConfig<'_>) {
    let log_file = match std::env::var(LOG_FILE_ENV) {
        Ok(path) => path,
        Err(_) => return, // No logging if env var not set
    };

    let entry = log_entry(&config);

    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
    {
        Ok(mut file) => {
            if let Err(e) = writeln!(file, "{}", entry) {
                warn!("Failed to write to LLM log file: {}", e);
            }
        }
        Err(e) => {
            warn!("Failed to open LLM log file {}: {}", log_file, e);
        }
    }

    debug!("Logged LLM interaction to {}", log_file);
}
