//! Error types for Vibebus Core

use thiserror::Error;

/// Result type alias using Vibebus Error
pub type Result<T> = std::result::Result<T, Error>;

/// Vibebus error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Tool-specific errors
///
/// Every expected failure of a tool ends up here; executors return these as
/// values and never propagate a fault past their boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("{0} not found in environment variables")]
    MissingCredential(String),

    #[error("{service} API error: {message}")]
    Transport { service: String, message: String },

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl ToolError {
    /// Transport failure against a named upstream service
    pub fn transport(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            service: service.into(),
            message: message.into(),
        }
    }
}
