//! Vibebus Core - tool-calling dialogue orchestration for a Helsinki commute assistant
//!
//! This crate provides:
//! - Tools for weather, transit departures, stop search and the clock
//! - Pure formatters turning tool results into display text
//! - Per-session conversation state with numbered stop selection
//! - The orchestrator that runs each turn against an LLM backend

pub mod config;
pub mod error;
pub mod formatting;
pub mod orchestration;
pub mod provider;
pub mod session;
pub mod tools;

pub use config::{defaults, Config, ConfigManager};
pub use error::{Error, Result, ToolError};
pub use formatting::{format_tool_result, Formatted};
pub use orchestration::{
    create_standard_tool_registry, Orchestrator, SystemPrompt, ToolRegistryBuilder,
};
pub use provider::{ChatBackend, Completion, GenAIProvider};
pub use session::{Message, PendingSelection, Role, SessionContext, SessionId, StopCandidate};
pub use tools::{Tool, ToolDefinition, ToolKind, ToolRegistry, ToolResult};
