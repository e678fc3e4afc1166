//! Orchestration: the dialogue protocol and what it is assembled from
//!
//! - System prompt
//! - Standard tool registry
//! - The per-turn orchestrator

mod orchestrator;
mod system_prompt;
mod tool_registry;

pub use orchestrator::{Orchestrator, EMPTY_REPLY};
pub use system_prompt::{SystemPrompt, DEFAULT_SYSTEM_PROMPT};
pub use tool_registry::{create_standard_tool_registry, ToolRegistryBuilder};
