//! LLM chat backend abstraction
//!
//! The orchestrator only sees [`ChatBackend`]. The production implementation
//! talks to OpenRouter's OpenAI-compatible endpoint through genai.

mod genai_provider;
mod logging;

pub use genai_provider::GenAIProvider;
pub use logging::{log_llm_interaction, LogConfig};

use async_trait::async_trait;

use crate::error::Result;
use crate::session::{Message, ToolInvocationRequest};
use crate::tools::ToolDefinition;

/// Response from a completion: text, tool calls, or both
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    /// Text content from the assistant (may be present even with tool calls)
    pub content: Option<String>,
    /// Requested tool invocations, in the order the model emitted them
    pub tool_calls: Vec<ToolInvocationRequest>,
}

impl Completion {
    /// Plain text reply
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Reply that requests tools
    pub fn with_tool_calls(tool_calls: Vec<ToolInvocationRequest>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }

    /// Check if this result has any tool calls
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Check if this result has text content
    pub fn has_content(&self) -> bool {
        self.content.as_ref().is_some_and(|c| !c.is_empty())
    }
}

/// A chat completion endpoint with automatic tool selection
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Model identifier, for logs and the banner
    fn model(&self) -> &str;

    /// Complete over the full message log with the given tools on offer
    async fn complete(&self, messages: &[Message], tools: &[ToolDefinition]) -> Result<Completion>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_flags() {
        let c = Completion::text("hi");
        assert!(c.has_content());
        assert!(!c.has_tool_calls());

        let c = Completion::with_tool_calls(vec![ToolInvocationRequest::new(
            "call_1",
            "get_weather",
            serde_json::json!({}),
        )]);
        assert!(!c.has_content());
        assert!(c.has_tool_calls());

        assert!(!Completion::text("").has_content());
    }
}
