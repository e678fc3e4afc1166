//! Message types for the conversation log

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// The role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Result of a tool invocation
    Tool,
}

/// A model-issued request to invoke a named tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationRequest {
    /// Opaque correlation token chosen by the model
    pub id: String,
    pub tool_name: String,
    /// Arguments as the model sent them, possibly still a serialized string
    pub arguments: Value,
}

impl ToolInvocationRequest {
    pub fn new(id: impl Into<String>, tool_name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            arguments,
        }
    }

    /// Decode the argument blob into a JSON object
    ///
    /// Models send arguments either as an object or as a JSON-encoded
    /// string; an absent or empty blob means no arguments.
    pub fn decode_arguments(&self) -> Result<Value, ToolError> {
        let decoded = match &self.arguments {
            Value::Null => return Ok(Value::Object(Default::default())),
            Value::String(raw) if raw.trim().is_empty() => {
                return Ok(Value::Object(Default::default()));
            }
            Value::String(raw) => serde_json::from_str::<Value>(raw).map_err(|e| {
                ToolError::InvalidParams(format!("arguments for {} are not valid JSON: {}", self.tool_name, e))
            })?,
            other => other.clone(),
        };

        match decoded {
            Value::Object(_) => Ok(decoded),
            Value::Null => Ok(Value::Object(Default::default())),
            other => Err(ToolError::InvalidParams(format!(
                "arguments for {} must be an object, got {}",
                self.tool_name, other
            ))),
        }
    }
}

/// One entry of the conversation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    /// Absent for assistant messages that only announce tool calls
    pub content: Option<String>,
    /// For tool messages: the request this result answers
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tool_call_id: Option<String>,
    /// For assistant messages: requested invocations, in order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tool_calls: Vec<ToolInvocationRequest>,
}

impl Message {
    fn new(role: Role, content: Option<String>) -> Self {
        Self {
            role,
            content,
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, Some(content.into()))
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, Some(content.into()))
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, Some(content.into()))
    }

    /// Assistant message announcing tool calls
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolInvocationRequest>) -> Self {
        Self {
            tool_calls,
            ..Self::new(Role::Assistant, content.filter(|c| !c.is_empty()))
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new(Role::Tool, Some(content.into()))
        }
    }

    /// Text content, empty when absent
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
