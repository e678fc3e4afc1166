//! Tool system for Vibebus
//!
//! Tools are the external capabilities the model may invoke. Each tool has:
//! - A [`ToolKind`] that fixes its name and selects its response formatter
//! - A description and typed parameter specs for the LLM
//! - An execute method returning a [`ToolResult`]

pub mod clock;
pub mod transit;
pub mod weather;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::ToolError;

pub use clock::CurrentTime;
pub use transit::{DigitransitClient, NextDepartures, StopsByName};
pub use weather::Weather;

/// Outcome of a tool execution: a structured payload or an error value
pub type ToolResult = std::result::Result<Value, ToolError>;

/// The closed set of capabilities the agent knows how to run and format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Weather,
    CurrentTime,
    StopsByName,
    NextDepartures,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::Weather,
        ToolKind::CurrentTime,
        ToolKind::StopsByName,
        ToolKind::NextDepartures,
    ];

    /// Name the LLM uses to invoke the tool
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Weather => "get_weather",
            ToolKind::CurrentTime => "get_current_time",
            ToolKind::StopsByName => "get_stops_by_name",
            ToolKind::NextDepartures => "get_next_departures",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ToolError::UnknownTool(s.to_string()))
    }
}

/// JSON schema primitive type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        }
    }
}

/// A single declared tool parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
    pub required: bool,
}

impl ParameterSpec {
    pub fn required(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }
}

/// Tool definition for LLM consumption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    /// Render parameter specs as an object schema
    pub fn from_specs(name: &str, description: &str, specs: &[ParameterSpec]) -> Self {
        let mut properties = Map::new();
        for spec in specs {
            properties.insert(
                spec.name.clone(),
                json!({
                    "type": spec.param_type.as_str(),
                    "description": spec.description,
                }),
            );
        }
        let required: Vec<&str> = specs
            .iter()
            .filter(|s| s.required)
            .map(|s| s.name.as_str())
            .collect();

        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }
}

/// Core trait for all tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Which capability this tool implements
    fn kind(&self) -> ToolKind;

    /// Tool name (used by LLM to invoke)
    fn name(&self) -> &str {
        self.kind().as_str()
    }

    /// Description of what the tool does
    fn description(&self) -> &str;

    /// Declared parameters
    fn parameters(&self) -> Vec<ParameterSpec> {
        Vec::new()
    }

    /// Execute the tool with decoded arguments (always a JSON object)
    async fn execute(&self, params: Value) -> ToolResult;

    /// Convert to tool definition for LLM
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::from_specs(self.name(), self.description(), &self.parameters())
    }
}

/// Registry of available tools, keyed by name
///
/// Read-only once built. Registration problems are programmer errors and
/// panic immediately.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool
    ///
    /// # Panics
    /// On a duplicate tool name, an empty description, or a duplicate or
    /// empty parameter name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        assert!(!name.is_empty(), "tool name must not be empty");
        assert!(
            !self.tools.contains_key(&name),
            "tool {} registered twice",
            name
        );
        assert!(
            !tool.description().trim().is_empty(),
            "tool {} has no description",
            name
        );
        let params = tool.parameters();
        for (i, spec) in params.iter().enumerate() {
            assert!(!spec.name.is_empty(), "tool {} has an unnamed parameter", name);
            assert!(
                params[..i].iter().all(|other| other.name != spec.name),
                "tool {} declares parameter {} twice",
                name,
                spec.name
            );
        }
        self.tools.insert(name, tool);
    }

    /// Builder-style registration
    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Get the tool implementing a capability
    pub fn get_kind(&self, kind: ToolKind) -> Option<Arc<dyn Tool>> {
        self.get(kind.as_str())
    }

    /// List all available tools, ordered by name
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Read an optional string argument, treating blanks as absent
pub(crate) fn str_param<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
