//! System prompt management
//!
//! The prompt is the first message of every session and is never trimmed.

/// System prompt configuration and generation
#[derive(Debug, Clone)]
pub struct SystemPrompt {
    base: String,
    /// Additional context appended after the base prompt
    context: Option<String>,
}

impl Default for SystemPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemPrompt {
    /// Create a new system prompt with the default content
    pub fn new() -> Self {
        Self {
            base: DEFAULT_SYSTEM_PROMPT.to_string(),
            context: None,
        }
    }

    /// Create with custom base prompt
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            context: None,
        }
    }

    /// Use the configured prompt when set, otherwise the default
    pub fn from_settings(custom: Option<&str>) -> Self {
        match custom.map(str::trim).filter(|s| !s.is_empty()) {
            Some(base) => Self::with_base(base),
            None => Self::new(),
        }
    }

    /// Mention the stop used when the user gives none
    pub fn with_default_stop(self, stop_id: &str) -> Self {
        self.with_context(format!(
            "\n\nThe user's home stop is {}. Use it when they ask for departures without naming a stop.",
            stop_id
        ))
    }

    /// Add custom context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Build the final system prompt
    pub fn build(&self) -> String {
        match &self.context {
            Some(ctx) => format!("{}{}", self.base, ctx),
            None => self.base.clone(),
        }
    }

    /// Get the base prompt without context
    pub fn base(&self) -> &str {
        &self.base
    }
}

/// Default system prompt
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant for getting around Helsinki. \
You have access to weather information, bus departure times, stop search, and the current time.

- When the user asks for the weather here or right now, call get_weather.
- When the user asks for bus departures or next buses, call get_next_departures. \
If they name a stop, first call get_stops_by_name to find its id.
- When the user asks what time or day it is, call get_current_time.

If a stop search returns several stops, the user sees a numbered list and can reply \
with a number to get departures; you do not need to ask them to pick.

After calling functions, give a short, friendly summary of the information.";
