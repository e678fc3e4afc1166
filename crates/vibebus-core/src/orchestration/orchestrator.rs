//! Turn-by-turn dialogue protocol
//!
//! A turn either resolves a pending numbered stop selection locally, or goes
//! through the model: one completion, sequential tool dispatch with result
//! reinjection, then a follow-up completion.
//!
//! Model turns are built on a draft copy of the session and committed only
//! when every LLM call succeeded, so a failed turn leaves no partial messages.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::error::{Result, ToolError};
use crate::formatting::{format_tool_result, Formatted};
use crate::provider::ChatBackend;
use crate::session::{Message, SessionContext, StopCandidate, ToolInvocationRequest, TurnRoute};
use crate::tools::{ToolDefinition, ToolKind, ToolRegistry, ToolResult};

/// Said when a completion carries no text
pub const EMPTY_REPLY: &str = "Sorry, I couldn't put an answer together. Please try again.";

/// Drives turns for any number of independent sessions
pub struct Orchestrator {
    backend: Arc<dyn ChatBackend>,
    registry: ToolRegistry,
    definitions: Vec<ToolDefinition>,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn ChatBackend>, registry: ToolRegistry) -> Self {
        let definitions = registry.list();
        Self {
            backend,
            registry,
            definitions,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Process one user turn to completion and return the reply
    ///
    /// Never fails: LLM errors come back as `"Error: <message>"` and leave the
    /// session exactly as it was before the turn.
    pub async fn handle_turn(&self, ctx: &mut SessionContext, input: &str) -> String {
        match ctx.pending.route(input) {
            TurnRoute::Selection { index, candidate } => {
                info!(session = %ctx.id(), index, stop = %candidate.id, "Resolving stop selection");
                self.resolve_selection(ctx, input, &candidate).await
            }
            TurnRoute::Model => match self.consult_model(ctx, input).await {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(session = %ctx.id(), error = %e, "Turn failed");
                    format!("Error: {}", e)
                }
            },
        }
    }

    /// Departures for a chosen candidate, with no model involvement
    async fn resolve_selection(
        &self,
        ctx: &mut SessionContext,
        input: &str,
        candidate: &StopCandidate,
    ) -> String {
        let kind = ToolKind::NextDepartures;
        let arguments = json!({ "stop_id": candidate.id });
        let result = self.execute(kind.as_str(), arguments.clone()).await;
        let formatted = format_tool_result(kind.as_str(), &arguments, &result);

        ctx.conversation.push(Message::user(input));
        ctx.conversation.push(Message::assistant(formatted.text.clone()));
        ctx.pending.clear();
        ctx.conversation.trim();
        formatted.text
    }

    async fn consult_model(&self, ctx: &mut SessionContext, input: &str) -> Result<String> {
        let mut conversation = ctx.conversation.clone();
        let mut pending = ctx.pending.clone();

        conversation.push(Message::user(input));
        conversation.trim();

        debug!(session = %ctx.id(), messages = conversation.len(), "Requesting completion");
        let first = self
            .backend
            .complete(conversation.messages(), &self.definitions)
            .await?;

        let reply = if first.has_tool_calls() {
            let calls = first.tool_calls;
            info!(
                session = %ctx.id(),
                tools = ?calls.iter().map(|c| c.tool_name.as_str()).collect::<Vec<_>>(),
                "Model requested tools"
            );
            conversation.push(Message::assistant_tool_calls(first.content, calls.clone()));

            for call in &calls {
                let formatted = self.dispatch(call).await;
                pending.apply(formatted.selection);
                conversation.push(Message::tool_result(call.id.clone(), formatted.text));
            }

            let second = self
                .backend
                .complete(conversation.messages(), &self.definitions)
                .await?;
            if second.has_tool_calls() {
                warn!(
                    session = %ctx.id(),
                    count = second.tool_calls.len(),
                    "Ignoring chained tool calls in follow-up completion"
                );
            }
            second.content
        } else {
            first.content
        };
        let reply = reply
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| EMPTY_REPLY.to_string());

        conversation.push(Message::assistant(reply.clone()));
        conversation.trim();

        ctx.conversation = conversation;
        ctx.pending = pending;
        Ok(reply)
    }

    /// Run one requested invocation and format its result
    async fn dispatch(&self, call: &ToolInvocationRequest) -> Formatted {
        let (arguments, result) = match call.decode_arguments() {
            Ok(arguments) => {
                let result = self.execute(&call.tool_name, arguments.clone()).await;
                (arguments, result)
            }
            Err(e) => (Value::Object(Map::new()), Err(e)),
        };

        if let Err(e) = &result {
            debug!(tool = %call.tool_name, call_id = %call.id, error = %e, "Tool returned an error");
        }
        format_tool_result(&call.tool_name, &arguments, &result)
    }

    async fn execute(&self, name: &str, arguments: Value) -> ToolResult {
        match self.registry.get(name) {
            Some(tool) => tool.execute(arguments).await,
            None => Err(ToolError::UnknownTool(name.to_string())),
        }
    }
}
