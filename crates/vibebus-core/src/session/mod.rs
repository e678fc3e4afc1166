//! Session state
//!
//! A session owns everything that survives between turns: the message log
//! and the pending stop selection. Nothing here is shared between sessions.

mod conversation;
mod message;
mod selection;

#[cfg(test)]
mod proptests;

pub use conversation::Conversation;
pub use message::{Message, Role, ToolInvocationRequest};
pub use selection::{PendingSelection, SelectionUpdate, StopCandidate, TurnRoute};

/// Session identifier
pub type SessionId = String;

/// Per-chat state passed into every orchestrator operation
#[derive(Debug, Clone)]
pub struct SessionContext {
    id: SessionId,
    pub conversation: Conversation,
    pub pending: PendingSelection,
}

impl SessionContext {
    /// Create a new session seeded with its system prompt
    pub fn new(system_prompt: impl Into<String>, max_messages: usize) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            conversation: Conversation::new(system_prompt, max_messages),
            pending: PendingSelection::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}
