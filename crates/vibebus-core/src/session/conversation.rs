//! Append-only message log with retention trimming

use super::message::{Message, Role};

/// Ordered, role-tagged message log
///
/// The leading system message, when present, survives every trim. Trimming
/// is the only operation that removes entries, and it removes the oldest
/// non-system ones first.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
    max_messages: usize,
}

impl Conversation {
    /// Start a log with its system message
    pub fn new(system_prompt: impl Into<String>, max_messages: usize) -> Self {
        let mut conversation = Self::empty(max_messages);
        conversation.messages.push(Message::system(system_prompt));
        conversation
    }

    /// A log without a system message
    ///
    /// # Panics
    /// If `max_messages` is zero.
    pub fn empty(max_messages: usize) -> Self {
        assert!(max_messages > 0, "max_messages must be positive");
        Self {
            messages: Vec::new(),
            max_messages,
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Drop the oldest non-system messages until the limit holds.
    ///
    /// Returns the number of messages removed.
    pub fn trim(&mut self) -> usize {
        let len = self.messages.len();
        if len <= self.max_messages {
            return 0;
        }
        let excess = len - self.max_messages;
        let start = usize::from(self.has_system_message());
        self.messages.drain(start..start + excess);
        tracing::debug!(removed = excess, kept = self.messages.len(), "Trimmed conversation");
        excess
    }

    fn has_system_message(&self) -> bool {
        self.messages.first().is_some_and(|m| m.role == Role::System)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
