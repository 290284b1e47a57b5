//! Multi-turn chat sessions

use super::types::{Content, Role, TextRequest};

/// Conversation state for a multi-turn chat
///
/// The session only holds history; sending is left to the caller so the same
/// session works with both [`generate`](super::GenerationClient::generate) and
/// [`generate_stream`](super::GenerationClient::generate_stream).
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    model: Option<String>,
    system_instruction: Option<String>,
    history: Vec<Content>,
}

impl ChatSession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific model for every turn
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the system instruction for every turn
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Completed turns, oldest first
    pub fn history(&self) -> &[Content] {
        &self.history
    }

    /// Number of completed exchanges
    pub fn exchanges(&self) -> usize {
        self.history
            .iter()
            .filter(|c| c.role == Some(Role::Model))
            .count()
    }

    /// Build the request for the next user message
    pub fn request(&self, prompt: impl Into<String>) -> TextRequest {
        let mut request = TextRequest::new(prompt).with_history(self.history.clone());
        request.model = self.model.clone();
        request.system_instruction = self.system_instruction.clone();
        request
    }

    /// Record a finished exchange
    ///
    /// Failed or empty replies are not recorded, so the next request does not
    /// carry a dangling user turn.
    pub fn record(&mut self, prompt: impl Into<String>, reply: impl Into<String>) -> bool {
        let reply = reply.into();
        if reply.trim().is_empty() {
            return false;
        }
        self.history.push(Content::user(prompt));
        self.history.push(Content::model(reply));
        true
    }

    /// Forget all turns, keeping model and system instruction
    pub fn clear(&mut self) {
        self.history.clear();
    }
}
