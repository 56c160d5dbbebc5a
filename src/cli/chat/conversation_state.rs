use crate::models::ChatMessage;

/// Chat turns in the order they happened.
pub struct ConversationState {
    messages: Vec<ChatMessage>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    pub fn add_user_message(&mut self, message: &str) {
        self.messages.push(ChatMessage::user(message));
    }

    pub fn add_model_message(&mut self, message: &str) {
        self.messages.push(ChatMessage::model(message));
    }

    pub fn get_messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Every turn except the newest one.
    pub fn prior_turns(&self) -> &[ChatMessage] {
        let len = self.messages.len();
        &self.messages[..len.saturating_sub(1)]
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
