pub mod conversation_state;

use std::io::Write;

use eyre::Result;
use tracing::{debug, error};

use conversation_state::ConversationState;

use super::render;
use crate::assistant::{ChatSession, KitchenAssistant};
use crate::models::Role;

pub const CHAT_FAILED: &str = "Failed to connect to the chat assistant. Please try again.";

/// Chat with the cooking assistant.
///
/// The session with the service is opened on the first message and kept for
/// as long as the panel lives (or until `/clear`).
pub struct ChatPanel {
    assistant: KitchenAssistant,
    conversation_state: ConversationState,
    session: Option<ChatSession>,
    sessions_opened: usize,
    busy: bool,
    error: Option<&'static str>,
}

impl ChatPanel {
    pub fn new(assistant: KitchenAssistant) -> Self {
        Self {
            assistant,
            conversation_state: ConversationState::new(),
            session: None,
            sessions_opened: 0,
            busy: false,
            error: None,
        }
    }

    #[cfg(test)]
    pub fn messages(&self) -> &[crate::models::ChatMessage] {
        self.conversation_state.get_messages()
    }

    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error
    }

    #[cfg(test)]
    pub fn sessions_opened(&self) -> usize {
        self.sessions_opened
    }

    /// Whether `send` would act on `text` right now.
    pub fn accepts(&self, text: &str) -> bool {
        !text.trim().is_empty() && !self.busy
    }

    /// Send one message. Returns false when nothing was sent.
    pub async fn send(&mut self, text: &str) -> bool {
        if !self.accepts(text) {
            return false;
        }
        let text = text.trim();

        self.busy = true;
        self.error = None;
        self.conversation_state.add_user_message(text);

        let assistant = &self.assistant;
        let history = self.conversation_state.prior_turns();
        let opened = &mut self.sessions_opened;
        let session = self.session.get_or_insert_with(|| {
            *opened += 1;
            debug!("Opening chat session #{}", opened);
            assistant.open_chat(history)
        });

        let result = session.send(text).await;
        debug!("Chat session holds {} turns", session.history_len());

        match result {
            Ok(reply) => self.conversation_state.add_model_message(&reply),
            Err(e) => {
                error!("Chat request failed: {}", e);
                self.error = Some(CHAT_FAILED);
            }
        }

        self.busy = false;
        true
    }

    /// Forget the transcript and the session.
    pub fn clear(&mut self) {
        self.conversation_state.clear();
        self.session = None;
        self.error = None;
    }

    /// Print the whole transcript.
    pub fn render(&self, out: &mut dyn Write) -> Result<()> {
        if self.conversation_state.is_empty() {
            render::hint(out, "Ask the chef anything about cooking.")?;
        }
        for message in self.conversation_state.get_messages() {
            render::turn(out, message.role, &message.content)?;
        }
        if let Some(message) = self.error {
            render::error(out, message)?;
        }
        Ok(())
    }

    /// Print only the outcome of the latest round trip.
    pub fn render_latest(&self, out: &mut dyn Write) -> Result<()> {
        if let Some(message) = self.error {
            return render::error(out, message);
        }
        if let Some(last) = self.conversation_state.last() {
            if last.role == Role::Model {
                render::turn(out, last.role, &last.content)?;
            }
        }
        Ok(())
    }
}
