use std::sync::Arc;

use tracing::debug;

use super::{AssistantError, KitchenAssistant};
use crate::gemini_client::{Content, ContentRequest, GenerativeBackend};
use crate::models::{ChatMessage, Role};

pub const CHEF_PERSONA: &str = "You are Fridge Chef, a friendly and knowledgeable cooking assistant. \
Help with recipes, techniques, substitutions, meal planning and food storage. \
Keep answers practical and concise, and ask a clarifying question when a request is ambiguous.";

/// A conversation with the model that remembers its own turns.
pub struct ChatSession {
    backend: Arc<dyn GenerativeBackend>,
    system_instruction: String,
    history: Vec<Content>,
}

impl KitchenAssistant {
    /// Open a conversation seeded with `history` and the chef persona.
    pub fn open_chat(&self, history: &[ChatMessage]) -> ChatSession {
        ChatSession::new(self.backend().clone(), history, CHEF_PERSONA)
    }
}

impl ChatSession {
    pub fn new(
        backend: Arc<dyn GenerativeBackend>,
        history: &[ChatMessage],
        system_instruction: &str,
    ) -> Self {
        debug!("Opening chat session with {} prior turns", history.len());
        Self {
            backend,
            system_instruction: system_instruction.to_string(),
            history: history
                .iter()
                .map(|message| Content::text(message.role, message.content.clone()))
                .collect(),
        }
    }

    /// Send one user turn and return the model's reply.
    ///
    /// Both turns join the session history only if the call succeeds.
    pub async fn send(&mut self, text: &str) -> Result<String, AssistantError> {
        let user_turn = Content::text(Role::User, text);

        let mut contents = self.history.clone();
        contents.push(user_turn.clone());

        let request = ContentRequest {
            system_instruction: Some(self.system_instruction.clone()),
            contents,
            response_schema: None,
        };

        let reply = self.backend.generate_content(&request).await?;

        self.history.push(user_turn);
        self.history.push(Content::text(Role::Model, reply.clone()));
        Ok(reply)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini_client::Part;
    use crate::testing::{assistant, FakeBackend};

    fn texts(request: &ContentRequest) -> Vec<(Role, String)> {
        request
            .contents
            .iter()
            .map(|content| match &content.parts[0] {
                Part::Text(text) => (content.role, text.clone()),
                other => panic!("unexpected part {:?}", other),
            })
            .collect()
    }

    #[tokio::test]
    async fn seeds_history_and_persona() {
        let backend = FakeBackend::new();
        backend.reply("Use yoghurt instead.");

        let prior = vec![
            ChatMessage::user("I have no sour cream"),
            ChatMessage::model("What are you making?"),
        ];
        let mut session = assistant(&backend).open_chat(&prior);
        let reply = session.send("Beef stroganoff").await.unwrap();
        assert_eq!(reply, "Use yoghurt instead.");

        let request = backend.last_content_request();
        assert_eq!(request.system_instruction.as_deref(), Some(CHEF_PERSONA));
        assert_eq!(
            texts(&request),
            vec![
                (Role::User, "I have no sour cream".to_string()),
                (Role::Model, "What are you making?".to_string()),
                (Role::User, "Beef stroganoff".to_string()),
            ]
        );
        assert_eq!(session.history_len(), 4);
    }

    #[tokio::test]
    async fn later_turns_carry_earlier_replies() {
        let backend = FakeBackend::new();
        backend.reply("Hello!");
        backend.reply("Try risotto.");

        let mut session = assistant(&backend).open_chat(&[]);
        session.send("Hi").await.unwrap();
        session.send("Dinner idea?").await.unwrap();

        assert_eq!(
            texts(&backend.last_content_request()),
            vec![
                (Role::User, "Hi".to_string()),
                (Role::Model, "Hello!".to_string()),
                (Role::User, "Dinner idea?".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn failed_turn_is_not_remembered() {
        let backend = FakeBackend::new();
        backend.fail_text();

        let mut session = assistant(&backend).open_chat(&[]);
        assert!(session.send("Hi").await.is_err());
        assert_eq!(session.history_len(), 0);
    }
}
