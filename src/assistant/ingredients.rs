use tracing::info;

use super::{AssistantError, ImageUpload, KitchenAssistant};
use crate::gemini_client::{Content, ContentRequest, Part};
use crate::models::Role;

/// Reply the model is told to give when the photo shows no food.
pub const NO_FOOD_SENTINEL: &str = "NONE";

const IDENTIFY_INSTRUCTION: &str = "Identify the food ingredients visible in this image. \
Reply with a comma-separated list of ingredient names and nothing else. \
If you cannot see any food, reply with exactly NONE.";

impl KitchenAssistant {
    /// Ask the vision model which ingredients are in the photo.
    ///
    /// Returns an empty string when no food was identified.
    pub async fn identify_ingredients(&self, upload: &ImageUpload) -> Result<String, AssistantError> {
        let request = ContentRequest {
            system_instruction: None,
            contents: vec![Content {
                role: Role::User,
                parts: vec![upload.to_part(), Part::Text(IDENTIFY_INSTRUCTION.to_string())],
            }],
            response_schema: None,
        };

        let reply = self.backend().generate_content(&request).await?;
        let ingredients = normalize_ingredients(&reply);
        if ingredients.is_empty() {
            info!("No food identified in image");
        } else {
            info!("Identified ingredients: {}", ingredients);
        }
        Ok(ingredients)
    }
}

fn normalize_ingredients(reply: &str) -> String {
    let trimmed = reply.trim();
    let bare = trimmed.trim_end_matches('.');
    if bare.eq_ignore_ascii_case(NO_FOOD_SENTINEL) {
        return String::new();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assistant, FakeBackend};

    fn upload() -> ImageUpload {
        ImageUpload {
            mime_type: "image/png",
            bytes: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn sends_image_then_instruction_and_trims_reply() {
        let backend = FakeBackend::new();
        backend.reply("  eggs, milk, spinach \n");

        let text = assistant(&backend).identify_ingredients(&upload()).await.unwrap();
        assert_eq!(text, "eggs, milk, spinach");

        let request = backend.last_content_request();
        assert_eq!(request.contents.len(), 1);
        let parts = &request.contents[0].parts;
        assert!(matches!(&parts[0], Part::InlineData { mime_type, data } if mime_type == "image/png" && data == "AQID"));
        assert!(matches!(&parts[1], Part::Text(text) if text.contains("ingredient")));
        assert!(request.response_schema.is_none());
    }

    #[tokio::test]
    async fn no_food_yields_empty_text() {
        let backend = FakeBackend::new();
        backend.reply("None.");
        backend.reply("   ");

        let assistant = assistant(&backend);
        assert_eq!(assistant.identify_ingredients(&upload()).await.unwrap(), "");
        assert_eq!(assistant.identify_ingredients(&upload()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn service_failure_propagates() {
        let backend = FakeBackend::new();
        backend.fail_text();
        let err = assistant(&backend).identify_ingredients(&upload()).await.unwrap_err();
        assert!(matches!(err, AssistantError::Gemini(_)));
    }
}
