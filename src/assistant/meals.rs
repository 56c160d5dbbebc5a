use regex::Regex;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use super::KitchenAssistant;
use crate::gemini_client::{Content, ContentRequest};
use crate::models::{Meal, Role};

/// Schema for the structured reply: an array of meals.
pub fn meal_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "name": {
                    "type": "STRING",
                    "description": "Name of the meal"
                },
                "description": {
                    "type": "STRING",
                    "description": "One or two sentences describing the meal"
                },
                "ingredients": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "Ingredients needed to cook the meal"
                }
            },
            "required": ["name", "description", "ingredients"]
        }
    })
}

fn suggestion_prompt(ingredients: &str) -> String {
    format!(
        "I have the following ingredients: {}. \
Suggest up to 5 meals I could cook mostly with these. \
For each meal give its name, a short description and the list of ingredients it needs.",
        ingredients
    )
}

impl KitchenAssistant {
    /// Ask for meal ideas built around `ingredients`.
    ///
    /// Never fails: blank input, transport errors and unusable replies all
    /// come back as an empty list.
    pub async fn suggest_meals(&self, ingredients: &str) -> Vec<Meal> {
        let ingredients = ingredients.trim();
        if ingredients.is_empty() {
            return Vec::new();
        }

        let request = ContentRequest {
            system_instruction: None,
            contents: vec![Content::text(Role::User, suggestion_prompt(ingredients))],
            response_schema: Some(meal_schema()),
        };

        match self.backend().generate_content(&request).await {
            Ok(reply) => {
                let meals = parse_meals(&reply);
                info!("Received {} meal suggestions", meals.len());
                meals
            }
            Err(e) => {
                error!("Meal suggestion request failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Parse the structured reply. Anything but a JSON array of meals is empty.
pub fn parse_meals(reply: &str) -> Vec<Meal> {
    let body = strip_code_fence(reply);

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            error!("Failed to parse meal suggestions: {}", e);
            return Vec::new();
        }
    };

    if !value.is_array() {
        warn!("Meal suggestions were not a list; ignoring");
        return Vec::new();
    }

    match serde_json::from_value::<Vec<Meal>>(value) {
        Ok(meals) => meals,
        Err(e) => {
            error!("Meal suggestions had an unexpected shape: {}", e);
            Vec::new()
        }
    }
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Ok(re) = Regex::new(r"^```[A-Za-z]*\s*([\s\S]*?)\s*```$") else {
        return trimmed;
    };
    match re.captures(trimmed).and_then(|captures| captures.get(1)) {
        Some(inner) => inner.as_str(),
        None => trimmed,
    }
}
