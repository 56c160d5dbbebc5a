use std::io::Write;
use std::path::{Path, PathBuf};

use eyre::Result;
use tracing::error;

use super::render;
use crate::assistant::{AssistantError, ImageUpload, KitchenAssistant};
use crate::models::Meal;

pub const ANALYZE_FAILED: &str = "Failed to analyze image. Please try again.";

/// Photo in, ingredient list and meal ideas out.
pub struct SuggesterPanel {
    assistant: KitchenAssistant,
    ingredients: Option<String>,
    meals: Vec<Meal>,
    busy: bool,
    error: Option<&'static str>,
}

impl SuggesterPanel {
    pub fn new(assistant: KitchenAssistant) -> Self {
        Self {
            assistant,
            ingredients: None,
            meals: Vec::new(),
            busy: false,
            error: None,
        }
    }

    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    #[cfg(test)]
    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    #[cfg(test)]
    pub fn ingredients(&self) -> Option<&str> {
        self.ingredients.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error
    }

    /// Run the image → ingredients → meals chain. Returns false if a
    /// previous analysis is still in flight.
    pub async fn analyze(&mut self, path: &Path) -> bool {
        if self.busy {
            return false;
        }

        self.busy = true;
        self.error = None;
        self.ingredients = None;
        self.meals.clear();

        match self.run_analysis(path).await {
            Ok((ingredients, meals)) => {
                self.ingredients = Some(ingredients);
                self.meals = meals;
            }
            Err(e) => {
                error!("Image analysis failed: {}", e);
                self.error = Some(ANALYZE_FAILED);
            }
        }

        self.busy = false;
        true
    }

    async fn run_analysis(&self, path: &Path) -> Result<(String, Vec<Meal>), AssistantError> {
        let upload = ImageUpload::from_path(path).await?;
        let ingredients = self.assistant.identify_ingredients(&upload).await?;
        let meals = self.assistant.suggest_meals(&ingredients).await;
        Ok((ingredients, meals))
    }

    pub fn render(&self, out: &mut dyn Write) -> Result<()> {
        if let Some(message) = self.error {
            return render::error(out, message);
        }

        let Some(ingredients) = &self.ingredients else {
            return render::hint(out, "Enter the path to a photo of your fridge or pantry.");
        };

        if ingredients.is_empty() {
            return render::hint(out, "No food identified in that image. Try another photo.");
        }

        render::heading(out, "Ingredients")?;
        writeln!(out, "  {}", ingredients)?;
        writeln!(out)?;

        if self.meals.is_empty() {
            return render::hint(out, "No meal suggestions for these ingredients.");
        }

        render::heading(out, "Meal ideas")?;
        for (idx, meal) in self.meals.iter().enumerate() {
            writeln!(out, "{}. {}", idx + 1, meal.name)?;
            writeln!(out, "   {}", meal.description)?;
            if !meal.ingredients.is_empty() {
                writeln!(out, "   Ingredients: {}", meal.ingredients.join(", "))?;
            }
        }
        Ok(())
    }
}

/// Turn a typed or pasted path into something readable from disk.
///
/// Strips the quotes terminals add to dropped files and expands `~`.
pub fn sanitize_path(path: &str) -> PathBuf {
    let path = path.trim();
    let path = path
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .or_else(|| path.strip_prefix('\'').and_then(|p| p.strip_suffix('\'')))
        .unwrap_or(path);

    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }

    PathBuf::from(path)
}
