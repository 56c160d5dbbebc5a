use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use eyre::{Result, WrapErr};
use tracing::{error, info};

use super::render;
use crate::assistant::{DataUrl, KitchenAssistant};

pub const GENERATE_FAILED: &str = "Failed to generate image. Please try again.";

pub struct ImagePanel {
    assistant: KitchenAssistant,
    prompt: Option<String>,
    image: Option<DataUrl>,
    saved_to: Option<PathBuf>,
    busy: bool,
    error: Option<&'static str>,
}

impl ImagePanel {
    pub fn new(assistant: KitchenAssistant) -> Self {
        Self {
            assistant,
            prompt: None,
            image: None,
            saved_to: None,
            busy: false,
            error: None,
        }
    }

    pub fn image(&self) -> Option<&DataUrl> {
        self.image.as_ref()
    }

    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error
    }

    /// Whether `generate` would act on `prompt` right now.
    pub fn accepts(&self, prompt: &str) -> bool {
        !prompt.trim().is_empty() && !self.busy
    }

    /// Generate an image for `prompt`. Returns false when nothing was sent.
    pub async fn generate(&mut self, prompt: &str) -> bool {
        if !self.accepts(prompt) {
            return false;
        }
        let prompt = prompt.trim();

        self.busy = true;
        self.error = None;
        self.image = None;
        self.saved_to = None;
        self.prompt = Some(prompt.to_string());

        match self.assistant.generate_image(prompt).await {
            Ok(image) => self.image = Some(image),
            Err(e) => {
                error!("Image generation failed: {}", e);
                self.error = Some(GENERATE_FAILED);
            }
        }

        self.busy = false;
        true
    }

    /// Write the current image to `path`, or to a timestamped file in `dir`.
    pub fn save(&mut self, path: Option<&Path>, dir: &Path) -> Result<PathBuf> {
        let Some(image) = &self.image else {
            eyre::bail!("No image to save yet");
        };

        let path = match path {
            Some(path) => path.to_path_buf(),
            None => dir.join(default_file_name(image)),
        };

        let bytes = image.decode()?;
        std::fs::write(&path, bytes)
            .wrap_err_with(|| format!("Failed to write image to {}", path.display()))?;

        info!("Saved image to {}", path.display());
        self.saved_to = Some(path.clone());
        Ok(path)
    }

    pub fn render(&self, out: &mut dyn Write) -> Result<()> {
        if let Some(message) = self.error {
            return render::error(out, message);
        }

        let (Some(prompt), Some(image)) = (&self.prompt, &self.image) else {
            return render::hint(out, "Describe a dish and I'll picture it.");
        };

        render::heading(out, "Generated image")?;
        writeln!(out, "  Prompt: {}", prompt)?;
        writeln!(out, "  Format: {}", image.mime_type())?;
        match &self.saved_to {
            Some(path) => writeln!(out, "  Saved to: {}", path.display())?,
            None => render::hint(out, "  Use /save [path] to write it to disk.")?,
        }
        Ok(())
    }
}

fn default_file_name(image: &DataUrl) -> String {
    format!(
        "fridge-chef-{}.{}",
        Local::now().format("%Y%m%d-%H%M%S"),
        image.extension()
    )
}
