pub mod chat;
pub mod image;
pub mod prompt;
pub mod render;
pub mod suggester;

use std::io::Write;
use std::path::{Path, PathBuf};

use eyre::Result;
use rustyline::error::ReadlineError;
use tracing::warn;

use chat::ChatPanel;
use image::ImagePanel;
use prompt::generate_prompt;
use suggester::{sanitize_path, SuggesterPanel};

use crate::assistant::KitchenAssistant;

const WELCOME_TEXT: &str = "
Hi, I'm Fridge Chef. Show me your fridge and I'll tell you what to cook.

Things to try
• Type the path to a photo of your fridge or pantry.
• /chat, then ask how long to rest a steak.
• /image, then describe the dish you want to see.

/help         Show the help dialogue
/quit         Quit the application
";

const HELP_TEXT: &str = "
Fridge Chef

/suggest      Meal ideas from a photo (enter an image path)
/chat         Chat with the cooking assistant
/image        Generate an image from a description
/clear        Clear the chat history
/save [path]  Save the last generated image
/help         Show this help dialogue
/quit         Quit the application
";

/// Which panel the shell is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Suggester,
    Chat,
    Image,
}

impl Tab {
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Suggester => "suggest",
            Tab::Chat => "chat",
            Tab::Image => "image",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The view shell: three panels and the tab that selects between them.
pub struct App {
    output: Box<dyn Write>,
    tab: Tab,
    suggester: SuggesterPanel,
    chat: ChatPanel,
    image: ImagePanel,
    image_dir: PathBuf,
}

impl App {
    pub fn new(output: Box<dyn Write>, assistant: KitchenAssistant, image_dir: PathBuf) -> Self {
        Self {
            output,
            tab: Tab::default(),
            suggester: SuggesterPanel::new(assistant.clone()),
            chat: ChatPanel::new(assistant.clone()),
            image: ImagePanel::new(assistant),
            image_dir,
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub async fn run_interactive(&mut self) -> Result<()> {
        writeln!(self.output, "{}", WELCOME_TEXT)?;

        let mut rl = prompt::rl()?;
        let history = prompt::history_path();
        if let Some(path) = &history {
            // no history yet on first run
            let _ = rl.load_history(path);
        }

        loop {
            let readline = rl.readline(&generate_prompt(self.tab));

            match readline {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line.as_str());

                    match self.handle_input(&line).await {
                        Ok(Flow::Quit) => break,
                        Ok(Flow::Continue) => {}
                        Err(e) => writeln!(self.output, "Error: {}", e)?,
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        if let Some(path) = &history {
            if let Err(e) = rl.save_history(path) {
                warn!("Failed to save history to {}: {}", path.display(), e);
            }
        }

        Ok(())
    }

    pub async fn handle_input(&mut self, input: &str) -> Result<Flow> {
        let input = input.trim();
        let (command, argument) = match input.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (input, ""),
        };

        match command {
            "/quit" | "/exit" => return Ok(Flow::Quit),
            "/help" => writeln!(self.output, "{}", HELP_TEXT)?,
            "/suggest" => self.switch_to(Tab::Suggester)?,
            "/chat" => self.switch_to(Tab::Chat)?,
            "/image" => self.switch_to(Tab::Image)?,
            "/clear" => {
                self.chat.clear();
                writeln!(self.output, "Conversation cleared.")?;
            }
            "/save" => {
                let path = (!argument.is_empty()).then(|| sanitize_path(argument));
                let saved = self.image.save(path.as_deref(), &self.image_dir)?;
                writeln!(self.output, "Saved image to {}", saved.display())?;
            }
            _ if is_unknown_command(command, input) => {
                render::error(&mut self.output, &format!("Unknown command: {}", command))?;
            }
            _ => match self.tab {
                Tab::Suggester => self.suggest(&sanitize_path(input)).await?,
                Tab::Chat => self.chat(input).await?,
                Tab::Image => self.imagine(input, None).await?,
            },
        }

        Ok(Flow::Continue)
    }

    pub fn switch_to(&mut self, tab: Tab) -> Result<()> {
        self.tab = tab;
        render::heading(&mut self.output, &format!("[{}]", tab.label()))?;
        match tab {
            Tab::Suggester => self.suggester.render(&mut self.output),
            Tab::Chat => self.chat.render(&mut self.output),
            Tab::Image => self.image.render(&mut self.output),
        }
    }

    pub async fn suggest(&mut self, path: &Path) -> Result<()> {
        render::status(&mut self.output, "Analyzing image...")?;
        if self.suggester.analyze(path).await {
            self.suggester.render(&mut self.output)?;
        }
        Ok(())
    }

    pub async fn chat(&mut self, text: &str) -> Result<()> {
        if !self.chat.accepts(text) {
            return Ok(());
        }
        render::status(&mut self.output, "Thinking...")?;
        if self.chat.send(text).await {
            self.chat.render_latest(&mut self.output)?;
        }
        Ok(())
    }

    /// Generate an image and write it to `output`, or a timestamped file.
    pub async fn imagine(&mut self, prompt: &str, output: Option<&Path>) -> Result<()> {
        if !self.image.accepts(prompt) {
            return Ok(());
        }
        render::status(&mut self.output, "Generating image...")?;
        if self.image.generate(prompt).await && self.image.image().is_some() {
            self.image.save(output, &self.image_dir)?;
        }
        self.image.render(&mut self.output)
    }

    /// The latest generated image as a data URL, if any.
    pub fn image_data_url(&self) -> Option<String> {
        self.image.image().map(ToString::to_string)
    }

    /// Whether any panel is showing a failure message.
    pub fn has_error(&self) -> bool {
        self.suggester.error().is_some() || self.chat.error().is_some() || self.image.error().is_some()
    }
}

/// A slash word that is neither a known command nor an existing path.
/// Absolute paths also start with '/', so `/fridge.jpg` or `/tmp` pass through.
fn is_unknown_command(command: &str, input: &str) -> bool {
    command.starts_with('/')
        && !command[1..].contains('/')
        && !sanitize_path(input).exists()
}
