mod assistant;
mod cli;
mod config;
mod gemini_client;
mod models;
#[cfg(test)]
mod testing;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use eyre::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use crate::assistant::KitchenAssistant;
use crate::cli::{App, Tab};
use crate::config::Config;
use crate::gemini_client::GeminiClient;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Gemini model used for vision, suggestions and chat
    #[arg(long, global = true)]
    text_model: Option<String>,

    /// Imagen model used for image generation
    #[arg(long, global = true)]
    image_model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Identify the ingredients in a photo and suggest meals
    Suggest {
        /// Photo of a fridge or pantry (png, jpeg, webp, heic)
        image: PathBuf,
    },

    /// Chat with the cooking assistant
    Chat {
        /// Send a single message instead of starting a session
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Generate an image from a description
    Imagine {
        /// What to picture
        prompt: String,

        /// Where to write the image (defaults to a timestamped file here)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also print the image as a data URL
        #[arg(long)]
        data_url: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Fridge Chef");

    let config = match Config::from_env() {
        Ok(config) => config.with_overrides(cli.text_model, cli.image_model),
        Err(e) => {
            writeln!(io::stdout(), "Failed to initialize Gemini client: {}", e)?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let assistant = KitchenAssistant::new(Arc::new(GeminiClient::new(&config)));
    let mut app = App::new(Box::new(io::stdout()), assistant, std::env::current_dir()?);

    match cli.command {
        Some(Commands::Suggest { image }) => {
            app.suggest(&image).await?;
        }
        Some(Commands::Chat { input: Some(input) }) => {
            app.chat(&input).await?;
        }
        Some(Commands::Chat { input: None }) => {
            app.switch_to(Tab::Chat)?;
            app.run_interactive().await?;
            return Ok(ExitCode::SUCCESS);
        }
        Some(Commands::Imagine {
            prompt,
            output,
            data_url,
        }) => {
            app.imagine(&prompt, output.as_deref()).await?;
            if data_url {
                if let Some(url) = app.image_data_url() {
                    writeln!(io::stdout(), "{}", url)?;
                }
            }
        }
        None => {
            app.run_interactive().await?;
            return Ok(ExitCode::SUCCESS);
        }
    }

    if app.has_error() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
