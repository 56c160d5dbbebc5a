use std::path::PathBuf;

use rustyline::{Config, Editor, Result};

use super::Tab;

const HISTORY_FILE: &str = ".fridge-chef_history";

pub fn generate_prompt(tab: Tab) -> String {
    format!("{}> ", tab.label())
}

pub fn rl() -> Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .history_ignore_dups(true)
        .completion_type(rustyline::CompletionType::List)
        .build();
    Editor::with_config(config)
}

pub fn history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(HISTORY_FILE))
}
