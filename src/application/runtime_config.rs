use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::{GitSettings, Settings};

/// Settings file values with the command line flags laid over them.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub base_path: PathBuf,
    pub state_file: PathBuf,
    pub adopt_existing: bool,
    pub load_state: bool,
    pub editor: String,
    pub history_file: Option<PathBuf>,
    pub prompt: String,
    pub git: GitSettings,
    pub commands: Vec<String>,
}

impl RuntimeConfig {
    pub fn new(settings: Settings, cli: Cli) -> Self {
        Self {
            base_path: cli.base_path.unwrap_or(settings.base_path),
            state_file: cli.state_file.unwrap_or(settings.state_file),
            adopt_existing: settings.adopt_existing && !cli.empty,
            load_state: cli.load,
            editor: cli.editor.unwrap_or(settings.editor),
            history_file: settings.history_file,
            prompt: settings.prompt,
            git: settings.git,
            commands: cli.commands,
        }
    }
}
