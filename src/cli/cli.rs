use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;
use crate::config::DEFAULT_CONFIG_FILE;

/// Shell over a virtual directory tree mirrored onto disk.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Settings file to read
    #[clap(long, short, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory the virtual tree is mirrored onto
    #[clap(long, short)]
    pub base_path: Option<PathBuf>,

    /// Default snapshot file for `save` and `load`
    #[clap(long, short)]
    pub state_file: Option<PathBuf>,

    /// Editor command used by `open`
    #[clap(long, short)]
    pub editor: Option<String>,

    /// Start with an empty root instead of adopting what is on disk
    #[clap(long)]
    pub empty: bool,

    /// Restore the state file on startup
    #[clap(long)]
    pub load: bool,

    /// Run a command and exit instead of starting the interactive shell; may
    /// be given several times
    #[clap(long = "execute", short = 'x', value_name = "COMMAND")]
    pub commands: Vec<String>,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_arguments() {
        let cli = Cli::try_parse_from(["vfs"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert!(cli.base_path.is_none());
        assert!(!cli.empty);
        assert!(cli.commands.is_empty());
    }

    #[test]
    fn execute_may_repeat() {
        let cli = Cli::try_parse_from(["vfs", "-x", "mkdir a", "--execute", "ls", "--empty"]).unwrap();
        assert_eq!(cli.commands, vec!["mkdir a", "ls"]);
        assert!(cli.empty);
    }
}
