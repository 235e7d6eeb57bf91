use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::cli::Cli;
use crate::config::{Settings, SettingsError};
use crate::ext::BestEffortPathExt;
use crate::external::{EditorLauncher, GitBridge, ToolError};
use crate::filesystem::{Namespace, NamespaceError};
use crate::shell::{
    self, Command, ReplError, Reply, Shell, ShellError, render_error, render_reply,
};

pub struct Application;

impl Application {
    pub async fn run(cli: Cli) -> Result<(), ApplicationError> {
        let settings = Settings::read(&cli.config).await.context(ReadSettingsSnafu)?;
        debug!("Loaded settings: {:?}", settings);
        let config = RuntimeConfig::new(settings, cli);

        let mut shell = Self::build_shell(&config)?;
        info!(
            "Mirroring onto {}",
            shell.namespace().base_path().best_effort_path_display()
        );

        if config.load_state {
            shell
                .execute(Command::Load(None))
                .await
                .context(LoadStateSnafu)?;
        }

        shell::configure_colors();
        if config.commands.is_empty() {
            shell::run_repl(&mut shell, &config.prompt, config.history_file.as_deref())
                .await
                .context(InteractiveShellSnafu)?;
        } else {
            Self::run_batch(&mut shell, &config.commands).await;
        }
        Ok(())
    }

    fn build_shell(config: &RuntimeConfig) -> Result<Shell, ApplicationError> {
        let namespace = if config.adopt_existing {
            Namespace::open(&config.base_path)
        } else {
            Namespace::open_empty(&config.base_path)
        }
        .context(BaseDirectorySnafu)?;

        let git = GitBridge::new(namespace.base_path(), &config.git.remote, &config.git.branch);
        let editor = EditorLauncher::from_command(&config.editor).context(EditorCommandSnafu)?;
        Ok(Shell::new(namespace, git, editor, &config.state_file))
    }

    /// Runs `--execute` commands in order. A failing command is reported and
    /// the batch carries on; `exit` ends it early.
    async fn run_batch(shell: &mut Shell, commands: &[String]) {
        for line in commands {
            match shell.execute_line(line).await {
                Ok(Some(Reply::Exit)) => break,
                Ok(Some(reply)) => println!("{}", render_reply(&reply)),
                Ok(None) => {}
                Err(err) => eprintln!("{}", render_error(&err)),
            }
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while reading settings"))]
    ReadSettingsError { source: SettingsError },
    #[snafu(display("Could not set up the base directory"))]
    BaseDirectoryError { source: NamespaceError },
    #[snafu(display("Invalid editor command"))]
    EditorCommandError { source: ToolError },
    #[snafu(display("Could not restore the saved state"))]
    LoadStateError { source: ShellError },
    #[snafu(display("Critical failure encountered in the interactive shell"))]
    InteractiveShellError { source: ReplError },
}
