use std::path::PathBuf;

use snafu::Snafu;
use tracing::debug;

use crate::ext::BestEffortPathExt;
use crate::external::{EditorLauncher, GitBridge, GitOperation, ToolError};
use crate::filesystem::{Namespace, NamespaceError};
use crate::shell::command::{self, Command, CommandParseError, GitCommand};
use crate::snapshot::{SnapshotError, SnapshotStore, SnapshotStoreError};

/// Outcome of a successful command, rendered by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Done(String),
    Listing(Vec<String>),
    Text(String),
    Help,
    Exit,
}

/// Dispatches commands to the namespace and the external tools.
pub struct Shell {
    namespace: Namespace,
    git: GitBridge,
    editor: EditorLauncher,
    state_file: PathBuf,
}

impl Shell {
    pub fn new(
        namespace: Namespace,
        git: GitBridge,
        editor: EditorLauncher,
        state_file: impl Into<PathBuf>,
    ) -> Self {
        Shell {
            namespace,
            git,
            editor,
            state_file: state_file.into(),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn prompt(&self, prefix: &str) -> String {
        format!("{prefix}:{}> ", self.namespace.cursor_path())
    }

    /// Parses and runs one input line. Blank lines produce no reply.
    pub async fn execute_line(&mut self, line: &str) -> Result<Option<Reply>, ShellError> {
        match command::parse(line)? {
            Some(command) => self.execute(command).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn execute(&mut self, command: Command) -> Result<Reply, ShellError> {
        debug!("Executing {command:?}");
        let reply = match command {
            Command::Mkdir(name) => {
                self.namespace.create_directory(&name)?;
                Reply::Done(format!("Directory '{name}' created"))
            }
            Command::Touch(name) => {
                self.namespace.create_file(&name)?;
                Reply::Done(format!("File '{name}' created"))
            }
            Command::Ls => Reply::Listing(self.namespace.list()),
            Command::Cd(path) => {
                self.namespace.change_directory(&path)?;
                Reply::Done(format!(
                    "Changed directory to '{}'",
                    self.namespace.cursor_path()
                ))
            }
            Command::Pwd => Reply::Text(self.namespace.cursor_path()),
            Command::Open(name) => {
                let path = self.namespace.file_real_path(&name)?;
                self.editor.open(&path).await?;
                Reply::Done(format!("Opened '{name}' with {}", self.editor.program()))
            }
            Command::Move { file, target } => {
                let target = self.namespace.move_file(&file, &target)?;
                Reply::Done(format!(
                    "Moved '{file}' to '{}'",
                    self.namespace.virtual_path(target)
                ))
            }
            Command::Del(name) => {
                let removed = self.namespace.delete(&name)?;
                if removed > 1 {
                    Reply::Done(format!("Deleted '{name}' and {} entries below it", removed - 1))
                } else {
                    Reply::Done(format!("Deleted '{name}'"))
                }
            }
            Command::Boilerplate(name) => {
                let template = self.namespace.create_boilerplate(&name)?;
                Reply::Done(format!("Boilerplate '{template}' created"))
            }
            Command::Git(git_command) => self.run_git(git_command).await?,
            Command::Save(path) => {
                let path = path.unwrap_or_else(|| self.state_file.clone());
                SnapshotStore::save(&path, &self.namespace.export_snapshot()).await?;
                Reply::Done(format!("Saved to {}", path.best_effort_path_display()))
            }
            Command::Load(path) => {
                let path = path.unwrap_or_else(|| self.state_file.clone());
                let snapshot = SnapshotStore::load(&path).await?;
                self.namespace.restore_snapshot(&snapshot)?;
                Reply::Done(format!("Loaded {}", path.best_effort_path_display()))
            }
            Command::Sync => {
                self.namespace.reload_from_disk()?;
                Reply::Done(format!(
                    "Reloaded from {}",
                    self.namespace.base_path().best_effort_path_display()
                ))
            }
            Command::Help => Reply::Help,
            Command::Exit => Reply::Exit,
        };
        Ok(reply)
    }

    async fn run_git(&self, command: GitCommand) -> Result<Reply, ShellError> {
        let (operation, done) = match command {
            GitCommand::Init => (
                GitOperation::Init,
                format!(
                    "Initialized a git repository in {}",
                    self.git.repository().best_effort_path_display()
                ),
            ),
            GitCommand::Status => (GitOperation::Status, String::new()),
            GitCommand::Add(name) => (
                GitOperation::Add(self.namespace.file_real_path(&name)?),
                format!("Staged '{name}'"),
            ),
            GitCommand::Commit(message) => {
                let done = format!("Committed with message '{message}'");
                (GitOperation::Commit(message), done)
            }
            GitCommand::RemoteAdd { name, url } => {
                let done = format!("Added remote '{name}' at {url}");
                (GitOperation::RemoteAdd { name, url }, done)
            }
            GitCommand::Push(branch) => (GitOperation::Push(branch), "Pushed changes".to_string()),
            GitCommand::Pull(branch) => (GitOperation::Pull(branch), "Pulled changes".to_string()),
        };

        match self.git.run(&operation).await? {
            Some(output) => Ok(Reply::Text(output)),
            None => Ok(Reply::Done(done)),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ShellError {
    #[snafu(transparent)]
    Parse { source: CommandParseError },
    #[snafu(transparent)]
    Namespace { source: NamespaceError },
    #[snafu(transparent)]
    Tool { source: ToolError },
    #[snafu(transparent)]
    Snapshot { source: SnapshotError },
    #[snafu(transparent)]
    Store { source: SnapshotStoreError },
}
