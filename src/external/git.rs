use std::ffi::OsString;
use std::path::{Path, PathBuf};

use snafu::ensure;
use tracing::debug;

use super::tool::{self, EmptyCommitMessageSnafu, ToolError};

const GIT_PROGRAM: &str = "git";

/// One version-control action against the mirrored directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitOperation {
    Init,
    Status,
    Add(PathBuf),
    Commit(String),
    RemoteAdd { name: String, url: String },
    Push(Option<String>),
    Pull(Option<String>),
}

/// Shells out to `git` with the base path as the working tree.
#[derive(Debug, Clone)]
pub struct GitBridge {
    repository: PathBuf,
    remote: String,
    default_branch: String,
}

impl GitBridge {
    pub fn new(
        repository: impl Into<PathBuf>,
        remote: impl Into<String>,
        default_branch: impl Into<String>,
    ) -> Self {
        GitBridge {
            repository: repository.into(),
            remote: remote.into(),
            default_branch: default_branch.into(),
        }
    }

    pub fn repository(&self) -> &Path {
        &self.repository
    }

    /// Runs `operation`. Only `Status` returns captured output, the other
    /// operations print straight to the terminal.
    pub async fn run(&self, operation: &GitOperation) -> Result<Option<String>, ToolError> {
        if let GitOperation::Commit(message) = operation {
            ensure!(!message.trim().is_empty(), EmptyCommitMessageSnafu);
        }

        let args = self.command_args(operation);
        debug!("Running git {:?}", args);
        match operation {
            GitOperation::Status => tool::capture(GIT_PROGRAM, &args).await.map(Some),
            _ => tool::run(GIT_PROGRAM, &args).await.map(|()| None),
        }
    }

    /// Builds the argument list for `operation`.
    pub fn command_args(&self, operation: &GitOperation) -> Vec<OsString> {
        let repository = self.repository.as_os_str().to_owned();
        let mut args: Vec<OsString> = match operation {
            GitOperation::Init => return vec!["init".into(), repository],
            _ => vec!["-C".into(), repository],
        };

        match operation {
            GitOperation::Init => {}
            GitOperation::Status => args.push("status".into()),
            GitOperation::Add(path) => {
                args.push("add".into());
                args.push(path.as_os_str().to_owned());
            }
            GitOperation::Commit(message) => {
                args.extend(["commit", "-m", message.as_str()].map(OsString::from));
            }
            GitOperation::RemoteAdd { name, url } => {
                args.extend(["remote", "add", name.as_str(), url.as_str()].map(OsString::from));
            }
            GitOperation::Push(branch) => {
                let branch = self.branch_or_default(branch);
                args.extend(["push", "-u", self.remote.as_str(), branch].map(OsString::from));
            }
            GitOperation::Pull(branch) => {
                let branch = self.branch_or_default(branch);
                args.extend(["pull", self.remote.as_str(), branch].map(OsString::from));
            }
        }
        args
    }

    fn branch_or_default<'a>(&'a self, branch: &'a Option<String>) -> &'a str {
        branch.as_deref().unwrap_or(&self.default_branch)
    }
}
