use std::ffi::OsString;
use std::path::Path;

use snafu::OptionExt;

use super::tool::{self, EmptyEditorCommandSnafu, ToolError};

/// Opens real files in an external editor, e.g. `code` or `vim`.
#[derive(Debug, Clone)]
pub struct EditorLauncher {
    program: String,
    args: Vec<String>,
}

impl EditorLauncher {
    /// Parses a whitespace separated command line such as `code --wait`.
    pub fn from_command(command: &str) -> Result<Self, ToolError> {
        let mut parts = command.split_whitespace().map(str::to_owned);
        let program = parts.next().context(EmptyEditorCommandSnafu)?;
        Ok(EditorLauncher {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub async fn open(&self, path: &Path) -> Result<(), ToolError> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        args.push(path.as_os_str().to_owned());

        match tool::run(&self.program, &args).await {
            Err(ToolError::ToolNotFound { program }) => Err(ToolError::EditorNotFound { editor: program }),
            other => other,
        }
    }
}
