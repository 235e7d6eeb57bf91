use std::ffi::OsString;
use std::io;
use std::process::Stdio;

use compio::process::Command;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

/// Runs `program` with its output going straight to the terminal.
pub(crate) async fn run(program: &str, args: &[OsString]) -> Result<(), ToolError> {
    let mut cmd = create_command(program, args);
    let handle = spawn(&mut cmd, program)?;
    let status = handle.wait().await.context(WaitSnafu { program })?;
    check_status(program, args, status.success(), status.code())
}

/// Runs `program` and returns what it printed to stdout.
pub(crate) async fn capture(program: &str, args: &[OsString]) -> Result<String, ToolError> {
    let mut cmd = create_command(program, args);
    let _ = cmd.stdout(Stdio::piped());
    let handle = spawn(&mut cmd, program)?;
    let output = handle
        .wait_with_output()
        .await
        .context(WaitSnafu { program })?;
    check_status(program, args, output.status.success(), output.status.code())?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn create_command(program: &str, args: &[OsString]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd
}

fn spawn(cmd: &mut Command, program: &str) -> Result<compio::process::Child, ToolError> {
    debug!("Spawning '{}'", program);
    match cmd.spawn() {
        Ok(handle) => Ok(handle),
        Err(err) if err.kind() == io::ErrorKind::NotFound => ToolNotFoundSnafu { program }.fail(),
        Err(err) => Err(err).context(SpawnSnafu { program }),
    }
}

fn check_status(
    program: &str,
    args: &[OsString],
    success: bool,
    code: Option<i32>,
) -> Result<(), ToolError> {
    if success {
        info!("'{}' completed successfully", program);
        return Ok(());
    }
    UnsuccessfulExecutionSnafu {
        program,
        args: join_args(args),
        status: code.unwrap_or(-1),
    }
    .fail()
}

fn join_args(args: &[OsString]) -> String {
    args.iter()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ToolError {
    #[snafu(display("'{}' is not installed or not found in PATH", program))]
    ToolNotFound { program: String },
    #[snafu(display("Editor '{}' is not installed or not found in PATH", editor))]
    EditorNotFound { editor: String },
    #[snafu(display("No editor command is configured"))]
    EmptyEditorCommand,
    #[snafu(display("Commit message cannot be empty"))]
    EmptyCommitMessage,
    #[snafu(display("Failed to spawn '{}'", program))]
    SpawnError {
        program: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to wait for '{}'", program))]
    WaitError {
        program: String,
        source: std::io::Error,
    },
    #[snafu(display("'{} {}' failed with exit code {}", program, args, status))]
    UnsuccessfulExecution {
        program: String,
        args: String,
        status: i32,
    },
}
