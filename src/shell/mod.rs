//! Command parsing, dispatch and the interactive loop.

mod command;
mod output;
mod repl;
mod shell;

pub use command::Command;
pub use output::{configure_colors, render_error, render_reply};
pub use repl::{ReplError, run as run_repl};
pub use shell::{Reply, Shell, ShellError};
