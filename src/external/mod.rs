//! Bridges to external programs: `git` and a text editor.

mod editor;
mod git;
mod tool;

pub use editor::EditorLauncher;
pub use git::{GitBridge, GitOperation};
pub use tool::ToolError;
