use std::path::PathBuf;

use snafu::Snafu;

use crate::ext::BestEffortPathExt;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum NamespaceError {
    #[snafu(display("'{}' already exists", name))]
    AlreadyExists { name: String },
    #[snafu(display("'{}' does not exist in the current directory", name))]
    NotFound { name: String },
    #[snafu(display("'{}' is not a directory", name))]
    NotADirectory { name: String },
    #[snafu(display("'{}' is not a file", name))]
    NotAFile { name: String },
    #[snafu(display("Already at the root directory"))]
    AtRoot,
    #[snafu(display("Path '{}' not found", path))]
    PathNotFound { path: String },
    #[snafu(display("Target directory '{}' does not exist", path))]
    TargetNotFound { path: String },
    #[snafu(display(
        "Unknown boilerplate template '{}'. Supported templates are: {}",
        name,
        supported
    ))]
    UnknownTemplate { name: String, supported: String },
    #[snafu(display("'{}' is not a valid name", name))]
    InvalidName { name: String },
    #[snafu(display("Entries on disk are missing from the new tree: {}", paths))]
    UntrackedEntries { paths: String },
    #[snafu(display("Filesystem operation on {} failed", path.best_effort_path_display()))]
    IoFailure {
        path: PathBuf,
        source: std::io::Error,
    },
}
