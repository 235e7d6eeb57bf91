use std::io;
use std::path::Path;

use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use snafu::prelude::*;
use tracing::{debug, warn};

use crate::shell::output::{render_error, render_reply};
use crate::shell::shell::{Reply, Shell};

/// Runs the interactive loop until `exit` or end of input.
pub async fn run(
    shell: &mut Shell,
    prompt: &str,
    history_file: Option<&Path>,
) -> Result<(), ReplError> {
    let mut rl: Editor<(), DefaultHistory> = Editor::new().context(EditorSnafu)?;
    if let Some(path) = history_file {
        load_history(&mut rl, path);
    }

    println!("Welcome to the Virtual File System! Type 'help' for a list of commands.");
    loop {
        match rl.readline(&shell.prompt(prompt)) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(err) = rl.add_history_entry(line.as_str()) {
                        warn!("Failed to add history entry: {err}");
                    }
                }

                match shell.execute_line(&line).await {
                    Ok(Some(Reply::Exit)) => {
                        println!("{}", render_reply(&Reply::Exit));
                        break;
                    }
                    Ok(Some(reply)) => println!("{}", render_reply(&reply)),
                    Ok(None) => {}
                    Err(err) => eprintln!("{}", render_error(&err)),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
            }
            Err(ReadlineError::Eof) => {
                println!("{}", render_reply(&Reply::Exit));
                break;
            }
            Err(source) => return Err(ReplError::ReadError { source }),
        }
    }

    if let Some(path) = history_file {
        save_history(&mut rl, path);
    }
    Ok(())
}

fn load_history(rl: &mut Editor<(), DefaultHistory>, path: &Path) {
    match rl.load_history(path) {
        Ok(()) => debug!("Loaded history from {}", path.display()),
        Err(ReadlineError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!("Failed to load history: {err}"),
    }
}

fn save_history(rl: &mut Editor<(), DefaultHistory>, path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(err) = std::fs::create_dir_all(parent) {
            warn!("Failed to create history directory: {err}");
        }
    }
    if let Err(err) = rl.save_history(path) {
        warn!("Failed to save history: {err}");
    }
}

#[derive(Debug, Snafu)]
pub enum ReplError {
    #[snafu(display("Failed to set up the line editor"))]
    EditorError { source: ReadlineError },
    #[snafu(display("Failed to read input"))]
    ReadError { source: ReadlineError },
}
