use std::error::Error;
use std::fmt::Write as _;

use colored::Colorize;
use supports_color::Stream;

use crate::shell::command::HELP;
use crate::shell::shell::Reply;

/// Turns colours on only when stdout can show them.
pub fn configure_colors() {
    let enabled = supports_color::on(Stream::Stdout).is_some();
    colored::control::set_override(enabled);
}

pub fn render_reply(reply: &Reply) -> String {
    match reply {
        Reply::Done(message) => format!("{} {message}", "✔".green()),
        Reply::Listing(names) if names.is_empty() => "Directory is empty.".dimmed().to_string(),
        Reply::Listing(names) => names.iter().fold(String::new(), |mut out, name| {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str("  ");
            out.push_str(name);
            out
        }),
        Reply::Text(text) => text.trim_end().to_string(),
        Reply::Help => render_help(),
        Reply::Exit => "Exiting VFS...".to_string(),
    }
}

/// One line with the error and each of its causes.
pub fn render_error(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(message, ": {cause}");
        source = cause.source();
    }
    format!("{} {}", "✘ Error:".red().bold(), message)
}

fn render_help() -> String {
    let width = HELP.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
    let mut out = String::from("Commands:");
    for (usage, description) in HELP {
        let usage = format!("{usage:<width$}");
        let _ = write!(out, "\n  {}  {description}", usage.cyan());
    }
    out
}
