use std::path::PathBuf;

use snafu::prelude::*;

/// A parsed shell command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mkdir(String),
    Touch(String),
    Ls,
    Cd(String),
    Pwd,
    Open(String),
    Move { file: String, target: String },
    Del(String),
    Boilerplate(String),
    Git(GitCommand),
    /// Save a snapshot, to the default state file when no path is given.
    Save(Option<PathBuf>),
    Load(Option<PathBuf>),
    Sync,
    Help,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCommand {
    Init,
    Status,
    Add(String),
    Commit(String),
    RemoteAdd { name: String, url: String },
    Push(Option<String>),
    Pull(Option<String>),
}

pub const HELP: &[(&str, &str)] = &[
    ("mkdir <name>", "Create a directory"),
    ("touch <name>", "Create an empty file"),
    ("ls", "List the current directory"),
    ("cd <path>", "Change directory; '/' is the root and '..' the parent"),
    ("pwd", "Print the current directory"),
    ("open <name>", "Open a file in the configured editor"),
    ("move <name> <targetDir>", "Move a file into a directory below the current one"),
    ("del <name>", "Delete a file or a directory with everything in it"),
    ("boilerplate <template>", "Lay out a django, react or python project"),
    ("git init|status|add|commit|remote add|push|pull", "Run git on the base directory"),
    ("save [file]", "Write a snapshot of the tree"),
    ("load [file]", "Restore a snapshot of the tree"),
    ("sync", "Rebuild the tree from what is on disk"),
    ("help", "Show this list"),
    ("exit, quit", "Leave the shell"),
];

/// Parses one input line. Blank lines yield `None`. Command names are case
/// insensitive and surplus arguments are ignored.
pub fn parse(line: &str) -> Result<Option<Command>, CommandParseError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let mut args = Arguments { words, usage: "" };

    let command = match name.to_lowercase().as_str() {
        "mkdir" => Command::Mkdir(args.usage("mkdir <name>").required()?),
        "touch" => Command::Touch(args.usage("touch <name>").required()?),
        "ls" => Command::Ls,
        "cd" => Command::Cd(args.usage("cd <path>").required()?),
        "pwd" => Command::Pwd,
        "open" => Command::Open(args.usage("open <name>").required()?),
        "move" => {
            let args = args.usage("move <name> <targetDir>");
            Command::Move {
                file: args.required()?,
                target: args.required()?,
            }
        }
        "del" => Command::Del(args.usage("del <name>").required()?),
        "boilerplate" => Command::Boilerplate(args.usage("boilerplate <template>").required()?),
        "git" => Command::Git(parse_git(args)?),
        "save" => Command::Save(args.optional().map(PathBuf::from)),
        "load" => Command::Load(args.optional().map(PathBuf::from)),
        "sync" => Command::Sync,
        "help" => Command::Help,
        "exit" | "quit" => Command::Exit,
        _ => return UnknownCommandSnafu { name }.fail(),
    };
    Ok(Some(command))
}

fn parse_git(mut args: Arguments<'_>) -> Result<GitCommand, CommandParseError> {
    let subcommand = args
        .usage("git init|status|add|commit|remote add|push|pull")
        .required()?;

    let command = match subcommand.to_lowercase().as_str() {
        "init" => GitCommand::Init,
        "status" => GitCommand::Status,
        "add" => GitCommand::Add(args.usage("git add <name>").required()?),
        "commit" => {
            let message = args.rest();
            ensure!(
                !message.is_empty(),
                MissingArgumentSnafu {
                    usage: "git commit <message>"
                }
            );
            GitCommand::Commit(message)
        }
        "remote" => {
            let args = args.usage("git remote add <name> <url>");
            let action = args.required()?;
            ensure!(
                action.eq_ignore_ascii_case("add"),
                UnknownGitSubcommandSnafu {
                    name: format!("remote {action}")
                }
            );
            GitCommand::RemoteAdd {
                name: args.required()?,
                url: args.required()?,
            }
        }
        "push" => GitCommand::Push(args.optional()),
        "pull" => GitCommand::Pull(args.optional()),
        _ => return UnknownGitSubcommandSnafu { name: subcommand }.fail(),
    };
    Ok(command)
}

struct Arguments<'a> {
    words: std::str::SplitWhitespace<'a>,
    usage: &'static str,
}

impl Arguments<'_> {
    fn usage(&mut self, usage: &'static str) -> &mut Self {
        self.usage = usage;
        self
    }

    fn required(&mut self) -> Result<String, CommandParseError> {
        self.words
            .next()
            .map(str::to_owned)
            .context(MissingArgumentSnafu { usage: self.usage })
    }

    fn optional(&mut self) -> Option<String> {
        self.words.next().map(str::to_owned)
    }

    fn rest(&mut self) -> String {
        self.words.by_ref().collect::<Vec<_>>().join(" ")
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum CommandParseError {
    #[snafu(display("Missing argument. Usage: {}", usage))]
    MissingArgument { usage: String },
    #[snafu(display("Unknown command '{}'. Type 'help' for a list of commands", name))]
    UnknownCommand { name: String },
    #[snafu(display("Unknown git subcommand '{}'", name))]
    UnknownGitSubcommand { name: String },
}
