use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use std::{
    borrow::Cow,
    io,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::ext::BestEffortPathExt;

pub const DEFAULT_CONFIG_FILE: &str = "vfs.yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSettings {
    pub remote: String,
    pub branch: String,
}

impl Default for GitSettings {
    fn default() -> Self {
        GitSettings {
            remote: "origin".to_string(),
            branch: "main".to_string(),
        }
    }
}

/// Values read from the YAML settings file. Keys that are absent keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_path: PathBuf,
    pub state_file: PathBuf,
    pub adopt_existing: bool,
    pub editor: String,
    pub history_file: Option<PathBuf>,
    pub prompt: String,
    pub git: GitSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_path: PathBuf::from("PyVFS"),
            state_file: PathBuf::from("data/vfs_state.json"),
            adopt_existing: true,
            editor: "code".to_string(),
            history_file: None,
            prompt: "vfs".to_string(),
            git: GitSettings::default(),
        }
    }
}

fn key(name: &'static str) -> Yaml<'static> {
    Yaml::Value(Scalar::String(Cow::Borrowed(name)))
}

impl Settings {
    /// Reads the settings file, falling back to defaults when it does not exist.
    pub async fn read(path: &Path) -> Result<Self, SettingsError> {
        debug!("Opening settings file: {}", path.best_effort_path_display());
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("No settings file found, using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).context(ReadSnafu {
                    file_path: path.best_effort_path_display(),
                });
            }
        };

        debug!("Successfully read settings file: {} bytes", bytes.len());
        let contents = String::from_utf8_lossy(&bytes);
        Self::try_from(&*contents)
    }

    fn apply(&mut self, top_level: &LinkedHashMap<Yaml, Yaml>) -> Result<(), SettingsError> {
        if let Some(base_path) = string_value(top_level, "base_path")? {
            self.base_path = PathBuf::from(base_path);
        }
        if let Some(state_file) = string_value(top_level, "state_file")? {
            self.state_file = PathBuf::from(state_file);
        }
        if let Some(adopt_existing) = bool_value(top_level, "adopt_existing")? {
            self.adopt_existing = adopt_existing;
        }
        if let Some(editor) = string_value(top_level, "editor")? {
            self.editor = editor;
        }
        if let Some(history_file) = string_value(top_level, "history_file")? {
            self.history_file = Some(PathBuf::from(history_file));
        }
        if let Some(prompt) = string_value(top_level, "prompt")? {
            self.prompt = prompt;
        }

        match top_level.get(&key("git")) {
            None | Some(Yaml::Value(Scalar::Null)) => {}
            Some(git) => {
                let git = git.as_mapping().context(GitSectionNotMapSnafu)?;
                if let Some(remote) = string_value(git, "remote")? {
                    self.git.remote = remote;
                }
                if let Some(branch) = string_value(git, "branch")? {
                    self.git.branch = branch;
                }
            }
        }
        Ok(())
    }
}

fn string_value(
    map: &LinkedHashMap<Yaml, Yaml>,
    name: &'static str,
) -> Result<Option<String>, SettingsError> {
    match map.get(&key(name)) {
        None | Some(Yaml::Value(Scalar::Null)) => Ok(None),
        Some(value) => value
            .as_str()
            .map(|value| Some(value.to_string()))
            .context(InvalidValueSnafu {
                key: name,
                expected: "a string",
            }),
    }
}

fn bool_value(
    map: &LinkedHashMap<Yaml, Yaml>,
    name: &'static str,
) -> Result<Option<bool>, SettingsError> {
    match map.get(&key(name)) {
        None | Some(Yaml::Value(Scalar::Null)) => Ok(None),
        Some(Yaml::Value(Scalar::Boolean(value))) => Ok(Some(*value)),
        Some(_) => InvalidValueSnafu {
            key: name,
            expected: "a boolean",
        }
        .fail(),
    }
}

impl TryFrom<&str> for Settings {
    type Error = SettingsError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents =
            Yaml::load_from_str(contents).map_err(|e| SettingsError::ParseError { source: e })?;

        let mut settings = Settings::default();
        let Some(document) = documents.first() else {
            return Ok(settings);
        };
        if matches!(document, Yaml::Value(Scalar::Null)) {
            return Ok(settings);
        }

        let top_level = document
            .as_mapping()
            .ok_or(SettingsError::TopLevelNotMap)?;
        settings.apply(top_level)?;
        Ok(settings)
    }
}

#[derive(Debug, Snafu)]
pub enum SettingsError {
    #[snafu(display("Failed to read the settings file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse the settings file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of the settings file should be a map"))]
    TopLevelNotMap,
    #[snafu(display("The git section should be a map"))]
    GitSectionNotMap,
    #[snafu(display("Setting '{}' should be {}", key, expected))]
    InvalidValue { key: String, expected: String },
}
