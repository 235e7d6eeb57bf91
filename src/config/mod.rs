mod settings;

pub use settings::{DEFAULT_CONFIG_FILE, GitSettings, Settings, SettingsError};
