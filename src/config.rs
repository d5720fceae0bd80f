use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::remote::DEFAULT_API_URL;
use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;
/// Upper bound for `import_due_in_days` (about a century)
pub const MAX_IMPORT_DUE_IN_DAYS: u32 = 36_500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub read_timeout_secs: u64,
    #[serde(default = "default_use_system_proxy")]
    pub use_system_proxy: bool,
    #[serde(default = "default_remote_display_limit")]
    pub remote_display_limit: usize,
    #[serde(default = "default_import_due_in_days")]
    pub import_due_in_days: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_back")]
    pub back: String,
    #[serde(default = "default_select")]
    pub select: String,
    #[serde(default = "default_new")]
    pub new: String,
    #[serde(default = "default_edit")]
    pub edit: String,
    #[serde(default = "default_save")]
    pub save: String,
    #[serde(default = "default_delete")]
    pub delete: String,
    #[serde(default = "default_toggle_task_status")]
    pub toggle_task_status: String,
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
    #[serde(default = "default_refresh")]
    pub refresh: String,
    #[serde(default = "default_import")]
    pub import: String,
    #[serde(default = "default_help")]
    pub help: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    /// Empty means "derive from highlight_bg"
    #[serde(default)]
    pub highlight_fg: String,
    #[serde(default = "default_error_fg")]
    pub error_fg: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            api_url: default_api_url(),
            connect_timeout_secs: default_timeout_secs(),
            read_timeout_secs: default_timeout_secs(),
            use_system_proxy: default_use_system_proxy(),
            remote_display_limit: default_remote_display_limit(),
            import_due_in_days: default_import_due_in_days(),
            log_level: default_log_level(),
            key_bindings: KeyBindings::default(),
            theme: Theme::default(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            back: default_back(),
            select: default_select(),
            new: default_new(),
            edit: default_edit(),
            save: default_save(),
            delete: default_delete(),
            toggle_task_status: default_toggle_task_status(),
            filter: default_filter(),
            list_up: default_list_up(),
            list_down: default_list_down(),
            refresh: default_refresh(),
            import: default_import(),
            help: default_help(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            highlight_fg: String::new(),
            error_fg: default_error_fg(),
        }
    }
}

// Default value functions
fn default_database_path() -> String {
    // This is a fallback - actual profile will be determined at load time
    Config::default_database_path_for_profile(utils::Profile::Prod)
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_use_system_proxy() -> bool {
    true
}

fn default_remote_display_limit() -> usize {
    20
}

fn default_import_due_in_days() -> u32 {
    7
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_back() -> String {
    "Esc".to_string()
}

fn default_select() -> String {
    "Enter".to_string()
}

fn default_new() -> String {
    "n".to_string()
}

fn default_edit() -> String {
    "e".to_string()
}

fn default_save() -> String {
    "Ctrl+s".to_string()
}

fn default_delete() -> String {
    "d".to_string()
}

fn default_toggle_task_status() -> String {
    "Space".to_string()
}

fn default_filter() -> String {
    "f".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_refresh() -> String {
    "r".to_string()
}

fn default_import() -> String {
    "i".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "blue".to_string()
}

fn default_error_fg() -> String {
    "lightred".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("import_due_in_days must be at most {max}, got {value}")]
    ImportDueInDaysError { value: u32, max: u32 },
    #[error("Invalid key binding '{binding}' for {action}: {reason}")]
    KeyBindingError {
        action: &'static str,
        binding: String,
        reason: String,
    },
}

impl Config {
    /// Load configuration from the profile's config file, or create it with defaults
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        if config_path.exists() {
            return Self::load_from_path(&config_path);
        }
        let mut config = Config {
            database_path: Self::default_database_path_for_profile(profile),
            ..Config::default()
        };
        config.save_to_path(&config_path)?;
        Ok(config)
    }

    /// Load from an explicit file. A missing file is created with defaults.
    pub fn load_from_path(config_path: &Path) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let mut config = Config::default();
            config.save_to_path(config_path)?;
            Ok(config)
        }
    }

    /// Reject key bindings that cannot be parsed, so the TUI never has to
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.import_due_in_days > MAX_IMPORT_DUE_IN_DAYS {
            return Err(ConfigError::ImportDueInDaysError {
                value: self.import_due_in_days,
                max: MAX_IMPORT_DUE_IN_DAYS,
            });
        }
        for (action, binding) in self.key_bindings.entries() {
            utils::parse_key_binding(binding).map_err(|reason| ConfigError::KeyBindingError {
                action,
                binding: binding.to_string(),
                reason,
            })?;
        }
        Ok(())
    }

    pub fn save_to_path(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        // Ensure config version is set before saving
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get default database path for a specific profile
    fn default_database_path_for_profile(profile: utils::Profile) -> String {
        if let Some(data_dir) = utils::get_data_dir(profile) {
            data_dir.join("tasks.db").to_string_lossy().to_string()
        } else {
            match profile {
                utils::Profile::Dev => "~/.local/share/taskdeck-dev/tasks.db".to_string(),
                utils::Profile::Prod => "~/.local/share/taskdeck/tasks.db".to_string(),
            }
        }
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    /// Log file lives next to the database
    pub fn get_log_path(&self) -> PathBuf {
        let db_path = self.get_database_path();
        match db_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join("taskdeck.log"),
            _ => PathBuf::from("taskdeck.log"),
        }
    }
}

impl KeyBindings {
    pub fn entries(&self) -> [(&'static str, &str); 14] {
        [
            ("quit", self.quit.as_str()),
            ("back", self.back.as_str()),
            ("select", self.select.as_str()),
            ("new", self.new.as_str()),
            ("edit", self.edit.as_str()),
            ("save", self.save.as_str()),
            ("delete", self.delete.as_str()),
            ("toggle_task_status", self.toggle_task_status.as_str()),
            ("filter", self.filter.as_str()),
            ("list_up", self.list_up.as_str()),
            ("list_down", self.list_down.as_str()),
            ("refresh", self.refresh.as_str()),
            ("import", self.import.as_str()),
            ("help", self.help.as_str()),
        ]
    }
}
