// SecurePass Settings Engine
// Loads, saves and resets vault settings.
// Settings are stored as a JSON file at the platform-specific config path.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::VaultSettings;

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<VaultSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &VaultSettings;
    fn set_settings(&mut self, settings: VaultSettings) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine implementation that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: VaultSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise, uses the platform-specific config directory with `settings.json`.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string(),
        };

        Self {
            config_path,
            settings: VaultSettings::default(),
        }
    }

    /// Points the data directory elsewhere for this process only; the
    /// settings file is not rewritten.
    pub fn override_data_dir(&mut self, dir: impl Into<String>) {
        let dir = dir.into();
        debug!(dir = %dir, "data directory overridden");
        self.settings.storage.data_dir = Some(dir);
    }

    /// Directory holding the credential database.
    pub fn data_dir(&self) -> PathBuf {
        match &self.settings.storage.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => platform::get_data_dir(),
        }
    }

    /// Full path of the credential database described by the current settings.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join(&self.settings.storage.database_file)
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// If the file does not exist, returns default settings.
    /// If the file exists but is malformed, returns a serialization error.
    /// Fields missing from the file take their default values.
    fn load(&mut self) -> Result<VaultSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            debug!(path = %self.config_path, "no settings file, using defaults");
            self.settings = VaultSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        let settings: VaultSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;

        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Saves the current settings to the JSON config file.
    ///
    /// Creates parent directories if they don't exist.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_settings(&self) -> &VaultSettings {
        &self.settings
    }

    /// Replaces the settings and saves them immediately.
    fn set_settings(&mut self, settings: VaultSettings) -> Result<(), SettingsError> {
        self.settings = settings;
        self.save()
    }

    /// Restores defaults and writes them to disk.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = VaultSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
