use serde::{Deserialize, Serialize};

/// Top-level vault settings container, persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct VaultSettings {
    pub storage: StorageSettings,
    pub security: SecuritySettings,
    pub logging: LoggingSettings,
}

/// Where the credential database lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    /// File name of the SQLite database inside the data directory.
    pub database_file: String,
    /// Overrides the platform data directory when set.
    pub data_dir: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_file: "password_database.db".to_string(),
            data_dir: None,
        }
    }
}

/// Key facility and biometric gate settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SecuritySettings {
    /// Alias the vault key is stored under in the secure key facility.
    pub key_alias: String,
    /// Service name used for OS keychain entries.
    pub keychain_service: String,
    /// Open the gate when the device has no biometric hardware or enrollment.
    pub allow_without_biometric: bool,
    pub prompt_title: String,
    pub prompt_subtitle: String,
    pub prompt_negative_button: String,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            key_alias: "SECURE_PASS_KEY".to_string(),
            keychain_service: "securepass".to_string(),
            allow_without_biometric: false,
            prompt_title: "Biometric Authentication".to_string(),
            prompt_subtitle: "Log in using your biometric credential".to_string(),
            prompt_negative_button: "Cancel".to_string(),
        }
    }
}

/// Diagnostic output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
