// SecurePass platform abstraction
// Provides platform-specific config and data paths for Windows, macOS, and Linux.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Returns the platform-specific configuration directory for SecurePass.
///
/// - **Linux**: `~/.config/securepass` (or `$XDG_CONFIG_HOME/securepass`)
/// - **macOS**: `~/Library/Application Support/SecurePass`
/// - **Windows**: `%APPDATA%/SecurePass`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the platform-specific data directory holding the credential database.
///
/// - **Linux**: `~/.local/share/securepass` (or `$XDG_DATA_HOME/securepass`)
/// - **macOS**: `~/Library/Application Support/SecurePass`
/// - **Windows**: `%APPDATA%/SecurePass`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}
