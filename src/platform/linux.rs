// SecurePass platform paths for Linux
// Config: ~/.config/securepass
// Data:   ~/.local/share/securepass

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Uses `$XDG_CONFIG_HOME/securepass` if set, otherwise `~/.config/securepass`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("securepass"),
        _ => home_dir().join(".config").join("securepass"),
    }
}

/// Uses `$XDG_DATA_HOME/securepass` if set, otherwise `~/.local/share/securepass`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("securepass"),
        _ => home_dir().join(".local").join("share").join("securepass"),
    }
}
