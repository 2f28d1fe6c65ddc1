//! Centralized configuration paths for dragsort
//!
//! All config files live under:
//! - Unix/macOS: `~/.config/dragsort/`
//! - Windows: `%APPDATA%\dragsort\`

use std::{env, path::PathBuf};

const APP_DIR: &str = "dragsort";

/// Base config directory for dragsort
///
/// Unix/macOS:
///   - If XDG_CONFIG_HOME is set: `$XDG_CONFIG_HOME/dragsort`
///   - Else: `~/.config/dragsort`
///
/// Windows:
///   - `%APPDATA%\dragsort`
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

/// `~/.config/dragsort/options.yaml`
pub fn options_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("options.yaml"))
}
