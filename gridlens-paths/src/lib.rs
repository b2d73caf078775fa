//! XDG Base Directory paths for gridlens.
//!
//! CLI tools should use XDG paths for cross-platform consistency,
//! not platform-native paths.

use std::path::PathBuf;

/// Get the gridlens config directory.
///
/// Returns `$XDG_CONFIG_HOME/gridlens` if set, otherwise `~/.config/gridlens`.
/// The user-level `config.toml` lives here.
///
/// # Examples
///
/// ```
/// use gridlens_paths::config_dir;
///
/// let config = config_dir();
/// let user_file = config.join("config.toml");
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("gridlens")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config/gridlens")
    } else {
        PathBuf::from(".config/gridlens")
    }
}

/// Path of the user-level configuration file.
pub fn user_config_file() -> PathBuf {
    config_dir().join("config.toml")
}
