//! Cross-platform utilities.

use std::path::PathBuf;

/// Get the application data directory.
///
/// - Linux: `~/.local/share/beamchat`
/// - Windows: `%LOCALAPPDATA%\beamchat`
/// - macOS: `~/Library/Application Support/beamchat`
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("beamchat")
}

/// Get the configuration directory.
///
/// - Linux: `~/.config/beamchat`
/// - Windows: `%APPDATA%\beamchat`
/// - macOS: `~/Library/Application Support/beamchat`
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("beamchat")
}

/// Get the path to the main config file.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Get the path to the chat database.
pub fn chat_db_path() -> PathBuf {
    data_dir().join("chat.db")
}
