//! Configuration management for BeamChat.

use crate::error::Result;
use crate::platform;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default auto-reply delay in milliseconds.
pub const DEFAULT_REPLY_DELAY_MS: u64 = 2000;

/// Default number of characters of the sent text quoted in the auto-reply.
pub const DEFAULT_REPLY_PREVIEW_LEN: usize = 20;

/// Main configuration struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory where the chat database lives.
    pub data_dir: PathBuf,

    /// Delay before the simulated auto-reply fires, in milliseconds.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,

    /// How many characters of the sent text the auto-reply quotes.
    #[serde(default = "default_reply_preview_len")]
    pub reply_preview_len: usize,
}

fn default_reply_delay_ms() -> u64 {
    DEFAULT_REPLY_DELAY_MS
}

fn default_reply_preview_len() -> usize {
    DEFAULT_REPLY_PREVIEW_LEN
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            data_dir: platform::data_dir(),
            reply_delay_ms: DEFAULT_REPLY_DELAY_MS,
            reply_preview_len: DEFAULT_REPLY_PREVIEW_LEN,
        }
    }
}

impl SessionConfig {
    /// Load configuration from the default config file.
    pub fn load() -> Result<Self> {
        let config_path = platform::config_file_path();

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .map_err(|e| crate::error::Error::Storage(e.to_string()))?;
            let mut config: SessionConfig = serde_json::from_str(&contents)?;
            config.fix_invalid_values();
            Ok(config)
        } else {
            Ok(SessionConfig::default())
        }
    }

    /// Fix any invalid or empty values with sensible defaults.
    fn fix_invalid_values(&mut self) {
        if self.data_dir.as_os_str().is_empty() {
            self.data_dir = platform::data_dir();
        }
        if self.reply_preview_len == 0 {
            self.reply_preview_len = DEFAULT_REPLY_PREVIEW_LEN;
        }
    }

    /// Save configuration to the default config file.
    pub fn save(&mut self) -> Result<()> {
        self.fix_invalid_values();

        let config_path = platform::config_file_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| crate::error::Error::Storage(e.to_string()))?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)
            .map_err(|e| crate::error::Error::Storage(e.to_string()))?;

        Ok(())
    }

    /// Load configuration from environment variables, falling back to file/defaults.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;

        if let Ok(dir) = std::env::var("BEAMCHAT_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Ok(ms) = std::env::var("BEAMCHAT_REPLY_DELAY_MS") {
            if let Ok(ms) = ms.parse() {
                config.reply_delay_ms = ms;
            }
        }

        config.fix_invalid_values();
        Ok(config)
    }

    /// The auto-reply delay as a [`Duration`].
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}
