//! Session settings and their TOML representation.
//!
//! ```toml
//! mode = "practice"
//! auto_show = true
//! show_steps = false
//! policy = "strict"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::session::Mode;
use crate::tree::Policy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: Mode,
    /// Show the tree after every command that changes it.
    pub auto_show: bool,
    /// Show every rotation of automatic rebalancing, needs `auto_show`.
    pub show_steps: bool,
    pub policy: Policy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::Automatic,
            auto_show: true,
            show_steps: true,
            policy: Policy::Strict,
        }
    }
}

impl Settings {
    /// Parses settings from TOML. Missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Steps are only shown when the tree itself is shown.
    pub fn shows_steps(&self) -> bool {
        self.auto_show && self.show_steps
    }
}
