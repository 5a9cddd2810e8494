//! Configuration file I/O

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::Config;

impl Config {
    /// Get the global config directory path (~/.opsession/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".opsession")
    }

    /// Get the global config file path (~/.opsession/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load `path`, or the global config when `None`.
    ///
    /// A missing global config yields defaults. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let global_path = Self::global_config_path();
                if !global_path.exists() {
                    tracing::debug!(
                        "No config at {}, using defaults",
                        global_path.display()
                    );
                    return Ok(Self::default());
                }
                Self::from_file(&global_path)
            }
        }
    }
}
