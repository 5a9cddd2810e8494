//! Configuration loading

mod io;
mod settings;

pub use settings::{AgentSettings, ApiSettings, TerminalSettings};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Tickets directory. When unset, the nearest `.tickets` ancestor of the
    /// ticket file is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickets_dir: Option<PathBuf>,

    /// Control plane settings
    #[serde(default)]
    pub api: ApiSettings,

    /// Agent CLI settings
    #[serde(default)]
    pub agent: AgentSettings,

    /// Terminal host settings
    #[serde(default)]
    pub terminal: TerminalSettings,
}
