//! Settings sections

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::agent::AGENT_BINARY;

/// Control plane settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// URL used when no endpoint descriptor is found
    #[serde(default = "default_api_url")]
    pub default_url: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Overall timeout for a single request
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ApiSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Agent CLI settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Binary invoked for local launches
    #[serde(default = "default_agent_binary")]
    pub binary: String,

    /// Model used when `--model` is not given
    #[serde(default = "default_model")]
    pub default_model: String,
}

/// Terminal host settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalSettings {
    /// How often tmux panes are polled for activity changes
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl TerminalSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_api_url() -> String {
    "http://localhost:7008".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    2_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_agent_binary() -> String {
    AGENT_BINARY.to_string()
}

fn default_model() -> String {
    "sonnet".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            default_url: default_api_url(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            binary: default_agent_binary(),
            default_model: default_model(),
        }
    }
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}
