//! Control plane endpoint discovery.
//!
//! The control plane picks a free port on startup and writes a session
//! descriptor under the tickets directory. We read it; we never write it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Descriptor location, relative to the tickets directory
pub const SESSION_DESCRIPTOR_PATH: &str = "operator/api-session.json";

/// Contents of the descriptor written by a running control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescriptor {
    pub port: u16,
    pub pid: u32,
    pub started_at: String,
    pub version: String,
}

impl EndpointDescriptor {
    pub fn base_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

pub fn descriptor_path(tickets_dir: &Path) -> PathBuf {
    tickets_dir.join(SESSION_DESCRIPTOR_PATH)
}

/// Read the descriptor, treating any I/O or schema problem as absence
pub fn read_descriptor(tickets_dir: &Path) -> Option<EndpointDescriptor> {
    let path = descriptor_path(tickets_dir);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("no session descriptor at {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(descriptor) => Some(descriptor),
        Err(e) => {
            tracing::debug!("ignoring malformed session descriptor {}: {}", path.display(), e);
            None
        }
    }
}

/// Base URL of the control plane: the discovered port, else `default_url`.
pub fn resolve_base_url(tickets_dir: Option<&Path>, default_url: &str) -> String {
    tickets_dir
        .and_then(read_descriptor)
        .map(|d| d.base_url())
        .unwrap_or_else(|| default_url.to_string())
}
