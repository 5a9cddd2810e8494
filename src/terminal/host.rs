//! The host terminal environment seen by the manager.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::mpsc;

use super::style::TerminalStyle;
use crate::HostError;

/// Opaque identity of a terminal allocated by the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub String);

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the host needs to allocate a terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleSpec {
    pub name: String,
    pub cwd: PathBuf,
    pub env: BTreeMap<String, String>,
    pub style: TerminalStyle,
}

/// Activity events emitted by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEventKind {
    ExecutionStarted,
    ExecutionEnded,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEvent {
    pub handle: HandleId,
    pub kind: HostEventKind,
}

impl HostEvent {
    pub fn new(handle: HandleId, kind: HostEventKind) -> Self {
        Self { handle, kind }
    }
}

/// A terminal the host already has, used to rebuild state in a new process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingHandle {
    pub name: String,
    pub handle: HandleId,
    pub created_at: Option<DateTime<Utc>>,
    /// Executing something when listed
    pub busy: bool,
}

/// Capabilities of a terminal host (tmux, an editor's terminal panel, ...)
#[async_trait]
pub trait TerminalHost: Send + Sync {
    /// Backend identifier for logs
    fn id(&self) -> &'static str;

    /// Allocate a visible terminal
    async fn create_handle(&self, spec: &HandleSpec) -> Result<HandleId, HostError>;

    /// Write text to the terminal and submit it
    async fn send_text(&self, handle: &HandleId, text: &str) -> Result<(), HostError>;

    /// Make the terminal visible, optionally taking input focus
    async fn reveal(&self, handle: &HandleId, steal_focus: bool) -> Result<(), HostError>;

    /// Destroy the terminal
    async fn dispose(&self, handle: &HandleId) -> Result<(), HostError>;

    /// Event feed for activity and closure. `None` if the host emits no events.
    fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<HostEvent>> {
        None
    }

    /// Terminals the host already has
    async fn existing(&self) -> Result<Vec<ExistingHandle>, HostError> {
        Ok(Vec::new())
    }
}
