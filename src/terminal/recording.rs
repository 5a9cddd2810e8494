//! In-memory terminal host.
//!
//! Records every call instead of touching a real terminal. Backs the CLI's
//! `--dry-run` mode and the test suites.

use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::mpsc;

use super::host::{ExistingHandle, HandleId, HandleSpec, HostEvent, TerminalHost};
use crate::HostError;

/// A call made against the [`RecordingHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Create(HandleSpec),
    Send(HandleId, String),
    Reveal(HandleId, bool),
    Dispose(HandleId),
}

impl std::fmt::Display for HostCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostCall::Create(spec) => write!(
                f,
                "create {} in {} ({} {})",
                spec.name,
                spec.cwd.display(),
                spec.style.color.tmux_colour(),
                spec.style.icon
            ),
            HostCall::Send(handle, text) => write!(f, "send {handle}: {text}"),
            HostCall::Reveal(handle, true) => write!(f, "focus {handle}"),
            HostCall::Reveal(handle, false) => write!(f, "show {handle}"),
            HostCall::Dispose(handle) => write!(f, "dispose {handle}"),
        }
    }
}

#[derive(Debug, Default)]
struct Recorded {
    next_id: u64,
    calls: Vec<HostCall>,
    live: Vec<HandleId>,
    existing: Vec<ExistingHandle>,
    fail_next_create: bool,
}

#[derive(Debug, Default)]
pub struct RecordingHost {
    state: Mutex<Recorded>,
    events: Mutex<Option<mpsc::UnboundedSender<HostEvent>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// All calls in the order they were made
    pub fn calls(&self) -> Vec<HostCall> {
        self.state().calls.clone()
    }

    pub fn created_specs(&self) -> Vec<HandleSpec> {
        self.state()
            .calls
            .iter()
            .filter_map(|c| match c {
                HostCall::Create(spec) => Some(spec.clone()),
                _ => None,
            })
            .collect()
    }

    /// Handles created and not yet disposed
    pub fn live_handles(&self) -> Vec<HandleId> {
        self.state().live.clone()
    }

    /// Make the next `create_handle` fail
    pub fn fail_next_create(&self) {
        self.state().fail_next_create = true;
    }

    /// Pretend the host already has an idle terminal with this name
    pub fn add_existing(&self, name: &str, handle: &str) {
        self.push_existing(name, handle, false);
    }

    /// Pretend the host already has a terminal with this name that is executing
    pub fn add_busy_existing(&self, name: &str, handle: &str) {
        self.push_existing(name, handle, true);
    }

    fn push_existing(&self, name: &str, handle: &str, busy: bool) {
        let mut state = self.state();
        state.existing.push(ExistingHandle {
            name: name.to_string(),
            handle: HandleId(handle.to_string()),
            created_at: None,
            busy,
        });
        state.live.push(HandleId(handle.to_string()));
    }

    /// Push an event to the subscriber, if any
    pub fn emit(&self, event: HostEvent) {
        let events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(tx) = events.as_ref() {
            let _ = tx.send(event);
        }
    }
}

#[async_trait]
impl TerminalHost for RecordingHost {
    fn id(&self) -> &'static str {
        "recording"
    }

    async fn create_handle(&self, spec: &HandleSpec) -> Result<HandleId, HostError> {
        let mut state = self.state();
        if std::mem::take(&mut state.fail_next_create) {
            return Err(HostError::CommandFailed(format!(
                "cannot allocate terminal {}",
                spec.name
            )));
        }
        state.next_id += 1;
        let handle = HandleId(format!("%{}", state.next_id));
        state.calls.push(HostCall::Create(spec.clone()));
        state.live.push(handle.clone());
        Ok(handle)
    }

    async fn send_text(&self, handle: &HandleId, text: &str) -> Result<(), HostError> {
        self.state()
            .calls
            .push(HostCall::Send(handle.clone(), text.to_string()));
        Ok(())
    }

    async fn reveal(&self, handle: &HandleId, steal_focus: bool) -> Result<(), HostError> {
        self.state()
            .calls
            .push(HostCall::Reveal(handle.clone(), steal_focus));
        Ok(())
    }

    async fn dispose(&self, handle: &HandleId) -> Result<(), HostError> {
        let mut state = self.state();
        state.calls.push(HostCall::Dispose(handle.clone()));
        state.live.retain(|h| h != handle);
        Ok(())
    }

    fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<HostEvent>> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.events.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);
        Some(rx)
    }

    async fn existing(&self) -> Result<Vec<ExistingHandle>, HostError> {
        Ok(self.state().existing.clone())
    }
}
