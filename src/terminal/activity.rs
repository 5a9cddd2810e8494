use serde::{Deserialize, Serialize};

use super::host::HostEventKind;

/// What a session's terminal is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityState {
    Idle,
    Running,
    Unknown,
}

impl ActivityState {
    /// Transition table for host events.
    ///
    /// `Closed` yields `Unknown`: the manager drops the record entirely, and an
    /// untracked session reports `Unknown`.
    pub fn apply(self, event: HostEventKind) -> ActivityState {
        match event {
            HostEventKind::ExecutionStarted => ActivityState::Running,
            HostEventKind::ExecutionEnded => ActivityState::Idle,
            HostEventKind::Closed => ActivityState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityState::Idle => "idle",
            ActivityState::Running => "running",
            ActivityState::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ActivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}
