use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle status of a ticket, mirrored by the directory it lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    /// Waiting to be picked up
    Queue,
    /// An agent is (or was) working on it
    InProgress,
    /// Done
    Completed,
}

impl TicketStatus {
    /// The directory / frontmatter spelling of this status
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Queue => "queue",
            TicketStatus::InProgress => "in-progress",
            TicketStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "queue" | "queued" => Ok(TicketStatus::Queue),
            "in-progress" | "in_progress" | "running" => Ok(TicketStatus::InProgress),
            "completed" | "done" => Ok(TicketStatus::Completed),
            other => Err(format!("unknown ticket status: {other}")),
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ticket as discovered on disk. Read-only input to the launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketInfo {
    /// Ticket id, e.g. `FEAT-123`
    pub id: String,
    /// Inferred ticket type, e.g. `FEAT`
    pub ticket_type: String,
    /// Human readable title
    pub title: String,
    /// Lifecycle status
    pub status: TicketStatus,
    /// Absolute path of the ticket document
    pub file_path: PathBuf,
}
