//! Error types shared across the session layer

/// Failure reported by a terminal host backend
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("terminal backend not available: {0}")]
    NotAvailable(&'static str),

    #[error("terminal command failed: {0}")]
    CommandFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure talking to the control plane.
///
/// These never reach the operator directly: they trigger the local fallback
/// and are only reported if that fallback fails too.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    #[error("control plane not reachable at {url}")]
    Unavailable { url: String },

    /// Non-2xx response. Displays the server's message verbatim.
    #[error("{message}")]
    Rejected {
        status: u16,
        error: String,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors surfaced by the terminal manager and the launcher
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no session named {0}")]
    NotFound(String),

    #[error("terminal host unavailable: {0}")]
    HostUnavailable(#[from] HostError),

    #[error("ticket metadata unavailable for {ticket_id}")]
    MetadataUnavailable { ticket_id: String },
}

impl SessionError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SessionError::NotFound(_))
    }
}
