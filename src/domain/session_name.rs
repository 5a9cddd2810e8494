use serde::{Deserialize, Serialize};

/// Prefix shared by every session this crate creates.
pub const SESSION_PREFIX: &str = "op-";

/// Stable terminal/session identifier derived from a ticket id.
///
/// Always `op-<sanitized id>`, where every character outside
/// `[A-Za-z0-9_-]` is replaced with `-`. This is the join key between
/// tickets, terminals and the control plane.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionName(String);

impl SessionName {
    /// Derive the session name for a ticket id.
    pub fn for_ticket(ticket_id: &str) -> Self {
        let sanitized: String = ticket_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        Self(format!("{SESSION_PREFIX}{sanitized}"))
    }

    /// Wrap a name handed to us verbatim (e.g. by the control plane or the host).
    pub fn from_raw(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The ticket type embedded in the name, e.g. `FEAT` for `op-FEAT-123`.
    ///
    /// Only used for cosmetic classification.
    pub fn ticket_type(&self) -> Option<&str> {
        let rest = self.0.strip_prefix(SESSION_PREFIX)?;
        let kind = rest.split('-').next().unwrap_or(rest);
        if kind.is_empty() { None } else { Some(kind) }
    }
}

impl std::fmt::Display for SessionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl AsRef<str> for SessionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Build the session name for a ticket id.
pub fn build_session_name(ticket_id: &str) -> SessionName {
    SessionName::for_ticket(ticket_id)
}
