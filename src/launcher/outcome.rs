use crate::{RemoteError, SessionError, SessionName};

/// How a launch attempt ended
#[derive(Debug)]
pub enum LaunchOutcome {
    /// A terminal was created and the agent command sent to it
    Materialized {
        session_name: SessionName,
        via_remote: bool,
    },
    /// The session already existed and the operator chose to focus it
    Focused { session_name: SessionName },
    /// The operator declined; nothing was changed
    Aborted,
    /// No recovery path left. `remote` is the absorbed control plane
    /// failure that led to the failed fallback, if any.
    Failed {
        reason: SessionError,
        remote: Option<RemoteError>,
    },
}

impl LaunchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            LaunchOutcome::Materialized { .. } | LaunchOutcome::Focused { .. }
        )
    }

    pub fn session_name(&self) -> Option<&SessionName> {
        match self {
            LaunchOutcome::Materialized { session_name, .. }
            | LaunchOutcome::Focused { session_name } => Some(session_name),
            _ => None,
        }
    }
}

impl std::fmt::Display for LaunchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchOutcome::Materialized {
                session_name,
                via_remote: true,
            } => write!(f, "launched {session_name} via control plane"),
            LaunchOutcome::Materialized { session_name, .. } => {
                write!(f, "launched {session_name} locally")
            }
            LaunchOutcome::Focused { session_name } => write!(f, "focused {session_name}"),
            LaunchOutcome::Aborted => write!(f, "launch cancelled"),
            LaunchOutcome::Failed {
                reason,
                remote: Some(remote),
            } => write!(f, "{reason} (control plane: {remote})"),
            LaunchOutcome::Failed { reason, .. } => write!(f, "{reason}"),
        }
    }
}
