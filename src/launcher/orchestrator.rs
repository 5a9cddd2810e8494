//! Launch orchestration: conflict check, remote delegation, local fallback.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::outcome::LaunchOutcome;
use super::prompt::{ConflictChoice, Operator, RelaunchChoice};
use crate::agent::{AGENT_BINARY, build_command_with};
use crate::api::{ControlPlane, LaunchTicketRequest, WRAPPER_ID, resolve_base_url};
use crate::terminal::TerminalManager;
use crate::ticket::{
    TicketMetadata, current_session_token, find_tickets_dir, parse_from_path, project_root,
    relative_ticket_path,
};
use crate::{
    LaunchOptions, RemoteError, SessionError, SessionName, TicketInfo, build_session_name,
};

/// Environment variable carrying the ticket id into the session's terminal
pub const TICKET_ENV_VAR: &str = "OPSESSION_TICKET_ID";

/// Static launcher configuration
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    /// Tickets directory; also where the endpoint descriptor lives
    pub tickets_dir: Option<PathBuf>,
    /// Control plane URL when no descriptor is found
    pub default_api_url: String,
    /// Agent CLI used for local launches
    pub agent_binary: String,
}

impl LaunchSettings {
    pub fn new(tickets_dir: Option<PathBuf>, default_api_url: impl Into<String>) -> Self {
        Self {
            tickets_dir,
            default_api_url: default_api_url.into(),
            agent_binary: AGENT_BINARY.to_string(),
        }
    }

    pub fn with_agent_binary(mut self, binary: impl Into<String>) -> Self {
        self.agent_binary = binary.into();
        self
    }
}

/// Turns tickets into live agent sessions.
///
/// Every launch tries the control plane first and falls back to building the
/// agent command locally, so launching keeps working while the control plane
/// is down.
pub struct Launcher {
    terminals: TerminalManager,
    control_plane: Arc<dyn ControlPlane>,
    operator: Arc<dyn Operator>,
    settings: LaunchSettings,
}

impl Launcher {
    pub fn new(
        terminals: TerminalManager,
        control_plane: Arc<dyn ControlPlane>,
        operator: Arc<dyn Operator>,
        settings: LaunchSettings,
    ) -> Self {
        Self {
            terminals,
            control_plane,
            operator,
            settings,
        }
    }

    pub fn terminals(&self) -> &TerminalManager {
        &self.terminals
    }

    /// Launch a ticket's agent session.
    pub async fn launch(&self, ticket: &TicketInfo, options: &LaunchOptions) -> LaunchOutcome {
        let session_name = build_session_name(&ticket.id);
        tracing::info!(
            "launching {} as {} ({})",
            ticket.id,
            session_name,
            options.launch_mode_string()
        );

        if let Some(stop) = self.check_conflict(&session_name).await {
            return stop;
        }

        let remote_failure = match self.remote_launch(ticket, options).await {
            Ok(outcome) => return outcome,
            Err(e) => e,
        };
        tracing::warn!(
            "control plane launch of {} failed ({}); launching locally",
            ticket.id,
            remote_failure
        );

        match self.local_launch(ticket, options, &session_name).await {
            Ok(()) => LaunchOutcome::Materialized {
                session_name,
                via_remote: false,
            },
            Err(reason) => LaunchOutcome::Failed {
                reason,
                remote: Some(remote_failure),
            },
        }
    }

    /// Recovery entry point for a ticket whose session is expected but gone.
    pub async fn offer_relaunch(&self, ticket: &TicketInfo, options: &LaunchOptions) -> LaunchOutcome {
        let metadata = parse_from_path(&ticket.file_path);
        let token = metadata
            .as_ref()
            .and_then(current_session_token)
            .map(str::to_string);

        let resume = match self.operator.choose_relaunch(ticket, token.as_deref()).await {
            RelaunchChoice::Resume => token.is_some(),
            RelaunchChoice::StartFresh => false,
            RelaunchChoice::Cancel => return LaunchOutcome::Aborted,
        };

        let options = options.clone().with_resume(resume);
        self.launch(ticket, &options).await
    }

    /// Ask the operator about a live session. `Some` ends the launch, `None`
    /// means the name is free (possibly after a kill).
    async fn check_conflict(&self, session_name: &SessionName) -> Option<LaunchOutcome> {
        if !self.terminals.exists(session_name) {
            return None;
        }
        match self.operator.resolve_conflict(session_name).await {
            ConflictChoice::FocusExisting => Some(match self.terminals.focus(session_name).await {
                Ok(()) => LaunchOutcome::Focused {
                    session_name: session_name.clone(),
                },
                Err(reason) => LaunchOutcome::Failed {
                    reason,
                    remote: None,
                },
            }),
            ConflictChoice::Restart => {
                self.terminals.kill(session_name).await;
                None
            }
            ConflictChoice::Abort => {
                tracing::info!("launch aborted at conflict check for {}", session_name);
                Some(LaunchOutcome::Aborted)
            }
        }
    }

    /// Remote path. `Err` means "fall back", host failures after a successful
    /// remote call are final and come back as `Ok(Failed)`.
    async fn remote_launch(
        &self,
        ticket: &TicketInfo,
        options: &LaunchOptions,
    ) -> Result<LaunchOutcome, RemoteError> {
        let base_url = resolve_base_url(
            self.settings.tickets_dir.as_deref(),
            &self.settings.default_api_url,
        );
        if !self.control_plane.probe(&base_url).await {
            return Err(RemoteError::Unavailable { url: base_url });
        }

        let resume_session_id = if options.resume_session {
            parse_from_path(&ticket.file_path)
                .as_ref()
                .and_then(current_session_token)
                .map(str::to_string)
        } else {
            None
        };
        let request = LaunchTicketRequest {
            provider: options.provider.clone(),
            model: Some(options.model.clone()),
            yolo_mode: options.yolo_mode,
            wrapper: WRAPPER_ID.to_string(),
            retry_reason: options.retry_reason.clone(),
            resume_session_id,
        };

        let launched = self
            .control_plane
            .launch(&base_url, &ticket.id, &request)
            .await?;
        tracing::info!(
            "control plane launched {} in {} (worktree created: {})",
            launched.terminal_name,
            launched.working_directory,
            launched.worktree_created
        );

        let session_name = SessionName::from_raw(launched.terminal_name);
        let expected = build_session_name(&ticket.id);
        if session_name != expected {
            tracing::warn!(
                "control plane named the session {} instead of {}",
                session_name,
                expected
            );
            if let Some(stop) = self.check_conflict(&session_name).await {
                return Ok(stop);
            }
        }

        let working_dir = PathBuf::from(launched.working_directory);
        Ok(
            match self
                .materialize(&session_name, &working_dir, &launched.command, ticket)
                .await
            {
                Ok(()) => LaunchOutcome::Materialized {
                    session_name,
                    via_remote: true,
                },
                Err(reason) => LaunchOutcome::Failed {
                    reason,
                    remote: None,
                },
            },
        )
    }

    async fn local_launch(
        &self,
        ticket: &TicketInfo,
        options: &LaunchOptions,
        session_name: &SessionName,
    ) -> Result<(), SessionError> {
        let metadata =
            parse_from_path(&ticket.file_path).ok_or_else(|| SessionError::MetadataUnavailable {
                ticket_id: ticket.id.clone(),
            })?;

        let resume_token = if options.resume_session {
            current_session_token(&metadata)
        } else {
            None
        };
        if options.resume_session && resume_token.is_none() {
            tracing::info!("{} has no resumable session; starting fresh", ticket.id);
        }

        let root = self.project_root_for(ticket);
        let working_dir = working_dir_for(&metadata, root.as_deref(), &ticket.file_path);
        let relative = relative_ticket_path(&ticket.file_path, root.as_deref());
        let command = build_command_with(
            &self.settings.agent_binary,
            &relative,
            &metadata,
            options,
            resume_token,
        );

        self.materialize(session_name, &working_dir, &command, ticket)
            .await
    }

    /// create -> send -> focus, each awaited before the next
    async fn materialize(
        &self,
        session_name: &SessionName,
        working_dir: &Path,
        command: &str,
        ticket: &TicketInfo,
    ) -> Result<(), SessionError> {
        let mut env = BTreeMap::new();
        env.insert(TICKET_ENV_VAR.to_string(), ticket.id.clone());

        self.terminals
            .create(session_name, working_dir, Some(&env))
            .await?;
        self.terminals.send(session_name, command).await?;
        self.terminals.focus(session_name).await?;
        Ok(())
    }

    fn project_root_for(&self, ticket: &TicketInfo) -> Option<PathBuf> {
        self.settings
            .tickets_dir
            .clone()
            .or_else(|| find_tickets_dir(&ticket.file_path))
            .map(|dir| project_root(&dir))
    }
}

/// Worktree first, then the explicit override, then the project root.
fn working_dir_for(metadata: &TicketMetadata, project_root: Option<&Path>, ticket_path: &Path) -> PathBuf {
    if let Some(worktree) = &metadata.worktree_path {
        return PathBuf::from(worktree);
    }
    if let Some(workdir) = &metadata.workdir {
        return PathBuf::from(workdir);
    }
    project_root
        .map(Path::to_path_buf)
        .or_else(|| ticket_path.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
