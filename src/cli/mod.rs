//! CLI command implementations

pub mod endpoint;
pub mod launch;
pub mod operator;
pub mod session;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use opsession::config::Config;
use opsession::terminal::{TerminalHost, TerminalManager, TmuxHost};
use opsession::{SESSION_PREFIX, SessionName, build_session_name};

/// Config plus the CLI overrides that apply to every command
pub struct Context {
    pub config: Config,
    pub tickets_dir: Option<PathBuf>,
}

impl Context {
    pub fn new(config: Config, tickets_dir_override: Option<PathBuf>) -> Self {
        let tickets_dir = tickets_dir_override.or_else(|| config.tickets_dir.clone());
        Self {
            config,
            tickets_dir,
        }
    }

    /// The tmux host, or an error telling the user tmux is missing
    pub async fn tmux_host(&self) -> Result<Arc<dyn TerminalHost>> {
        if !TmuxHost::is_available().await {
            anyhow::bail!("tmux is not installed or not on PATH");
        }
        Ok(Arc::new(TmuxHost::new(self.config.terminal.poll_interval())))
    }

    /// A manager over tmux that already knows the sessions tmux holds and
    /// follows their activity for as long as it lives
    pub async fn restored_manager(&self) -> Result<TerminalManager> {
        let manager = TerminalManager::new(self.tmux_host().await?);
        let adopted = manager.restore().await?;
        tracing::debug!("adopted {} existing session(s)", adopted);
        manager.listen();
        Ok(manager)
    }

    pub fn tickets_dir_for(&self, ticket_path: &Path) -> Option<PathBuf> {
        self.tickets_dir
            .clone()
            .or_else(|| opsession::ticket::find_tickets_dir(ticket_path))
    }
}

/// Accepts either a full session name (`op-FEAT-1`) or a bare ticket id
pub fn resolve_session_name(arg: &str) -> SessionName {
    if arg.starts_with(SESSION_PREFIX) {
        SessionName::from_raw(arg)
    } else {
        build_session_name(arg)
    }
}
