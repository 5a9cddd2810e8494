//! `launch` and `relaunch` commands

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use clap::{Args, ValueEnum};

use opsession::api::{ApiClient, ControlPlane, LaunchTicketRequest, LaunchTicketResponse};
use opsession::launcher::{
    ConflictChoice, LaunchOutcome, LaunchSettings, Launcher, Operator, RelaunchChoice,
};
use opsession::terminal::{RecordingHost, TerminalHost, TerminalManager};
use opsession::ticket::load_ticket;
use opsession::{LaunchOptions, RemoteError};

use super::Context;
use super::operator::FlagOperator;

/// What to do when the ticket's session is already running
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnConflict {
    Ask,
    Focus,
    Restart,
    Abort,
}

impl OnConflict {
    fn choice(self) -> Option<ConflictChoice> {
        match self {
            OnConflict::Ask => None,
            OnConflict::Focus => Some(ConflictChoice::FocusExisting),
            OnConflict::Restart => Some(ConflictChoice::Restart),
            OnConflict::Abort => Some(ConflictChoice::Abort),
        }
    }
}

/// Flags shared by `launch` and `relaunch`
#[derive(Debug, Clone, Args)]
pub struct LaunchFlags {
    /// Model to run (defaults to agent.default_model from config)
    #[arg(long)]
    pub model: Option<String>,

    /// Skip the agent's permission prompts
    #[arg(long)]
    pub yolo: bool,

    /// Provider hint passed to the control plane
    #[arg(long)]
    pub provider: Option<String>,

    /// Why this ticket is being retried, passed to the control plane
    #[arg(long)]
    pub retry_reason: Option<String>,

    #[arg(long, value_enum, default_value_t = OnConflict::Ask)]
    pub on_conflict: OnConflict,

    /// Print the terminal calls instead of running them; never contacts the control plane
    #[arg(long)]
    pub dry_run: bool,
}

impl LaunchFlags {
    fn options(&self, ctx: &Context, resume: bool) -> LaunchOptions {
        let model = self
            .model
            .clone()
            .unwrap_or_else(|| ctx.config.agent.default_model.clone());
        LaunchOptions::new(model)
            .with_yolo(self.yolo)
            .with_resume(resume)
            .with_provider(self.provider.clone())
            .with_retry_reason(self.retry_reason.clone())
    }
}

/// Launch a ticket
pub async fn launch_command(
    ctx: &Context,
    ticket_file: &Path,
    resume: bool,
    flags: &LaunchFlags,
) -> Result<()> {
    let ticket = load_ticket(ticket_file)?;
    let operator = FlagOperator {
        conflict: flags.on_conflict.choice(),
        relaunch: None,
    };
    let run = build_launcher(ctx, ticket_file, flags, Arc::new(operator)).await?;

    let outcome = run
        .launcher
        .launch(&ticket, &flags.options(ctx, resume))
        .await;
    report(&run, outcome)
}

/// Relaunch a ticket whose session is gone
pub async fn relaunch_command(
    ctx: &Context,
    ticket_file: &Path,
    relaunch: Option<RelaunchChoice>,
    flags: &LaunchFlags,
) -> Result<()> {
    let ticket = load_ticket(ticket_file)?;
    let operator = FlagOperator {
        conflict: flags.on_conflict.choice(),
        relaunch,
    };
    let run = build_launcher(ctx, ticket_file, flags, Arc::new(operator)).await?;

    let outcome = run
        .launcher
        .offer_relaunch(&ticket, &flags.options(ctx, false))
        .await;
    report(&run, outcome)
}

struct LaunchRun {
    launcher: Launcher,
    recording: Option<Arc<RecordingHost>>,
}

async fn build_launcher(
    ctx: &Context,
    ticket_file: &Path,
    flags: &LaunchFlags,
    operator: Arc<dyn Operator>,
) -> Result<LaunchRun> {
    let settings = LaunchSettings::new(
        ctx.tickets_dir_for(ticket_file),
        ctx.config.api.default_url.clone(),
    )
    .with_agent_binary(ctx.config.agent.binary.clone());

    if flags.dry_run {
        let recording = Arc::new(RecordingHost::new());
        let host: Arc<dyn TerminalHost> = recording.clone();
        let launcher = Launcher::new(
            TerminalManager::new(host),
            Arc::new(Offline),
            operator,
            settings,
        );
        return Ok(LaunchRun {
            launcher,
            recording: Some(recording),
        });
    }

    let terminals = ctx
        .restored_manager()
        .await
        .context("Failed to read existing sessions")?;
    let client = ApiClient::new(
        ctx.config.api.connect_timeout(),
        ctx.config.api.request_timeout(),
    );
    Ok(LaunchRun {
        launcher: Launcher::new(terminals, Arc::new(client), operator, settings),
        recording: None,
    })
}

fn report(run: &LaunchRun, outcome: LaunchOutcome) -> Result<()> {
    if let Some(recording) = &run.recording {
        for call in recording.calls() {
            println!("{call}");
        }
    }

    match outcome {
        LaunchOutcome::Failed { .. } => anyhow::bail!("{outcome}"),
        outcome => {
            println!("{outcome}");
            if let Some(hint) = follow_up(&outcome, run.recording.is_some()) {
                println!("{hint}");
            }
            Ok(())
        }
    }
}

/// How to get back to the session later; nothing for dry runs
fn follow_up(outcome: &LaunchOutcome, dry_run: bool) -> Option<String> {
    if dry_run {
        return None;
    }
    outcome
        .session_name()
        .map(|name| format!("bring it back with: opsession focus {name}"))
}

/// Control plane stand-in for dry runs: always down
struct Offline;

#[async_trait]
impl ControlPlane for Offline {
    async fn probe(&self, _base_url: &str) -> bool {
        false
    }

    async fn launch(
        &self,
        base_url: &str,
        _ticket_id: &str,
        _request: &LaunchTicketRequest,
    ) -> Result<LaunchTicketResponse, RemoteError> {
        Err(RemoteError::Unavailable {
            url: base_url.to_string(),
        })
    }
}
