use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use opsession::config::Config;
use opsession::launcher::RelaunchChoice;

mod cli;

#[derive(Parser)]
#[command(name = "opsession")]
#[command(about = "Launch and manage ticket-driven coding agent sessions")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.opsession/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Tickets directory (overrides config; defaults to the nearest .tickets)
    #[arg(long, global = true)]
    tickets_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch an agent session for a ticket
    Launch {
        /// Path to the ticket file
        ticket_file: PathBuf,

        /// Resume the ticket's last agent session if it has one
        #[arg(long)]
        resume: bool,

        #[command(flatten)]
        flags: cli::launch::LaunchFlags,
    },

    /// Relaunch a ticket whose session has gone away
    Relaunch {
        /// Path to the ticket file
        ticket_file: PathBuf,

        /// Resume the last agent session without asking
        #[arg(long, conflicts_with = "fresh")]
        resume: bool,

        /// Start a fresh agent session without asking
        #[arg(long)]
        fresh: bool,

        #[command(flatten)]
        flags: cli::launch::LaunchFlags,
    },

    /// List live sessions
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a session without taking focus
    Show {
        /// Session name or ticket id
        session: String,
    },

    /// Switch to a session
    Focus {
        /// Session name or ticket id
        session: String,
    },

    /// Type a line into a session
    Send {
        /// Session name or ticket id
        session: String,
        text: String,
    },

    /// Kill a session
    Kill {
        /// Session name or ticket id
        session: String,
    },

    /// Show the control plane endpoint and whether it is healthy
    Endpoint,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so listings on stdout stay parseable
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let ctx = cli::Context::new(config, cli.tickets_dir);

    match cli.command {
        Commands::Launch {
            ticket_file,
            resume,
            flags,
        } => {
            cli::launch::launch_command(&ctx, &ticket_file, resume, &flags).await?;
        }
        Commands::Relaunch {
            ticket_file,
            resume,
            fresh,
            flags,
        } => {
            let choice = match (resume, fresh) {
                (true, _) => Some(RelaunchChoice::Resume),
                (_, true) => Some(RelaunchChoice::StartFresh),
                _ => None,
            };
            cli::launch::relaunch_command(&ctx, &ticket_file, choice, &flags).await?;
        }
        Commands::List { json } => {
            cli::session::list_command(&ctx, json).await?;
        }
        Commands::Show { session } => {
            cli::session::show_command(&ctx, &session).await?;
        }
        Commands::Focus { session } => {
            cli::session::focus_command(&ctx, &session).await?;
        }
        Commands::Send { session, text } => {
            cli::session::send_command(&ctx, &session, &text).await?;
        }
        Commands::Kill { session } => {
            cli::session::kill_command(&ctx, &session).await?;
        }
        Commands::Endpoint => {
            cli::endpoint::endpoint_command(&ctx)?;
        }
    }

    Ok(())
}
