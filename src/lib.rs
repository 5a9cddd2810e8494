//! opsession - ticket-driven agent sessions
//!
//! opsession turns tickets (Markdown files with a small frontmatter block) into
//! interactive coding-agent sessions running inside a terminal multiplexer.
//!
//! ## Launch paths
//!
//! Every launch first tries to delegate to the control plane API, whose port is
//! discovered from a session descriptor the API writes next to the tickets:
//!
//! 1. **Remote**: the API prepares the worktree and hands back the terminal
//!    name, working directory and command to run.
//! 2. **Local fallback**: when the API is down or rejects the request, the
//!    command is synthesized from the ticket's own frontmatter.
//!
//! Either way the session ends up in the [`terminal::TerminalManager`], keyed
//! by its [`SessionName`].

pub mod agent;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod launcher;
pub mod terminal;
pub mod ticket;

pub use domain::*;
pub use error::{HostError, RemoteError, SessionError};
