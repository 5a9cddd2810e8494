//! Terminal lifecycle management.
//!
//! The [`TerminalManager`] maps each [`SessionName`](crate::SessionName) to a
//! terminal allocated by a [`TerminalHost`], tracks its [`ActivityState`] from
//! host events, and guarantees at most one live terminal per session.
//!
//! # Hosts
//!
//! - [`TmuxHost`] - detached tmux sessions, activity polled from `list-panes`
//! - [`RecordingHost`] - in-memory host that only records calls (dry runs, tests)
//!
//! # Example
//!
//! ```rust,ignore
//! let manager = TerminalManager::new(Arc::new(TmuxHost::default()));
//! manager.listen();
//!
//! let name = build_session_name("FEAT-123");
//! manager.create(&name, Path::new("/work/repo"), None).await?;
//! manager.send(&name, "claude --model sonnet -p 'Work on ...'").await?;
//! manager.focus(&name).await?;
//! ```

mod activity;
mod host;
mod manager;
pub mod recording;
mod style;
mod tmux;

pub use activity::ActivityState;
pub use host::{ExistingHandle, HandleId, HandleSpec, HostEvent, HostEventKind, TerminalHost};
pub use manager::{SessionSummary, TerminalManager, TerminalRecord};
pub use recording::{HostCall, RecordingHost};
pub use style::{TerminalColor, TerminalStyle};
pub use tmux::TmuxHost;
