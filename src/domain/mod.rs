//! Core domain types for opsession

mod options;
mod session_name;
mod ticket;

pub use options::LaunchOptions;
pub use session_name::{SessionName, SESSION_PREFIX, build_session_name};
pub use ticket::{TicketInfo, TicketStatus};
