//! Launch orchestration.
//!
//! ```text
//! launch(ticket)
//!   -> conflict check   (existing session? focus / restart / abort)
//!   -> remote attempt   (discover URL, probe, POST launch)
//!   -> local fallback   (parse frontmatter, build agent command)
//!   -> materialized     (create terminal, send command, focus)
//! ```

mod orchestrator;
mod outcome;
mod prompt;

pub use orchestrator::{LaunchSettings, Launcher, TICKET_ENV_VAR};
pub use outcome::LaunchOutcome;
pub use prompt::{ConflictChoice, Operator, PresetOperator, RelaunchChoice};
