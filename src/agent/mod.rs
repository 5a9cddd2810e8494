//! Local agent CLI invocation.
//!
//! When the control plane is not available, the launcher builds the agent
//! command itself from the ticket's metadata. Everything here is pure string
//! building so it can be tested without a terminal.

mod command;
mod shell;

pub use command::{
    AGENT_BINARY, MODEL_FLAG, PROMPT_FLAG, RESUME_FLAG, YOLO_FLAG, build_command,
    build_command_with, ticket_instruction,
};
pub use shell::{shell_escape, shell_quote};
