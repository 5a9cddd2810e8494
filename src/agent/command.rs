use super::shell::{shell_escape, shell_quote};
use crate::LaunchOptions;
use crate::ticket::TicketMetadata;

/// Default agent CLI
pub const AGENT_BINARY: &str = "claude";
pub const MODEL_FLAG: &str = "--model";
pub const RESUME_FLAG: &str = "--resume";
pub const YOLO_FLAG: &str = "--dangerously-skip-permissions";
pub const PROMPT_FLAG: &str = "-p";

/// Build the agent command line for a ticket using the default agent binary.
///
/// See [`build_command_with`].
pub fn build_command(
    relative_ticket_path: &str,
    metadata: &TicketMetadata,
    options: &LaunchOptions,
    resume_token: Option<&str>,
) -> String {
    build_command_with(AGENT_BINARY, relative_ticket_path, metadata, options, resume_token)
}

/// Build the agent command line for a ticket.
///
/// Layout: `<binary> --model <model> [--resume <token>] [--dangerously-skip-permissions] -p '<instruction>'`.
/// The resume flag needs both `options.resume_session` and a token; a
/// resume request without a token starts a fresh session.
pub fn build_command_with(
    binary: &str,
    relative_ticket_path: &str,
    metadata: &TicketMetadata,
    options: &LaunchOptions,
    resume_token: Option<&str>,
) -> String {
    let mut parts = vec![
        shell_quote(binary),
        MODEL_FLAG.to_string(),
        shell_quote(&options.model),
    ];

    if options.resume_session {
        if let Some(token) = resume_token {
            parts.push(RESUME_FLAG.to_string());
            parts.push(shell_quote(token));
        }
    }

    if options.yolo_mode {
        parts.push(YOLO_FLAG.to_string());
    }

    parts.push(PROMPT_FLAG.to_string());
    parts.push(shell_escape(&ticket_instruction(relative_ticket_path, metadata)));

    parts.join(" ")
}

/// Natural-language instruction pointing the agent at the ticket
pub fn ticket_instruction(relative_ticket_path: &str, metadata: &TicketMetadata) -> String {
    if metadata.step.is_empty() {
        format!("Work on the ticket at {relative_ticket_path}")
    } else {
        format!(
            "Work on the {} step of the ticket at {relative_ticket_path}",
            metadata.step
        )
    }
}
