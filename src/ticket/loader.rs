//! Building [`TicketInfo`] from ticket files on disk

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::metadata;
use crate::{TicketInfo, TicketStatus};

/// Conventional name of the tickets directory inside a project
pub const TICKETS_DIR_NAME: &str = ".tickets";

/// Load a ticket file into a [`TicketInfo`].
///
/// The id comes from the frontmatter (file stem as fallback), the status from
/// the `queue` / `in-progress` / `completed` directory the file sits in
/// (frontmatter status as fallback), and the title from the first heading.
pub fn load_ticket(path: &Path) -> Result<TicketInfo> {
    let file_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to determine current directory")?
            .join(path)
    };

    let content = std::fs::read_to_string(&file_path)
        .with_context(|| format!("Failed to read ticket: {}", file_path.display()))?;
    let meta = metadata::parse(&content);

    let id = meta
        .as_ref()
        .map(|m| m.id.clone())
        .filter(|id| !id.is_empty())
        .or_else(|| {
            file_path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        })
        .with_context(|| format!("Cannot derive a ticket id for {}", file_path.display()))?;

    let status = status_from_dir(&file_path)
        .or_else(|| {
            meta.as_ref()
                .and_then(|m| m.status.as_deref())
                .and_then(|s| s.parse().ok())
        })
        .unwrap_or(TicketStatus::Queue);

    let title = first_heading(&content).unwrap_or_else(|| id.clone());

    Ok(TicketInfo {
        ticket_type: ticket_type_of(&id),
        id,
        title,
        status,
        file_path,
    })
}

/// Ticket type is the id prefix before the first dash, upper-cased
pub fn ticket_type_of(id: &str) -> String {
    id.split('-').next().unwrap_or(id).to_uppercase()
}

/// Nearest ancestor directory named `.tickets`
pub fn find_tickets_dir(ticket_path: &Path) -> Option<PathBuf> {
    ticket_path
        .ancestors()
        .skip(1)
        .find(|dir| dir.file_name().is_some_and(|n| n == TICKETS_DIR_NAME))
        .map(Path::to_path_buf)
}

/// Project root for a tickets directory (its parent)
pub fn project_root(tickets_dir: &Path) -> PathBuf {
    tickets_dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| tickets_dir.to_path_buf())
}

/// Path of the ticket relative to the project root, for agent instructions
pub fn relative_ticket_path(ticket_path: &Path, project_root: Option<&Path>) -> String {
    project_root
        .and_then(|root| ticket_path.strip_prefix(root).ok())
        .unwrap_or(ticket_path)
        .display()
        .to_string()
}

fn status_from_dir(path: &Path) -> Option<TicketStatus> {
    path.parent()?.file_name()?.to_str()?.parse().ok()
}

fn first_heading(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("# "))
        .map(|line| line.trim_start_matches('#').trim().to_string())
        .filter(|title| !title.is_empty())
}
