//! Ticket documents: frontmatter metadata and on-disk loading

pub mod metadata;
mod loader;

pub use loader::{
    TICKETS_DIR_NAME, find_tickets_dir, load_ticket, project_root, relative_ticket_path,
    ticket_type_of,
};
pub use metadata::{
    INITIAL_SESSION_KEY, TicketMetadata, current_session_token, parse, parse_from_path,
};
