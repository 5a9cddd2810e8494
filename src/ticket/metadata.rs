//! Ticket frontmatter parser
//!
//! Tickets start with a small frontmatter block:
//! ```markdown
//! ---
//! id: FEAT-123
//! status: in-progress
//! step: review
//! priority: P2
//! project: backend
//! worktree_path: /work/backend-feat-123
//! sessions:
//!   initial: 7d1c0c9e-...
//!   review: 0b7e21aa-...
//! ---
//!
//! # Add retries to the uploader
//! ```
//!
//! This is deliberately not a YAML parser: top-level lines are split at the
//! first colon only, so values may contain colons (URLs, timestamps).

use std::collections::BTreeMap;
use std::path::Path;

/// Session key used for the very first agent session on a ticket
pub const INITIAL_SESSION_KEY: &str = "initial";

const SESSIONS_KEY: &str = "sessions";

/// Structured fields extracted from a ticket's frontmatter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketMetadata {
    pub id: String,
    /// Absent status is tolerated but worth noticing
    pub status: Option<String>,
    /// Current workflow step, empty when none recorded
    pub step: String,
    pub priority: String,
    pub project: String,
    pub worktree_path: Option<String>,
    pub branch: Option<String>,
    /// Working directory override for local launches
    pub workdir: Option<String>,
    /// Step name -> agent session resume token
    pub sessions: Option<BTreeMap<String, String>>,
}

/// Parse ticket frontmatter. Returns `None` when there is no metadata block.
pub fn parse(content: &str) -> Option<TicketMetadata> {
    let body = frontmatter_body(content)?;
    if body.iter().all(|line| line.trim().is_empty()) {
        return None;
    }

    let mut metadata = TicketMetadata::default();
    let mut in_sessions = false;

    for line in body {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let indented = line.starts_with(|c: char| c.is_whitespace());
        if indented {
            if in_sessions {
                if let Some((key, value)) = split_pair(line) {
                    metadata
                        .sessions
                        .get_or_insert_with(BTreeMap::new)
                        .insert(key.to_string(), value);
                }
            }
            continue;
        }

        in_sessions = false;
        let Some((key, value)) = split_pair(line) else {
            continue;
        };

        match key {
            "id" => metadata.id = value,
            "status" => metadata.status = non_empty(value),
            "step" => metadata.step = value,
            "priority" => metadata.priority = value,
            "project" => metadata.project = value,
            "worktree_path" => metadata.worktree_path = non_empty(value),
            "branch" => metadata.branch = non_empty(value),
            "workdir" => metadata.workdir = non_empty(value),
            SESSIONS_KEY => {
                in_sessions = true;
                metadata.sessions.get_or_insert_with(BTreeMap::new);
            }
            _ => {}
        }
    }

    if metadata.status.is_none() {
        tracing::debug!("ticket {:?} has no status in its frontmatter", metadata.id);
    }

    Some(metadata)
}

/// Read and parse a ticket file. Any I/O failure yields `None`.
pub fn parse_from_path(path: &Path) -> Option<TicketMetadata> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse(&content),
        Err(e) => {
            tracing::debug!("cannot read ticket {}: {}", path.display(), e);
            None
        }
    }
}

/// The resume token for the ticket's current work.
///
/// The step in progress wins; without a step the first-ever (`initial`)
/// session is used.
pub fn current_session_token(metadata: &TicketMetadata) -> Option<&str> {
    let sessions = metadata.sessions.as_ref()?;
    if !metadata.step.is_empty() {
        if let Some(token) = sessions.get(&metadata.step) {
            return Some(token.as_str());
        }
    }
    sessions.get(INITIAL_SESSION_KEY).map(String::as_str)
}

/// Lines between the opening and closing delimiter, or `None` if either is missing.
fn frontmatter_body(content: &str) -> Option<Vec<&str>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.lines().skip_while(|line| line.trim().is_empty());

    if !is_delimiter(lines.next()?) {
        return None;
    }

    let mut body = Vec::new();
    for line in lines {
        if is_delimiter(line) {
            return Some(body);
        }
        body.push(line);
    }
    None
}

fn is_delimiter(line: &str) -> bool {
    let line = line.trim_end();
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

/// Split at the first colon, trimming both sides
fn split_pair(line: &str) -> Option<(&str, String)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, unquote(value.trim()).to_string()))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_sessions(step: &str, sessions: &[(&str, &str)]) -> TicketMetadata {
        TicketMetadata {
            id: "FEAT-1".to_string(),
            step: step.to_string(),
            sessions: Some(
                sessions
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_basic_fields() {
        let content = "---\nid: FEAT-123\nstatus: queue\nstep: plan\npriority: P1\nproject: api\n---\n\n# Title\n";
        let meta = parse(content).unwrap();
        assert_eq!(meta.id, "FEAT-123");
        assert_eq!(meta.status.as_deref(), Some("queue"));
        assert_eq!(meta.step, "plan");
        assert_eq!(meta.priority, "P1");
        assert_eq!(meta.project, "api");
        assert_eq!(meta.sessions, None);
    }

    #[test]
    fn test_value_with_colon_splits_at_first_colon() {
        let content = "---\nid: FIX-9\nbranch: https://example.com:8080/x\n---\n";
        let meta = parse(content).unwrap();
        assert_eq!(meta.branch.as_deref(), Some("https://example.com:8080/x"));
    }

    #[test]
    fn test_sessions_block_any_indentation() {
        let content = "---\nid: FEAT-1\nsessions:\n  initial: abc\n\treview: def\n        qa: ghi\nstep: review\n  stray: ignored\n---\n";
        let meta = parse(content).unwrap();
        let sessions = meta.sessions.unwrap();
        assert_eq!(sessions.len(), 3);
        assert_eq!(sessions["initial"], "abc");
        assert_eq!(sessions["review"], "def");
        assert_eq!(sessions["qa"], "ghi");
        assert_eq!(meta.step, "review");
    }

    #[test]
    fn test_empty_sessions_block_is_present_but_empty() {
        let meta = parse("---\nid: A-1\nsessions:\n---\n").unwrap();
        assert_eq!(meta.sessions, Some(BTreeMap::new()));
        assert_eq!(current_session_token(&meta), None);
    }

    #[test]
    fn test_missing_block_returns_none() {
        assert_eq!(parse("# Just a title\n\nid: nope\n"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_unclosed_block_returns_none() {
        assert_eq!(parse("---\nid: A-1\nstatus: queue\n"), None);
    }

    #[test]
    fn test_empty_body_returns_none() {
        assert_eq!(parse("---\n---\nbody"), None);
        assert_eq!(parse("---\n   \n-----\n"), None);
    }

    #[test]
    fn test_missing_fields_default() {
        let meta = parse("---\ntitle: something\n---\n").unwrap();
        assert_eq!(meta.id, "");
        assert_eq!(meta.step, "");
        assert_eq!(meta.priority, "");
        assert_eq!(meta.project, "");
        assert_eq!(meta.status, None);
    }

    #[test]
    fn test_longer_delimiters_and_bom() {
        let content = "\u{feff}\n-----\nid: B-2\n------\n";
        assert_eq!(parse(content).unwrap().id, "B-2");
    }

    #[test]
    fn test_quoted_values_and_comments() {
        let content = "---\n# comment: here\nid: \"C-3\"\nproject: 'web app'\n---\n";
        let meta = parse(content).unwrap();
        assert_eq!(meta.id, "C-3");
        assert_eq!(meta.project, "web app");
    }

    #[test]
    fn test_parse_from_path_io_failures() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(parse_from_path(&dir.path().join("missing.md")), None);
        assert_eq!(parse_from_path(dir.path()), None);

        let file = dir.path().join("FEAT-1.md");
        std::fs::write(&file, "---\nid: FEAT-1\n---\n").unwrap();
        assert_eq!(parse_from_path(&file).unwrap().id, "FEAT-1");
    }

    #[test]
    fn test_token_initial_without_step() {
        let meta = with_sessions("", &[("initial", "A")]);
        assert_eq!(current_session_token(&meta), Some("A"));
    }

    #[test]
    fn test_token_current_step_wins() {
        let meta = with_sessions("review", &[("initial", "A"), ("review", "B")]);
        assert_eq!(current_session_token(&meta), Some("B"));
    }

    #[test]
    fn test_token_falls_back_to_initial_for_unknown_step() {
        let meta = with_sessions("qa", &[("initial", "A"), ("review", "B")]);
        assert_eq!(current_session_token(&meta), Some("A"));
    }

    #[test]
    fn test_token_absent_without_sessions() {
        let meta = TicketMetadata {
            step: "review".to_string(),
            ..Default::default()
        };
        assert_eq!(current_session_token(&meta), None);
        assert_eq!(current_session_token(&with_sessions("review", &[("qa", "Q")])), None);
    }

    #[test]
    fn test_round_trip_from_parts() {
        let fields = [
            ("id", "FEAT-77"),
            ("status", "in-progress"),
            ("step", "build"),
            ("priority", "P0"),
            ("project", "core"),
            ("worktree_path", "/tmp/wt/feat-77"),
            ("branch", "feat/77"),
            ("workdir", "/srv/core"),
        ];
        let sessions = [("initial", "s-1"), ("build", "s-2"), ("plan", "s-3")];

        let mut doc = String::from("---\n");
        for (k, v) in fields {
            doc.push_str(&format!("{k}: {v}\n"));
        }
        doc.push_str("sessions:\n");
        for (k, v) in sessions {
            doc.push_str(&format!("  {k}: {v}\n"));
        }
        doc.push_str("---\n\nBody text\n");

        let meta = parse(&doc).unwrap();
        assert_eq!(
            meta,
            TicketMetadata {
                id: "FEAT-77".into(),
                status: Some("in-progress".into()),
                step: "build".into(),
                priority: "P0".into(),
                project: "core".into(),
                worktree_path: Some("/tmp/wt/feat-77".into()),
                branch: Some("feat/77".into()),
                workdir: Some("/srv/core".into()),
                sessions: Some(
                    sessions
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect()
                ),
            }
        );
        assert_eq!(current_session_token(&meta), Some("s-2"));
    }
}
