//! Shell quoting helpers.

/// Escape a string for safe shell use.
///
/// Wraps the string in single quotes and escapes embedded single quotes
/// using the `'\''` technique (end quote, escaped quote, start quote).
///
/// # Example
///
/// ```
/// use opsession::agent::shell_escape;
///
/// assert_eq!(shell_escape("hello"), "'hello'");
/// assert_eq!(shell_escape("it's"), "'it'\\''s'");
/// ```
pub fn shell_escape(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Quote only when needed: plain words (models, ids, tokens) stay bare.
pub fn shell_quote(s: &str) -> String {
    let plain = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '@' | '='));
    if plain { s.to_string() } else { shell_escape(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_escape() {
        assert_eq!(shell_escape("hello"), "'hello'");
        assert_eq!(shell_escape("it's"), "'it'\\''s'");
        assert_eq!(shell_escape(""), "''");
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("claude-sonnet-4"), "claude-sonnet-4");
        assert_eq!(shell_quote("7d1c0c9e-aa"), "7d1c0c9e-aa");
        assert_eq!(shell_quote("two words"), "'two words'");
        assert_eq!(shell_quote("$(rm -rf /)"), "'$(rm -rf /)'");
        assert_eq!(shell_quote(""), "''");
    }
}
