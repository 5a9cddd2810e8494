//! Cosmetic terminal styling by ticket type.

use crate::SessionName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalColor {
    Green,
    Red,
    Magenta,
    Yellow,
    Blue,
    Cyan,
}

impl TerminalColor {
    /// Colour name understood by tmux `status-style`
    pub fn tmux_colour(&self) -> &'static str {
        match self {
            TerminalColor::Green => "green",
            TerminalColor::Red => "red",
            TerminalColor::Magenta => "magenta",
            TerminalColor::Yellow => "yellow",
            TerminalColor::Blue => "blue",
            TerminalColor::Cyan => "cyan",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalStyle {
    pub color: TerminalColor,
    pub icon: &'static str,
}

impl TerminalStyle {
    /// Classify a session by the ticket type embedded in its name
    pub fn for_session(name: &SessionName) -> Self {
        let kind = name.ticket_type().unwrap_or_default().to_ascii_uppercase();
        let (color, icon) = match kind.as_str() {
            "FEAT" | "FEATURE" => (TerminalColor::Green, "sparkle"),
            "FIX" | "BUG" => (TerminalColor::Red, "bug"),
            "SPIKE" => (TerminalColor::Magenta, "beaker"),
            "INV" | "INVESTIGATION" => (TerminalColor::Yellow, "search"),
            "TASK" | "CHORE" => (TerminalColor::Blue, "checklist"),
            _ => (TerminalColor::Cyan, "terminal"),
        };
        Self { color, icon }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_session_name;

    #[test]
    fn test_classification() {
        let style = |id: &str| TerminalStyle::for_session(&build_session_name(id));
        assert_eq!(style("FEAT-1").color, TerminalColor::Green);
        assert_eq!(style("fix-2").color, TerminalColor::Red);
        assert_eq!(style("SPIKE-3").icon, "beaker");
        assert_eq!(style("INV-4").color, TerminalColor::Yellow);
        assert_eq!(style("weird").color, TerminalColor::Cyan);
        assert_eq!(
            TerminalStyle::for_session(&SessionName::from_raw("custom")).icon,
            "terminal"
        );
    }
}
