//! Role styling for message rows.

use crate::model::Role;
use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Colors are disabled when the `NO_COLOR` environment variable is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Read `NO_COLOR` from the environment.
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    /// Explicit setting.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== MessageStyles =====

/// Styles for the parts of a rendered message row.
///
/// - User headers (Cyan)
/// - Assistant headers (Green)
/// - System headers (Yellow)
/// - Error headers and bodies (Red)
/// - Fenced code (Gray)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageStyles {
    user: Style,
    assistant: Style,
    system: Style,
    error: Style,
    code: Style,
    meta: Style,
}

impl MessageStyles {
    /// Styles honoring `NO_COLOR`.
    pub fn new() -> Self {
        Self::with_color_config(ColorConfig::from_env())
    }

    /// Styles for an explicit color setting.
    ///
    /// Without colors, headers keep their bold modifier so roles stay distinct.
    pub fn with_color_config(config: ColorConfig) -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        if config.colors_enabled() {
            Self {
                user: bold.fg(Color::Cyan),
                assistant: bold.fg(Color::Green),
                system: bold.fg(Color::Yellow),
                error: bold.fg(Color::Red),
                code: Style::default().fg(Color::Gray),
                meta: Style::default().fg(Color::DarkGray),
            }
        } else {
            Self {
                user: bold,
                assistant: bold,
                system: bold,
                error: bold,
                code: Style::default(),
                meta: Style::default(),
            }
        }
    }

    /// Header style for a role.
    pub fn header(&self, role: Role) -> Style {
        match role {
            Role::User => self.user,
            Role::Assistant => self.assistant,
            Role::System => self.system,
            Role::Error => self.error,
        }
    }

    /// Body style for a role outside code blocks.
    pub fn body(&self, role: Role) -> Style {
        match role {
            Role::Error => self.error.remove_modifier(Modifier::BOLD),
            _ => Style::default(),
        }
    }

    /// Style for lines inside fenced code blocks.
    pub fn code(&self) -> Style {
        self.code
    }

    /// Style for timestamps and token counts.
    pub fn meta(&self) -> Style {
        self.meta
    }
}

impl Default for MessageStyles {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_get_distinct_header_colors() {
        let styles = MessageStyles::with_color_config(ColorConfig::new(true));
        assert_eq!(styles.header(Role::User).fg, Some(Color::Cyan));
        assert_eq!(styles.header(Role::Assistant).fg, Some(Color::Green));
        assert_eq!(styles.header(Role::Error).fg, Some(Color::Red));
    }

    #[test]
    fn disabled_colors_keep_headers_bold() {
        let styles = MessageStyles::with_color_config(ColorConfig::new(false));
        let header = styles.header(Role::User);
        assert_eq!(header.fg, None);
        assert!(header.add_modifier.contains(Modifier::BOLD));
        assert_eq!(styles.code(), Style::default());
    }

    #[test]
    fn error_body_is_red_but_not_bold() {
        let styles = MessageStyles::with_color_config(ColorConfig::new(true));
        let body = styles.body(Role::Error);
        assert_eq!(body.fg, Some(Color::Red));
        assert!(!body.add_modifier.contains(Modifier::BOLD));
    }
}
