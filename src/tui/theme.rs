// Theme system for the TUI
//
// Two built-in palettes, picked by name from config.

use crate::logging::LogLevel;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

#[derive(Debug, Clone)]
pub struct Theme {
    // Base colors
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub border: Color,
    pub border_type: BorderType,

    // Title and status
    pub title: Color,
    pub status_bar: Color,
    pub highlight: Color,

    // Selection
    pub selection: Color,
    pub selection_fg: Color,

    // Content
    pub label: Color,
    pub value: Color,
    pub error: Color,
    pub logged_in: Color,

    // Log levels
    pub log_error: Color,
    pub log_warn: Color,
    pub log_info: Color,
    pub log_debug: Color,
    pub log_trace: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            background: Color::Reset,
            foreground: Color::White,
            muted: Color::DarkGray,
            border: Color::Gray,
            border_type: BorderType::Rounded,
            title: Color::Cyan,
            status_bar: Color::Gray,
            highlight: Color::Yellow,
            selection: Color::Blue,
            selection_fg: Color::White,
            label: Color::Cyan,
            value: Color::White,
            error: Color::LightRed,
            logged_in: Color::LightGreen,
            log_error: Color::Red,
            log_warn: Color::Yellow,
            log_info: Color::Green,
            log_debug: Color::Blue,
            log_trace: Color::DarkGray,
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color::White,
            foreground: Color::Black,
            muted: Color::Gray,
            border: Color::DarkGray,
            border_type: BorderType::Plain,
            title: Color::Blue,
            status_bar: Color::DarkGray,
            highlight: Color::Magenta,
            selection: Color::LightBlue,
            selection_fg: Color::Black,
            label: Color::Blue,
            value: Color::Black,
            error: Color::Red,
            logged_in: Color::Green,
            log_error: Color::Red,
            log_warn: Color::Magenta,
            log_info: Color::Green,
            log_debug: Color::Blue,
            log_trace: Color::Gray,
        }
    }

    /// Theme by config name; unknown names fall back to dark
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => Self::light(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!("Unknown theme '{}', using dark", other);
                Self::dark()
            }
        }
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.selection_fg)
            .bg(self.selection)
            .add_modifier(Modifier::BOLD)
    }

    pub fn log_level(&self, level: LogLevel) -> Color {
        match level {
            LogLevel::Error => self.log_error,
            LogLevel::Warn => self.log_warn,
            LogLevel::Info => self.log_info,
            LogLevel::Debug => self.log_debug,
            LogLevel::Trace => self.log_trace,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(Theme::by_name("LIGHT").foreground, Theme::light().foreground);
        assert_eq!(Theme::by_name("solarized").foreground, Theme::dark().foreground);
    }
}
