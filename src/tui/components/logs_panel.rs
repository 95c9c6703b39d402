//! Logs panel component
//!
//! Shows the newest captured log entries, color-coded by level. The panel
//! follows new entries until scrolled up with PageUp.

use super::scrollbar::{render_scrollbar, ScrollbarStyle};
use crate::logging::{LogEntry, LogLevel};
use crate::tui::app::App;
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Entries pulled from the buffer per frame
const PANEL_HISTORY: usize = 200;

fn format_log_entry(entry: &LogEntry) -> String {
    format!(
        "[{}] {:5} {} {}",
        entry.timestamp.format("%H:%M:%S"),
        entry.level.as_str(),
        entry.target,
        entry.message
    )
}

fn log_level_style(level: LogLevel, theme: &Theme) -> Style {
    let style = Style::default().fg(theme.log_level(level));
    if level == LogLevel::Error {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

pub fn render(f: &mut Frame, area: Rect, app: &mut App) {
    let entries = app.log_buffer.recent(PANEL_HISTORY);
    // Inside the borders
    let viewport = area.height.saturating_sub(2) as usize;
    app.logs_scroll.update_dimensions(entries.len(), viewport);

    let (start, end) = app.logs_scroll.visible_range();
    let items: Vec<ListItem> = entries[start..end]
        .iter()
        .map(|entry| {
            ListItem::new(format_log_entry(entry)).style(log_level_style(entry.level, &app.theme))
        })
        .collect();

    let title = if app.logs_scroll.auto_follow {
        " Logs "
    } else {
        " Logs [paused] "
    };

    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    f.render_widget(list, area);
    render_scrollbar(f, area, &app.logs_scroll, ScrollbarStyle::Minimal);
}
