// Title bar component
//
// Renders the route title, a spinner while a load or login runs, and the
// observed login state on the right.

use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let loading = if app.is_loading() {
        format!(" {}", app.spinner_char())
    } else {
        String::new()
    };
    let title_text = format!(" {}{}", app.title, loading);

    let (login_text, login_color) = if app.logged_in {
        (" ● logged in ", app.theme.logged_in)
    } else {
        (" ○ anonymous ", app.theme.muted)
    };

    let title = Paragraph::new(title_text)
        .style(
            Style::default()
                .fg(app.theme.title)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.title))
                .title_top(
                    Line::from(Span::styled(login_text, Style::default().fg(login_color)))
                        .right_aligned(),
                ),
        );

    f.render_widget(title, area);
}
