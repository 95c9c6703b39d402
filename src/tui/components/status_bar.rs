// Status bar component
//
// Current navigation URL on the left, key hints for the active page after it.

use crate::content::Page;
use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Key hints for a page, most specific first
pub fn hints(page: &Page, logged_in: bool) -> &'static str {
    let page_hints = match page {
        Page::Home => "↑/↓ select │ Enter open",
        Page::List(_) => "↑/↓ select │ Enter open │ n/p page │ +/- size │ r refresh",
        Page::Record(_) => "↑/↓ scroll │ y copy │ r refresh",
        Page::Login => "l login form",
        Page::NotFound(_) => "g home",
    };

    match (page, logged_in) {
        (Page::Home, true) => "↑/↓ select │ Enter open │ m me │ o logout │ ? help │ q quit",
        (Page::Home, false) => "↑/↓ select │ Enter open │ l login │ ? help │ q quit",
        _ => page_hints,
    }
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let mut nav = String::new();
    if app.history.can_back() {
        nav.push('‹');
    }
    if app.history.can_forward() {
        nav.push('›');
    }

    let status_text = format!(
        " {} {} │ {}",
        app.history.current(),
        nav,
        hints(&app.page, app.logged_in)
    );

    let status = Paragraph::new(status_text)
        .style(Style::default().fg(app.theme.status_bar))
        .block(Block::default().borders(Borders::TOP));

    f.render_widget(status, area);
}
