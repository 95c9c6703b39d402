// Views module - screen-level rendering
//
// The shell is fixed: title bar, page content, optional logs panel, status
// bar. The content slot dispatches on the active page.

mod modal;
mod page;

use super::app::App;
use crate::tui::components::{logs_panel, status_bar, title_bar};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::Frame;

/// Height of the logs panel when shown
const LOGS_HEIGHT: u16 = 10;

/// Main UI render function - called on every frame
pub fn draw(f: &mut Frame, app: &mut App) {
    let bg_block = Block::default().style(Style::default().bg(app.theme.background));
    f.render_widget(bg_block, f.area());

    let mut constraints = vec![Constraint::Length(3), Constraint::Min(6)];
    if app.show_logs {
        constraints.push(Constraint::Length(LOGS_HEIGHT));
    }
    constraints.push(Constraint::Length(2));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    title_bar::render(f, chunks[0], app);
    page::render(f, chunks[1], app);
    if app.show_logs {
        logs_panel::render(f, chunks[2], app);
    }
    status_bar::render(f, chunks[chunks.len() - 1], app);

    if let Some(ref modal_state) = app.modal {
        modal::render(f, modal_state, app);
    }

    if let Some(ref toast) = app.toast {
        toast.render(f, f.area(), &app.theme);
    }
}
