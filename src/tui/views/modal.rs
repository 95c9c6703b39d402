// Modal overlay rendering
//
// Modals are rendered on top of the page content:
// - Help modal: keyboard shortcuts
// - Login modal: username/password form

use crate::tui::app::App;
use crate::tui::modal::{LoginField, LoginForm, Modal};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, modal: &Modal, app: &App) {
    match modal {
        Modal::Help => render_help(f, app),
        Modal::Login(form) => render_login(f, form, app),
    }
}

/// Calculate centered rect for modal dialog
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn modal_block<'a>(title: &'a str, app: &App) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight))
        .style(Style::default().bg(app.theme.background))
}

fn render_help(f: &mut Frame, app: &App) {
    let key_style = Style::default().fg(app.theme.label);
    let desc_style = Style::default().fg(app.theme.foreground);
    let header_style = Style::default()
        .fg(app.theme.highlight)
        .add_modifier(Modifier::BOLD);

    let kb = |key: &str, desc: &str| -> Line {
        Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("{:<12}", key), key_style),
            Span::styled(desc.to_string(), desc_style),
        ])
    };

    let content = Text::from(vec![
        Line::raw(""),
        Line::from(Span::styled("  Navigation", header_style)),
        kb("↑/↓, j/k", "Select item / scroll record"),
        kb("Enter", "Open selection"),
        kb("Backspace, b", "Back"),
        kb("f", "Forward"),
        kb("g", "Home"),
        Line::raw(""),
        Line::from(Span::styled("  Lists", header_style)),
        kb("n / p", "Next / previous page"),
        kb("+ / -", "Page size up / down"),
        kb("r", "Refresh"),
        Line::raw(""),
        Line::from(Span::styled("  Account", header_style)),
        kb("m", "My profile"),
        kb("l", "Log in"),
        kb("o", "Log out"),
        Line::raw(""),
        Line::from(Span::styled("  Other", header_style)),
        kb("y", "Copy page to clipboard"),
        kb("Y", "Copy record as JSON"),
        kb("L", "Toggle logs panel"),
        kb("?", "This help"),
        kb("q", "Quit"),
    ]);

    let area = centered_rect(52, content.height() as u16 + 2, f.area());
    let help = Paragraph::new(content).block(modal_block(" Help ", app));

    f.render_widget(Clear, area);
    f.render_widget(help, area);
}

fn render_login(f: &mut Frame, form: &LoginForm, app: &App) {
    let field = |label: &str, value: String, focused: bool| -> Line {
        let marker = if focused { "›" } else { " " };
        let value_style = if focused {
            app.theme.selected()
        } else {
            Style::default().fg(app.theme.value)
        };
        Line::from(vec![
            Span::styled(format!("  {} {:<10}", marker, label), Style::default().fg(app.theme.label)),
            Span::styled(format!("{:<24}", value), value_style),
        ])
    };

    let mut lines = vec![
        Line::raw(""),
        field(
            "username",
            form.username.clone(),
            form.focus == LoginField::Username,
        ),
        field(
            "password",
            "•".repeat(form.password.chars().count()),
            form.focus == LoginField::Password,
        ),
        Line::raw(""),
    ];

    if form.submitting {
        lines.push(Line::from(Span::styled(
            format!("  {} logging in...", app.spinner_char()),
            Style::default().fg(app.theme.muted),
        )));
    } else if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            Style::default().fg(app.theme.error),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "  Tab switch field │ Enter submit │ Esc close",
            Style::default().fg(app.theme.muted),
        )));
    }

    let area = centered_rect(44, lines.len() as u16 + 3, f.area());
    let login = Paragraph::new(lines).block(modal_block(" Login ", app));

    f.render_widget(Clear, area);
    f.render_widget(login, area);
}
