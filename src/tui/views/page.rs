// Page content rendering
//
// - Home: the content menu
// - Record: key/value table, scrollable, nested records indented
// - List: controls line, status line, selectable items
// - Login / NotFound: short hints

use crate::content::{Page, HOME_MENU};
use crate::page::{ListPage, PageState, RecordView};
use crate::render::Table;
use crate::tui::app::App;
use crate::tui::components::scrollbar::{render_scrollbar, ScrollbarStyle};
use crate::tui::theme::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

pub fn render(f: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    match &app.page {
        Page::Home => render_menu(f, inner, app.selected, &app.theme),
        Page::List(list) => render_list(f, inner, list, app.selected, &app.theme),
        Page::Record(record) => match record.view() {
            RecordView::Table(table) => {
                let lines = table_lines(&table, &app.theme);
                app.content_scroll
                    .update_dimensions(lines.len(), inner.height as usize);
                let (start, end) = app.content_scroll.visible_range();
                let visible: Vec<Line> = lines.into_iter().skip(start).take(end - start).collect();
                f.render_widget(Paragraph::new(visible), inner);
                render_scrollbar(f, area, &app.content_scroll, ScrollbarStyle::Arrows);
            }
            RecordView::Status(status) => {
                render_status(f, inner, &status, &record.state(), &app.theme)
            }
        },
        Page::Login => {
            let text = vec![
                Line::raw("Log in to see your own profile."),
                Line::raw(""),
                Line::raw("Press l to open the login form."),
                Line::raw("New here? Run `medium signup` from a shell."),
            ];
            f.render_widget(
                Paragraph::new(text).style(Style::default().fg(app.theme.foreground)),
                inner,
            );
        }
        Page::NotFound(_) => {
            let text = format!("Nothing here: {}", app.history.current());
            f.render_widget(
                Paragraph::new(text).style(Style::default().fg(app.theme.muted)),
                inner,
            );
        }
    }
}

fn render_menu(f: &mut Frame, area: Rect, selected: usize, theme: &Theme) {
    let items: Vec<ListItem> = HOME_MENU
        .iter()
        .map(|(label, _)| ListItem::new(format!("  {}", label)))
        .collect();

    let list = List::new(items)
        .style(Style::default().fg(theme.foreground))
        .highlight_style(theme.selected());
    let mut state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_list(f: &mut Frame, area: Rect, page: &ListPage, selected: usize, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    f.render_widget(Paragraph::new(controls_line(page, theme)), chunks[0]);

    let state = page.state();
    let status_style = match state {
        PageState::Error(_) => Style::default().fg(theme.error),
        _ => Style::default().fg(theme.muted),
    };
    f.render_widget(
        Paragraph::new(page.status_line()).style(status_style),
        chunks[1],
    );

    let items: Vec<ListItem> = page
        .list_items()
        .into_iter()
        .map(|item| ListItem::new(format!("  {}", item.label)))
        .collect();
    let list = List::new(items)
        .style(Style::default().fg(theme.foreground))
        .highlight_style(theme.selected());
    let mut list_state = ListState::default();
    if !page.items().is_empty() {
        list_state.select(Some(selected));
    }
    f.render_stateful_widget(list, chunks[2], &mut list_state);
}

/// `size 25 │ ‹ prev │ next › │ offset 50`, unavailable moves dimmed
fn controls_line<'a>(page: &ListPage, theme: &Theme) -> Line<'a> {
    let enabled = Style::default().fg(theme.highlight);
    let disabled = Style::default().fg(theme.muted);
    let divider = Span::styled(" │ ", Style::default().fg(theme.border));

    Line::from(vec![
        Span::styled(
            format!("size {}", page.page_size()),
            Style::default().fg(theme.label),
        ),
        divider.clone(),
        Span::styled(
            "‹ prev (p)",
            if page.can_prev() { enabled } else { disabled },
        ),
        divider.clone(),
        Span::styled(
            "next (n) ›",
            if page.can_next() { enabled } else { disabled },
        ),
        divider,
        Span::styled(
            format!("offset {}", page.page_offset()),
            Style::default().fg(theme.muted),
        ),
    ])
}

fn render_status(f: &mut Frame, area: Rect, status: &str, state: &PageState, theme: &Theme) {
    let style = match state {
        PageState::Error(_) => Style::default().fg(theme.error),
        _ => Style::default().fg(theme.muted),
    };
    f.render_widget(
        Paragraph::new(status.to_string())
            .style(style)
            .wrap(Wrap { trim: true }),
        area,
    );
}

/// One line per flattened row, labels padded to their sibling column
fn table_lines<'a>(table: &Table, theme: &Theme) -> Vec<Line<'a>> {
    let label_style = Style::default()
        .fg(theme.label)
        .add_modifier(Modifier::BOLD);
    let value_style = Style::default().fg(theme.value);

    table
        .flatten()
        .into_iter()
        .map(|row| {
            let indent = "  ".repeat(row.depth);
            let pad = row.label_width.saturating_sub(row.label.width());
            let label = format!("{}{}{} ", indent, row.label, " ".repeat(pad));
            match row.text {
                Some(text) => Line::from(vec![
                    Span::styled(label, label_style),
                    Span::styled(text.to_string(), value_style),
                ]),
                None => Line::from(Span::styled(label, label_style)),
            }
        })
        .collect()
}
