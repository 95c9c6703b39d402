//! Clipboard support for the `y` key
//!
//! Record pages copy their rendered key/value text (`y`) or the record as
//! JSON (`Y`), list pages copy one label per line. The clipboard is opened
//! per copy so nothing is held while the TUI idles.

use crate::content::Page;
use crate::page::RecordView;
use anyhow::{Context, Result};
use arboard::Clipboard;

/// Text the active page puts on the clipboard, if it has any
pub fn page_text(page: &Page) -> Option<String> {
    match page {
        Page::Record(record) => match record.view() {
            RecordView::Table(table) => Some(table.to_text()),
            RecordView::Status(_) => None,
        },
        Page::List(list) => {
            let labels: Vec<String> = list
                .list_items()
                .into_iter()
                .map(|item| item.label)
                .collect();
            (!labels.is_empty()).then(|| labels.join("\n"))
        }
        Page::Home | Page::Login | Page::NotFound(_) => None,
    }
}

/// The loaded record as pretty-printed JSON
pub fn page_json(page: &Page) -> Option<String> {
    match page {
        Page::Record(record) => record
            .record()
            .and_then(|r| serde_json::to_string_pretty(&r.to_json()).ok()),
        _ => None,
    }
}

/// Copy text to the system clipboard
///
/// Fails without a display server (headless Linux) or clipboard access.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;
    clipboard
        .set_text(text)
        .context("Failed to set clipboard text")?;
    Ok(())
}
