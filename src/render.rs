//! Key/value table rendering for records
//!
//! `render()` turns a record into a two-column `Table` (label, value),
//! recursing into nested records. The table is a plain data structure;
//! the TUI and the headless printer both consume it through `flatten()`.

use crate::record::{Record, Value};

/// Placeholder shown for null values
pub const NULL_PLACEHOLDER: &str = "-";

/// Separator between sequence elements
pub const SEQUENCE_SEPARATOR: &str = ", ";

/// Rendering options
///
/// `labels` is only honoured when it has exactly as many entries as the
/// key list; otherwise raw keys are used as labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub keys: Option<Vec<String>>,
    pub labels: Option<Vec<String>>,
    /// Appended to every label
    pub end: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            keys: None,
            labels: None,
            end: ":".to_string(),
        }
    }
}

impl RenderOptions {
    pub fn keys(mut self, keys: &[&str]) -> Self {
        self.keys = Some(keys.iter().map(|k| k.to_string()).collect());
        self
    }

    pub fn labels(mut self, labels: &[&str]) -> Self {
        self.labels = Some(labels.iter().map(|l| l.to_string()).collect());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Label including the terminator
    pub label: String,
    pub value: Cell,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Table(Table),
}

/// A table row flattened for line-oriented output
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow<'a> {
    pub depth: usize,
    pub label: &'a str,
    /// None for a row whose value is a nested table (its rows follow)
    pub text: Option<&'a str>,
    /// Widest label among this row's siblings, for column alignment
    pub label_width: usize,
}

/// Render a record as a key/value table
pub fn render(record: &Record, options: &RenderOptions) -> Table {
    let keys: Vec<&str> = match &options.keys {
        Some(keys) => keys.iter().map(String::as_str).collect(),
        None => record.keys().collect(),
    };

    let labels: Vec<&str> = match &options.labels {
        Some(labels) if labels.len() == keys.len() => labels.iter().map(String::as_str).collect(),
        _ => keys.clone(),
    };

    let rows = keys
        .iter()
        .zip(labels)
        .map(|(key, label)| Row {
            label: format!("{}{}", label, options.end),
            value: render_value(record.get(key), options),
        })
        .collect();

    Table { rows }
}

fn render_value(value: Option<&Value>, options: &RenderOptions) -> Cell {
    match value {
        // Explicit key not present in the payload
        None => Cell::Text(String::new()),
        Some(Value::Null) => Cell::Text(NULL_PLACEHOLDER.to_string()),
        Some(Value::Scalar(s)) => Cell::Text(s.to_string()),
        Some(Value::Sequence(items)) => Cell::Text(
            items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(SEQUENCE_SEPARATOR),
        ),
        Some(Value::Record(nested)) => Cell::Table(render(nested, options)),
    }
}

impl Table {
    /// Depth-first rows with nesting depth, for line-oriented renderers
    pub fn flatten(&self) -> Vec<FlatRow<'_>> {
        let mut out = Vec::new();
        self.flatten_into(0, &mut out);
        out
    }

    fn flatten_into<'a>(&'a self, depth: usize, out: &mut Vec<FlatRow<'a>>) {
        let label_width = self
            .rows
            .iter()
            .map(|r| unicode_width::UnicodeWidthStr::width(r.label.as_str()))
            .max()
            .unwrap_or(0);

        for row in &self.rows {
            match &row.value {
                Cell::Text(text) => out.push(FlatRow {
                    depth,
                    label: &row.label,
                    text: Some(text),
                    label_width,
                }),
                Cell::Table(nested) => {
                    out.push(FlatRow {
                        depth,
                        label: &row.label,
                        text: None,
                        label_width,
                    });
                    nested.flatten_into(depth + 1, out);
                }
            }
        }
    }

    /// Plain text rendering, two spaces of indent per nesting level
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for row in self.flatten() {
            let indent = "  ".repeat(row.depth);
            match row.text {
                Some(text) => {
                    let pad = row
                        .label_width
                        .saturating_sub(unicode_width::UnicodeWidthStr::width(row.label));
                    out.push_str(&format!(
                        "{}{}{} {}\n",
                        indent,
                        row.label,
                        " ".repeat(pad),
                        text
                    ));
                }
                None => out.push_str(&format!("{}{}\n", indent, row.label)),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Scalar;
    use serde_json::json;

    fn artist() -> Record {
        Record::from_json(json!({
            "name": "Ada",
            "short_name": "ada",
            "mediums": ["oil", "ink"],
            "summary": null,
            "studio": {"city": "London", "floor": 3}
        }))
        .unwrap()
    }

    fn cell_text(table: &Table, index: usize) -> &str {
        match &table.rows[index].value {
            Cell::Text(t) => t,
            Cell::Table(_) => panic!("expected text cell"),
        }
    }

    #[test]
    fn test_default_keys_follow_record_order() {
        let table = render(&artist(), &RenderOptions::default());
        let labels: Vec<_> = table.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["name:", "short_name:", "mediums:", "summary:", "studio:"]
        );
    }

    #[test]
    fn test_value_formatting() {
        let table = render(&artist(), &RenderOptions::default());
        assert_eq!(cell_text(&table, 0), "Ada");
        assert_eq!(cell_text(&table, 2), "oil, ink");
        assert_eq!(cell_text(&table, 3), NULL_PLACEHOLDER);

        match &table.rows[4].value {
            Cell::Table(nested) => {
                assert_eq!(nested.rows[0].label, "city:");
                assert_eq!(cell_text(nested, 1), "3");
            }
            Cell::Text(_) => panic!("nested record should render as a table"),
        }
    }

    #[test]
    fn test_explicit_keys_and_labels() {
        let options = RenderOptions::default()
            .keys(&["short_name", "name"])
            .labels(&["short name", "full name"]);
        let table = render(&artist(), &options);

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].label, "short name:");
        assert_eq!(cell_text(&table, 1), "Ada");
    }

    #[test]
    fn test_mismatched_labels_behave_like_no_labels() {
        let keys = RenderOptions::default().keys(&["name", "short_name"]);
        let wrong = keys.clone().labels(&["only one"]);

        assert_eq!(render(&artist(), &wrong), render(&artist(), &keys));
    }

    #[test]
    fn test_render_is_idempotent() {
        let options = RenderOptions::default().keys(&["name", "studio"]);
        assert_eq!(render(&artist(), &options), render(&artist(), &options));
    }

    #[test]
    fn test_missing_explicit_key_renders_empty() {
        let table = render(&artist(), &RenderOptions::default().keys(&["nope"]));
        assert_eq!(cell_text(&table, 0), "");
    }

    #[test]
    fn test_custom_end() {
        let table = render(&artist(), &RenderOptions {
            end: " =".to_string(),
            ..RenderOptions::default().keys(&["name"])
        });
        assert_eq!(table.rows[0].label, "name =");
    }

    #[test]
    fn test_nested_records_reuse_options() {
        // Explicit keys also apply one level down
        let record = Record::new()
            .with("a", Value::Record(Record::new().with("a", Value::text("inner"))));
        let table = render(&record, &RenderOptions::default().keys(&["a"]));

        match &table.rows[0].value {
            Cell::Table(nested) => assert_eq!(cell_text(nested, 0), "inner"),
            Cell::Text(_) => panic!("expected nested table"),
        }
    }

    #[test]
    fn test_flatten_depths() {
        let table = render(&artist(), &RenderOptions::default());
        let flat = table.flatten();
        assert_eq!(flat.len(), 7);
        assert_eq!(flat[4].text, None);
        assert_eq!(flat[5].depth, 1);
        assert_eq!(flat[5].label, "city:");
    }

    #[test]
    fn test_to_text_aligns_labels() {
        let record = Record::new()
            .with("id", Value::Scalar(Scalar::Text("7".into())))
            .with("email", Value::text("a@b.c"));
        let text = render(&record, &RenderOptions::default()).to_text();
        assert_eq!(text, "id:    7\nemail: a@b.c\n");
    }
}
