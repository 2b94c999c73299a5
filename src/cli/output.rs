//! Output rendering for CLI commands
//!
//! Everything written to stdout goes through here so identical rows always
//! produce byte-identical text. List commands render a row set through a
//! [`Column`] set in one of three list formats; single-entity views use
//! [`DetailBlock`]. Failures render as `ERROR:` lines via [`emit_error`].

use std::collections::HashSet;
use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::api::PageInfo;
use crate::error::LtuiError;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated rows with a header line
    #[default]
    Tsv,
    /// Padded columns separated by `|`
    Table,
    /// Key/value blocks (single-entity views only)
    Detail,
    /// Compact JSON array
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Tsv => "tsv",
            OutputFormat::Table => "table",
            OutputFormat::Detail => "detail",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable output column
pub struct Column<T> {
    /// Selection key, unique within a column set
    pub key: &'static str,
    pub header: &'static str,
    value: fn(&T) -> String,
}

impl<T> Column<T> {
    pub const fn new(key: &'static str, header: &'static str, value: fn(&T) -> String) -> Self {
        Self { key, header, value }
    }

    /// Column whose header is its key
    pub const fn keyed(key: &'static str, value: fn(&T) -> String) -> Self {
        Self::new(key, key, value)
    }

    pub fn value(&self, row: &T) -> String {
        (self.value)(row)
    }
}

/// Output helper carrying the caller's format and field selection
#[derive(Debug, Clone, Default)]
pub struct Output {
    format: OutputFormat,
    fields: Vec<String>,
}

impl Output {
    pub fn new(format: OutputFormat, fields: Vec<String>) -> Self {
        Self { format, fields }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Rejects the format and field selection before any rows are fetched
    pub fn check_columns<T>(&self, columns: &[Column<T>]) -> Result<(), LtuiError> {
        self.list_columns(columns).map(|_| ())
    }

    fn list_columns<'c, T>(
        &self,
        columns: &'c [Column<T>],
    ) -> Result<Vec<&'c Column<T>>, LtuiError> {
        if self.format == OutputFormat::Detail {
            return Err(LtuiError::Validation(format!(
                "Format '{}' not supported for this command",
                self.format
            )));
        }
        select_columns(columns, &self.fields)
    }

    /// Renders rows in the selected list format
    pub fn render_list<T>(&self, rows: &[T], columns: &[Column<T>]) -> Result<String, LtuiError> {
        let selected = self.list_columns(columns)?;
        Ok(match self.format {
            OutputFormat::Table => render_table(rows, &selected),
            OutputFormat::Json => render_json(rows, &selected),
            OutputFormat::Tsv | OutputFormat::Detail => render_tsv(rows, &selected),
        })
    }

    /// Pagination preamble followed by the rendered rows
    pub fn render_page<T>(
        &self,
        page_info: &PageInfo,
        rows: &[T],
        columns: &[Column<T>],
    ) -> Result<String, LtuiError> {
        let body = self.render_list(rows, columns)?;
        let meta = pagination_meta(
            page_info.end_cursor.as_deref(),
            page_info.start_cursor.as_deref(),
            rows.len(),
        );
        Ok(format!("{}\n{}\n", meta, body))
    }
}

/// Resolves requested field keys against a column set
///
/// An empty request selects every column. Otherwise the requested order is
/// kept, repeats are dropped, and every unknown key is reported together.
pub fn select_columns<'c, T>(
    columns: &'c [Column<T>],
    fields: &[String],
) -> Result<Vec<&'c Column<T>>, LtuiError> {
    if fields.is_empty() {
        return Ok(columns.iter().collect());
    }

    let mut seen = HashSet::new();
    let mut selected = Vec::with_capacity(fields.len());
    let mut unknown = Vec::new();
    for field in fields {
        if !seen.insert(field.as_str()) {
            continue;
        }
        match columns.iter().find(|column| column.key == field) {
            Some(column) => selected.push(column),
            None => unknown.push(field.as_str()),
        }
    }

    if !unknown.is_empty() {
        return Err(LtuiError::Validation(format!(
            "Unknown field(s): {}",
            unknown.join(", ")
        )));
    }
    Ok(selected)
}

/// Replaces tab, CR and LF with a single space each
pub fn sanitize_single_line(text: &str) -> String {
    text.replace(['\t', '\r', '\n'], " ")
}

/// Text capped at a character budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncated {
    pub text: String,
    pub truncated: bool,
}

pub const ELLIPSIS: char = '…';

/// Caps `text` at `max` characters, ending lossy output with an ellipsis
pub fn truncate_multiline(text: &str, max: usize) -> Truncated {
    if text.chars().count() <= max {
        return Truncated {
            text: text.to_string(),
            truncated: false,
        };
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push(ELLIPSIS);
    Truncated {
        text: cut,
        truncated: true,
    }
}

/// The three-line list preamble; absent cursors print empty
pub fn pagination_meta(next: Option<&str>, prev: Option<&str>, count: usize) -> String {
    format!(
        "CURSOR_NEXT: {}\nCURSOR_PREV: {}\nCOUNT: {}",
        next.unwrap_or(""),
        prev.unwrap_or(""),
        count
    )
}

/// Single-entity key/value block, always complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailBlock {
    header: String,
    fields: Vec<(&'static str, String)>,
}

impl DetailBlock {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((key, value.into()));
        self
    }
}

impl fmt::Display for DetailBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        let lines: Vec<String> = self
            .fields
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect();
        f.write_str(&lines.join("\n"))
    }
}

/// `ERROR: <code> <message>` with an optional `HINT:` line
pub fn emit_error(code: &str, message: &str, hint: Option<&str>) -> String {
    match hint {
        Some(hint) => format!("ERROR: {} {}\nHINT: {}", code, message, hint),
        None => format!("ERROR: {} {}", code, message),
    }
}

fn render_tsv<T>(rows: &[T], columns: &[&Column<T>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        columns
            .iter()
            .map(|column| column.header)
            .collect::<Vec<_>>()
            .join("\t"),
    );
    for row in rows {
        lines.push(
            columns
                .iter()
                .map(|column| sanitize_single_line(&column.value(row)))
                .collect::<Vec<_>>()
                .join("\t"),
        );
    }
    lines.join("\n")
}

fn render_table<T>(rows: &[T], columns: &[&Column<T>]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| sanitize_single_line(&column.value(row)))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            cells
                .iter()
                .map(|row| row[index].chars().count())
                .fold(column.header.chars().count(), usize::max)
        })
        .collect();

    let pad_line = |values: Vec<&str>| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(value, width)| pad(value, *width))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(pad_line(columns.iter().map(|column| column.header).collect()));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-|-"),
    );
    for row in &cells {
        lines.push(pad_line(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }
    format!("{}{}", value, " ".repeat(width - len))
}

/// Object whose keys serialize in column order
struct JsonRow<'a>(Vec<(&'a str, String)>);

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

fn render_json<T>(rows: &[T], columns: &[&Column<T>]) -> String {
    let items: Vec<JsonRow<'_>> = rows
        .iter()
        .map(|row| {
            JsonRow(
                columns
                    .iter()
                    .map(|column| (column.key, column.value(row)))
                    .collect(),
            )
        })
        .collect();
    // Strings-only maps cannot fail to serialize
    serde_json::to_string(&items).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Row {
        id: String,
        title: String,
    }

    fn row(id: &str, title: &str) -> Row {
        Row {
            id: id.to_string(),
            title: title.to_string(),
        }
    }

    fn columns() -> Vec<Column<Row>> {
        vec![
            Column::keyed("id", |r: &Row| r.id.clone()),
            Column::keyed("title", |r: &Row| r.title.clone()),
        ]
    }

    fn output(format: OutputFormat) -> Output {
        Output::new(format, Vec::new())
    }

    #[test]
    fn json_is_compact() {
        let body = output(OutputFormat::Json)
            .render_list(&[row("123", "Fix bug")], &columns())
            .unwrap();
        assert_eq!(body, r#"[{"id":"123","title":"Fix bug"}]"#);
    }

    #[test]
    fn json_keys_follow_column_order() {
        let out = Output::new(OutputFormat::Json, vec!["title".to_string(), "id".to_string()]);
        let body = out.render_list(&[row("1", "a")], &columns()).unwrap();
        assert_eq!(body, r#"[{"title":"a","id":"1"}]"#);
    }

    #[test]
    fn tsv_replaces_newlines() {
        let body = output(OutputFormat::Tsv)
            .render_list(&[row("1", "Fix\nbug\tnow\r")], &columns())
            .unwrap();
        assert_eq!(body, "id\ttitle\n1\tFix bug now ");
    }

    #[test]
    fn table_layout() {
        let body = output(OutputFormat::Table)
            .render_list(&[row("123", "Fix bug"), row("7", "x")], &columns())
            .unwrap();
        let lines: Vec<&str> = body.split('\n').collect();
        assert_eq!(
            lines,
            vec![
                "id  | title  ",
                "----|--------",
                "123 | Fix bug",
                "7   | x      ",
            ]
        );
    }

    #[test]
    fn table_widths_use_sanitized_values() {
        let body = output(OutputFormat::Table)
            .render_list(&[row("1", "a\nb")], &columns())
            .unwrap();
        assert_eq!(body.split('\n').nth(2), Some("1  | a b  "));
    }

    #[test]
    fn detail_format_rejected_for_lists() {
        let err = output(OutputFormat::Detail)
            .render_list(&[row("1", "a")], &columns())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation_error Format 'detail' not supported for this command"
        );
    }

    #[test]
    fn unknown_fields_are_all_reported() {
        let out = Output::new(
            OutputFormat::Tsv,
            vec!["bogus".to_string(), "id".to_string(), "nope".to_string()],
        );
        let err = out.render_list(&[row("1", "a")], &columns()).unwrap_err();
        assert_eq!(err, LtuiError::Validation("Unknown field(s): bogus, nope".to_string()));
    }

    #[test]
    fn check_columns_matches_render_validation() {
        assert!(output(OutputFormat::Tsv).check_columns(&columns()).is_ok());
        assert!(output(OutputFormat::Detail).check_columns(&columns()).is_err());

        let out = Output::new(OutputFormat::Json, vec!["nope".to_string()]);
        assert_eq!(
            out.check_columns(&columns()),
            Err(LtuiError::Validation("Unknown field(s): nope".to_string()))
        );
    }

    #[test]
    fn field_selection_restricts_and_reorders() {
        let out = Output::new(
            OutputFormat::Tsv,
            vec!["title".to_string(), "id".to_string(), "title".to_string()],
        );
        let body = out.render_list(&[row("1", "a")], &columns()).unwrap();
        assert_eq!(body, "title\tid\na\t1");
    }

    #[test]
    fn empty_rows() {
        assert_eq!(output(OutputFormat::Tsv).render_list(&[], &columns()).unwrap(), "id\ttitle");
        assert_eq!(output(OutputFormat::Json).render_list(&[], &columns()).unwrap(), "[]");
    }

    #[test]
    fn truncation_boundaries() {
        let cut = truncate_multiline("0123456789", 5);
        assert_eq!(cut.text, "0123…");
        assert_eq!(cut.text.chars().count(), 5);
        assert!(cut.truncated);

        let kept = truncate_multiline("01234", 5);
        assert_eq!(kept.text, "01234");
        assert!(!kept.truncated);
    }

    #[test]
    fn truncation_counts_characters() {
        let cut = truncate_multiline("héllo wörld", 6);
        assert_eq!(cut.text, "héllo…");
    }

    #[test]
    fn pagination_preamble() {
        assert_eq!(
            pagination_meta(Some("next-1"), None, 3),
            "CURSOR_NEXT: next-1\nCURSOR_PREV: \nCOUNT: 3"
        );
    }

    #[test]
    fn page_render_prefixes_preamble() {
        let page = PageInfo {
            start_cursor: Some("a".to_string()),
            end_cursor: Some("b".to_string()),
        };
        let text = output(OutputFormat::Tsv)
            .render_page(&page, &[row("1", "x")], &columns())
            .unwrap();
        assert_eq!(text, "CURSOR_NEXT: b\nCURSOR_PREV: a\nCOUNT: 1\nid\ttitle\n1\tx\n");
    }

    #[test]
    fn detail_block_keeps_field_order() {
        let block = DetailBlock::new("ISSUE_CREATED")
            .field("ISSUE", "ENG-1 (issue-1)")
            .field("TITLE", "Fix bug");
        assert_eq!(block.to_string(), "ISSUE_CREATED\nISSUE: ENG-1 (issue-1)\nTITLE: Fix bug");
    }

    #[test]
    fn error_lines() {
        assert_eq!(emit_error("not_found", "Team 'X' not found", None), "ERROR: not_found Team 'X' not found");
        assert_eq!(
            emit_error("auth_missing", "No profile", Some("Run ltui auth add")),
            "ERROR: auth_missing No profile\nHINT: Run ltui auth add"
        );
    }

    proptest! {
        #[test]
        fn truncation_respects_budget(text in "\\PC{0,40}", max in 1usize..30) {
            let cut = truncate_multiline(&text, max);
            let len = text.chars().count();
            if len <= max {
                prop_assert_eq!(&cut.text, &text);
                prop_assert!(!cut.truncated);
            } else {
                prop_assert_eq!(cut.text.chars().count(), max);
                prop_assert!(cut.text.ends_with(ELLIPSIS));
                prop_assert!(cut.truncated);
            }
        }

        #[test]
        fn rendering_is_idempotent(
            titles in proptest::collection::vec("[a-z \\t\\n]{0,12}", 0..6),
            format in prop_oneof![
                Just(OutputFormat::Tsv),
                Just(OutputFormat::Table),
                Just(OutputFormat::Json),
            ],
        ) {
            let rows: Vec<Row> = titles.iter().enumerate().map(|(i, t)| row(&i.to_string(), t)).collect();
            let out = output(format);
            let first = out.render_list(&rows, &columns()).unwrap();
            let second = out.render_list(&rows, &columns()).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn tsv_lines_never_break(titles in proptest::collection::vec("\\PC{0,12}|[\\r\\n\\t]", 1..6)) {
            let rows: Vec<Row> = titles.iter().map(|t| row("x", t)).collect();
            let body = output(OutputFormat::Tsv).render_list(&rows, &columns()).unwrap();
            prop_assert_eq!(body.split('\n').count(), rows.len() + 1);
        }
    }
}
