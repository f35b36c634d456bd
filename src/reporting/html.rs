//! HTML building blocks shared by the reports
//!
//! Every piece of platform text goes through [`escape`] before it lands in
//! the document. Tables are assembled from [`Cell`]s; records spanning
//! several rows (a dataset and its columns, an analysis and its tasks) are
//! laid out by [`RowGroup`].

use chrono::DateTime;
use std::fmt::Write;

use crate::core::constants::dates;

const CSS: &str = "body { font-family: sans-serif; font-size: 13px; } \
h3 { margin-top: 1em; } \
table { border-collapse: collapse; margin-bottom: 1em; } \
thead { font-weight: bold; } \
table, th, td { border: 1px solid black; } \
th, td { padding: 2px 6px; vertical-align: top; } \
pre { margin: 0; font-family: inherit; }";

/// Escape text for use in element content and attribute values
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Number of table rows a record occupies: never less than one
pub fn rowspan(nested_rows: usize) -> usize {
    nested_rows.max(1)
}

/// Epoch milliseconds as a UTC date; zero, negative or out of range is empty
pub fn format_epoch_millis(millis: i64) -> String {
    if millis <= 0 {
        return String::new();
    }
    DateTime::from_timestamp_millis(millis)
        .map(|date| date.format(dates::DISPLAY_FORMAT).to_string())
        .unwrap_or_default()
}

pub fn format_optional_millis(millis: Option<i64>) -> String {
    millis.map(format_epoch_millis).unwrap_or_default()
}

/// Boolean flag as shown in the reports
pub fn format_flag(flag: bool) -> &'static str {
    if flag { "True" } else { "False" }
}

/// Content of a single table cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    /// One entry per line, rendered preformatted
    Lines(Vec<String>),
}

impl Cell {
    pub fn empty() -> Self {
        Cell::Text(String::new())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Cell::Text(text.into())
    }

    pub fn lines(lines: Vec<String>) -> Self {
        Cell::Lines(lines)
    }

    fn write_to(&self, out: &mut String, rowspan: Option<usize>) {
        match rowspan {
            Some(rows) => {
                let _ = write!(out, "<td rowspan=\"{rows}\">");
            }
            None => out.push_str("<td>"),
        }
        match self {
            Cell::Text(text) => out.push_str(&escape(text)),
            Cell::Lines(lines) if lines.is_empty() => {}
            Cell::Lines(lines) => {
                out.push_str("<pre>");
                let escaped: Vec<String> = lines.iter().map(|line| escape(line)).collect();
                out.push_str(&escaped.join("\n"));
                out.push_str("</pre>");
            }
        }
        out.push_str("</td>");
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::Text(text)
    }
}

/// Header column, optionally grouping sub-columns under a shared label
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub label: &'static str,
    pub children: &'static [&'static str],
}

impl Column {
    pub const fn leaf(label: &'static str) -> Self {
        Self {
            label,
            children: &[],
        }
    }

    pub const fn group(label: &'static str, children: &'static [&'static str]) -> Self {
        Self { label, children }
    }
}

fn render_head(columns: &[Column]) -> String {
    let two_levels = columns.iter().any(|column| !column.children.is_empty());
    let mut head = String::from("<thead><tr>");

    for column in columns {
        let label = escape(column.label);
        if !column.children.is_empty() {
            let _ = write!(head, "<th colspan=\"{}\">{label}</th>", column.children.len());
        } else if two_levels {
            let _ = write!(head, "<th rowspan=\"2\">{label}</th>");
        } else {
            let _ = write!(head, "<th>{label}</th>");
        }
    }
    head.push_str("</tr>");

    if two_levels {
        head.push_str("<tr>");
        for child in columns.iter().flat_map(|column| column.children.iter()) {
            let _ = write!(head, "<th>{}</th>", escape(child));
        }
        head.push_str("</tr>");
    }

    head.push_str("</thead>");
    head
}

/// One logical record laid out over `rowspan(nested.len())` table rows.
///
/// Leading and trailing cells appear once on the first row and span the
/// whole group; each nested row fills the middle columns. A group without
/// nested rows gets a single row with `nested_width` empty cells.
#[derive(Debug, Clone)]
pub struct RowGroup {
    leading: Vec<Cell>,
    nested: Vec<Vec<Cell>>,
    nested_width: usize,
    trailing: Vec<Cell>,
}

impl RowGroup {
    pub fn new(nested_width: usize) -> Self {
        Self {
            leading: Vec::new(),
            nested: Vec::new(),
            nested_width,
            trailing: Vec::new(),
        }
    }

    pub fn leading(mut self, cell: impl Into<Cell>) -> Self {
        self.leading.push(cell.into());
        self
    }

    pub fn trailing(mut self, cell: impl Into<Cell>) -> Self {
        self.trailing.push(cell.into());
        self
    }

    pub fn nested_row(mut self, cells: Vec<Cell>) -> Self {
        self.nested.push(cells);
        self
    }

    /// Rows the group occupies
    pub fn span(&self) -> usize {
        rowspan(self.nested.len())
    }

    pub fn render(&self, out: &mut String) {
        let span = self.span();

        out.push_str("<tr>");
        for cell in &self.leading {
            cell.write_to(out, Some(span));
        }
        match self.nested.first() {
            Some(first) => {
                for cell in first {
                    cell.write_to(out, None);
                }
            }
            None => {
                for _ in 0..self.nested_width {
                    Cell::empty().write_to(out, None);
                }
            }
        }
        for cell in &self.trailing {
            cell.write_to(out, Some(span));
        }
        out.push_str("</tr>");

        for row in self.nested.iter().skip(1) {
            out.push_str("<tr>");
            for cell in row {
                cell.write_to(out, None);
            }
            out.push_str("</tr>");
        }
    }
}

/// Table with a (possibly two-level) header and a body built row by row
#[derive(Debug)]
pub struct Table {
    head: String,
    body: String,
    records: usize,
}

impl Table {
    pub fn new(columns: &[Column]) -> Self {
        Self {
            head: render_head(columns),
            body: String::new(),
            records: 0,
        }
    }

    pub fn row(&mut self, cells: &[Cell]) {
        self.body.push_str("<tr>");
        for cell in cells {
            cell.write_to(&mut self.body, None);
        }
        self.body.push_str("</tr>");
        self.records += 1;
    }

    pub fn group(&mut self, group: &RowGroup) {
        group.render(&mut self.body);
        self.records += 1;
    }

    /// Rows or row groups added so far
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn finish(self) -> String {
        format!("<table>{}<tbody>{}</tbody></table>", self.head, self.body)
    }
}

/// Self-contained HTML document with inline styles
#[derive(Debug)]
pub struct HtmlDocument {
    title: String,
    body: String,
}

impl HtmlDocument {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            body: String::new(),
        }
    }

    /// Add an escaped heading; `level` is clamped to `h1..=h6`
    pub fn heading(&mut self, level: u8, text: &str) {
        let level = level.clamp(1, 6);
        let _ = write!(self.body, "<h{level}>{}</h{level}>", escape(text));
    }

    /// Add already rendered markup
    pub fn push_html(&mut self, html: &str) {
        self.body.push_str(html);
    }

    pub fn finish(self) -> String {
        format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"UTF-8\"><title>{}</title><style>{CSS}</style></head><body>{}</body></html>\n",
            escape(&self.title),
            self.body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_rowspan() {
        assert_eq!(rowspan(0), 1);
        assert_eq!(rowspan(1), 1);
        assert_eq!(rowspan(7), 7);
    }

    #[test]
    fn test_format_epoch_millis() {
        assert_eq!(format_epoch_millis(0), "");
        assert_eq!(format_epoch_millis(-5), "");
        assert_eq!(format_epoch_millis(1_546_300_800_000), "2019-01-01 00:00:00");
        assert_eq!(format_epoch_millis(1_551_429_000_999), "2019-03-01 08:30:00");
        assert_eq!(format_optional_millis(None), "");
    }

    #[test]
    fn test_format_flag() {
        assert_eq!(format_flag(true), "True");
        assert_eq!(format_flag(false), "False");
    }

    #[test]
    fn test_cell_rendering() {
        let mut out = String::new();
        Cell::text("a<b").write_to(&mut out, None);
        Cell::lines(vec!["x".to_string(), "y&z".to_string()]).write_to(&mut out, Some(3));
        Cell::lines(Vec::new()).write_to(&mut out, None);
        assert_eq!(
            out,
            "<td>a&lt;b</td><td rowspan=\"3\"><pre>x\ny&amp;z</pre></td><td></td>"
        );
    }

    #[test]
    fn test_single_level_head() {
        let head = render_head(&[Column::leaf("Name"), Column::leaf("Type")]);
        assert_eq!(head, "<thead><tr><th>Name</th><th>Type</th></tr></thead>");
    }

    #[test]
    fn test_two_level_head() {
        let columns = [
            Column::leaf("Connection"),
            Column::group("DSS Groups", &["Read", "Usage"]),
        ];
        assert_eq!(
            render_head(&columns),
            "<thead><tr><th rowspan=\"2\">Connection</th><th colspan=\"2\">DSS Groups</th></tr>\
             <tr><th>Read</th><th>Usage</th></tr></thead>"
        );
    }

    #[test]
    fn test_row_group_with_nested_rows() {
        let group = RowGroup::new(2)
            .leading("customers")
            .nested_row(vec![Cell::text("id"), Cell::text("bigint")])
            .nested_row(vec![Cell::text("email"), Cell::text("string")])
            .trailing("YES");

        let mut out = String::new();
        group.render(&mut out);

        assert_eq!(group.span(), 2);
        assert_eq!(
            out,
            "<tr><td rowspan=\"2\">customers</td><td>id</td><td>bigint</td><td rowspan=\"2\">YES</td></tr>\
             <tr><td>email</td><td>string</td></tr>"
        );
    }

    #[test]
    fn test_row_group_without_nested_rows() {
        let group = RowGroup::new(3).leading("empty").trailing("UNSURE");
        let mut out = String::new();
        group.render(&mut out);

        assert_eq!(group.span(), 1);
        assert_eq!(
            out,
            "<tr><td rowspan=\"1\">empty</td><td></td><td></td><td></td><td rowspan=\"1\">UNSURE</td></tr>"
        );
    }

    #[test]
    fn test_table_finish() {
        let mut table = Table::new(&[Column::leaf("Dataset")]);
        assert_eq!(table.records(), 0);
        table.row(&[Cell::text("orders")]);
        assert_eq!(table.records(), 1);
        assert_eq!(
            table.finish(),
            "<table><thead><tr><th>Dataset</th></tr></thead><tbody><tr><td>orders</td></tr></tbody></table>"
        );
    }

    #[test]
    fn test_empty_table_keeps_body() {
        let table = Table::new(&[Column::leaf("Name")]);
        assert!(table.finish().contains("<tbody></tbody>"));
    }

    #[test]
    fn test_document() {
        let mut doc = HtmlDocument::new("GDPR audit");
        doc.heading(3, "Project <CRM>");
        doc.heading(9, "clamped");
        doc.push_html("<p>ok</p>");
        let html = doc.finish();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>GDPR audit</title>"));
        assert!(html.contains("<h3>Project &lt;CRM&gt;</h3>"));
        assert!(html.contains("<h6>clamped</h6>"));
        assert!(html.contains("<p>ok</p>"));
        assert!(html.contains("border-collapse"));
        assert!(html.trim_end().ends_with("</body></html>"));
    }
}
