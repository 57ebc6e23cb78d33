//! Small markdown building blocks: inline code and pipe tables.

/// Format text as an inline code span.
///
/// Text containing backticks gets a double-backtick fence so the span stays
/// intact.
pub fn code(text: &str) -> String {
    if text.contains('`') {
        format!("`` {} ``", text)
    } else {
        format!("`{}`", text)
    }
}

/// Inline code for present, non-empty values; empty string otherwise
pub fn code_or_empty(text: Option<&str>) -> String {
    match text {
        Some(t) if !t.is_empty() => code(t),
        _ => String::new(),
    }
}

/// Escape characters that would break a table cell
fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\r', '\n'], " ")
}

/// A GitHub-flavored pipe table
#[derive(Debug, Clone)]
pub struct MarkdownTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl MarkdownTable {
    pub fn new<S: AsRef<str>>(header: &[S]) -> Self {
        Self {
            header: header.iter().map(|h| h.as_ref().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; missing cells are padded, extra cells are dropped
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.header.len(), String::new());
        self.rows.push(row);
    }

    /// Render the table, one line per row, each line newline-terminated
    pub fn render(&self) -> String {
        let mut out = String::new();
        push_line(&mut out, &self.header);
        out.push('|');
        for h in &self.header {
            out.push_str(&"-".repeat(h.chars().count().max(3) + 2));
            out.push('|');
        }
        out.push('\n');
        for row in &self.rows {
            push_line(&mut out, row);
        }
        out
    }
}

fn push_line(out: &mut String, cells: &[String]) {
    out.push('|');
    for cell in cells {
        if cell.is_empty() {
            out.push_str("  |");
        } else {
            out.push(' ');
            out.push_str(&escape_cell(cell));
            out.push_str(" |");
        }
    }
    out.push('\n');
}
