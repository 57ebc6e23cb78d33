//! Terminal preview of generated markdown.
//!
//! Understands the subset of markdown the renderer produces: ATX headings,
//! pipe tables, fenced blocks and inline code spans.

use owo_colors::OwoColorize;
use prettytable::format::{FormatBuilder, LinePosition, LineSeparator, TableFormat};
use prettytable::{Cell, Row, Table};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreviewError {
    #[error("line {line}: table row has {found} cells, header has {expected}")]
    MalformedTable {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: code fence is never closed")]
    UnterminatedFence { line: usize },

    #[error("writing preview: {0}")]
    Io(String),
}

/// Table being collected line by line, cells already styled
struct PendingTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Split a `| a | b |` line into cell texts, honouring `\|` escapes
fn split_cells(line: &str) -> Vec<String> {
    let inner = line.trim();
    let inner = inner.strip_prefix('|').unwrap_or(inner);
    let inner = inner.strip_suffix('|').unwrap_or(inner);

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);
    cells.into_iter().map(|c| c.trim().to_string()).collect()
}

fn is_separator(cells: &[String]) -> bool {
    cells
        .iter()
        .all(|c| !c.is_empty() && c.chars().all(|ch| ch == '-' || ch == ':'))
}

/// Byte offset of the next backtick run of exactly `len` backticks
fn closing_run(text: &str, len: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let run = bytes[i..].iter().take_while(|b| **b == b'`').count();
            if run == len {
                return Some(i);
            }
            i += run;
        } else {
            i += 1;
        }
    }
    None
}

/// One leading and one trailing space are stripped when both are present
fn strip_span_padding(span: &str) -> &str {
    if span.len() >= 2 && span.starts_with(' ') && span.ends_with(' ') && !span.trim().is_empty() {
        &span[1..span.len() - 1]
    } else {
        span
    }
}

/// Style inline code spans, dropping their backtick delimiters.
///
/// A span opens with a run of N backticks and closes at the next run of
/// exactly N; an opening run without a match is literal text.
fn inline(text: &str, colorize: bool) -> String {
    let mut out = String::new();
    let mut rest = text;
    while let Some(start) = rest.find('`') {
        out.push_str(&rest[..start]);
        let run = rest[start..].bytes().take_while(|b| *b == b'`').count();
        let after = &rest[start + run..];
        match closing_run(after, run) {
            Some(end) => {
                let span = strip_span_padding(&after[..end]);
                if colorize {
                    out.push_str(&span.cyan().to_string());
                } else {
                    out.push_str(span);
                }
                rest = &after[end + run..];
            }
            None => {
                out.push_str(&rest[start..start + run]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn heading(line: &str, colorize: bool) -> Option<String> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if level == 0 || !line[level..].starts_with(' ') {
        return None;
    }
    let text = inline(line[level..].trim(), false);
    if !colorize {
        return Some(text);
    }
    Some(if level == 1 {
        text.bold().underline().to_string()
    } else {
        text.bold().to_string()
    })
}

/// Borderless layout: `│` between columns, `─┼─` under the header
fn table_format() -> TableFormat {
    FormatBuilder::new()
        .column_separator('│')
        .separators(&[LinePosition::Title], LineSeparator::new('─', '┼', '─', '─'))
        .padding(1, 1)
        .build()
}

fn flush_table(table: PendingTable, out: &mut Vec<String>, colorize: bool) {
    let mut layout = Table::new();
    layout.set_format(table_format());
    layout.set_titles(Row::new(
        table
            .header
            .iter()
            .map(|h| {
                if colorize {
                    Cell::new(&h.bold().to_string())
                } else {
                    Cell::new(h)
                }
            })
            .collect(),
    ));
    for row in &table.rows {
        layout.add_row(Row::new(row.iter().map(|c| Cell::new(c)).collect()));
    }

    out.extend(layout.to_string().lines().map(|l| l.trim_end().to_string()));
}

/// Render markdown for display in a terminal
pub fn to_terminal(markdown: &str, colorize: bool) -> Result<String, PreviewError> {
    let mut out: Vec<String> = Vec::new();
    let mut table: Option<PendingTable> = None;
    let mut fence_start: Option<usize> = None;

    for (idx, line) in markdown.lines().enumerate() {
        let line_no = idx + 1;

        if line.starts_with("```") {
            if fence_start.take().is_none() {
                fence_start = Some(line_no);
            }
            continue;
        }
        if fence_start.is_some() {
            out.push(if colorize {
                format!("  {}", line.dimmed())
            } else {
                format!("  {}", line)
            });
            continue;
        }

        if line.trim_start().starts_with('|') {
            let cells = split_cells(line);
            match table.as_mut() {
                None => {
                    table = Some(PendingTable {
                        header: cells.iter().map(|c| inline(c, colorize)).collect(),
                        rows: Vec::new(),
                    });
                }
                Some(_) if is_separator(&cells) => {}
                Some(pending) => {
                    if cells.len() != pending.header.len() {
                        return Err(PreviewError::MalformedTable {
                            line: line_no,
                            expected: pending.header.len(),
                            found: cells.len(),
                        });
                    }
                    pending
                        .rows
                        .push(cells.iter().map(|c| inline(c, colorize)).collect());
                }
            }
            continue;
        }

        if let Some(pending) = table.take() {
            flush_table(pending, &mut out, colorize);
        }
        match heading(line, colorize) {
            Some(h) => out.push(h),
            None => out.push(inline(line, colorize)),
        }
    }

    if let Some(line) = fence_start {
        return Err(PreviewError::UnterminatedFence { line });
    }
    if let Some(pending) = table.take() {
        flush_table(pending, &mut out, colorize);
    }

    let mut rendered = out.join("\n");
    rendered.push('\n');
    Ok(rendered)
}
