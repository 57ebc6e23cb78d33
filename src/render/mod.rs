//! Markdown rendering of a single table's documentation.
//!
//! A rendered table is made of up to four blocks, in this order:
//! heading + column table, optional Mermaid diagram, optional constraints
//! section. [`RenderedTable::to_markdown`] joins them with one blank line.

pub mod markdown;
mod mermaid;
pub mod terminal;

pub use markdown::{code, code_or_empty, MarkdownTable};
pub use mermaid::{to_mermaid, RELATIONSHIP};

use crate::catalog::{ColumnDescriptor, ConstraintDescriptor};
use crate::schema::{normalize, EnrichedColumn};

/// Marker rendered in the `Nullable` cell of non-nullable columns
pub const NOT_NULL: &str = "NOT NULL";

const COLUMN_HEADER: [&str; 4] = ["Name", "Type", "Nullable", "Default"];
const KEYED_COLUMN_HEADER: [&str; 6] = ["Name", "Type", "Nullable", "Default", "Key", "Target"];
const CONSTRAINT_HEADER: [&str; 7] = [
    "Schema",
    "Name",
    "Type",
    "Referring Column",
    "Target Schema",
    "Target Table",
    "Target Column",
];

/// Which optional blocks to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit the `## Constraints` section when the table has constraints
    pub include_constraints: bool,
    /// Emit a Mermaid erDiagram block
    pub include_diagram: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_constraints: true,
            include_diagram: false,
        }
    }
}

/// Everything known about one table while it is being documented
#[derive(Debug, Clone)]
pub struct TableDocument {
    pub schema: String,
    pub table: String,
    pub columns: Vec<EnrichedColumn>,
    pub constraints: Vec<ConstraintDescriptor>,
}

impl TableDocument {
    /// Build the document from raw catalog rows
    pub fn new(
        schema: &str,
        table: &str,
        columns: &[ColumnDescriptor],
        constraints: Vec<ConstraintDescriptor>,
    ) -> Self {
        Self {
            schema: schema.to_string(),
            table: table.to_string(),
            columns: normalize(columns, &constraints),
            constraints,
        }
    }
}

/// Rendered text blocks of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    /// `# `table``
    pub heading: String,
    /// Column table, newline terminated
    pub columns: String,
    pub diagram: Option<String>,
    /// `## Constraints` heading and table
    pub constraints: Option<String>,
}

impl RenderedTable {
    /// Join all blocks into the table's markdown document.
    ///
    /// The document ends with exactly one newline.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.heading);
        out.push_str("\n\n");
        out.push_str(&self.columns);
        for block in [&self.diagram, &self.constraints].into_iter().flatten() {
            out.push('\n');
            out.push_str(block);
        }
        out
    }
}

fn column_row(column: &EnrichedColumn, keyed: bool) -> Vec<String> {
    let nullable = if column.column.nullable {
        String::new()
    } else {
        NOT_NULL.to_string()
    };
    let mut row = vec![
        code(column.name()),
        column.column.data_type.clone(),
        nullable,
        code_or_empty(column.column.default.as_deref()),
    ];
    if keyed {
        let keys: Vec<&str> = column.roles().into_iter().map(|r| r.marker()).collect();
        row.push(keys.join(", "));
        row.push(
            column
                .foreign_key
                .as_ref()
                .map(|t| t.qualified())
                .unwrap_or_default(),
        );
    }
    row
}

fn constraint_row(constraint: &ConstraintDescriptor) -> Vec<String> {
    vec![
        code_or_empty(Some(&constraint.schema)),
        code_or_empty(Some(&constraint.name)),
        code_or_empty(Some(constraint.kind.as_str())),
        code_or_empty(constraint.column.as_deref()),
        code_or_empty(constraint.target_schema.as_deref()),
        code_or_empty(constraint.target_table.as_deref()),
        code_or_empty(constraint.target_column.as_deref()),
    ]
}

/// Render one table.
///
/// The column table gains `Key` and `Target` columns whenever the table has
/// any constraint rows, so every table of a run that has constraints shares
/// the same header shape.
pub fn render_table(document: &TableDocument, options: RenderOptions) -> RenderedTable {
    let keyed = !document.constraints.is_empty();

    let mut columns = if keyed {
        MarkdownTable::new(&KEYED_COLUMN_HEADER)
    } else {
        MarkdownTable::new(&COLUMN_HEADER)
    };
    for column in &document.columns {
        columns.push_row(column_row(column, keyed));
    }

    let diagram = options
        .include_diagram
        .then(|| to_mermaid(&document.schema, &document.table, &document.columns));

    let constraints = (options.include_constraints && keyed).then(|| {
        let mut table = MarkdownTable::new(&CONSTRAINT_HEADER);
        for constraint in &document.constraints {
            table.push_row(constraint_row(constraint));
        }
        format!("## Constraints\n\n{}", table.render())
    });

    RenderedTable {
        heading: format!("# {}", code(&document.table)),
        columns: columns.render(),
        diagram,
        constraints,
    }
}
