//! Documentation run: walks schemas and tables and writes markdown files.

use crate::catalog::MetadataProvider;
use crate::render::terminal::{to_terminal, PreviewError};
use crate::render::{render_table, RenderOptions, TableDocument};
use crate::writer::{ensure_output_dir, DocWriter};
use ahash::AHashSet;
use anyhow::{bail, Context, Result};
use indicatif::ProgressBar;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How tables are distributed over output files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Every table in one file
    #[default]
    Unified,
    /// One `<table>.md` file per table
    PerTable,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unified" => Ok(Strategy::Unified),
            "per_table" => Ok(Strategy::PerTable),
            _ => Err(format!(
                "Unknown strategy: {}. Valid options: unified, per_table",
                s
            )),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Unified => write!(f, "unified"),
            Strategy::PerTable => write!(f, "per_table"),
        }
    }
}

/// Everything a documentation run needs
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Schemas to document, in output order
    pub schemas: Vec<String>,
    /// Table names to skip (exact match)
    pub exclude_tables: AHashSet<String>,
    pub strategy: Strategy,
    /// Destination directory, created if missing
    pub directory: PathBuf,
    /// File name used by the unified strategy
    pub filename: String,
    pub render: RenderOptions,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            schemas: vec!["public".to_string()],
            exclude_tables: AHashSet::new(),
            strategy: Strategy::Unified,
            directory: PathBuf::from("."),
            filename: "schema.md".to_string(),
            render: RenderOptions::default(),
        }
    }
}

/// Receives each table's markdown for interactive display
pub trait PreviewSink {
    fn show(&mut self, markdown: &str) -> Result<(), PreviewError>;
}

/// Prints a terminal rendering of each table to stdout
pub struct TerminalPreview<W: Write> {
    out: W,
    colorize: bool,
}

impl TerminalPreview<std::io::Stdout> {
    pub fn stdout(colorize: bool) -> Self {
        Self {
            out: std::io::stdout(),
            colorize,
        }
    }
}

impl<W: Write> TerminalPreview<W> {
    pub fn new(out: W, colorize: bool) -> Self {
        Self { out, colorize }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PreviewSink for TerminalPreview<W> {
    fn show(&mut self, markdown: &str) -> Result<(), PreviewError> {
        let rendered = to_terminal(markdown, self.colorize)?;
        writeln!(self.out, "{}", rendered).map_err(|e| PreviewError::Io(e.to_string()))
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateStats {
    pub tables_written: usize,
    pub tables_excluded: usize,
    pub files: Vec<PathBuf>,
}

/// `<directory>/<table>.md`, refusing table names that would resolve
/// outside `directory`
fn table_file(directory: &Path, table: &str) -> Result<PathBuf> {
    let path = directory.join(format!("{}.md", table));
    if table == "." || table == ".." || table.contains(['/', '\\']) {
        bail!(
            "table name '{}' cannot be used as a file name: {}",
            table,
            path.display()
        );
    }
    Ok(path)
}

/// Drives a documentation run against a metadata provider
pub struct Generator<'a, P: MetadataProvider> {
    provider: P,
    config: GenerateConfig,
    preview: Option<Box<dyn PreviewSink + 'a>>,
    progress: Option<ProgressBar>,
}

impl<'a, P: MetadataProvider> Generator<'a, P> {
    pub fn new(provider: P, config: GenerateConfig) -> Self {
        Self {
            provider,
            config,
            preview: None,
            progress: None,
        }
    }

    /// Send every rendered table to `sink` as well as to its file
    pub fn with_preview(mut self, sink: impl PreviewSink + 'a) -> Self {
        self.preview = Some(Box::new(sink));
        self
    }

    /// Report each table on a progress spinner
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &GenerateConfig {
        &self.config
    }

    /// Run the generation. The first provider or filesystem error aborts it.
    pub fn generate(&mut self) -> Result<GenerateStats> {
        ensure_output_dir(&self.config.directory)?;

        let stats = match self.config.strategy {
            Strategy::Unified => self.generate_unified()?,
            Strategy::PerTable => self.generate_per_table()?,
        };

        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }
        Ok(stats)
    }

    fn generate_unified(&mut self) -> Result<GenerateStats> {
        let path = self.config.directory.join(&self.config.filename);
        let mut writer = DocWriter::create(&path)?;
        let mut stats = GenerateStats::default();

        for schema in self.config.schemas.clone() {
            for table in self.tables(&schema, &mut stats)? {
                let markdown = self.document(&schema, &table)?;
                writer.write_document(&markdown)?;
                stats.tables_written += 1;
            }
        }

        let path = writer.finish()?;
        tracing::info!(path = %path.display(), tables = stats.tables_written, "wrote documentation");
        stats.files.push(path);
        Ok(stats)
    }

    fn generate_per_table(&mut self) -> Result<GenerateStats> {
        let mut stats = GenerateStats::default();

        for schema in self.config.schemas.clone() {
            for table in self.tables(&schema, &mut stats)? {
                let path = table_file(&self.config.directory, &table)?;
                let markdown = self.document(&schema, &table)?;
                let mut writer = DocWriter::create(&path)?;
                writer.write_document(&markdown)?;
                let path = writer.finish()?;
                tracing::info!(path = %path.display(), "wrote documentation");
                stats.tables_written += 1;
                stats.files.push(path);
            }
        }
        Ok(stats)
    }

    /// Tables of `schema` in provider order, minus excluded ones
    fn tables(&self, schema: &str, stats: &mut GenerateStats) -> Result<Vec<String>> {
        let tables = self
            .provider
            .list_tables(schema)
            .with_context(|| format!("fetching tables for schema '{}'", schema))?;

        let (kept, excluded): (Vec<String>, Vec<String>) = tables
            .into_iter()
            .partition(|t| !self.config.exclude_tables.contains(t));
        for table in &excluded {
            tracing::debug!(schema, table = %table, "excluded");
        }
        stats.tables_excluded += excluded.len();
        Ok(kept)
    }

    /// Fetch, normalize and render one table
    fn document(&mut self, schema: &str, table: &str) -> Result<String> {
        tracing::debug!(schema, table, "documenting table");
        if let Some(pb) = &self.progress {
            pb.set_message(format!("{}.{}", schema, table));
            pb.inc(1);
        }

        let constraints = self
            .provider
            .list_constraints(schema, table)
            .with_context(|| format!("fetching constraints for '{}.{}'", schema, table))?;
        let columns = self
            .provider
            .list_columns(schema, table)
            .with_context(|| format!("fetching columns for '{}.{}'", schema, table))?;

        let document = TableDocument::new(schema, table, &columns, constraints);
        let markdown = render_table(&document, self.config.render).to_markdown();

        if let Some(sink) = self.preview.as_mut() {
            if let Err(e) = sink.show(&markdown) {
                tracing::warn!(schema, table, error = %e, "rendering markdown to terminal failed");
            }
        }
        Ok(markdown)
    }
}
