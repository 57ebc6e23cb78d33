//! Catalog metadata model and the provider interface the generator consumes.
//!
//! This module provides:
//! - Raw column and constraint descriptors as returned by a catalog
//! - The [`MetadataProvider`] trait implemented by every catalog backend
//! - A PostgreSQL backend reading `information_schema`
//! - An in-memory snapshot backend that can be saved to and loaded from disk

mod postgres;
mod snapshot;

pub use postgres::*;
pub use snapshot::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A column as reported by the catalog, in ordinal order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Declared type, engine specific (e.g. `character varying`)
    #[serde(rename = "type")]
    pub data_type: String,
    /// Whether the column accepts NULL
    pub nullable: bool,
    /// Raw default expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Classification of a table constraint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
    /// Anything else (`CHECK`, `EXCLUDE`, ...), kept verbatim
    Other(String),
}

impl ConstraintKind {
    pub fn as_str(&self) -> &str {
        match self {
            ConstraintKind::PrimaryKey => "PRIMARY KEY",
            ConstraintKind::Unique => "UNIQUE",
            ConstraintKind::ForeignKey => "FOREIGN KEY",
            ConstraintKind::Other(kind) => kind,
        }
    }
}

impl From<String> for ConstraintKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "PRIMARY KEY" => ConstraintKind::PrimaryKey,
            "UNIQUE" => ConstraintKind::Unique,
            "FOREIGN KEY" => ConstraintKind::ForeignKey,
            _ => ConstraintKind::Other(kind),
        }
    }
}

impl From<&str> for ConstraintKind {
    fn from(kind: &str) -> Self {
        ConstraintKind::from(kind.to_string())
    }
}

impl From<ConstraintKind> for String {
    fn from(kind: ConstraintKind) -> Self {
        match kind {
            ConstraintKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a table's constraint listing.
///
/// A multi-column foreign key shows up as several descriptors sharing a name,
/// each mapping one referring column to one target column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintDescriptor {
    /// Schema owning the constraint
    pub schema: String,
    /// Constraint name
    pub name: String,
    /// Constraint kind
    #[serde(rename = "type")]
    pub kind: ConstraintKind,
    /// Referring column in the owning table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_column: Option<String>,
}

impl ConstraintDescriptor {
    /// Create a constraint on a single column
    pub fn new(
        schema: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<ConstraintKind>,
        column: Option<&str>,
    ) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            kind: kind.into(),
            column: column.map(str::to_string),
            target_schema: None,
            target_table: None,
            target_column: None,
        }
    }

    /// Create a foreign key from `column` to `target_schema.target_table.target_column`
    pub fn foreign_key(
        schema: impl Into<String>,
        name: impl Into<String>,
        column: &str,
        target_schema: &str,
        target_table: &str,
        target_column: &str,
    ) -> Self {
        Self {
            target_schema: Some(target_schema.to_string()),
            target_table: Some(target_table.to_string()),
            target_column: Some(target_column.to_string()),
            ..Self::new(schema, name, ConstraintKind::ForeignKey, Some(column))
        }
    }

    /// Whether this constraint refers to the given column (exact match)
    pub fn refers_to(&self, column: &str) -> bool {
        self.column.as_deref() == Some(column)
    }
}

/// Errors raised by catalog backends
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unsupported database URL scheme: {0} (expected postgres:// or postgresql://)")]
    UnsupportedScheme(String),

    #[error("setting up TLS: {0}")]
    Tls(#[source] native_tls::Error),

    #[error("connecting to database: {0}")]
    Connect(#[source] tokio_postgres::Error),

    #[error("querying {what}: {source}")]
    Query {
        what: &'static str,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("operation cancelled by interrupt")]
    Cancelled,

    #[error("table {schema}.{table} is not present in the snapshot")]
    UnknownTable { schema: String, table: String },

    #[error("reading snapshot {path}: {source}")]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing snapshot {path}: {message}")]
    SnapshotFormat { path: PathBuf, message: String },

    #[error("starting async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Source of catalog metadata for documentation generation.
///
/// Implementations decide ordering: tables in whatever order the backend
/// reports them, columns by ordinal position, constraints in any stable order.
pub trait MetadataProvider {
    /// Names of the tables in `schema`
    fn list_tables(&self, schema: &str) -> Result<Vec<String>, CatalogError>;

    /// Columns of `schema.table` in ordinal order
    fn list_columns(&self, schema: &str, table: &str)
        -> Result<Vec<ColumnDescriptor>, CatalogError>;

    /// Constraint rows of `schema.table`
    fn list_constraints(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ConstraintDescriptor>, CatalogError>;
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for &P {
    fn list_tables(&self, schema: &str) -> Result<Vec<String>, CatalogError> {
        (**self).list_tables(schema)
    }

    fn list_columns(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>, CatalogError> {
        (**self).list_columns(schema, table)
    }

    fn list_constraints(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ConstraintDescriptor>, CatalogError> {
        (**self).list_constraints(schema, table)
    }
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for Box<P> {
    fn list_tables(&self, schema: &str) -> Result<Vec<String>, CatalogError> {
        (**self).list_tables(schema)
    }

    fn list_columns(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>, CatalogError> {
        (**self).list_columns(schema, table)
    }

    fn list_constraints(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ConstraintDescriptor>, CatalogError> {
        (**self).list_constraints(schema, table)
    }
}
