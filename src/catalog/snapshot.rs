//! In-memory catalog snapshots, persisted as JSON or YAML.

use super::{CatalogError, ColumnDescriptor, ConstraintDescriptor, MetadataProvider};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File format of a snapshot, picked from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    /// Detect format from a path; anything that is not `.yaml`/`.yml` is JSON
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("yaml" | "yml") => SnapshotFormat::Yaml,
            _ => SnapshotFormat::Json,
        }
    }
}

/// One table of a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub constraints: Vec<ConstraintDescriptor>,
}

/// One schema of a snapshot, tables in catalog order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<TableSnapshot>,
}

/// A frozen copy of catalog metadata.
///
/// Order is preserved exactly as captured. Schemas that are not present
/// report no tables, the way an empty schema would.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCatalog {
    #[serde(default)]
    pub schemas: Vec<SchemaSnapshot>,
}

impl SnapshotCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a table to `schema`, creating the schema on first use
    pub fn add_table(
        &mut self,
        schema: &str,
        table: &str,
        columns: Vec<ColumnDescriptor>,
        constraints: Vec<ConstraintDescriptor>,
    ) -> &mut Self {
        let table = TableSnapshot {
            name: table.to_string(),
            columns,
            constraints,
        };
        match self.schemas.iter_mut().find(|s| s.name == schema) {
            Some(existing) => existing.tables.push(table),
            None => self.schemas.push(SchemaSnapshot {
                name: schema.to_string(),
                tables: vec![table],
            }),
        }
        self
    }

    /// Copy the given schemas out of another provider, skipping excluded tables
    pub fn capture<P: MetadataProvider + ?Sized>(
        provider: &P,
        schemas: &[String],
        exclude_tables: &[String],
    ) -> Result<Self, CatalogError> {
        let mut snapshot = Self::new();
        for schema in schemas {
            let mut captured = SchemaSnapshot {
                name: schema.clone(),
                tables: Vec::new(),
            };
            for table in provider.list_tables(schema)? {
                if exclude_tables.contains(&table) {
                    continue;
                }
                let constraints = provider.list_constraints(schema, &table)?;
                let columns = provider.list_columns(schema, &table)?;
                captured.tables.push(TableSnapshot {
                    name: table,
                    columns,
                    constraints,
                });
            }
            snapshot.schemas.push(captured);
        }
        Ok(snapshot)
    }

    /// Load a snapshot file, format chosen by extension
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::SnapshotIo {
            path: path.to_path_buf(),
            source,
        })?;
        let format_error = |message: String| CatalogError::SnapshotFormat {
            path: path.to_path_buf(),
            message,
        };
        match SnapshotFormat::from_path(path) {
            SnapshotFormat::Json => {
                serde_json::from_str(&content).map_err(|e| format_error(e.to_string()))
            }
            SnapshotFormat::Yaml => {
                serde_yaml_ng::from_str(&content).map_err(|e| format_error(e.to_string()))
            }
        }
    }

    /// Serialize to the given format
    pub fn serialize_as(&self, format: SnapshotFormat) -> Result<String, String> {
        match format {
            SnapshotFormat::Json => serde_json::to_string_pretty(self).map_err(|e| e.to_string()),
            SnapshotFormat::Yaml => serde_yaml_ng::to_string(self).map_err(|e| e.to_string()),
        }
    }

    /// Write the snapshot to `path`, format chosen by extension
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let content = self
            .serialize_as(SnapshotFormat::from_path(path))
            .map_err(|message| CatalogError::SnapshotFormat {
                path: path.to_path_buf(),
                message,
            })?;
        fs::write(path, content).map_err(|source| CatalogError::SnapshotIo {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Total number of tables across all schemas
    pub fn table_count(&self) -> usize {
        self.schemas.iter().map(|s| s.tables.len()).sum()
    }

    fn table(&self, schema: &str, table: &str) -> Result<&TableSnapshot, CatalogError> {
        self.schemas
            .iter()
            .filter(|s| s.name == schema)
            .flat_map(|s| s.tables.iter())
            .find(|t| t.name == table)
            .ok_or_else(|| CatalogError::UnknownTable {
                schema: schema.to_string(),
                table: table.to_string(),
            })
    }
}

impl MetadataProvider for SnapshotCatalog {
    fn list_tables(&self, schema: &str) -> Result<Vec<String>, CatalogError> {
        Ok(self
            .schemas
            .iter()
            .filter(|s| s.name == schema)
            .flat_map(|s| s.tables.iter().map(|t| t.name.clone()))
            .collect())
    }

    fn list_columns(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>, CatalogError> {
        Ok(self.table(schema, table)?.columns.clone())
    }

    fn list_constraints(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ConstraintDescriptor>, CatalogError> {
        Ok(self.table(schema, table)?.constraints.clone())
    }
}
