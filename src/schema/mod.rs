//! Per-table structural model built from raw catalog rows.
//!
//! This module provides:
//! - [`EnrichedColumn`]: a catalog column plus its resolved key roles
//! - [`normalize`]: joins columns with constraint rows, keeping column order
//! - [`resolve_foreign_key`]: the single rule for columns with several FKs

use crate::catalog::{ColumnDescriptor, ConstraintDescriptor, ConstraintKind};
use std::fmt;

/// Key roles a column can take, used to build `Key` cells and diagram markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    Primary,
    Unique,
    Foreign,
}

impl KeyRole {
    pub fn marker(self) -> &'static str {
        match self {
            KeyRole::Primary => "PK",
            KeyRole::Unique => "UK",
            KeyRole::Foreign => "FK",
        }
    }
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Column referenced by a foreign key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyTarget {
    pub schema: String,
    pub table: String,
    pub column: String,
}

impl ForeignKeyTarget {
    fn from_constraint(constraint: &ConstraintDescriptor) -> Self {
        Self {
            schema: constraint.target_schema.clone().unwrap_or_default(),
            table: constraint.target_table.clone().unwrap_or_default(),
            column: constraint.target_column.clone().unwrap_or_default(),
        }
    }

    /// `schema.table` of the referenced table
    pub fn entity(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    /// `schema.table.column` of the referenced column
    pub fn qualified(&self) -> String {
        format!("{}.{}.{}", self.schema, self.table, self.column)
    }
}

/// A catalog column with its key roles resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedColumn {
    /// Column as reported by the catalog
    pub column: ColumnDescriptor,
    /// Whether this column is part of the primary key
    pub is_primary_key: bool,
    /// Whether this column is part of a unique constraint
    pub is_unique_key: bool,
    /// Referenced column, if this column is part of a foreign key
    pub foreign_key: Option<ForeignKeyTarget>,
}

impl EnrichedColumn {
    /// A column with no key roles
    pub fn plain(column: ColumnDescriptor) -> Self {
        Self {
            column,
            is_primary_key: false,
            is_unique_key: false,
            foreign_key: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.column.name
    }

    /// Roles in the order PK, UK, FK (the `Key` cell order)
    pub fn roles(&self) -> Vec<KeyRole> {
        let mut roles = Vec::with_capacity(3);
        if self.is_primary_key {
            roles.push(KeyRole::Primary);
        }
        if self.is_unique_key {
            roles.push(KeyRole::Unique);
        }
        if self.foreign_key.is_some() {
            roles.push(KeyRole::Foreign);
        }
        roles
    }
}

/// Resolve the foreign-key target of a column from every FK row that refers
/// to it. The last row wins.
pub fn resolve_foreign_key<'a, I>(matches: I) -> Option<ForeignKeyTarget>
where
    I: IntoIterator<Item = &'a ConstraintDescriptor>,
{
    matches
        .into_iter()
        .filter(|c| c.kind == ConstraintKind::ForeignKey)
        .last()
        .map(ForeignKeyTarget::from_constraint)
}

/// Join columns with the table's constraint rows.
///
/// Column order is preserved. Matching is exact on the referring column name;
/// constraint kinds other than PK/UNIQUE/FK do not contribute a role.
pub fn normalize(
    columns: &[ColumnDescriptor],
    constraints: &[ConstraintDescriptor],
) -> Vec<EnrichedColumn> {
    columns
        .iter()
        .map(|column| {
            let matching: Vec<&ConstraintDescriptor> = constraints
                .iter()
                .filter(|c| c.refers_to(&column.name))
                .collect();

            EnrichedColumn {
                column: column.clone(),
                is_primary_key: matching.iter().any(|c| c.kind == ConstraintKind::PrimaryKey),
                is_unique_key: matching.iter().any(|c| c.kind == ConstraintKind::Unique),
                foreign_key: resolve_foreign_key(matching.iter().copied()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("id", "integer", false),
            ColumnDescriptor::new("org_id", "integer", false),
            ColumnDescriptor::new("email", "text", true),
        ]
    }

    #[test]
    fn test_no_constraints_means_no_roles() {
        let enriched = normalize(&columns(), &[]);
        assert_eq!(enriched.len(), 3);
        assert!(enriched.iter().all(|c| c.roles().is_empty()));
        let names: Vec<&str> = enriched.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["id", "org_id", "email"]);
    }

    #[test]
    fn test_roles_combine_on_one_column() {
        let constraints = vec![
            ConstraintDescriptor::new("public", "members_pkey", "PRIMARY KEY", Some("org_id")),
            ConstraintDescriptor::foreign_key(
                "public",
                "members_org_fk",
                "org_id",
                "public",
                "orgs",
                "id",
            ),
            ConstraintDescriptor::new("public", "members_email_key", "UNIQUE", Some("email")),
        ];
        let enriched = normalize(&columns(), &constraints);

        assert!(enriched[0].roles().is_empty());
        assert_eq!(enriched[1].roles(), vec![KeyRole::Primary, KeyRole::Foreign]);
        assert_eq!(
            enriched[1].foreign_key.as_ref().map(|t| t.qualified()),
            Some("public.orgs.id".to_string())
        );
        assert_eq!(enriched[2].roles(), vec![KeyRole::Unique]);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let constraints = vec![ConstraintDescriptor::new(
            "public",
            "pk",
            "PRIMARY KEY",
            Some("ID"),
        )];
        let enriched = normalize(&columns(), &constraints);
        assert!(!enriched[0].is_primary_key);
    }

    #[test]
    fn test_other_kinds_do_not_add_roles() {
        let constraints = vec![
            ConstraintDescriptor::new("public", "id_not_null", "CHECK", Some("id")),
            ConstraintDescriptor::new("public", "no_overlap", "EXCLUDE", None),
        ];
        let enriched = normalize(&columns(), &constraints);
        assert!(enriched.iter().all(|c| c.roles().is_empty()));
    }

    #[test]
    fn test_last_foreign_key_wins() {
        let first = ConstraintDescriptor::foreign_key("public", "a_fk", "org_id", "public", "orgs", "id");
        let second =
            ConstraintDescriptor::foreign_key("public", "b_fk", "org_id", "billing", "accounts", "org_id");
        let enriched = normalize(&columns(), &[first.clone(), second.clone()]);
        let target = enriched[1].foreign_key.as_ref().unwrap();
        assert_eq!(target.entity(), "billing.accounts");
        assert_eq!(target.column, "org_id");

        let reversed = normalize(&columns(), &[second, first]);
        assert_eq!(
            reversed[1].foreign_key.as_ref().unwrap().entity(),
            "public.orgs"
        );
    }

    #[test]
    fn test_foreign_key_with_missing_target_fields() {
        let fk = ConstraintDescriptor::new("public", "dangling", "FOREIGN KEY", Some("org_id"));
        let target = resolve_foreign_key([&fk]).unwrap();
        assert_eq!(target.entity(), ".");
        assert_eq!(target.column, "");
    }
}
