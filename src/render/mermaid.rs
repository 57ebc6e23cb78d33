//! Mermaid erDiagram block for a single table.

use crate::schema::{EnrichedColumn, KeyRole};

/// Relationship marker between a table and the table its FK points at
pub const RELATIONSHIP: &str = "o|--o|";

/// Type names cannot contain spaces in an attribute line
fn escape_mermaid_type(s: &str) -> String {
    s.replace(' ', "_")
}

/// Role markers for an attribute line, in the order PK, FK, UK
fn attribute_keys(column: &EnrichedColumn) -> String {
    let mut keys = Vec::with_capacity(3);
    if column.is_primary_key {
        keys.push(KeyRole::Primary.marker());
    }
    if column.foreign_key.is_some() {
        keys.push(KeyRole::Foreign.marker());
    }
    if column.is_unique_key {
        keys.push(KeyRole::Unique.marker());
    }
    keys.join(",")
}

/// Generate a fenced Mermaid erDiagram declaring `schema.table` and one
/// relationship per foreign-key column
pub fn to_mermaid(schema: &str, table: &str, columns: &[EnrichedColumn]) -> String {
    let entity = format!("\"{}.{}\"", schema, table);
    let mut output = String::from("```mermaid\nerDiagram\n");
    let mut relationships = String::new();

    output.push_str(&format!("{} {{\n", entity));
    for column in columns {
        let col_type = escape_mermaid_type(&column.column.data_type);
        let keys = attribute_keys(column);
        if keys.is_empty() {
            output.push_str(&format!("    {} {}\n", col_type, column.name()));
        } else {
            output.push_str(&format!("    {} {} {}\n", col_type, column.name(), keys));
        }

        if let Some(target) = &column.foreign_key {
            relationships.push_str(&format!(
                "{} {} \"{}\" : \"{}\"\n",
                entity,
                RELATIONSHIP,
                target.entity(),
                target.column
            ));
        }
    }
    output.push_str("}\n");

    if !relationships.is_empty() {
        output.push('\n');
        output.push_str(&relationships);
    }
    output.push_str("```\n");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDescriptor, ConstraintDescriptor};
    use crate::schema::normalize;

    fn orders() -> Vec<EnrichedColumn> {
        let columns = vec![
            ColumnDescriptor::new("id", "bigint", false),
            ColumnDescriptor::new("user_id", "bigint", false),
            ColumnDescriptor::new("placed_at", "timestamp with time zone", true),
        ];
        let constraints = vec![
            ConstraintDescriptor::new("shop", "orders_pkey", "PRIMARY KEY", Some("id")),
            ConstraintDescriptor::new("shop", "orders_id_key", "UNIQUE", Some("user_id")),
            ConstraintDescriptor::foreign_key("shop", "orders_user_fk", "user_id", "public", "users", "id"),
        ];
        normalize(&columns, &constraints)
    }

    #[test]
    fn test_mermaid_entity_and_attributes() {
        let output = to_mermaid("shop", "orders", &orders());

        assert!(output.starts_with("```mermaid\nerDiagram\n\"shop.orders\" {\n"));
        assert!(output.contains("    bigint id PK\n"));
        assert!(output.contains("    bigint user_id FK,UK\n"));
        assert!(output.contains("    timestamp_with_time_zone placed_at\n"));
        assert!(output.ends_with("```\n"));
    }

    #[test]
    fn test_mermaid_relationships_after_entity() {
        let output = to_mermaid("shop", "orders", &orders());

        let close = output.find("}\n").unwrap();
        let rel = output
            .find("\"shop.orders\" o|--o| \"public.users\" : \"id\"")
            .unwrap();
        assert!(rel > close);
        assert_eq!(output.matches(RELATIONSHIP).count(), 1);
    }

    #[test]
    fn test_mermaid_without_relationships() {
        let columns = vec![EnrichedColumn::plain(ColumnDescriptor::new("id", "int", false))];
        let output = to_mermaid("public", "t", &columns);
        assert_eq!(
            output,
            "```mermaid\nerDiagram\n\"public.t\" {\n    int id\n}\n```\n"
        );
    }
}
