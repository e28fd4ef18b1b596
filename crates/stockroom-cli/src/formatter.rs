//! Output formatters for schema and check reports.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use serde_json::json;
use stockroom_core::catalog::{AutoTimestamp, DefaultValue, EntityDef, FieldDef, SchemaRegistry};

use crate::commands::CheckReport;

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter {
    /// Format the given entities of a schema.
    fn format_schema(&self, schema: &SchemaRegistry, entities: &[&EntityDef]) -> String;

    /// Format the result of a store check.
    fn format_check(&self, report: &CheckReport) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

fn describe_default(field: &FieldDef) -> String {
    match &field.default {
        None => String::new(),
        Some(DefaultValue::Null) => "NULL".to_string(),
        Some(DefaultValue::Bool(b)) => b.to_string(),
        Some(DefaultValue::Int(i)) => i.to_string(),
        Some(DefaultValue::Float(x)) => x.to_string(),
        Some(DefaultValue::String(s)) => format!("'{}'", s),
        Some(DefaultValue::AutoIncrement) => "auto increment".to_string(),
        Some(DefaultValue::AutoUuid) => "uuid v4".to_string(),
        Some(DefaultValue::CurrentTimestamp) => "now".to_string(),
    }
}

fn describe_relation(schema: &SchemaRegistry, entity: &str, field: &FieldDef) -> String {
    match schema.relation_for_field(entity, &field.name) {
        Some(relation) => format!(
            "{}.{} on delete {}",
            relation.to_entity, relation.to_field, relation.on_delete
        ),
        None => String::new(),
    }
}

fn describe_auto(field: &FieldDef) -> Option<&'static str> {
    field.auto_timestamp.map(|auto| match auto {
        AutoTimestamp::OnCreate => "on create",
        AutoTimestamp::OnUpdate => "on update",
    })
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_schema(&self, schema: &SchemaRegistry, entities: &[&EntityDef]) -> String {
        let mut output = String::new();

        for entity in entities {
            if !output.is_empty() {
                output.push_str("\n\n");
            }

            output.push_str(&format!(
                "{} ({} fields)\n",
                entity.name,
                entity.field_count()
            ));

            let mut table = Table::new();
            table.set_header(vec![
                "Field", "Type", "Null", "Length", "Default", "Unique", "Relation",
            ]);
            for field in &entity.fields {
                let default = match describe_auto(field) {
                    Some(auto) => auto.to_string(),
                    None => describe_default(field),
                };
                table.add_row(vec![
                    Cell::new(&field.name),
                    Cell::new(field.field_type.to_string()),
                    Cell::new(if field.is_nullable() { "yes" } else { "no" }),
                    Cell::new(field.max_length.map(|n| n.to_string()).unwrap_or_default()),
                    Cell::new(default),
                    Cell::new(if schema.is_unique(&entity.name, &field.name) {
                        "yes"
                    } else {
                        ""
                    }),
                    Cell::new(describe_relation(schema, &entity.name, field)),
                ]);
            }
            output.push_str(&table.to_string());

            for relation in schema.many_to_many_from(&entity.name) {
                output.push_str(&format!(
                    "\n{} <-> {} through {}",
                    relation.name,
                    relation.to_entity,
                    relation.edge_entity.as_deref().unwrap_or("?")
                ));
            }
        }

        output
    }

    fn format_check(&self, report: &CheckReport) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Entity", "Rows"]);
        for (entity, count) in &report.counts {
            table.add_row(vec![Cell::new(entity), Cell::new(count)]);
        }

        format!(
            "Store: {}\nSchema version: {}\nFingerprint: {}\nRecovered: {}\n{}",
            report.path.display(),
            report.version,
            report.fingerprint,
            if report.recovered { "yes" } else { "no" },
            table
        )
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_schema(&self, schema: &SchemaRegistry, entities: &[&EntityDef]) -> String {
        let entities: Vec<serde_json::Value> = entities
            .iter()
            .map(|entity| {
                let fields: Vec<serde_json::Value> = entity
                    .fields
                    .iter()
                    .map(|field| {
                        let relation = schema.relation_for_field(&entity.name, &field.name).map(
                            |r| {
                                json!({
                                    "name": r.name,
                                    "target": r.to_entity,
                                    "on_delete": r.on_delete.to_string(),
                                })
                            },
                        );
                        json!({
                            "name": field.name,
                            "type": field.field_type.to_string(),
                            "nullable": field.is_nullable(),
                            "max_length": field.max_length,
                            "default": field.default.as_ref().map(|_| describe_default(field)),
                            "auto_timestamp": describe_auto(field),
                            "unique": schema.is_unique(&entity.name, &field.name),
                            "relation": relation,
                        })
                    })
                    .collect();

                let many_to_many: Vec<serde_json::Value> = schema
                    .many_to_many_from(&entity.name)
                    .into_iter()
                    .map(|r| {
                        json!({
                            "name": r.name,
                            "target": r.to_entity,
                            "through": r.edge_entity,
                        })
                    })
                    .collect();

                json!({
                    "name": entity.name,
                    "display_name": entity.verbose_name(),
                    "field_count": entity.field_count(),
                    "fields": fields,
                    "many_to_many": many_to_many,
                })
            })
            .collect();

        let doc = json!({
            "version": schema.version,
            "entities": entities,
        });
        serde_json::to_string_pretty(&doc).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }

    fn format_check(&self, report: &CheckReport) -> String {
        let counts: serde_json::Map<String, serde_json::Value> = report
            .counts
            .iter()
            .map(|(entity, count)| (entity.clone(), json!(count)))
            .collect();

        let doc = json!({
            "path": report.path.display().to_string(),
            "version": report.version,
            "fingerprint": report.fingerprint,
            "recovered": report.recovered,
            "counts": counts,
        });
        serde_json::to_string_pretty(&doc).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use stockroom_inventory::inventory_schema;

    #[test]
    fn test_table_schema_lists_fields() {
        let schema = inventory_schema();
        let product = schema.get_entity("Product").unwrap();

        let output = TableFormatter.format_schema(&schema, &[product]);

        assert!(output.starts_with("Product (12 fields)"));
        assert!(output.contains("stock_status"));
        assert!(output.contains("'OOS'"));
        assert!(output.contains("Category.id on delete set null"));
        assert!(output.contains("Product.product_type <-> ProductType through Product_ProductType"));
    }

    #[test]
    fn test_json_schema_is_valid() {
        let schema = inventory_schema();
        let category = schema.get_entity("Category").unwrap();

        let output = JsonFormatter.format_schema(&schema, &[category]);
        let doc: serde_json::Value = serde_json::from_str(&output).unwrap();

        let entity = &doc["entities"][0];
        assert_eq!(entity["name"], "Category");
        assert_eq!(entity["display_name"], "Inventory Category");
        assert_eq!(entity["field_count"], 6);

        let parent = entity["fields"]
            .as_array()
            .unwrap()
            .iter()
            .find(|f| f["name"] == "parent")
            .unwrap();
        assert_eq!(parent["nullable"], true);
        assert_eq!(parent["relation"]["on_delete"], "restrict");
    }

    #[test]
    fn test_json_check_report() {
        let report = CheckReport {
            path: PathBuf::from("/data"),
            fingerprint: "abc".to_string(),
            version: 1,
            recovered: true,
            counts: vec![("Attribute".to_string(), 2), ("Product".to_string(), 0)],
        };

        let doc: serde_json::Value =
            serde_json::from_str(&JsonFormatter.format_check(&report)).unwrap();
        assert_eq!(doc["counts"]["Attribute"], 2);
        assert_eq!(doc["recovered"], true);

        let table = TableFormatter.format_check(&report);
        assert!(table.contains("Fingerprint: abc"));
    }
}
