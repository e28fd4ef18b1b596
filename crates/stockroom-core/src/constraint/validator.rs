//! Constraint validation logic.
//!
//! The ConstraintValidator turns caller-supplied assignments into a
//! complete, type-checked row and enforces field, foreign key and unique
//! constraints for insert and update operations.

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::catalog::{
    AutoTimestamp, DefaultValue, EntityDef, FieldDef, FieldType, ScalarType, SchemaRegistry,
};
use crate::error::{Error, ValidationError};
use crate::row::Row;
use crate::storage::key::{encode_row_key, table_tree};
use crate::storage::Transaction;
use crate::value::{Fields, Value};

use super::unique_index::UniqueIndex;

/// Constraint validator for enforcing schema constraints.
pub struct ConstraintValidator<'r> {
    registry: &'r SchemaRegistry,
    unique_index: UniqueIndex<'r>,
}

impl<'r> ConstraintValidator<'r> {
    /// Create a new constraint validator.
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self {
            registry,
            unique_index: UniqueIndex::new(registry),
        }
    }

    /// Validate an insert and build the stored row.
    ///
    /// Missing fields take their defaults, the identity field takes `id`
    /// and auto timestamps take `now`. Unique entries for the new row are
    /// queued on the transaction.
    pub fn validate_insert(
        &self,
        tx: &mut Transaction<'_>,
        entity: &EntityDef,
        id: i64,
        input: &Fields,
        now: DateTime<Utc>,
    ) -> Result<Vec<(String, Value)>, Error> {
        self.check_assignable(entity, input)?;
        let now = now.trunc_subsecs(6);

        let mut row = Vec::with_capacity(entity.fields.len());
        for field in &entity.fields {
            let value = if field.primary_key {
                Value::Int(id)
            } else if field.auto_timestamp.is_some() {
                Value::Timestamp(now)
            } else {
                match input.get(&field.name) {
                    Some(value) => value.clone(),
                    None => resolve_default(field, id, now),
                }
            };
            let value = coerce(&entity.name, field, value)?;
            row.push((field.name.clone(), value));
        }

        self.check_references(tx, entity, &row, None)?;
        self.unique_index
            .update_row(tx, &entity.name, id, None, &row)?;

        Ok(row)
    }

    /// Validate an update and build the new stored row.
    ///
    /// Unassigned fields keep their current values; fields stamped on
    /// update take `now`. Unique checks ignore the row itself.
    pub fn validate_update(
        &self,
        tx: &mut Transaction<'_>,
        entity: &EntityDef,
        existing: &Row,
        input: &Fields,
        now: DateTime<Utc>,
    ) -> Result<Vec<(String, Value)>, Error> {
        self.check_assignable(entity, input)?;
        let now = now.trunc_subsecs(6);

        let mut row = Vec::with_capacity(entity.fields.len());
        for field in &entity.fields {
            let value = if field.auto_timestamp == Some(AutoTimestamp::OnUpdate) {
                Value::Timestamp(now)
            } else if let Some(value) = input.get(&field.name) {
                coerce(&entity.name, field, value.clone())?
            } else {
                existing.get(&field.name).cloned().unwrap_or(Value::Null)
            };
            row.push((field.name.clone(), value));
        }

        self.check_references(tx, entity, &row, Some(input))?;
        self.unique_index.update_row(
            tx,
            &entity.name,
            existing.id(),
            Some(existing.fields()),
            &row,
        )?;

        Ok(row)
    }

    /// Reject assignments to unknown or store-managed fields.
    fn check_assignable(&self, entity: &EntityDef, input: &Fields) -> Result<(), Error> {
        for (name, _) in input.iter() {
            match entity.get_field(name) {
                None => {
                    return Err(ValidationError::UnknownField {
                        entity: entity.name.clone(),
                        field: name.to_string(),
                    }
                    .into())
                }
                Some(field) if !field.is_editable() => {
                    return Err(ValidationError::ReadOnlyField {
                        entity: entity.name.clone(),
                        field: name.to_string(),
                    }
                    .into())
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Check that every non-null foreign key names an existing row.
    ///
    /// With `changed` set, only reassigned columns are checked.
    fn check_references(
        &self,
        tx: &Transaction<'_>,
        entity: &EntityDef,
        row: &[(String, Value)],
        changed: Option<&Fields>,
    ) -> Result<(), Error> {
        for field in entity.reference_fields() {
            if changed.is_some_and(|input| !input.contains(&field.name)) {
                continue;
            }
            let Some(target) = field.field_type.referenced_entity() else {
                continue;
            };
            let id = match row.iter().find(|(n, _)| *n == field.name).map(|(_, v)| v) {
                Some(Value::Int(id)) => *id,
                _ => continue,
            };
            let tree = table_tree(target);
            if tx.get(&tree, &encode_row_key(id))?.is_none() {
                return Err(ValidationError::ForeignKeyViolation {
                    entity: entity.name.clone(),
                    field: field.name.clone(),
                    referenced_entity: target.to_string(),
                    id,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Get the registry this validator checks against.
    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }
}

/// Value a field takes when the caller does not assign it.
///
/// Required string fields that may be blank fall back to the empty string.
fn resolve_default(field: &FieldDef, id: i64, now: DateTime<Utc>) -> Value {
    match &field.default {
        None if field.blank
            && !field.is_nullable()
            && field.field_type.scalar_type().is_some_and(ScalarType::is_string_like) =>
        {
            Value::String(String::new())
        }
        None | Some(DefaultValue::Null) => Value::Null,
        Some(DefaultValue::Bool(b)) => Value::Bool(*b),
        Some(DefaultValue::Int(i)) => Value::Int(*i),
        Some(DefaultValue::Float(f)) => Value::Float(*f),
        Some(DefaultValue::String(s)) => Value::String(s.clone()),
        Some(DefaultValue::AutoIncrement) => Value::Int(id),
        Some(DefaultValue::AutoUuid) => Value::Uuid(Uuid::new_v4()),
        Some(DefaultValue::CurrentTimestamp) => Value::Timestamp(now),
    }
}

/// Check a value against its field definition and convert it to the stored form.
fn coerce(entity: &str, field: &FieldDef, value: Value) -> Result<Value, ValidationError> {
    if value.is_null() {
        if field.is_nullable() {
            return Ok(Value::Null);
        }
        return Err(ValidationError::Required {
            entity: entity.to_string(),
            field: field.name.clone(),
        });
    }

    let mismatch = |value: &Value| ValidationError::TypeMismatch {
        entity: entity.to_string(),
        field: field.name.clone(),
        expected: field.field_type.to_string(),
        actual: value.type_name().to_string(),
    };

    match &field.field_type {
        FieldType::Scalar(scalar) | FieldType::OptionalScalar(scalar) => {
            coerce_scalar(entity, field, scalar, value, mismatch)
        }
        FieldType::Enum { variants, .. } | FieldType::OptionalEnum { variants, .. } => {
            let code = match value {
                Value::String(code) => code,
                other => return Err(mismatch(&other)),
            };
            if !variants.iter().any(|v| *v == code) {
                return Err(ValidationError::InvalidChoice {
                    entity: entity.to_string(),
                    field: field.name.clone(),
                    value: code,
                    choices: variants.clone(),
                });
            }
            check_length(entity, field, &code)?;
            Ok(Value::String(code))
        }
        FieldType::Reference { .. } | FieldType::OptionalReference { .. } => match value {
            Value::Int(id) => Ok(Value::Int(id)),
            other => Err(mismatch(&other)),
        },
    }
}

fn coerce_scalar(
    entity: &str,
    field: &FieldDef,
    scalar: &ScalarType,
    value: Value,
    mismatch: impl Fn(&Value) -> ValidationError,
) -> Result<Value, ValidationError> {
    match (scalar, value) {
        (ScalarType::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
        (ScalarType::Int32, Value::Int(i)) => {
            if i32::try_from(i).is_err() {
                return Err(ValidationError::IntegerOutOfRange {
                    entity: entity.to_string(),
                    field: field.name.clone(),
                    value: i,
                });
            }
            Ok(Value::Int(i))
        }
        (ScalarType::Int64, Value::Int(i)) => Ok(Value::Int(i)),
        (ScalarType::Float64, Value::Float(f)) => Ok(Value::Float(f)),
        (ScalarType::Float64, Value::Int(i)) => Ok(Value::Float(i as f64)),
        (ScalarType::Decimal { precision, scale }, Value::Decimal(d)) => {
            fit_decimal(entity, field, d, *precision, *scale)
        }
        (ScalarType::Decimal { precision, scale }, Value::Int(i)) => {
            fit_decimal(entity, field, Decimal::from(i), *precision, *scale)
        }
        (ScalarType::String | ScalarType::Text | ScalarType::Image, Value::String(s)) => {
            check_blank(entity, field, &s)?;
            check_length(entity, field, &s)?;
            Ok(Value::String(s))
        }
        (ScalarType::Slug, Value::String(s)) => {
            check_blank(entity, field, &s)?;
            check_length(entity, field, &s)?;
            if !is_slug(&s) {
                return Err(ValidationError::InvalidSlug {
                    entity: entity.to_string(),
                    field: field.name.clone(),
                    value: s,
                });
            }
            Ok(Value::String(s))
        }
        (ScalarType::Timestamp, Value::Timestamp(t)) => Ok(Value::Timestamp(t.trunc_subsecs(6))),
        (ScalarType::Uuid, Value::Uuid(u)) => Ok(Value::Uuid(u)),
        (_, other) => Err(mismatch(&other)),
    }
}

/// Check a decimal against `decimal(precision, scale)` and rescale it.
fn fit_decimal(
    entity: &str,
    field: &FieldDef,
    value: Decimal,
    precision: u8,
    scale: u8,
) -> Result<Value, ValidationError> {
    let normalized = value.normalize();
    let integer_digits = integer_digits(&normalized);
    let max_integer_digits = usize::from(precision.saturating_sub(scale));

    if normalized.scale() > u32::from(scale) || integer_digits > max_integer_digits {
        return Err(ValidationError::DecimalOutOfRange {
            entity: entity.to_string(),
            field: field.name.clone(),
            value: value.to_string(),
            precision,
            scale,
        });
    }

    let mut stored = normalized;
    stored.rescale(u32::from(scale));
    Ok(Value::Decimal(stored))
}

fn integer_digits(value: &Decimal) -> usize {
    let integer = value.abs().trunc();
    if integer.is_zero() {
        return 0;
    }
    integer
        .to_string()
        .chars()
        .take_while(|c| *c != '.')
        .filter(char::is_ascii_digit)
        .count()
}

fn check_blank(entity: &str, field: &FieldDef, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() && !field.blank {
        return Err(ValidationError::Blank {
            entity: entity.to_string(),
            field: field.name.clone(),
        });
    }
    Ok(())
}

fn check_length(entity: &str, field: &FieldDef, value: &str) -> Result<(), ValidationError> {
    if let Some(max) = field.max_length {
        let actual = value.chars().count();
        if actual > max as usize {
            return Err(ValidationError::MaxLength {
                entity: entity.to_string(),
                field: field.name.clone(),
                max,
                actual,
            });
        }
    }
    Ok(())
}

/// Letters, digits, hyphens and underscores only.
fn is_slug(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{RelationDef, UniqueConstraint};
    use crate::storage::{StorageConfig, StorageEngine};

    fn registry() -> SchemaRegistry {
        let category = EntityDef::new("Category", "id")
            .with_field(FieldDef::string("name", 10))
            .with_field(FieldDef::new("slug", FieldType::scalar(ScalarType::Slug)).with_max_length(10).allow_blank())
            .with_field(
                FieldDef::new("level", FieldType::scalar(ScalarType::Int32))
                    .with_default(DefaultValue::Int(100)),
            );
        let line = EntityDef::new("Line", "id")
            .with_field(FieldDef::new(
                "price",
                FieldType::scalar(ScalarType::Decimal {
                    precision: 5,
                    scale: 2,
                }),
            ))
            .with_field(
                FieldDef::new("sku", FieldType::scalar(ScalarType::Uuid))
                    .with_default(DefaultValue::AutoUuid),
            )
            .with_field(
                FieldDef::new("status", FieldType::enum_type("Status", vec!["IS".into(), "OOS".into()]))
                    .with_max_length(3)
                    .with_default(DefaultValue::String("OOS".into())),
            )
            .with_field(FieldDef::new("category", FieldType::optional_reference("Category")))
            .with_field(
                FieldDef::new("updated_at", FieldType::scalar(ScalarType::Timestamp))
                    .auto_timestamp(AutoTimestamp::OnUpdate),
            );

        SchemaRegistry::new(1)
            .with_entity(category)
            .with_entity(line)
            .with_relation(RelationDef::one_to_many("Line", "category", "Category"))
            .with_unique(UniqueConstraint::single("Category", "name"))
    }

    fn insert(
        registry: &SchemaRegistry,
        engine: &StorageEngine,
        entity: &str,
        id: i64,
        input: Fields,
    ) -> Result<Vec<(String, Value)>, Error> {
        let validator = ConstraintValidator::new(registry);
        let mut tx = engine.transaction();
        let def = registry.entity(entity)?;
        let row = validator.validate_insert(&mut tx, def, id, &input, Utc::now())?;
        tx.insert(&table_tree(entity), encode_row_key(id), crate::query::encode_row(&row)?);
        tx.commit()?;
        Ok(row)
    }

    fn validation_error(result: Result<Vec<(String, Value)>, Error>) -> ValidationError {
        match result {
            Err(Error::Validation(e)) => e,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_applied() {
        let engine = StorageEngine::open(StorageConfig::temporary()).unwrap();
        let registry = registry();

        let row = insert(&registry, &engine, "Category", 1, Fields::new().set("name", "Shoes")).unwrap();
        let row = Row::new("Category", 1, row);

        assert_eq!(row.get_i64("id"), Some(1));
        assert_eq!(row.get_i64("level"), Some(100));
        assert_eq!(row.get_str("slug"), Some(""));
    }

    #[test]
    fn test_required_field() {
        let engine = StorageEngine::open(StorageConfig::temporary()).unwrap();
        let registry = registry();

        let err = validation_error(insert(&registry, &engine, "Category", 1, Fields::new()));
        assert!(matches!(err, ValidationError::Required { field, .. } if field == "name"));
    }

    #[test]
    fn test_max_length_counts_characters() {
        let engine = StorageEngine::open(StorageConfig::temporary()).unwrap();
        let registry = registry();

        assert!(insert(&registry, &engine, "Category", 1, Fields::new().set("name", "éééééééééé")).is_ok());
        let err = validation_error(insert(
            &registry,
            &engine,
            "Category",
            2,
            Fields::new().set("name", "abcdefghijk"),
        ));
        assert_eq!(
            err,
            ValidationError::MaxLength {
                entity: "Category".into(),
                field: "name".into(),
                max: 10,
                actual: 11
            }
        );
    }

    #[test]
    fn test_blank_and_slug_rules() {
        let engine = StorageEngine::open(StorageConfig::temporary()).unwrap();
        let registry = registry();

        let err = validation_error(insert(&registry, &engine, "Category", 1, Fields::new().set("name", "")));
        assert!(matches!(err, ValidationError::Blank { .. }));

        let ok = Fields::new().set("name", "Shoes").set("slug", "");
        assert!(insert(&registry, &engine, "Category", 2, ok).is_ok());

        let bad = Fields::new().set("name", "Boots").set("slug", "a b");
        let err = validation_error(insert(&registry, &engine, "Category", 3, bad));
        assert!(matches!(err, ValidationError::InvalidSlug { .. }));
    }

    #[test]
    fn test_unknown_and_read_only_fields() {
        let engine = StorageEngine::open(StorageConfig::temporary()).unwrap();
        let registry = registry();

        let err = validation_error(insert(
            &registry,
            &engine,
            "Category",
            1,
            Fields::new().set("name", "Shoes").set("colour", "red"),
        ));
        assert!(matches!(err, ValidationError::UnknownField { .. }));

        let err = validation_error(insert(
            &registry,
            &engine,
            "Category",
            1,
            Fields::new().set("name", "Shoes").set("id", 9i64),
        ));
        assert!(matches!(err, ValidationError::ReadOnlyField { .. }));
    }

    #[test]
    fn test_int32_range() {
        let engine = StorageEngine::open(StorageConfig::temporary()).unwrap();
        let registry = registry();

        let err = validation_error(insert(
            &registry,
            &engine,
            "Category",
            1,
            Fields::new().set("name", "Shoes").set("level", i64::from(i32::MAX) + 1),
        ));
        assert!(matches!(err, ValidationError::IntegerOutOfRange { .. }));
    }

    #[test]
    fn test_decimal_precision_and_scale() {
        let engine = StorageEngine::open(StorageConfig::temporary()).unwrap();
        let registry = registry();

        let row = insert(&registry, &engine, "Line", 1, Fields::new().set("price", Decimal::new(9999, 1))).unwrap();
        let row = Row::new("Line", 1, row);
        assert_eq!(row.get_decimal("price").unwrap().to_string(), "999.90");

        for bad in [Decimal::new(100000, 2), Decimal::new(1001, 3)] {
            let err = validation_error(insert(&registry, &engine, "Line", 2, Fields::new().set("price", bad)));
            assert!(matches!(err, ValidationError::DecimalOutOfRange { .. }));
        }

        let row = insert(&registry, &engine, "Line", 3, Fields::new().set("price", 12i64)).unwrap();
        assert_eq!(Row::new("Line", 3, row).get_decimal("price").unwrap().to_string(), "12.00");
    }

    #[test]
    fn test_enum_choices() {
        let engine = StorageEngine::open(StorageConfig::temporary()).unwrap();
        let registry = registry();

        let row = insert(&registry, &engine, "Line", 1, Fields::new().set("price", 1i64)).unwrap();
        let row = Row::new("Line", 1, row);
        assert_eq!(row.get_str("status"), Some("OOS"));
        assert!(row.get_uuid("sku").is_some());

        let err = validation_error(insert(
            &registry,
            &engine,
            "Line",
            2,
            Fields::new().set("price", 1i64).set("status", "XX"),
        ));
        assert!(matches!(err, ValidationError::InvalidChoice { .. }));
    }

    #[test]
    fn test_type_mismatch() {
        let engine = StorageEngine::open(StorageConfig::temporary()).unwrap();
        let registry = registry();

        let err = validation_error(insert(&registry, &engine, "Line", 1, Fields::new().set("price", "cheap")));
        assert!(matches!(err, ValidationError::TypeMismatch { .. }));
    }

    #[test]
    fn test_foreign_key_must_exist() {
        let engine = StorageEngine::open(StorageConfig::temporary()).unwrap();
        let registry = registry();

        let err = validation_error(insert(
            &registry,
            &engine,
            "Line",
            1,
            Fields::new().set("price", 1i64).set("category", 42i64),
        ));
        assert!(matches!(err, ValidationError::ForeignKeyViolation { id: 42, .. }));

        insert(&registry, &engine, "Category", 42, Fields::new().set("name", "Shoes")).unwrap();
        assert!(insert(
            &registry,
            &engine,
            "Line",
            1,
            Fields::new().set("price", 1i64).set("category", 42i64),
        )
        .is_ok());
    }

    #[test]
    fn test_update_keeps_unassigned_and_restamps() {
        let engine = StorageEngine::open(StorageConfig::temporary()).unwrap();
        let registry = registry();
        let created = insert(&registry, &engine, "Line", 1, Fields::new().set("price", 5i64)).unwrap();
        let existing = Row::new("Line", 1, created);

        let validator = ConstraintValidator::new(&registry);
        let mut tx = engine.transaction();
        let later = existing.get_timestamp("updated_at").unwrap() + chrono::Duration::seconds(5);
        let updated = validator
            .validate_update(
                &mut tx,
                registry.entity("Line").unwrap(),
                &existing,
                &Fields::new().set("status", "IS"),
                later,
            )
            .unwrap();
        let updated = Row::new("Line", 1, updated);

        assert_eq!(updated.get_str("status"), Some("IS"));
        assert_eq!(updated.get_decimal("price"), existing.get_decimal("price"));
        assert_eq!(updated.get_uuid("sku"), existing.get_uuid("sku"));
        assert_eq!(updated.get_timestamp("updated_at"), Some(later));
    }

    #[test]
    fn test_unique_on_insert() {
        let engine = StorageEngine::open(StorageConfig::temporary()).unwrap();
        let registry = registry();

        insert(&registry, &engine, "Category", 1, Fields::new().set("name", "Shoes")).unwrap();
        let err = validation_error(insert(&registry, &engine, "Category", 2, Fields::new().set("name", "Shoes")));
        assert!(matches!(err, ValidationError::UniqueViolation { .. }));
    }
}
