//! Row filters for list queries.

use crate::row::Row;
use crate::value::Value;

/// A single condition on one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals value. Comparing with NULL matches NULL fields.
    Eq {
        /// Field name.
        field: String,
        /// Value to compare with.
        value: Value,
    },
    /// Field differs from value. NULL fields differ from every non-NULL value.
    Ne {
        /// Field name.
        field: String,
        /// Value to compare with.
        value: Value,
    },
    /// Field is NULL.
    IsNull {
        /// Field name.
        field: String,
    },
    /// Field is not NULL.
    IsNotNull {
        /// Field name.
        field: String,
    },
}

impl Condition {
    /// Name of the field the condition reads.
    pub fn field(&self) -> &str {
        match self {
            Condition::Eq { field, .. }
            | Condition::Ne { field, .. }
            | Condition::IsNull { field }
            | Condition::IsNotNull { field } => field,
        }
    }

    /// Evaluate the condition against a row.
    pub fn matches(&self, row: &Row) -> bool {
        let current = row.get(self.field()).unwrap_or(&Value::Null);
        match self {
            Condition::Eq { value, .. } => values_equal(current, value),
            Condition::Ne { value, .. } => !values_equal(current, value),
            Condition::IsNull { .. } => current.is_null(),
            Condition::IsNotNull { .. } => !current.is_null(),
        }
    }
}

/// A conjunction of conditions. The empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// A filter matching every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Require `field == value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Require `field != value`.
    pub fn ne(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Ne {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Require `field IS NULL`.
    pub fn is_null(mut self, field: impl Into<String>) -> Self {
        self.conditions.push(Condition::IsNull {
            field: field.into(),
        });
        self
    }

    /// Require `field IS NOT NULL`.
    pub fn is_not_null(mut self, field: impl Into<String>) -> Self {
        self.conditions.push(Condition::IsNotNull {
            field: field.into(),
        });
        self
    }

    /// The conditions of this filter.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Check whether a row satisfies every condition.
    pub fn matches(&self, row: &Row) -> bool {
        self.conditions.iter().all(|c| c.matches(row))
    }
}

/// Check if two values are equal, widening integers for numeric comparisons.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => (*a as f64) == *b,
        (Value::Int(a), Value::Decimal(b)) | (Value::Decimal(b), Value::Int(a)) => {
            rust_decimal::Decimal::from(*a) == *b
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(category: Value, active: bool) -> Row {
        Row::new(
            "Product",
            1,
            vec![
                ("id".into(), Value::Int(1)),
                ("is_active".into(), Value::Bool(active)),
                ("category".into(), category),
            ],
        )
    }

    #[test]
    fn test_empty_filter_matches() {
        assert!(Filter::all().matches(&product(Value::Null, false)));
    }

    #[test]
    fn test_eq_and_ne() {
        let row = product(Value::Int(4), true);

        assert!(Filter::all().eq("category", 4i64).matches(&row));
        assert!(!Filter::all().eq("category", 5i64).matches(&row));
        assert!(Filter::all().ne("category", 5i64).matches(&row));
        assert!(!Filter::all()
            .eq("category", 4i64)
            .eq("is_active", false)
            .matches(&row));
    }

    #[test]
    fn test_null_conditions() {
        let orphan = product(Value::Null, false);

        assert!(Filter::all().is_null("category").matches(&orphan));
        assert!(Filter::all().eq("category", Value::Null).matches(&orphan));
        assert!(Filter::all().ne("category", 4i64).matches(&orphan));
        assert!(!Filter::all().is_not_null("category").matches(&orphan));
    }

    #[test]
    fn test_numeric_widening() {
        assert!(values_equal(&Value::Int(2), &Value::Float(2.0)));
        assert!(values_equal(
            &Value::Decimal(Decimal::new(200, 2)),
            &Value::Int(2)
        ));
        assert!(!values_equal(&Value::Int(2), &Value::from("2")));
    }
}
