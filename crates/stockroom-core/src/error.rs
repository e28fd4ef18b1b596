//! Core error types.

use thiserror::Error;

/// Core errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Invalid data format.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The entity is not part of the schema registry.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// The relation is not part of the schema registry.
    #[error("unknown relation: {0}")]
    UnknownRelation(String),

    /// The schema registry is internally inconsistent.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// The store was created with a different schema.
    #[error("schema mismatch: store has {stored}, registry has {expected}")]
    SchemaMismatch {
        /// Fingerprint recorded in the store.
        stored: String,
        /// Fingerprint of the registry in use.
        expected: String,
    },

    /// A field constraint was violated.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The addressed row does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity name.
        entity: String,
        /// Requested id.
        id: i64,
    },

    /// A delete was blocked by referential integrity.
    #[error("integrity error: {0}")]
    Integrity(#[from] IntegrityError),
}

impl Error {
    /// Check if this is a field validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this is a missing row.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check if this is a blocked delete.
    pub fn is_integrity(&self) -> bool {
        matches!(self, Error::Integrity(_))
    }

    pub(crate) fn not_found(entity: &str, id: i64) -> Self {
        Error::NotFound {
            entity: entity.to_string(),
            id,
        }
    }
}

/// Field constraint violations raised by create and update.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A non-nullable field has no value.
    #[error("{entity}.{field} is required")]
    Required {
        /// Entity name.
        entity: String,
        /// Field name.
        field: String,
    },

    /// An empty string was given for a field that may not be blank.
    #[error("{entity}.{field} may not be blank")]
    Blank {
        /// Entity name.
        entity: String,
        /// Field name.
        field: String,
    },

    /// A string is longer than the declared maximum.
    #[error("{entity}.{field} exceeds {max} characters (got {actual})")]
    MaxLength {
        /// Entity name.
        entity: String,
        /// Field name.
        field: String,
        /// Declared maximum length.
        max: u32,
        /// Actual length in characters.
        actual: usize,
    },

    /// Unique constraint violation.
    #[error("unique constraint '{constraint}' violated on {entity}({fields:?}): value '{value}' already exists")]
    UniqueViolation {
        /// Constraint name.
        constraint: String,
        /// Entity type.
        entity: String,
        /// Fields involved in the constraint.
        fields: Vec<String>,
        /// The duplicate value(s).
        value: String,
    },

    /// The referenced row does not exist.
    #[error("{entity}.{field} references missing {referenced_entity} with id {id}")]
    ForeignKeyViolation {
        /// Entity containing the foreign key.
        entity: String,
        /// Foreign key field.
        field: String,
        /// Referenced entity type.
        referenced_entity: String,
        /// The dangling id.
        id: i64,
    },

    /// The value does not match the declared field type.
    #[error("{entity}.{field} expects {expected}, got {actual}")]
    TypeMismatch {
        /// Entity name.
        entity: String,
        /// Field name.
        field: String,
        /// Declared type.
        expected: String,
        /// Type of the given value.
        actual: String,
    },

    /// The field is not declared on the entity.
    #[error("{entity} has no field '{field}'")]
    UnknownField {
        /// Entity name.
        entity: String,
        /// Field name.
        field: String,
    },

    /// The value is not one of the enum's choices.
    #[error("{entity}.{field}: '{value}' is not one of {choices:?}")]
    InvalidChoice {
        /// Entity name.
        entity: String,
        /// Field name.
        field: String,
        /// Rejected value.
        value: String,
        /// Allowed codes.
        choices: Vec<String>,
    },

    /// The decimal does not fit the declared precision and scale.
    #[error("{entity}.{field}: {value} does not fit decimal({precision}, {scale})")]
    DecimalOutOfRange {
        /// Entity name.
        entity: String,
        /// Field name.
        field: String,
        /// Rejected value.
        value: String,
        /// Total digits.
        precision: u8,
        /// Fraction digits.
        scale: u8,
    },

    /// The integer does not fit the declared width.
    #[error("{entity}.{field}: {value} is out of range")]
    IntegerOutOfRange {
        /// Entity name.
        entity: String,
        /// Field name.
        field: String,
        /// Rejected value.
        value: i64,
    },

    /// A slug contains characters other than letters, digits, hyphens and underscores.
    #[error("{entity}.{field}: '{value}' is not a valid slug")]
    InvalidSlug {
        /// Entity name.
        entity: String,
        /// Field name.
        field: String,
        /// Rejected value.
        value: String,
    },

    /// The field is managed by the store and cannot be assigned.
    #[error("{entity}.{field} is read-only")]
    ReadOnlyField {
        /// Entity name.
        entity: String,
        /// Field name.
        field: String,
    },
}

/// Referential integrity errors raised by delete.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrityError {
    /// RESTRICT relation prevents delete.
    #[error("cannot delete {entity} {id}: {count} {referencing_entity} row(s) reference it via '{relation}'")]
    RestrictViolation {
        /// Relation name.
        relation: String,
        /// Entity being deleted.
        entity: String,
        /// Id of the row being deleted.
        id: i64,
        /// Entity that references it.
        referencing_entity: String,
        /// Number of referencing rows.
        count: usize,
    },

    /// Cascade depth exceeded.
    #[error("cascade depth exceeded maximum of {depth}")]
    MaxDepthExceeded {
        /// Depth reached.
        depth: usize,
    },
}
