//! Core type definitions for the catalog.

use std::fmt;

use rkyv::{Archive, Deserialize, Serialize};

/// Scalar column types.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub enum ScalarType {
    /// Boolean value.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point.
    Float64,
    /// Fixed-precision decimal.
    Decimal {
        /// Total number of digits.
        precision: u8,
        /// Number of digits after decimal point.
        scale: u8,
    },
    /// Bounded UTF-8 string.
    String,
    /// Unbounded UTF-8 text.
    Text,
    /// URL-safe identifier (letters, digits, hyphens, underscores).
    Slug,
    /// UTC timestamp.
    Timestamp,
    /// UUID (128-bit identifier).
    Uuid,
    /// Path to a stored image.
    Image,
}

/// Field types - flat representation without recursion.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub enum FieldType {
    /// A scalar value.
    Scalar(ScalarType),
    /// An optional scalar value (nullable).
    OptionalScalar(ScalarType),
    /// An enumeration stored as one of its variant codes.
    Enum {
        /// Name of the enum type.
        name: String,
        /// Allowed variant codes.
        variants: Vec<String>,
    },
    /// An optional enumeration.
    OptionalEnum {
        /// Name of the enum type.
        name: String,
        /// Allowed variant codes.
        variants: Vec<String>,
    },
    /// A foreign key holding the id of a row in another entity.
    Reference {
        /// Referenced entity.
        entity: String,
    },
    /// A nullable foreign key.
    OptionalReference {
        /// Referenced entity.
        entity: String,
    },
}

impl ScalarType {
    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ScalarType::Int32 | ScalarType::Int64 | ScalarType::Float64 | ScalarType::Decimal { .. }
        )
    }

    /// Check if values of this type are stored as strings.
    pub fn is_string_like(&self) -> bool {
        matches!(
            self,
            ScalarType::String | ScalarType::Text | ScalarType::Slug | ScalarType::Image
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Bool => write!(f, "bool"),
            ScalarType::Int32 => write!(f, "int32"),
            ScalarType::Int64 => write!(f, "int64"),
            ScalarType::Float64 => write!(f, "float64"),
            ScalarType::Decimal { precision, scale } => {
                write!(f, "decimal({}, {})", precision, scale)
            }
            ScalarType::String => write!(f, "string"),
            ScalarType::Text => write!(f, "text"),
            ScalarType::Slug => write!(f, "slug"),
            ScalarType::Timestamp => write!(f, "timestamp"),
            ScalarType::Uuid => write!(f, "uuid"),
            ScalarType::Image => write!(f, "image"),
        }
    }
}

impl FieldType {
    /// Create a scalar field type.
    pub fn scalar(scalar: ScalarType) -> Self {
        FieldType::Scalar(scalar)
    }

    /// Create an optional scalar field type.
    pub fn optional_scalar(scalar: ScalarType) -> Self {
        FieldType::OptionalScalar(scalar)
    }

    /// Create an enum field type.
    pub fn enum_type(name: impl Into<String>, variants: Vec<String>) -> Self {
        FieldType::Enum {
            name: name.into(),
            variants,
        }
    }

    /// Create a required foreign key type.
    pub fn reference(entity: impl Into<String>) -> Self {
        FieldType::Reference {
            entity: entity.into(),
        }
    }

    /// Create a nullable foreign key type.
    pub fn optional_reference(entity: impl Into<String>) -> Self {
        FieldType::OptionalReference {
            entity: entity.into(),
        }
    }

    /// Check if this type is nullable.
    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            FieldType::OptionalScalar(_)
                | FieldType::OptionalEnum { .. }
                | FieldType::OptionalReference { .. }
        )
    }

    /// Get the inner scalar type if this is a scalar-based type.
    pub fn scalar_type(&self) -> Option<&ScalarType> {
        match self {
            FieldType::Scalar(s) | FieldType::OptionalScalar(s) => Some(s),
            _ => None,
        }
    }

    /// Get the referenced entity if this is a foreign key.
    pub fn referenced_entity(&self) -> Option<&str> {
        match self {
            FieldType::Reference { entity } | FieldType::OptionalReference { entity } => {
                Some(entity)
            }
            _ => None,
        }
    }

    /// Get the allowed codes if this is an enum.
    pub fn enum_variants(&self) -> Option<&[String]> {
        match self {
            FieldType::Enum { variants, .. } | FieldType::OptionalEnum { variants, .. } => {
                Some(variants)
            }
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(s) => write!(f, "{}", s),
            FieldType::OptionalScalar(s) => write!(f, "{}?", s),
            FieldType::Enum { name, .. } => write!(f, "enum {}", name),
            FieldType::OptionalEnum { name, .. } => write!(f, "enum {}?", name),
            FieldType::Reference { entity } => write!(f, "-> {}", entity),
            FieldType::OptionalReference { entity } => write!(f, "-> {}?", entity),
        }
    }
}
