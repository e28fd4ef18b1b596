//! Constraint enforcement module.
//!
//! - Field constraints (type, nullability, length, choices, precision)
//! - Foreign key existence
//! - Unique constraints (single and composite)

mod unique_index;
mod validator;

pub use unique_index::UniqueIndex;
pub use validator::ConstraintValidator;
