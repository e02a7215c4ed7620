//! Core error types.

use thiserror::Error;

/// Errors surfaced while evaluating or materializing a pipeline.
///
/// Building a pipeline never fails; these are reported at the first pull that
/// hits the problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Value inspection error (unhashable key, missing record field).
    #[error(transparent)]
    Value(#[from] lazyq_value::Error),

    /// A named field does not exist on the item.
    #[error("field '{field}' not found in {type_name}")]
    FieldNotFound {
        field: String,
        type_name: &'static str,
    },

    /// A named field was requested from an item that has no fields.
    #[error("item of type {type_name} is not a record")]
    NotARecord { type_name: &'static str },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The target container does not match the shape of the sequence.
    #[error("shape mismatch: sequence produces {actual}, target expects {expected}")]
    ShapeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
