//! Value-level error types.

use thiserror::Error;

/// Errors raised while inspecting dynamic values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The value has no hashable key form (floating point data).
    #[error("value of kind {kind} cannot be used as a key")]
    UnhashableKey { kind: &'static str },

    /// A named field was requested from a value that has no fields.
    #[error("value of kind {kind} is not a record")]
    NotARecord { kind: &'static str },

    /// The record does not contain the requested field.
    #[error("field '{field}' not found")]
    FieldNotFound { field: String },
}
