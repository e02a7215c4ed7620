//! lazyq value types.
//!
//! This crate defines the dynamic item model shared by lazyq pipelines.
//!
//! # Modules
//!
//! - [`value`] - The type-erased item, a closed sum type
//! - [`key`] - Hashable projection of values, used by joins and grouping
//! - [`row`] - Ordered named-field rows
//! - [`error`] - Value inspection errors
//!
//! # Example
//!
//! ```
//! use lazyq_value::{Key, Row, Value};
//!
//! let row = Row::new().with_field("id", 1i64).with_field("name", "alpha");
//! let value = Value::from(row);
//!
//! assert_eq!(value.field("id").unwrap().to_key().unwrap(), Key::Int(1));
//! ```

pub mod error;
pub mod key;
pub mod row;
pub mod value;

pub use error::Error;
pub use key::Key;
pub use row::Row;
pub use value::Value;
