//! Query combinators for lazy sequences.
//!
//! Every combinator is an inherent method on [`Sequence`](crate::Sequence)
//! and does no work until the result is pulled.

mod flatten;
mod join;
mod materialize;
mod selector;
mod transform;

pub use join::{DeferredJoin, Join, JoinKind, KeyedJoin, Pair, RightIndex};
pub use materialize::{GroupBuilder, MapPolicy, MapSequence};
pub use selector::{field_key, field_selector, serde_field, to_value, Record};
