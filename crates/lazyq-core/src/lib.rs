//! lazyq core - Lazy sequences, projection, flattening, hash joins, and
//! materialization for in-memory data.
//!
//! A [`Sequence`] is a pull-based stream. Combinators wrap it without
//! consuming anything; work happens only as the consumer pulls, and a
//! consumer stops the whole pipeline by dropping it.
//!
//! # Example
//!
//! ```
//! use lazyq_core::Sequence;
//!
//! let users = vec![(1, "ada"), (2, "grace"), (3, "linus")];
//! let posts = vec![(1, "hello"), (1, "again"), (3, "kernel")];
//!
//! let titles = Sequence::from_vec(users)
//!     .join_vec(posts)
//!     .on_this(|u| u.0)
//!     .equals_this(|p| p.0)
//!     .as_this(|u, p| format!("{}: {}", u.unwrap().1, p.unwrap().1))
//!     .try_to_vec()
//!     .unwrap();
//!
//! assert_eq!(titles, vec!["ada: hello", "ada: again", "linus: kernel"]);
//! ```

pub mod config;
pub mod error;
pub mod query;
pub mod sequence;

pub use config::JoinConfig;
pub use error::Error;
pub use query::{JoinKind, MapPolicy, Pair, Record};
pub use sequence::Sequence;

pub use lazyq_value::{Key, Row, Value};

/// Re-export value types.
pub use lazyq_value as value;
