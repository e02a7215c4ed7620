//! lazyq Benchmark Suite
//!
//! Criterion benchmarks for lazyq pipelines.
//!
//! # Benchmark Categories
//!
//! - **Join**: Join kinds, scale, closure vs named-field keys, early stop
//! - **Flatten**: Projection, flattening, and grouping throughput

pub mod fixtures;
pub mod harness;

pub use fixtures::{generate_posts, generate_users, PostData, Scale, UserData};
pub use harness::{init_tracing, BlogData};
