//! Join configuration.

use crate::query::JoinKind;

/// Configuration for a join evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinConfig {
    /// Which unmatched rows are emitted.
    pub kind: JoinKind,

    /// Number of right rows to reserve space for when building the index.
    /// Zero means the index grows on demand.
    pub index_capacity: usize,
}

impl JoinConfig {
    /// Create a configuration for the given join kind.
    pub fn new(kind: JoinKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn inner() -> Self {
        Self::new(JoinKind::Inner)
    }

    pub fn left() -> Self {
        Self::new(JoinKind::Left)
    }

    pub fn right() -> Self {
        Self::new(JoinKind::Right)
    }

    pub fn full_outer() -> Self {
        Self::new(JoinKind::FullOuter)
    }

    /// Set the join kind.
    pub fn kind(mut self, kind: JoinKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the index capacity hint.
    pub fn index_capacity(mut self, capacity: usize) -> Self {
        self.index_capacity = capacity;
        self
    }
}
