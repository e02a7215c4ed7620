//! Hash join over lazy sequences.
//!
//! A join is configured through a short builder chain and evaluated by the
//! consumer's pulls:
//!
//! 1. Build phase: on the first pull, drain the right sequence once into a
//!    [`RightIndex`] keyed by the right selector
//! 2. Probe phase: stream the left sequence, looking each key up in O(1) and
//!    emitting one result per matching right row
//! 3. Sweep phase: for `Right` and `FullOuter` joins, emit the right rows that
//!    no left row matched
//!
//! Complexity: O(N + M) where N = left rows, M = right rows. Only the right
//! side is held in memory.
//!
//! Output order: matched rows in left order, then bucket order within one
//! left row; unmatched right rows last, in bucket order.

use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use tracing::{debug, instrument, trace};

use crate::config::JoinConfig;
use crate::error::Error;
use crate::query::selector::{field_key, KeyFn, Record};
use crate::sequence::Sequence;
use lazyq_value::Key;

/// Which unmatched rows a join emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JoinKind {
    /// Only matching pairs.
    #[default]
    Inner,
    /// All left rows. Unmatched ones have an absent right side.
    Left,
    /// All right rows. Unmatched ones have an absent left side.
    Right,
    /// All rows from both sides.
    FullOuter,
}

impl JoinKind {
    /// Whether left rows without a match are emitted.
    pub fn keeps_unmatched_left(self) -> bool {
        matches!(self, JoinKind::Left | JoinKind::FullOuter)
    }

    /// Whether right rows without a match are emitted.
    pub fn keeps_unmatched_right(self) -> bool {
        matches!(self, JoinKind::Right | JoinKind::FullOuter)
    }
}

/// A joined row. `None` marks the absent side of an unmatched row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair<L, R> {
    pub left: Option<L>,
    pub right: Option<R>,
}

impl<L, R> Pair<L, R> {
    pub fn new(left: Option<L>, right: Option<R>) -> Self {
        Self { left, right }
    }

    /// Whether both sides are present.
    pub fn is_matched(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }
}

impl<'a, L: 'a> Sequence<'a, L> {
    /// Start an inner join against `right`.
    pub fn join<R: 'a>(self, right: Sequence<'a, R>) -> DeferredJoin<'a, L, R> {
        DeferredJoin::new(self, right, JoinKind::Inner)
    }

    /// Start a left join against `right`.
    pub fn left_join<R: 'a>(self, right: Sequence<'a, R>) -> DeferredJoin<'a, L, R> {
        DeferredJoin::new(self, right, JoinKind::Left)
    }

    /// Start a right join against `right`.
    pub fn right_join<R: 'a>(self, right: Sequence<'a, R>) -> DeferredJoin<'a, L, R> {
        DeferredJoin::new(self, right, JoinKind::Right)
    }

    /// Start a full outer join against `right`.
    pub fn full_outer_join<R: 'a>(self, right: Sequence<'a, R>) -> DeferredJoin<'a, L, R> {
        DeferredJoin::new(self, right, JoinKind::FullOuter)
    }

    pub fn join_vec<R: 'a>(self, right: Vec<R>) -> DeferredJoin<'a, L, R> {
        self.join(Sequence::from_vec(right))
    }

    pub fn left_join_vec<R: 'a>(self, right: Vec<R>) -> DeferredJoin<'a, L, R> {
        self.left_join(Sequence::from_vec(right))
    }

    pub fn right_join_vec<R: 'a>(self, right: Vec<R>) -> DeferredJoin<'a, L, R> {
        self.right_join(Sequence::from_vec(right))
    }

    pub fn full_outer_join_vec<R: 'a>(self, right: Vec<R>) -> DeferredJoin<'a, L, R> {
        self.full_outer_join(Sequence::from_vec(right))
    }
}

/// A join whose key selectors have not been set yet.
///
/// When both sides have the same `Hash + Eq` item type, the join can be
/// projected directly and every item is its own key.
pub struct DeferredJoin<'a, L, R> {
    left: Sequence<'a, L>,
    right: Sequence<'a, R>,
    config: JoinConfig,
}

impl<'a, L: 'a, R: 'a> DeferredJoin<'a, L, R> {
    fn new(left: Sequence<'a, L>, right: Sequence<'a, R>, kind: JoinKind) -> Self {
        Self {
            left,
            right,
            config: JoinConfig::new(kind),
        }
    }

    pub fn kind(&self) -> JoinKind {
        self.config.kind
    }

    /// Replace the whole join configuration, including the kind.
    pub fn with_config(mut self, config: JoinConfig) -> Self {
        self.config = config;
        self
    }

    /// Reserve room for `capacity` right rows in the index.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.config.index_capacity = capacity;
        self
    }

    /// Set the left key selector.
    ///
    /// If both sides share an item type and no right selector is given, the
    /// same selector keys the right side too.
    pub fn on_this<K, F>(self, selector: F) -> KeyedJoin<'a, L, R, K>
    where
        K: 'a,
        F: Fn(&L) -> K + 'a,
    {
        self.try_on_this(move |item| Ok(selector(item)))
    }

    /// Set a fallible left key selector.
    pub fn try_on_this<K, F>(self, selector: F) -> KeyedJoin<'a, L, R, K>
    where
        K: 'a,
        F: Fn(&L) -> Result<K, Error> + 'a,
    {
        KeyedJoin {
            left: self.left,
            right: self.right,
            config: self.config,
            left_key: Rc::new(selector),
        }
    }

    /// Key the left side by a named field.
    pub fn on(self, field: &str) -> KeyedJoin<'a, L, R, Key>
    where
        L: Record,
    {
        self.try_on_this(field_key(field))
    }
}

impl<'a, T> DeferredJoin<'a, T, T>
where
    T: Clone + Hash + Eq + 'a,
{
    /// Project the join with every item keyed by itself.
    pub fn as_this<O, F>(self, combine: F) -> Sequence<'a, Result<O, Error>>
    where
        O: 'a,
        F: FnMut(Option<T>, Option<T>) -> O + 'a,
    {
        self.on_this(T::clone).as_this(combine)
    }

    pub fn as_pairs(self) -> Sequence<'a, Result<Pair<T, T>, Error>> {
        self.as_this(Pair::new)
    }
}

/// A join with its left key selector set.
pub struct KeyedJoin<'a, L, R, K> {
    left: Sequence<'a, L>,
    right: Sequence<'a, R>,
    config: JoinConfig,
    left_key: KeyFn<'a, L, K>,
}

impl<'a, L: 'a, R: 'a, K: 'a> KeyedJoin<'a, L, R, K> {
    /// Set the right key selector.
    pub fn equals_this<F>(self, selector: F) -> Join<'a, L, R, K>
    where
        F: Fn(&R) -> K + 'a,
    {
        self.try_equals_this(move |item| Ok(selector(item)))
    }

    /// Set a fallible right key selector.
    pub fn try_equals_this<F>(self, selector: F) -> Join<'a, L, R, K>
    where
        F: Fn(&R) -> Result<K, Error> + 'a,
    {
        Join {
            left: self.left,
            right: self.right,
            config: self.config,
            left_key: self.left_key,
            right_key: Rc::new(selector),
        }
    }
}

impl<'a, L: 'a, R: 'a> KeyedJoin<'a, L, R, Key> {
    /// Key the right side by a named field.
    pub fn equals(self, field: &str) -> Join<'a, L, R, Key>
    where
        R: Record,
    {
        self.try_equals_this(field_key(field))
    }
}

impl<'a, T, K> KeyedJoin<'a, T, T, K>
where
    T: Clone + 'a,
    K: Hash + Eq + 'a,
{
    fn keyed_both_sides(self) -> Join<'a, T, T, K> {
        Join {
            right_key: Rc::clone(&self.left_key),
            left: self.left,
            right: self.right,
            config: self.config,
            left_key: self.left_key,
        }
    }

    /// Project the join using the left selector for both sides.
    pub fn as_this<O, F>(self, combine: F) -> Sequence<'a, Result<O, Error>>
    where
        O: 'a,
        F: FnMut(Option<T>, Option<T>) -> O + 'a,
    {
        self.keyed_both_sides().as_this(combine)
    }

    pub fn as_pairs(self) -> Sequence<'a, Result<Pair<T, T>, Error>> {
        self.keyed_both_sides().as_pairs()
    }
}

/// A fully configured join, ready to be projected.
pub struct Join<'a, L, R, K> {
    left: Sequence<'a, L>,
    right: Sequence<'a, R>,
    config: JoinConfig,
    left_key: KeyFn<'a, L, K>,
    right_key: KeyFn<'a, R, K>,
}

impl<'a, L, R, K> Join<'a, L, R, K>
where
    L: Clone + 'a,
    R: Clone + 'a,
    K: Hash + Eq + 'a,
{
    /// Project every joined row through `combine`.
    ///
    /// Nothing is evaluated until the returned sequence is pulled. A key
    /// selector failure is yielded once and ends the sequence.
    pub fn as_this<O, F>(self, combine: F) -> Sequence<'a, Result<O, Error>>
    where
        O: 'a,
        F: FnMut(Option<L>, Option<R>) -> O + 'a,
    {
        Sequence::new(HashJoin {
            left: self.left,
            right: Some(self.right),
            left_key: self.left_key,
            right_key: self.right_key,
            config: self.config,
            combine,
            index: RightIndex::with_capacity(0),
            phase: Phase::Build,
            stats: JoinStats::default(),
        })
    }

    /// Project every joined row as a [`Pair`].
    pub fn as_pairs(self) -> Sequence<'a, Result<Pair<L, R>, Error>> {
        self.as_this(Pair::new)
    }
}

/// Multi-map from join key to the right rows sharing it.
///
/// Buckets are numbered in first-appearance order of their key and keep
/// their rows in insertion order. Matched flags are tracked per row
/// position, so equal rows are never confused with each other.
#[derive(Debug)]
pub struct RightIndex<K, R> {
    rows: Vec<R>,
    matched: Vec<bool>,
    slots: HashMap<K, usize>,
    buckets: Vec<Vec<usize>>,
}

impl<K: Hash + Eq, R> RightIndex<K, R> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
            matched: Vec::with_capacity(capacity),
            slots: HashMap::with_capacity(capacity),
            buckets: Vec::new(),
        }
    }

    /// Drain `rows` into a new index. Fails on the first key that cannot be
    /// computed.
    pub fn build<I, F>(rows: I, key: F, capacity: usize) -> Result<Self, Error>
    where
        I: IntoIterator<Item = R>,
        F: Fn(&R) -> Result<K, Error>,
    {
        let mut index = Self::with_capacity(capacity);
        for row in rows {
            let k = key(&row)?;
            index.insert(k, row);
        }
        Ok(index)
    }

    /// Append a row to the bucket of `key`.
    pub fn insert(&mut self, key: K, row: R) {
        let pos = self.rows.len();
        self.rows.push(row);
        self.matched.push(false);

        match self.slots.get(&key) {
            Some(&slot) => self.buckets[slot].push(pos),
            None => {
                self.slots.insert(key, self.buckets.len());
                self.buckets.push(vec![pos]);
            }
        }
    }

    /// Rows sharing `key`, in insertion order.
    pub fn get<'s>(&'s self, key: &K) -> impl Iterator<Item = &'s R> + 's {
        self.slot(key)
            .map(|slot| self.buckets[slot].as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&pos| &self.rows[pos])
    }

    /// Whether the row at `pos` has been emitted as part of a match.
    pub fn is_matched(&self, pos: usize) -> bool {
        self.matched.get(pos).copied().unwrap_or(false)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct keys.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn slot(&self, key: &K) -> Option<usize> {
        self.slots.get(key).copied()
    }

    fn bucket(&self, slot: usize) -> &[usize] {
        &self.buckets[slot]
    }

    fn row(&self, pos: usize) -> &R {
        &self.rows[pos]
    }

    fn mark_matched(&mut self, pos: usize) {
        self.matched[pos] = true;
    }

    /// Advance `cursor` to the next row never marked matched.
    fn next_unmatched(&self, cursor: &mut SweepCursor) -> Option<usize> {
        while let Some(bucket) = self.buckets.get(cursor.slot) {
            while let Some(&pos) = bucket.get(cursor.pos) {
                cursor.pos += 1;
                if !self.matched[pos] {
                    return Some(pos);
                }
            }
            cursor.slot += 1;
            cursor.pos = 0;
        }
        None
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct SweepCursor {
    slot: usize,
    pos: usize,
}

/// A left row part-way through its matching bucket.
struct Pending<L> {
    item: L,
    slot: usize,
    pos: usize,
}

enum Phase<L> {
    Build,
    Probe(Option<Pending<L>>),
    Sweep(SweepCursor),
    Done,
}

#[derive(Debug, Default, Clone, Copy)]
struct JoinStats {
    matched: u64,
    left_only: u64,
    right_only: u64,
}

struct HashJoin<'a, L, R, K, F> {
    left: Sequence<'a, L>,
    right: Option<Sequence<'a, R>>,
    left_key: KeyFn<'a, L, K>,
    right_key: KeyFn<'a, R, K>,
    config: JoinConfig,
    combine: F,
    index: RightIndex<K, R>,
    phase: Phase<L>,
    stats: JoinStats,
}

impl<'a, L, R, K, F, O> HashJoin<'a, L, R, K, F>
where
    L: Clone + 'a,
    R: Clone + 'a,
    K: Hash + Eq,
    F: FnMut(Option<L>, Option<R>) -> O,
{
    #[instrument(level = "debug", skip_all, fields(kind = ?self.config.kind))]
    fn build_index(&mut self) -> Result<(), Error> {
        let right = self.right.take().unwrap_or_else(Sequence::empty);
        let key = Rc::clone(&self.right_key);
        self.index = RightIndex::build(right, |row| key(row), self.config.index_capacity)?;

        debug!(
            rows = self.index.len(),
            buckets = self.index.bucket_count(),
            "right index built"
        );
        Ok(())
    }

    /// Emit the next right row of a matching bucket.
    fn emit_match(&mut self, pending: Pending<L>) -> O {
        let bucket = self.index.bucket(pending.slot);
        let pos = bucket[pending.pos];
        let last = pending.pos + 1 == bucket.len();

        self.index.mark_matched(pos);
        self.stats.matched += 1;
        let right = self.index.row(pos).clone();

        if last {
            self.phase = Phase::Probe(None);
            (self.combine)(Some(pending.item), Some(right))
        } else {
            let left = pending.item.clone();
            self.phase = Phase::Probe(Some(Pending {
                pos: pending.pos + 1,
                ..pending
            }));
            (self.combine)(Some(left), Some(right))
        }
    }

    fn finish_probe(&mut self) {
        trace!("left side exhausted");
        if self.config.kind.keeps_unmatched_right() {
            self.phase = Phase::Sweep(SweepCursor::default());
        } else {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.phase = Phase::Done;
        debug!(
            kind = ?self.config.kind,
            matched = self.stats.matched,
            left_only = self.stats.left_only,
            right_only = self.stats.right_only,
            "join evaluated"
        );
    }

    fn abort(&mut self, err: Error) -> Option<Result<O, Error>> {
        self.phase = Phase::Done;
        debug!(error = %err, "join aborted");
        Some(Err(err))
    }
}

impl<'a, L, R, K, F, O> Iterator for HashJoin<'a, L, R, K, F>
where
    L: Clone + 'a,
    R: Clone + 'a,
    K: Hash + Eq,
    F: FnMut(Option<L>, Option<R>) -> O,
{
    type Item = Result<O, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.phase, Phase::Done) {
                Phase::Build => {
                    if let Err(err) = self.build_index() {
                        return self.abort(err);
                    }
                    self.phase = Phase::Probe(None);
                }
                Phase::Probe(Some(pending)) => return Some(Ok(self.emit_match(pending))),
                Phase::Probe(None) => {
                    let Some(item) = self.left.next() else {
                        self.finish_probe();
                        continue;
                    };
                    let key = match (self.left_key)(&item) {
                        Ok(key) => key,
                        Err(err) => return self.abort(err),
                    };

                    self.phase = Phase::Probe(None);
                    match self.index.slot(&key) {
                        Some(slot) => {
                            self.phase = Phase::Probe(Some(Pending { item, slot, pos: 0 }));
                        }
                        None if self.config.kind.keeps_unmatched_left() => {
                            self.stats.left_only += 1;
                            return Some(Ok((self.combine)(Some(item), None)));
                        }
                        None => {}
                    }
                }
                Phase::Sweep(mut cursor) => match self.index.next_unmatched(&mut cursor) {
                    Some(pos) => {
                        self.phase = Phase::Sweep(cursor);
                        self.stats.right_only += 1;
                        let right = self.index.row(pos).clone();
                        return Some(Ok((self.combine)(None, Some(right))));
                    }
                    None => {
                        self.finish();
                        return None;
                    }
                },
                Phase::Done => return None,
            }
        }
    }
}
