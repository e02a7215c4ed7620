//! Terminal consumers that drain a sequence into caller-owned containers.

use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use tracing::debug;

use crate::error::Error;
use crate::query::selector::{field_key, field_selector, Record};
use crate::sequence::Sequence;
use lazyq_value::{Key, Value};

/// How values sharing a key are stored in a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapPolicy {
    /// The last value per key wins.
    Overwrite,
    /// Values per key are appended to a list in first-seen order.
    Accumulate,
}

impl MapPolicy {
    fn shape(self) -> &'static str {
        match self {
            MapPolicy::Overwrite => "map of values",
            MapPolicy::Accumulate => "map of lists",
        }
    }
}

type ValueFn<'a, T, V> = Box<dyn FnMut(T) -> Result<V, Error> + 'a>;

impl<'a, T: 'a> Sequence<'a, T> {
    /// Drain the sequence into a new vector.
    pub fn to_vec(self) -> Vec<T> {
        self.collect()
    }

    /// Drain the sequence onto the end of `target`.
    pub fn assign_to_vec(self, target: &mut Vec<T>) {
        target.extend(self);
    }

    /// Group items into a map where the last value per key wins.
    pub fn group_these<V, F>(self, value_selector: F) -> GroupBuilder<'a, T, V>
    where
        V: 'a,
        F: FnMut(T) -> V + 'a,
    {
        self.grouped(value_selector, MapPolicy::Overwrite)
    }

    /// Group items into a map of value lists.
    pub fn group_lists_of<V, F>(self, value_selector: F) -> GroupBuilder<'a, T, V>
    where
        V: 'a,
        F: FnMut(T) -> V + 'a,
    {
        self.grouped(value_selector, MapPolicy::Accumulate)
    }

    /// Group a named field of every item, last value per key wins.
    pub fn group_field(self, name: &str) -> GroupBuilder<'a, T, Value>
    where
        T: Record,
    {
        let select = field_selector::<T>(name);
        GroupBuilder::new(self, Box::new(move |item| select(&item)), MapPolicy::Overwrite)
    }

    /// Group a named field of every item into lists.
    pub fn group_lists_of_field(self, name: &str) -> GroupBuilder<'a, T, Value>
    where
        T: Record,
    {
        let select = field_selector::<T>(name);
        GroupBuilder::new(self, Box::new(move |item| select(&item)), MapPolicy::Accumulate)
    }

    fn grouped<V, F>(self, mut value_selector: F, policy: MapPolicy) -> GroupBuilder<'a, T, V>
    where
        V: 'a,
        F: FnMut(T) -> V + 'a,
    {
        GroupBuilder::new(self, Box::new(move |item| Ok(value_selector(item))), policy)
    }
}

impl<'a, T: 'a, E: 'a> Sequence<'a, Result<T, E>> {
    /// Drain a fallible sequence, stopping at the first error.
    pub fn try_to_vec(self) -> Result<Vec<T>, E> {
        self.collect()
    }

    /// Drain a fallible sequence onto `target`, stopping at the first error.
    /// Items before the error stay in `target`.
    pub fn try_assign_to_vec(self, target: &mut Vec<T>) -> Result<(), E> {
        for item in self {
            target.push(item?);
        }
        Ok(())
    }
}

/// A grouping waiting for its key selector.
pub struct GroupBuilder<'a, T, V> {
    source: Sequence<'a, T>,
    value_selector: ValueFn<'a, T, V>,
    policy: MapPolicy,
}

impl<'a, T: 'a, V: 'a> GroupBuilder<'a, T, V> {
    fn new(source: Sequence<'a, T>, value_selector: ValueFn<'a, T, V>, policy: MapPolicy) -> Self {
        Self {
            source,
            value_selector,
            policy,
        }
    }

    /// Set the key selector.
    pub fn by<K, F>(self, key_selector: F) -> MapSequence<'a, K, V>
    where
        K: 'a,
        F: Fn(&T) -> K + 'a,
    {
        self.try_by(move |item| Ok(key_selector(item)))
    }

    /// Set a fallible key selector.
    pub fn try_by<K, F>(self, key_selector: F) -> MapSequence<'a, K, V>
    where
        K: 'a,
        F: Fn(&T) -> Result<K, Error> + 'a,
    {
        let mut value_selector = self.value_selector;
        let pairs = self
            .source
            .project(move |item| -> Result<(K, V), Error> {
                let key = key_selector(&item)?;
                Ok((key, value_selector(item)?))
            })
            .stop_after_error();

        MapSequence {
            pairs,
            policy: self.policy,
        }
    }

    /// Key by a named field.
    pub fn by_field(self, name: &str) -> MapSequence<'a, Key, V>
    where
        T: Record,
    {
        self.try_by(field_key(name))
    }
}

/// A lazy sequence of key/value pairs bound to a map policy.
pub struct MapSequence<'a, K, V> {
    pairs: Sequence<'a, Result<(K, V), Error>>,
    policy: MapPolicy,
}

impl<'a, K: 'a, V: 'a> MapSequence<'a, K, V> {
    pub fn policy(&self) -> MapPolicy {
        self.policy
    }

    /// The underlying key/value pairs, in source order.
    pub fn into_pairs(self) -> Sequence<'a, Result<(K, V), Error>> {
        self.pairs
    }

    /// Drain into a map of single values. Requires the overwrite policy.
    pub fn assign_to_map<S>(self, target: &mut HashMap<K, V, S>) -> Result<(), Error>
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        self.expect_policy(MapPolicy::Overwrite)?;

        let mut assigned = 0usize;
        for pair in self.pairs {
            let (key, value) = pair?;
            target.insert(key, value);
            assigned += 1;
        }
        debug!(assigned, keys = target.len(), "assigned pairs to map");
        Ok(())
    }

    /// Drain into a map of value lists. Requires the accumulate policy.
    pub fn assign_to_list_map<S>(self, target: &mut HashMap<K, Vec<V>, S>) -> Result<(), Error>
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        self.expect_policy(MapPolicy::Accumulate)?;

        let mut assigned = 0usize;
        for pair in self.pairs {
            let (key, value) = pair?;
            target.entry(key).or_default().push(value);
            assigned += 1;
        }
        debug!(assigned, keys = target.len(), "assigned pairs to list map");
        Ok(())
    }

    fn expect_policy(&self, expected: MapPolicy) -> Result<(), Error> {
        if self.policy == expected {
            Ok(())
        } else {
            Err(Error::ShapeMismatch {
                expected: expected.shape(),
                actual: self.policy.shape(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazyq_value::Row;

    #[derive(Debug, Clone, PartialEq, serde::Serialize)]
    struct Sale {
        region: String,
        amount: i64,
    }

    crate::impl_record!(Sale);

    fn sales() -> Vec<Sale> {
        [("north", 10), ("south", 5), ("north", 7)]
            .into_iter()
            .map(|(region, amount)| Sale {
                region: region.into(),
                amount,
            })
            .collect()
    }

    #[test]
    fn test_assign_to_vec_appends() {
        let mut target = vec![0];
        Sequence::from_vec(vec![1, 2]).assign_to_vec(&mut target);
        assert_eq!(target, vec![0, 1, 2]);
    }

    #[test]
    fn test_try_assign_keeps_items_before_error() {
        let mut target = Vec::new();
        let seq: Sequence<Result<i32, &str>> = Sequence::from_vec(vec![Ok(1), Err("x"), Ok(3)]);
        assert_eq!(seq.try_assign_to_vec(&mut target), Err("x"));
        assert_eq!(target, vec![1]);
    }

    #[test]
    fn test_overwrite_policy() {
        let mut totals = HashMap::new();
        Sequence::from_vec(sales())
            .group_these(|s| s.amount)
            .by(|s| s.region.clone())
            .assign_to_map(&mut totals)
            .unwrap();

        assert_eq!(totals.len(), 2);
        assert_eq!(totals["north"], 7);
        assert_eq!(totals["south"], 5);
    }

    #[test]
    fn test_accumulate_policy_keeps_first_seen_order() {
        let mut by_region = HashMap::new();
        Sequence::from_vec(sales())
            .group_lists_of(|s| s.amount)
            .by(|s| s.region.clone())
            .assign_to_list_map(&mut by_region)
            .unwrap();

        assert_eq!(by_region["north"], vec![10, 7]);
        assert_eq!(by_region["south"], vec![5]);
    }

    #[test]
    fn test_accumulate_appends_to_existing_lists() {
        let mut by_region = HashMap::from([("north".to_string(), vec![1])]);
        Sequence::from_vec(sales())
            .group_lists_of(|s| s.amount)
            .by(|s| s.region.clone())
            .assign_to_list_map(&mut by_region)
            .unwrap();

        assert_eq!(by_region["north"], vec![1, 10, 7]);
    }

    #[test]
    fn test_shape_mismatch() {
        let mut target: HashMap<String, i64> = HashMap::new();
        let err = Sequence::from_vec(sales())
            .group_lists_of(|s| s.amount)
            .by(|s| s.region.clone())
            .assign_to_map(&mut target)
            .unwrap_err();

        assert_eq!(
            err,
            Error::ShapeMismatch {
                expected: "map of values",
                actual: "map of lists",
            }
        );
        assert!(target.is_empty());
    }

    #[test]
    fn test_named_grouping() {
        let mut amounts = HashMap::new();
        Sequence::from_vec(sales())
            .group_lists_of_field("amount")
            .by_field("region")
            .assign_to_list_map(&mut amounts)
            .unwrap();

        assert_eq!(
            amounts[&Key::from("north")],
            vec![Value::Int64(10), Value::Int64(7)]
        );
    }

    #[test]
    fn test_named_grouping_missing_key_field() {
        let rows = vec![Row::new().with_field("k", 1i32).with_field("v", "a"), Row::new()];
        let mut target = HashMap::new();
        let result = Sequence::from_vec(rows)
            .group_field("v")
            .by_field("k")
            .assign_to_map(&mut target);

        assert!(result.is_err());
        assert_eq!(target.len(), 1);
    }

    #[test]
    fn test_into_pairs_in_source_order() {
        let pairs = Sequence::from_vec(vec![3, 1, 2])
            .group_these(|n| n * 10)
            .by(|n| *n)
            .into_pairs()
            .try_to_vec()
            .unwrap();

        assert_eq!(pairs, vec![(3, 30), (1, 10), (2, 20)]);
    }
}
