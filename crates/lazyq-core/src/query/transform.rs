//! Projection combinators.

use crate::error::Error;
use crate::query::Record;
use crate::sequence::Sequence;
use lazyq_value::Value;

impl<'a, T: 'a> Sequence<'a, T> {
    /// Map every item through `selector`, preserving order and count.
    pub fn project<U, F>(self, selector: F) -> Sequence<'a, U>
    where
        U: 'a,
        F: FnMut(T) -> U + 'a,
    {
        Sequence::new(self.map(selector))
    }

    /// Project every item onto one of its named fields.
    ///
    /// The first failed lookup is yielded as an error and ends the sequence.
    pub fn project_field(self, name: &str) -> Sequence<'a, Result<Value, Error>>
    where
        T: Record,
    {
        let name = name.to_string();
        self.project(move |item| item.field(&name)).stop_after_error()
    }

    /// Erase the item type into [`Value`].
    pub fn as_any(self) -> Sequence<'a, Value>
    where
        T: Into<Value>,
    {
        self.project(Into::into)
    }
}

impl<'a, T: 'a, E: 'a> Sequence<'a, Result<T, E>> {
    /// Map the successful items of a fallible sequence, passing errors through.
    pub fn try_project<U, F>(self, mut selector: F) -> Sequence<'a, Result<U, E>>
    where
        U: 'a,
        F: FnMut(T) -> U + 'a,
    {
        self.project(move |item| item.map(&mut selector))
    }
}
