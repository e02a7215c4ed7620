//! Flatten combinators.

use crate::error::Error;
use crate::query::Record;
use crate::sequence::Sequence;
use lazyq_value::Value;

impl<'a, T: 'a> Sequence<'a, T> {
    /// Expand every item into a nested sequence and concatenate the results
    /// in source order.
    ///
    /// Items whose nested sequence is empty contribute nothing. Only one
    /// nested sequence is open at a time, and dropping the result drops it.
    pub fn flatten_with<U, F>(self, selector: F) -> Sequence<'a, U>
    where
        U: 'a,
        F: FnMut(T) -> Sequence<'a, U> + 'a,
    {
        Sequence::new(self.flat_map(selector))
    }

    /// Flatten a named field of every item.
    ///
    /// List fields contribute their elements; any other value contributes
    /// itself. The first failed lookup is yielded as an error and ends the
    /// sequence.
    pub fn flatten_field(self, name: &str) -> Sequence<'a, Result<Value, Error>>
    where
        T: Record,
    {
        let name = name.to_string();
        self.flatten_with(move |item| match item.field(&name) {
            Ok(Value::List(items)) => Sequence::new(items.into_iter().map(Ok)),
            other => Sequence::new(std::iter::once(other)),
        })
        .stop_after_error()
    }
}
