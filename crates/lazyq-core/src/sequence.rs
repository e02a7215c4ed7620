//! The lazy sequence protocol.
//!
//! A [`Sequence`] is a pull-driven producer: nothing is computed until the
//! consumer asks for the next element, and a consumer that stops asking (or
//! drops the sequence) stops all upstream work. Every combinator in
//! [`crate::query`] is a `Sequence` that pulls from another one.

use std::fmt;

/// A lazy, single-pass, ordered producer of `T`.
pub struct Sequence<'a, T> {
    inner: Box<dyn Iterator<Item = T> + 'a>,
}

impl<'a, T: 'a> Sequence<'a, T> {
    /// Wrap any iterable.
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        Self {
            inner: Box::new(items.into_iter()),
        }
    }

    /// Create a sequence over the items of a vector.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::new(items)
    }

    /// Create a sequence that produces nothing.
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// Create a sequence from a producer function. The sequence ends the
    /// first time `producer` returns `None`.
    pub fn from_fn<F>(producer: F) -> Self
    where
        F: FnMut() -> Option<T> + 'a,
    {
        Self::new(std::iter::from_fn(producer))
    }
}

impl<'a, T: 'a, E: 'a> Sequence<'a, Result<T, E>> {
    /// End the sequence right after the first error it yields.
    pub fn stop_after_error(self) -> Self {
        Self::new(StopAfterError {
            inner: self,
            failed: false,
        })
    }
}

impl<T> Iterator for Sequence<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T: 'a> From<Vec<T>> for Sequence<'a, T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T> fmt::Debug for Sequence<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("size_hint", &self.inner.size_hint())
            .finish_non_exhaustive()
    }
}

struct StopAfterError<I> {
    inner: I,
    failed: bool,
}

impl<T, E, I> Iterator for StopAfterError<I>
where
    I: Iterator<Item = Result<T, E>>,
{
    type Item = Result<T, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.inner.next()?;
        self.failed = item.is_err();
        Some(item)
    }
}
