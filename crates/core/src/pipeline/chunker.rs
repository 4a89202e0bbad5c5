//! Lazy fixed-size grouping of an ordered sequence.

use std::iter::FusedIterator;

/// Iterator adapter yielding `Vec`s of at most `size` items, in input order.
///
/// Only the last chunk may be shorter; no chunk is ever empty.
#[derive(Debug, Clone)]
pub struct Chunked<I> {
    iter: I,
    size: usize,
}

/// Group `items` into chunks of `size`.
///
/// # Panics
///
/// Panics if `size` is zero.
pub fn chunked<I: IntoIterator>(items: I, size: usize) -> Chunked<I::IntoIter> {
    assert!(size > 0, "chunk size must be positive");
    Chunked {
        iter: items.into_iter(),
        size,
    }
}

impl<I: Iterator> Iterator for Chunked<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let (lower, _) = self.iter.size_hint();
        let mut chunk = Vec::with_capacity(lower.clamp(1, self.size));
        chunk.extend(self.iter.by_ref().take(self.size));

        if chunk.is_empty() {
            None
        } else {
            Some(chunk)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.iter.size_hint();
        (
            lower.div_ceil(self.size),
            upper.map(|u| u.div_ceil(self.size)),
        )
    }
}

impl<I: FusedIterator> FusedIterator for Chunked<I> {}
