//! Token streams as parser input.

use std::iter::Enumerate;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};
use std::slice::Iter;

use nom::{InputIter, InputLength, InputTake, Needed, Slice, UnspecializedInput};

/// A slice of lexed tokens, wrapped so it can serve as a
/// [nom](https://crates.io/crates/nom)
/// [custom input type](https://github.com/rust-bakery/nom/blob/main/doc/custom_input_types.md).
#[derive(Debug, Eq, PartialEq)]
pub struct Tokens<'a, T> {
    tokens: &'a [T],
}

impl<'a, T> Clone for Tokens<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Tokens<'a, T> {}

impl<'a, T> Tokens<'a, T> {
    pub fn new(tokens: &'a [T]) -> Self {
        Self { tokens }
    }

    /// The first token, if any.
    pub fn first(&self) -> Option<&'a T> {
        self.tokens.first()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<'a, T> InputLength for Tokens<'a, T> {
    #[inline]
    fn input_len(&self) -> usize {
        self.tokens.len()
    }
}

impl<'a, T> InputTake for Tokens<'a, T> {
    #[inline]
    fn take(&self, count: usize) -> Self {
        Tokens::new(&self.tokens[..count])
    }

    #[inline]
    fn take_split(&self, count: usize) -> (Self, Self) {
        let (head, tail) = self.tokens.split_at(count);
        (Tokens::new(tail), Tokens::new(head))
    }
}

impl<'a, T> Slice<Range<usize>> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, range: Range<usize>) -> Self {
        Tokens::new(&self.tokens[range])
    }
}

impl<'a, T> Slice<RangeTo<usize>> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, range: RangeTo<usize>) -> Self {
        Tokens::new(&self.tokens[range])
    }
}

impl<'a, T> Slice<RangeFrom<usize>> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, range: RangeFrom<usize>) -> Self {
        Tokens::new(&self.tokens[range])
    }
}

impl<'a, T> Slice<RangeFull> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, _: RangeFull) -> Self {
        Tokens::new(self.tokens)
    }
}

impl<'a, T> InputIter for Tokens<'a, T> {
    type Item = &'a T;
    type Iter = Enumerate<Iter<'a, T>>;
    type IterElem = Iter<'a, T>;

    #[inline]
    fn iter_indices(&self) -> Self::Iter {
        self.tokens.iter().enumerate()
    }

    #[inline]
    fn iter_elements(&self) -> Self::IterElem {
        self.tokens.iter()
    }

    #[inline]
    fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: Fn(Self::Item) -> bool,
    {
        self.tokens.iter().position(predicate)
    }

    #[inline]
    fn slice_index(&self, count: usize) -> Result<usize, Needed> {
        if count <= self.tokens.len() {
            Ok(count)
        } else {
            Err(Needed::new(count - self.tokens.len()))
        }
    }
}

impl<'a, T> UnspecializedInput for Tokens<'a, T> {}
