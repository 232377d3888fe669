// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Paired iteration over sequences that may differ in length.

use core::iter::Fuse;

/// One position of a [`zip_fill`] traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paired<A, B> {
    /// Both sequences have an element at this position.
    Both(A, B),
    /// Only the left sequence has an element at this position.
    Left(A),
    /// Only the right sequence has an element at this position.
    Right(B),
}

/// Iterator returned by [`zip_fill`].
#[derive(Debug, Clone)]
pub struct ZipFill<I, J> {
    left: Fuse<I>,
    right: Fuse<J>,
}

impl<I: Iterator, J: Iterator> Iterator for ZipFill<I, J> {
    type Item = Paired<I::Item, J::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        match (self.left.next(), self.right.next()) {
            (Some(a), Some(b)) => Some(Paired::Both(a, b)),
            (Some(a), None) => Some(Paired::Left(a)),
            (None, Some(b)) => Some(Paired::Right(b)),
            (None, None) => None,
        }
    }
}

/// Walk two sequences in lockstep until both are exhausted.
///
/// Unlike [`Iterator::zip`], a position where only one side has an element is
/// yielded as [`Paired::Left`] or [`Paired::Right`] instead of ending the walk.
pub fn zip_fill<I, J>(left: I, right: J) -> ZipFill<I::IntoIter, J::IntoIter>
where
    I: IntoIterator,
    J: IntoIterator,
{
    ZipFill {
        left: left.into_iter().fuse(),
        right: right.into_iter().fuse(),
    }
}

/// True when both sequences have the same length and `pred` holds for every pair.
pub fn all_paired<I, J, F>(left: I, right: J, mut pred: F) -> bool
where
    I: IntoIterator,
    J: IntoIterator,
    F: FnMut(I::Item, J::Item) -> bool,
{
    zip_fill(left, right).all(|pair| match pair {
        Paired::Both(a, b) => pred(a, b),
        Paired::Left(_) | Paired::Right(_) => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_unpaired_tail() {
        let pairs: Vec<_> = zip_fill([1, 2, 3], ["a"]).collect();
        assert_eq!(
            pairs,
            vec![Paired::Both(1, "a"), Paired::Left(2), Paired::Left(3)]
        );

        let pairs: Vec<_> = zip_fill(Vec::<u8>::new(), [true]).collect();
        assert_eq!(pairs, vec![Paired::Right(true)]);
    }

    #[test]
    fn all_paired_rejects_length_mismatch() {
        assert!(all_paired([1, 2], [1, 2], |a, b| a == b));
        assert!(!all_paired([1, 2], [1], |a, b| a == b));
        assert!(!all_paired([1], [1, 2], |a, b| a == b));
        assert!(!all_paired([1, 3], [1, 2], |a, b| a == b));
    }

    #[test]
    fn all_paired_is_vacuous_only_when_both_empty() {
        assert!(all_paired(Vec::<u8>::new(), Vec::<u8>::new(), |_, _| false));
        assert!(!all_paired(Vec::<u8>::new(), [0u8], |_, _| true));
    }
}
