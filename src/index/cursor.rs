//! Cursor interface shared by the FM indices.
//!
//! A cursor stands for the set of text positions matching the symbols
//! extended so far. Extension returns `None` once that set is empty, so a
//! live cursor always has `count() > 0` (the root counts every suffix).

use super::text::TextPosition;

pub trait IndexCursor: Clone {
    /// Append the symbol with alphabet rank `rank` to the matched pattern.
    fn extend_right(&self, rank: usize) -> Option<Self>;

    /// Number of text positions matching the pattern.
    fn count(&self) -> u64;

    /// Length of the matched pattern.
    fn query_length(&self) -> usize;

    /// Rank of the most recently extended symbol on the right end.
    fn last_rank(&self) -> Option<usize>;

    /// Start positions of every occurrence, sorted by `(reference_id, position)`.
    fn locate(&self) -> Vec<TextPosition>;

    /// Ranks occurring in the indexed texts, ascending.
    fn alphabet_ranks(&self) -> &[usize];

    /// Every non-empty extension to the right, in rank order.
    fn extend_right_all(&self) -> Vec<(usize, Self)> {
        self.alphabet_ranks()
            .iter()
            .filter_map(|&rank| self.extend_right(rank).map(|c| (rank, c)))
            .collect()
    }
}

pub trait BidirectionalCursor: IndexCursor {
    /// Prepend the symbol with alphabet rank `rank` to the matched pattern.
    fn extend_left(&self, rank: usize) -> Option<Self>;
}
