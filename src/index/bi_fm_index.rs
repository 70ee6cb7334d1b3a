// Bidirectional FM-Index
//
// Two cores: `forward` over the concatenation and `reverse` over its mirror.
// A cursor keeps the pattern's interval in both. Extending on one side is a
// backward step in the matching core; the other interval is shifted by the
// number of rows whose preceding code sorts below the new symbol.

use std::marker::PhantomData;

use super::cursor::{BidirectionalCursor, IndexCursor};
use super::fm_index::{FmCore, SaInterval};
use super::text::{TextCollection, TextPosition};
use crate::alphabet::Alphabet;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct BiFmIndex<A: Alphabet> {
    text: TextCollection,
    forward: FmCore,
    reverse: FmCore,
    _alphabet: PhantomData<A>,
}

impl<A: Alphabet> BiFmIndex<A> {
    /// Index `texts` for search from both ends.
    ///
    /// # Errors
    /// `Error::Input` for an empty collection or one with more than 254
    /// distinct symbols.
    pub fn new<T: AsRef<[A]>>(texts: &[T]) -> Result<Self> {
        let text = TextCollection::new(texts)?;
        let sigma = text.sigma();
        let forward = FmCore::build(text.codes(), sigma);
        let reversed: Vec<u8> = text.codes().iter().rev().copied().collect();
        let reverse = FmCore::build(&reversed, sigma);
        log::debug!(
            "Bidirectional FM index over {} text(s), {} symbols, sigma {}",
            text.text_count(),
            text.len(),
            sigma
        );
        Ok(Self {
            text,
            forward,
            reverse,
            _alphabet: PhantomData,
        })
    }

    pub fn text(&self) -> &TextCollection {
        &self.text
    }

    pub fn cursor(&self) -> BiFmCursor<'_, A> {
        BiFmCursor {
            index: self,
            forward: self.forward.root(),
            reverse: self.reverse.root(),
            query_length: 0,
            last_rank: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BiFmCursor<'a, A: Alphabet> {
    index: &'a BiFmIndex<A>,
    forward: SaInterval,
    reverse: SaInterval,
    query_length: usize,
    last_rank: Option<usize>,
}

impl<'a, A: Alphabet> BiFmCursor<'a, A> {
    pub fn forward_interval(&self) -> SaInterval {
        self.forward
    }
}

impl<'a, A: Alphabet> PartialEq for BiFmCursor<'a, A> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.index, other.index)
            && self.forward == other.forward
            && self.query_length == other.query_length
    }
}

impl<'a, A: Alphabet> IndexCursor for BiFmCursor<'a, A> {
    fn extend_right(&self, rank: usize) -> Option<Self> {
        let code = self.index.text.code(rank)?;
        let reverse = self.index.reverse.backward_step(self.reverse, code);
        if reverse.size() == 0 {
            return None;
        }
        let lo = self.forward.lo + self.index.reverse.smaller_preceding(self.reverse, code) as usize;
        let forward = SaInterval {
            lo,
            hi: lo + reverse.size(),
        };
        if log::log_enabled!(log::Level::Trace) {
            log::trace!(
                "extend_right rank {} -> fwd [{}, {}) rev [{}, {})",
                rank,
                forward.lo,
                forward.hi,
                reverse.lo,
                reverse.hi
            );
        }
        Some(Self {
            index: self.index,
            forward,
            reverse,
            query_length: self.query_length + 1,
            last_rank: Some(rank),
        })
    }

    fn count(&self) -> u64 {
        self.forward.size() as u64
    }

    fn query_length(&self) -> usize {
        self.query_length
    }

    fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    fn locate(&self) -> Vec<TextPosition> {
        let mut hits: Vec<TextPosition> = (self.forward.lo..self.forward.hi)
            .map(|row| self.index.text.locate(self.index.forward.locate_row(row)))
            .collect();
        hits.sort_unstable();
        hits
    }

    fn alphabet_ranks(&self) -> &[usize] {
        self.index.text.ranks()
    }
}

impl<'a, A: Alphabet> BidirectionalCursor for BiFmCursor<'a, A> {
    fn extend_left(&self, rank: usize) -> Option<Self> {
        let code = self.index.text.code(rank)?;
        let forward = self.index.forward.backward_step(self.forward, code);
        if forward.size() == 0 {
            return None;
        }
        let lo = self.reverse.lo + self.index.forward.smaller_preceding(self.forward, code) as usize;
        let reverse = SaInterval {
            lo,
            hi: lo + forward.size(),
        };
        Some(Self {
            index: self.index,
            forward,
            reverse,
            query_length: self.query_length + 1,
            // The right end only changes when the pattern was empty.
            last_rank: self.last_rank.or(Some(rank)),
        })
    }
}
