//! Concatenated text collection underlying the FM indices.
//!
//! Texts are joined with a separator code into one string. Symbol codes are
//! dense: 0 is the sentinel (appended by the index builders), 1 the
//! separator, and the symbols that actually occur get 2, 3, ... in rank
//! order.

use crate::alphabet::Alphabet;
use crate::defaults::{FIRST_SYMBOL_CODE, SEPARATOR_CODE};
use crate::error::{Error, Result};

/// Position inside one text of the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextPosition {
    pub reference_id: usize,
    pub position: usize,
}

#[derive(Debug, Clone)]
pub struct TextCollection {
    /// `t0 SEP t1 SEP ... t(k-1)`, no sentinel.
    codes: Vec<u8>,
    /// Offset of each text inside `codes`.
    starts: Vec<usize>,
    /// Code of each alphabet rank, `None` when the rank never occurs.
    code_of_rank: Vec<Option<u8>>,
    /// Ranks that occur, ascending.
    ranks: Vec<usize>,
}

impl TextCollection {
    /// Encode `texts` into one code string.
    ///
    /// # Errors
    /// `Error::Input` when there are no texts, when every text is empty, or
    /// when more than 254 distinct symbols occur.
    pub fn new<A: Alphabet, T: AsRef<[A]>>(texts: &[T]) -> Result<Self> {
        if texts.is_empty() {
            return Err(Error::input("cannot index an empty text collection"));
        }
        if texts.iter().all(|t| t.as_ref().is_empty()) {
            return Err(Error::input("cannot index a collection of empty texts"));
        }

        let mut present = vec![false; A::SIZE];
        for text in texts {
            for symbol in text.as_ref() {
                present[symbol.rank()] = true;
            }
        }
        let ranks: Vec<usize> = (0..A::SIZE).filter(|&r| present[r]).collect();
        let max_symbols = (u8::MAX - FIRST_SYMBOL_CODE + 1) as usize;
        if ranks.len() > max_symbols {
            return Err(Error::input(format!(
                "{} distinct symbols exceed the index limit of {max_symbols}",
                ranks.len()
            )));
        }
        let mut code_of_rank = vec![None; A::SIZE];
        for (i, &rank) in ranks.iter().enumerate() {
            code_of_rank[rank] = Some(FIRST_SYMBOL_CODE + i as u8);
        }

        let total: usize = texts.iter().map(|t| t.as_ref().len()).sum::<usize>() + texts.len() - 1;
        let mut codes = Vec::with_capacity(total);
        let mut starts = Vec::with_capacity(texts.len());
        for (i, text) in texts.iter().enumerate() {
            if i > 0 {
                codes.push(SEPARATOR_CODE);
            }
            starts.push(codes.len());
            codes.extend(text.as_ref().iter().map(|s| code_of_rank[s.rank()].unwrap_or(SEPARATOR_CODE)));
        }

        Ok(Self {
            codes,
            starts,
            code_of_rank,
            ranks,
        })
    }

    pub fn codes(&self) -> &[u8] {
        &self.codes
    }

    /// Length of the concatenation, separators included.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn text_count(&self) -> usize {
        self.starts.len()
    }

    /// Number of distinct codes including sentinel and separator.
    pub fn sigma(&self) -> usize {
        FIRST_SYMBOL_CODE as usize + self.ranks.len()
    }

    #[inline(always)]
    pub fn code(&self, rank: usize) -> Option<u8> {
        self.code_of_rank.get(rank).copied().flatten()
    }

    pub fn ranks(&self) -> &[usize] {
        &self.ranks
    }

    /// Map an offset in the concatenation to its text and position.
    pub fn locate(&self, offset: usize) -> TextPosition {
        let reference_id = self.starts.partition_point(|&s| s <= offset).saturating_sub(1);
        TextPosition {
            reference_id,
            position: offset - self.starts[reference_id],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Dna4;

    #[test]
    fn codes_are_dense_in_rank_order() {
        let texts = vec![Dna4::encode(b"GGT").unwrap(), Dna4::encode(b"TG").unwrap()];
        let collection = TextCollection::new(&texts).unwrap();
        assert_eq!(collection.sigma(), 4);
        assert_eq!(collection.code(Dna4::A.rank()), None);
        assert_eq!(collection.codes(), &[2, 2, 3, 1, 3, 2]);
        assert_eq!(
            collection.locate(4),
            TextPosition {
                reference_id: 1,
                position: 0
            }
        );
        assert_eq!(collection.locate(2).reference_id, 0);
    }

    #[test]
    fn empty_collections_are_rejected() {
        let none: Vec<Vec<Dna4>> = Vec::new();
        assert!(matches!(TextCollection::new(&none), Err(Error::Input(_))));
        let blanks: Vec<Vec<Dna4>> = vec![Vec::new(), Vec::new()];
        assert!(matches!(TextCollection::new(&blanks), Err(Error::Input(_))));
    }

    #[test]
    fn too_many_symbols_are_rejected() {
        let bytes: Vec<u8> = (0..=255).collect();
        assert!(matches!(TextCollection::new(&[bytes]), Err(Error::Input(_))));
        let bytes: Vec<u8> = (0..254).collect();
        assert!(TextCollection::new(&[bytes]).is_ok());
    }
}
