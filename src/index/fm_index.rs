// FM-Index over a text collection
//
// `FmCore` holds the BWT machinery for one code string: suffix array from the
// bio crate, C array, occurrence checkpoints and a sampled suffix array.
// `FmIndex` wraps one core built over the reversed concatenation, so that a
// backward step on the core appends a symbol on the right of the query.

use std::marker::PhantomData;

use super::cursor::IndexCursor;
use super::occ::OccurrenceTable;
use super::text::{TextCollection, TextPosition};
use crate::alphabet::Alphabet;
use crate::defaults::{SA_SAMPLE_INTERVAL, SENTINEL_CODE};
use crate::error::Result;

/// Half-open BWT row interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaInterval {
    pub lo: usize,
    pub hi: usize,
}

impl SaInterval {
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.hi - self.lo
    }
}

#[derive(Debug, Clone)]
pub struct FmCore {
    bwt: Vec<u8>,
    /// `c_array[c]` = number of text codes smaller than `c`, sentinel included.
    c_array: Vec<u64>,
    occ: OccurrenceTable,
    /// Suffix array values at rows divisible by the sampling interval.
    sa_samples: Vec<usize>,
}

impl FmCore {
    /// Build over `codes` (no sentinel); codes must be below `sigma` and non-zero.
    pub fn build(codes: &[u8], sigma: usize) -> Self {
        let mut text = Vec::with_capacity(codes.len() + 1);
        text.extend_from_slice(codes);
        text.push(SENTINEL_CODE);

        use bio::data_structures::suffix_array::suffix_array;
        let sa = suffix_array(&text);

        let bwt: Vec<u8> = sa
            .iter()
            .map(|&pos| if pos == 0 { SENTINEL_CODE } else { text[pos - 1] })
            .collect();

        let mut counts = vec![0u64; sigma];
        for &code in &text {
            counts[code as usize] += 1;
        }
        let mut c_array = vec![0u64; sigma + 1];
        for c in 0..sigma {
            c_array[c + 1] = c_array[c] + counts[c];
        }

        let interval = SA_SAMPLE_INTERVAL as usize;
        let sa_samples: Vec<usize> = sa.iter().step_by(interval).copied().collect();
        let occ = OccurrenceTable::new(&bwt, sigma);

        log::debug!(
            "Built FM core: {} rows, sigma {}, {} SA samples",
            bwt.len(),
            sigma,
            sa_samples.len()
        );

        Self {
            bwt,
            c_array,
            occ,
            sa_samples,
        }
    }

    /// Rows including the sentinel suffix.
    pub fn rows(&self) -> usize {
        self.bwt.len()
    }

    pub fn root(&self) -> SaInterval {
        SaInterval {
            lo: 0,
            hi: self.bwt.len(),
        }
    }

    #[inline(always)]
    pub fn occ(&self, code: u8, row: usize) -> u64 {
        self.occ.occ(code, row)
    }

    /// Prepend `code` to the pattern of `interval`.
    #[inline]
    pub fn backward_step(&self, interval: SaInterval, code: u8) -> SaInterval {
        let base = self.c_array[code as usize];
        SaInterval {
            lo: (base + self.occ(code, interval.lo)) as usize,
            hi: (base + self.occ(code, interval.hi)) as usize,
        }
    }

    /// Rows of `interval` whose preceding code is smaller than `code`.
    #[inline]
    pub fn smaller_preceding(&self, interval: SaInterval, code: u8) -> u64 {
        self.occ.smaller_in_range(code, interval.lo, interval.hi)
    }

    /// Suffix array value of `row`, resolved by LF walking to a sampled row.
    pub fn locate_row(&self, mut row: usize) -> usize {
        let interval = SA_SAMPLE_INTERVAL as usize;
        let mut steps = 0usize;
        while row % interval != 0 {
            let code = self.bwt[row];
            if code == SENTINEL_CODE {
                return steps;
            }
            row = (self.c_array[code as usize] + self.occ(code, row)) as usize;
            steps += 1;
        }
        self.sa_samples[row / interval] + steps
    }
}

/// Unidirectional FM index.
#[derive(Debug, Clone)]
pub struct FmIndex<A: Alphabet> {
    text: TextCollection,
    core: FmCore,
    _alphabet: PhantomData<A>,
}

impl<A: Alphabet> FmIndex<A> {
    pub fn new<T: AsRef<[A]>>(texts: &[T]) -> Result<Self> {
        let text = TextCollection::new(texts)?;
        let reversed: Vec<u8> = text.codes().iter().rev().copied().collect();
        let core = FmCore::build(&reversed, text.sigma());
        log::debug!(
            "FM index over {} text(s), {} symbols",
            text.text_count(),
            text.len()
        );
        Ok(Self {
            text,
            core,
            _alphabet: PhantomData,
        })
    }

    pub fn text(&self) -> &TextCollection {
        &self.text
    }

    pub fn cursor(&self) -> FmCursor<'_, A> {
        FmCursor {
            index: self,
            interval: self.core.root(),
            query_length: 0,
            last_rank: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FmCursor<'a, A: Alphabet> {
    index: &'a FmIndex<A>,
    interval: SaInterval,
    query_length: usize,
    last_rank: Option<usize>,
}

impl<'a, A: Alphabet> FmCursor<'a, A> {
    pub fn interval(&self) -> SaInterval {
        self.interval
    }
}

impl<'a, A: Alphabet> PartialEq for FmCursor<'a, A> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.index, other.index)
            && self.interval == other.interval
            && self.query_length == other.query_length
    }
}

impl<'a, A: Alphabet> IndexCursor for FmCursor<'a, A> {
    fn extend_right(&self, rank: usize) -> Option<Self> {
        let code = self.index.text.code(rank)?;
        let next = self.index.core.backward_step(self.interval, code);
        if next.size() == 0 {
            return None;
        }
        Some(Self {
            index: self.index,
            interval: next,
            query_length: self.query_length + 1,
            last_rank: Some(rank),
        })
    }

    fn count(&self) -> u64 {
        self.interval.size() as u64
    }

    fn query_length(&self) -> usize {
        self.query_length
    }

    fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    fn locate(&self) -> Vec<TextPosition> {
        let n = self.index.text.len();
        let mut hits: Vec<TextPosition> = (self.interval.lo..self.interval.hi)
            .map(|row| {
                // Occurrence of the reversed pattern in the reversed text.
                let reversed = self.index.core.locate_row(row);
                self.index.text.locate(n - reversed - self.query_length)
            })
            .collect();
        hits.sort_unstable();
        hits
    }

    fn alphabet_ranks(&self) -> &[usize] {
        self.index.text.ranks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor_for<'a>(index: &'a FmIndex<u8>, pattern: &[u8]) -> Option<FmCursor<'a, u8>> {
        pattern
            .iter()
            .try_fold(index.cursor(), |cursor, &b| cursor.extend_right(b as usize))
    }

    #[test]
    fn locate_row_recovers_every_suffix_array_value() {
        let codes: Vec<u8> = b"mississippi".iter().map(|&b| b - b'a' + 1).collect();
        let core = FmCore::build(&codes, 27);
        let mut positions: Vec<usize> = (0..core.rows()).map(|row| core.locate_row(row)).collect();
        positions.sort_unstable();
        assert_eq!(positions, (0..=codes.len()).collect::<Vec<_>>());
    }

    #[test]
    fn counts_and_locates_exact_matches() {
        let index = FmIndex::new(&[b"mississippi".to_vec()]).unwrap();
        let ssi = cursor_for(&index, b"ssi").expect("ssi occurs");
        assert_eq!(ssi.count(), 2);
        assert_eq!(ssi.query_length(), 3);
        assert_eq!(ssi.last_rank(), Some(b'i' as usize));
        let positions: Vec<usize> = ssi.locate().iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![2, 5]);
        assert!(cursor_for(&index, b"sis").is_some());
        assert!(cursor_for(&index, b"pps").is_none(), "pps does not occur");
        assert!(cursor_for(&index, b"z").is_none(), "z is not in the text");
    }

    #[test]
    fn matches_never_span_text_boundaries() {
        let index = FmIndex::new(&[b"acg".to_vec(), b"tac".to_vec()]).unwrap();
        assert!(cursor_for(&index, b"gt").is_none(), "gt would cross the separator");
        let ac = cursor_for(&index, b"ac").unwrap();
        assert_eq!(
            ac.locate(),
            vec![
                TextPosition { reference_id: 0, position: 0 },
                TextPosition { reference_id: 1, position: 1 },
            ]
        );
    }

    #[test]
    fn children_enumerate_in_rank_order() {
        let index = FmIndex::new(&[b"abcab".to_vec()]).unwrap();
        let a = cursor_for(&index, b"a").unwrap();
        let children: Vec<usize> = a.extend_right_all().into_iter().map(|(rank, _)| rank).collect();
        assert_eq!(children, vec![b'b' as usize]);
        let root_children = index.cursor().extend_right_all();
        assert_eq!(root_children.len(), 3);
    }
}
