//! Bit-parallel (Myers) edit distance with Ukkonen cut-off.
//!
//! Sequence 2 is the pattern (matrix rows), sequence 1 the text (columns).
//! Each column is processed in `ceil(len2 / 64)` word blocks; within a block
//! the vertical deltas of 64 rows are updated with a constant number of
//! word operations. With a maximum error count only the blocks that can
//! still reach the last row within the bound are computed, and the active
//! window grows or shrinks one block at a time.
//!
//! Rows past the end of the pattern in the last block are padding. Their
//! match bits are always set, and the last-row score subtracts their deltas
//! back out.

use super::matrix::TraceSource;
use super::types::{MatrixCoordinate, TraceCell, TraceDirections};
use crate::alphabet::Alphabet;
use crate::error::{Error, Result};

const WORD_BITS: usize = 64;
const HIGH_BIT: u64 = 1 << (WORD_BITS - 1);

/// Trace directions of an edit-distance matrix, one bit per cell.
///
/// Column `c > 0` holds `blocks` words for each of `diagonal`, `up` and
/// `left`; bit `(row - 1) % 64` of word `(row - 1) / 64` belongs to `row`.
/// Rows past `max_rows[c - 1]` were not computed and carry no direction.
/// Row 0 is `left` when `c > 0` and the alignment is global; column 0 is
/// `up` for every row below the origin.
#[derive(Debug, Clone, Default)]
pub struct BitTraceMatrix {
    rows: usize,
    columns: usize,
    blocks: usize,
    semi_global: bool,
    diagonal: Vec<u64>,
    up: Vec<u64>,
    left: Vec<u64>,
    max_rows: Vec<usize>,
}

impl BitTraceMatrix {
    fn new(sequence1_len: usize, sequence2_len: usize, semi_global: bool) -> Result<Self> {
        let blocks = sequence2_len.div_ceil(WORD_BITS);
        let words = sequence1_len
            .checked_mul(blocks)
            .ok_or(Error::Resource { cells: usize::MAX })?;
        let mut trace = Self {
            rows: sequence2_len + 1,
            columns: sequence1_len + 1,
            blocks,
            semi_global,
            ..Self::default()
        };
        for buffer in [&mut trace.diagonal, &mut trace.up, &mut trace.left] {
            buffer
                .try_reserve_exact(words)
                .map_err(|_| Error::Resource { cells: words * WORD_BITS })?;
            buffer.resize(words, 0);
        }
        trace.max_rows.resize(sequence1_len, 0);
        Ok(trace)
    }

    /// Highest row computed in column `col`.
    pub fn max_rows(&self, col: usize) -> usize {
        match col {
            0 => self.rows - 1,
            c => self.max_rows[c - 1],
        }
    }

    #[inline(always)]
    fn store(&mut self, col: usize, block: usize, diagonal: u64, up: u64, left: u64) {
        let i = (col - 1) * self.blocks + block;
        self.diagonal[i] = diagonal;
        self.up[i] = up;
        self.left[i] = left;
    }

    #[inline(always)]
    fn bit(words: &[u64], index: usize, bit: usize) -> bool {
        (words[index] >> bit) & 1 == 1
    }
}

impl TraceSource for BitTraceMatrix {
    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn trace_at(&self, coordinate: MatrixCoordinate) -> TraceCell {
        let (row, col) = (coordinate.row(), coordinate.col());
        if row >= self.rows || col >= self.columns {
            return TraceCell::NONE;
        }
        let (diagonal, up, left) = if row == 0 {
            (false, false, col > 0 && !self.semi_global)
        } else if col == 0 {
            (false, true, false)
        } else if row > self.max_rows[col - 1] {
            (false, false, false)
        } else {
            let index = (col - 1) * self.blocks + (row - 1) / WORD_BITS;
            let bit = (row - 1) % WORD_BITS;
            (
                Self::bit(&self.diagonal, index, bit),
                Self::bit(&self.up, index, bit),
                Self::bit(&self.left, index, bit),
            )
        };

        // Unit gaps: every gap step is its own run.
        let mut cell = TraceCell::NONE;
        if diagonal {
            cell.current |= TraceDirections::DIAGONAL;
        }
        if up {
            cell.current |= TraceDirections::UP;
            cell.up = TraceDirections::UP_OPEN;
        }
        if left {
            cell.current |= TraceDirections::LEFT;
            cell.left = TraceDirections::LEFT_OPEN;
        }
        cell
    }
}

/// Outcome of one edit-distance computation.
#[derive(Debug, Clone)]
pub struct EditDistanceResult {
    /// `None` when the distance exceeds the error bound.
    pub distance: Option<usize>,
    /// Column of the reported last-row cell.
    pub end_column: usize,
    pub trace: Option<BitTraceMatrix>,
}

impl EditDistanceResult {
    fn unbounded() -> Self {
        Self {
            distance: None,
            end_column: 0,
            trace: None,
        }
    }
}

/// One 64-row block step.
#[derive(Debug, Clone, Copy)]
struct BlockStep {
    pv: u64,
    mv: u64,
    h_out: i64,
    /// Horizontal positive deltas before the shift (the `left` trace bits).
    ph: u64,
    /// Rows whose diagonal delta is zero.
    d0: u64,
}

#[inline(always)]
fn advance_block(pv: u64, mv: u64, eq: u64, h_in: i64) -> BlockStep {
    let h_in_negative = (h_in < 0) as u64;
    let xv = eq | mv;
    let eq = eq | h_in_negative;
    let xh = ((eq & pv).wrapping_add(pv) ^ pv) | eq;

    let ph = mv | !(xh | pv);
    let mh = pv & xh;
    let d0 = xh | mv;

    let h_out = ((ph & HIGH_BIT) != 0) as i64 - ((mh & HIGH_BIT) != 0) as i64;

    let mut ph_shifted = ph << 1;
    let mut mh_shifted = mh << 1;
    if h_in < 0 {
        mh_shifted |= 1;
    } else if h_in > 0 {
        ph_shifted |= 1;
    }

    BlockStep {
        pv: mh_shifted | !(xv | ph_shifted),
        mv: ph_shifted & xv,
        h_out,
        ph,
        d0,
    }
}

/// Unit-cost edit distance between two sequences.
///
/// Global mode aligns both sequences end to end. Semi-global mode lets the
/// pattern (sequence 2) start and end anywhere in sequence 1 at no cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MyersEditDistance {
    semi_global: bool,
    max_errors: Option<usize>,
}

impl MyersEditDistance {
    pub fn global() -> Self {
        Self::default()
    }

    pub fn semi_global() -> Self {
        Self {
            semi_global: true,
            max_errors: None,
        }
    }

    pub fn with_max_errors(mut self, max_errors: Option<usize>) -> Self {
        self.max_errors = max_errors;
        self
    }

    pub fn is_semi_global(&self) -> bool {
        self.semi_global
    }

    /// Edit distance only.
    pub fn distance<A: Alphabet>(&self, sequence1: &[A], sequence2: &[A]) -> Result<EditDistanceResult> {
        self.run::<A, false>(sequence1, sequence2)
    }

    /// Edit distance plus the bit-packed trace for traceback.
    pub fn distance_with_trace<A: Alphabet>(
        &self,
        sequence1: &[A],
        sequence2: &[A],
    ) -> Result<EditDistanceResult> {
        self.run::<A, true>(sequence1, sequence2)
    }

    fn run<A: Alphabet, const TRACE: bool>(
        &self,
        sequence1: &[A],
        sequence2: &[A],
    ) -> Result<EditDistanceResult> {
        let n = sequence1.len();
        let m = sequence2.len();
        let within = |d: usize| self.max_errors.map_or(true, |k| d <= k);

        let mut trace = if TRACE {
            Some(BitTraceMatrix::new(n, m, self.semi_global)?)
        } else {
            None
        };

        if m == 0 {
            let (distance, end_column) = if self.semi_global { (0, 0) } else { (n, n) };
            if !within(distance) {
                return Ok(EditDistanceResult::unbounded());
            }
            return Ok(EditDistanceResult {
                distance: Some(distance),
                end_column,
                trace,
            });
        }
        if let Some(k) = self.max_errors {
            if !self.semi_global && n.abs_diff(m) > k {
                return Ok(EditDistanceResult::unbounded());
            }
        }

        let blocks = m.div_ceil(WORD_BITS);
        let peq = pattern_match_vectors(sequence2, blocks);
        let last_bit = (m - 1) % WORD_BITS;
        let padding_mask = if last_bit == WORD_BITS - 1 {
            0
        } else {
            !0u64 << (last_bit + 1)
        };

        let mut pv = vec![!0u64; blocks];
        let mut mv = vec![0u64; blocks];
        let mut score: Vec<i64> = (0..blocks).map(|b| ((b + 1) * WORD_BITS) as i64).collect();
        let mut last: isize = match self.max_errors {
            Some(k) => (blocks.min((k.min(m) + 1).div_ceil(WORD_BITS)) as isize) - 1,
            None => blocks as isize - 1,
        };
        let h_top: i64 = if self.semi_global { 0 } else { 1 };
        let last_row_score = |pv: &[u64], mv: &[u64], score: &[i64]| -> i64 {
            let b = blocks - 1;
            score[b] - (pv[b] & padding_mask).count_ones() as i64 + (mv[b] & padding_mask).count_ones() as i64
        };

        let mut best: Option<(usize, usize)> = None;
        if self.semi_global && within(m) {
            best = Some((m, 0));
        }

        for (j, symbol) in sequence1.iter().enumerate() {
            let col = j + 1;
            let eq_row = &peq[symbol.rank() * blocks..(symbol.rank() + 1) * blocks];
            let mut h = h_top;

            for b in 0..=last as usize {
                let step = advance_block(pv[b], mv[b], eq_row[b], h);
                if let Some(t) = trace.as_mut() {
                    t.store(col, b, !(eq_row[b] ^ step.d0), step.pv, step.ph);
                }
                pv[b] = step.pv;
                mv[b] = step.mv;
                score[b] += step.h_out;
                h = step.h_out;
            }

            if let Some(k) = self.max_errors {
                let k = k as i64;
                let next = (last + 1) as usize;
                if next < blocks && score[last as usize] - h <= k && ((eq_row[next] & 1) != 0 || h < 0) {
                    last += 1;
                    pv[next] = !0;
                    mv[next] = 0;
                    let step = advance_block(pv[next], mv[next], eq_row[next], h);
                    if let Some(t) = trace.as_mut() {
                        t.store(col, next, !(eq_row[next] ^ step.d0), step.pv, step.ph);
                    }
                    pv[next] = step.pv;
                    mv[next] = step.mv;
                    score[next] = score[next - 1] - h + WORD_BITS as i64 + step.h_out;
                }
                let floor = if self.semi_global { 1 } else { 0 };
                while last >= floor && score[last as usize] >= k + WORD_BITS as i64 {
                    last -= 1;
                }
                if last < 0 {
                    return Ok(EditDistanceResult::unbounded());
                }
            }

            if let Some(t) = trace.as_mut() {
                t.max_rows[j] = m.min((last as usize + 1) * WORD_BITS);
            }
            if self.semi_global && last as usize == blocks - 1 {
                let d = last_row_score(&pv, &mv, &score) as usize;
                if within(d) && best.map_or(true, |(b, _)| d < b) {
                    best = Some((d, col));
                }
            }
        }

        if log::log_enabled!(log::Level::Trace) {
            log::trace!(
                "Myers: {n}x{m}, {blocks} blocks, final window {} blocks",
                last + 1
            );
        }

        if !self.semi_global && last as usize == blocks - 1 {
            let d = last_row_score(&pv, &mv, &score) as usize;
            if within(d) {
                best = Some((d, n));
            }
        }
        Ok(match best {
            Some((distance, end_column)) => EditDistanceResult {
                distance: Some(distance),
                end_column,
                trace,
            },
            None => EditDistanceResult::unbounded(),
        })
    }
}

/// Match vectors per symbol rank; padding rows match every symbol.
fn pattern_match_vectors<A: Alphabet>(pattern: &[A], blocks: usize) -> Vec<u64> {
    let mut peq = vec![0u64; A::SIZE * blocks];
    for (i, symbol) in pattern.iter().enumerate() {
        peq[symbol.rank() * blocks + i / WORD_BITS] |= 1 << (i % WORD_BITS);
    }
    let used = pattern.len() % WORD_BITS;
    if used != 0 {
        let padding = !0u64 << used;
        for rank in 0..A::SIZE {
            peq[rank * blocks + blocks - 1] |= padding;
        }
    }
    peq
}
