// ============================================================================
// BATCHED SCORE COMPUTATION (structure of arrays)
// ============================================================================
//
// Up to BATCH_LANES sequence pairs are swept together over one matrix sized
// to the longest sequences of the batch. Each matrix row holds one value per
// lane, so the per-cell work is a fixed-width loop the compiler can map onto
// vector registers.
//
// Lanes with shorter sequences are padded. A padded cell never feeds a cell
// inside its own lane's matrix, and the optimum is only captured inside that
// matrix, so padding cannot leak into a lane's result. Padding compares as a
// match in global mode and as a hard mismatch in local mode.
// ============================================================================

use super::scoring::{GapScheme, ScoringScheme};
use super::types::{AlignmentOptimum, MatrixCoordinate, Score};
use crate::alphabet::Alphabet;
use crate::defaults::{BATCH_LANES, MINUS_INFINITY};

pub const LANES: usize = BATCH_LANES;

type Lanes = [Score; LANES];

const UNREACHABLE_LANES: Lanes = [MINUS_INFINITY; LANES];

/// Per-lane sequence lengths and the active-lane mask.
#[derive(Debug, Clone, Copy)]
struct LaneShape {
    len1: [usize; LANES],
    len2: [usize; LANES],
    active: [bool; LANES],
}

impl LaneShape {
    #[inline(always)]
    fn covers(&self, lane: usize, row: usize, col: usize) -> bool {
        self.active[lane] && row <= self.len2[lane] && col <= self.len1[lane]
    }
}

/// Lane-wise affine sweep for score (and end position) output.
#[derive(Debug, Clone)]
pub struct BatchAligner<S> {
    scoring: S,
    gap: GapScheme,
    local: bool,
    current: Vec<Lanes>,
    up: Vec<Lanes>,
    left: Vec<Lanes>,
}

impl<S> BatchAligner<S> {
    pub fn new(scoring: S, gap: GapScheme, local: bool) -> Self {
        Self {
            scoring,
            gap,
            local,
            current: Vec::new(),
            up: Vec::new(),
            left: Vec::new(),
        }
    }

    /// Optimum of each pair, in input order. At most `LANES` pairs.
    pub fn align<A, P, Q>(&mut self, pairs: &[(P, Q)]) -> Vec<AlignmentOptimum>
    where
        A: Alphabet,
        S: ScoringScheme<A>,
        P: AsRef<[A]>,
        Q: AsRef<[A]>,
    {
        debug_assert!(pairs.len() <= LANES);
        let mut shape = LaneShape {
            len1: [0; LANES],
            len2: [0; LANES],
            active: [false; LANES],
        };
        for (lane, (s1, s2)) in pairs.iter().enumerate() {
            shape.len1[lane] = s1.as_ref().len();
            shape.len2[lane] = s2.as_ref().len();
            shape.active[lane] = true;
        }
        let columns = shape.len1.iter().max().copied().unwrap_or(0) + 1;
        let rows = shape.len2.iter().max().copied().unwrap_or(0) + 1;

        let padding = if self.local {
            MINUS_INFINITY
        } else {
            self.scoring.score(A::from_rank(0), A::from_rank(0))
        };
        let open = self.gap.open + self.gap.extension;
        let extension = self.gap.extension;

        self.current.clear();
        self.current.resize(rows, UNREACHABLE_LANES);
        self.up.clear();
        self.up.resize(rows, UNREACHABLE_LANES);
        self.left.clear();
        self.left.resize(rows, UNREACHABLE_LANES);

        let mut optimum = [AlignmentOptimum::default(); LANES];
        let mut substitution: Lanes = [0; LANES];

        for col in 0..columns {
            // Cache of the previous column's value one row up.
            let mut diagonal: Lanes = UNREACHABLE_LANES;
            for row in 0..rows {
                let mut cur = [0; LANES];
                if col == 0 && row == 0 {
                    self.up[0] = UNREACHABLE_LANES;
                    self.left[0] = UNREACHABLE_LANES;
                } else if self.local && (row == 0 || col == 0) {
                    self.up[row] = UNREACHABLE_LANES;
                    self.left[row] = UNREACHABLE_LANES;
                } else if col == 0 {
                    for l in 0..LANES {
                        let up = (self.current[row - 1][l] + open).max(self.up[row - 1][l] + extension);
                        self.up[row][l] = up;
                        cur[l] = up;
                    }
                    self.left[row] = UNREACHABLE_LANES;
                } else if row == 0 {
                    for l in 0..LANES {
                        let left = (self.current[0][l] + open).max(self.left[0][l] + extension);
                        self.left[0][l] = left;
                        cur[l] = left;
                    }
                    self.up[0] = UNREACHABLE_LANES;
                } else {
                    for (l, (s1, s2)) in pairs.iter().enumerate() {
                        let (s1, s2) = (s1.as_ref(), s2.as_ref());
                        substitution[l] = if col <= s1.len() && row <= s2.len() {
                            self.scoring.score(s1[col - 1], s2[row - 1])
                        } else {
                            padding
                        };
                    }
                    for l in pairs.len()..LANES {
                        substitution[l] = padding;
                    }
                    for l in 0..LANES {
                        let d = diagonal[l] + substitution[l];
                        let u = (self.current[row - 1][l] + open).max(self.up[row - 1][l] + extension);
                        let w = (self.current[row][l] + open).max(self.left[row][l] + extension);
                        let mut best = d.max(u).max(w);
                        if self.local {
                            best = best.max(0);
                        }
                        cur[l] = best.max(MINUS_INFINITY);
                        self.up[row][l] = u.max(MINUS_INFINITY);
                        self.left[row][l] = w.max(MINUS_INFINITY);
                    }
                }
                diagonal = self.current[row];
                self.current[row] = cur;

                for (l, best) in optimum.iter_mut().enumerate() {
                    if !shape.covers(l, row, col) {
                        continue;
                    }
                    let final_cell = row == shape.len2[l] && col == shape.len1[l];
                    if self.local || final_cell {
                        best.update(cur[l], MatrixCoordinate::new(row, col));
                    }
                }
            }
        }

        optimum[..pairs.len()].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Dna4;
    use crate::core::alignment::scoring::MatchMismatch;

    fn dna(s: &str) -> Vec<Dna4> {
        Dna4::encode(s.as_bytes()).unwrap()
    }

    #[test]
    fn lanes_of_different_lengths_do_not_interfere() {
        let pairs = vec![
            (dna("AAAACCCGGG"), dna("AACCCGGG")),
            (dna("ACGT"), dna("ACGT")),
            (dna(""), dna("ACG")),
        ];
        let mut batch = BatchAligner::new(MatchMismatch::edit_distance(), GapScheme::linear(-1), false);
        let optima = batch.align(&pairs);
        let scores: Vec<Score> = optima.iter().map(|o| o.score).collect();
        assert_eq!(scores, vec![-2, 0, -3]);
        assert_eq!(optima[0].coordinate, MatrixCoordinate::new(8, 10));
        assert_eq!(optima[2].coordinate, MatrixCoordinate::new(3, 0));
    }

    #[test]
    fn local_lane_ignores_padding() {
        let pairs = vec![(dna("TTACGTT"), dna("ACG")), (dna("ACGTACGTACGT"), dna("GGGGGGACGTAC"))];
        let mut batch = BatchAligner::new(MatchMismatch::new(2, -3), GapScheme::affine(-1, -4), true);
        let optima = batch.align(&pairs);
        assert_eq!(optima[0].score, 6);
        assert_eq!(optima[0].coordinate, MatrixCoordinate::new(3, 5));
        assert_eq!(optima[1].score, 12);
    }
}
