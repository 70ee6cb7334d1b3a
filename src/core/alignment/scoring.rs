//! Substitution and gap scoring.
//!
//! Scores are used as given: penalties are negative numbers supplied by the
//! caller, nothing is sign-flipped internally.

use std::marker::PhantomData;

use super::types::Score;
use crate::alphabet::{Aa20, Alphabet, Dna5};
use crate::defaults::{GAP_OPEN_SCORE, GAP_SCORE, MATCH_SCORE, MISMATCH_SCORE};
use crate::error::{Error, Result};

/// Symmetric, total substitution score between two symbols.
pub trait ScoringScheme<A: Alphabet>: Clone + Send + Sync {
    fn score(&self, a: A, b: A) -> Score;

    /// True when every match scores 0 and every mismatch -1.
    fn is_edit_distance(&self) -> bool {
        (0..A::SIZE).all(|i| {
            (0..A::SIZE).all(|j| {
                let expected = if i == j { 0 } else { -1 };
                self.score(A::from_rank(i), A::from_rank(j)) == expected
            })
        })
    }
}

/// Closed-form match/mismatch scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchMismatch {
    pub match_score: Score,
    pub mismatch_score: Score,
}

impl MatchMismatch {
    pub const fn new(match_score: Score, mismatch_score: Score) -> Self {
        Self {
            match_score,
            mismatch_score,
        }
    }

    /// Unit-cost scoring: 0 for a match, -1 for a mismatch.
    pub const fn edit_distance() -> Self {
        Self::new(MATCH_SCORE, MISMATCH_SCORE)
    }
}

impl Default for MatchMismatch {
    fn default() -> Self {
        Self::edit_distance()
    }
}

impl<A: Alphabet> ScoringScheme<A> for MatchMismatch {
    #[inline(always)]
    fn score(&self, a: A, b: A) -> Score {
        if a == b {
            self.match_score
        } else {
            self.mismatch_score
        }
    }

    fn is_edit_distance(&self) -> bool {
        self.match_score == 0 && self.mismatch_score == -1
    }
}

/// Full symbol-by-symbol score table, row-major by rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionMatrix<A: Alphabet> {
    scores: Vec<Score>,
    _alphabet: PhantomData<A>,
}

impl<A: Alphabet> SubstitutionMatrix<A> {
    /// Build from a `SIZE * SIZE` row-major table. The table must be symmetric.
    pub fn new(scores: Vec<Score>) -> Result<Self> {
        let size = A::SIZE;
        if scores.len() != size * size {
            return Err(Error::config(format!(
                "substitution matrix needs {} entries, got {}",
                size * size,
                scores.len()
            )));
        }
        for i in 0..size {
            for j in (i + 1)..size {
                if scores[i * size + j] != scores[j * size + i] {
                    return Err(Error::config(format!(
                        "substitution matrix is not symmetric at ranks ({i}, {j})"
                    )));
                }
            }
        }
        Ok(Self {
            scores,
            _alphabet: PhantomData,
        })
    }

    pub fn from_fn(mut f: impl FnMut(A, A) -> Score) -> Result<Self> {
        let size = A::SIZE;
        let mut scores = Vec::with_capacity(size * size);
        for i in 0..size {
            for j in 0..size {
                scores.push(f(A::from_rank(i), A::from_rank(j)));
            }
        }
        Self::new(scores)
    }

    #[inline(always)]
    pub fn score_ranks(&self, a: usize, b: usize) -> Score {
        self.scores[a * A::SIZE + b]
    }
}

impl SubstitutionMatrix<Dna5> {
    /// Nucleotide table with a separate score for anything involving `N`.
    pub fn nucleotide(match_score: Score, mismatch_score: Score, ambiguous_score: Score) -> Self {
        let mut scores = vec![0; Dna5::SIZE * Dna5::SIZE];
        for i in 0..Dna5::SIZE {
            for j in 0..Dna5::SIZE {
                scores[i * Dna5::SIZE + j] = if i == Dna5::N.rank() || j == Dna5::N.rank() {
                    ambiguous_score
                } else if i == j {
                    match_score
                } else {
                    mismatch_score
                };
            }
        }
        Self {
            scores,
            _alphabet: PhantomData,
        }
    }
}

// Rows and columns in `Aa20` rank order.
#[rustfmt::skip]
const BLOSUM62: [[Score; 20]; 20] = [
    [ 4,  0, -2, -1, -2,  0, -2, -1, -1, -1, -1, -2, -1, -1, -1,  1,  0,  0, -3, -2], // A
    [ 0,  9, -3, -4, -2, -3, -3, -1, -3, -1, -1, -3, -3, -3, -3, -1, -1, -1, -2, -2], // C
    [-2, -3,  6,  2, -3, -1, -1, -3, -1, -4, -3,  1, -1,  0, -2,  0, -1, -3, -4, -3], // D
    [-1, -4,  2,  5, -3, -2,  0, -3,  1, -3, -2,  0, -1,  2,  0,  0, -1, -2, -3, -2], // E
    [-2, -2, -3, -3,  6, -3, -1,  0, -3,  0,  0, -3, -4, -3, -3, -2, -2, -1,  1,  3], // F
    [ 0, -3, -1, -2, -3,  6, -2, -4, -2, -4, -3,  0, -2, -2, -2,  0, -2, -3, -2, -3], // G
    [-2, -3, -1,  0, -1, -2,  8, -3, -1, -3, -2,  1, -2,  0,  0, -1, -2, -3, -2,  2], // H
    [-1, -1, -3, -3,  0, -4, -3,  4, -3,  2,  1, -3, -3, -3, -3, -2, -1,  3, -3, -1], // I
    [-1, -3, -1,  1, -3, -2, -1, -3,  5, -2, -1,  0, -1,  1,  2,  0, -1, -2, -3, -2], // K
    [-1, -1, -4, -3,  0, -4, -3,  2, -2,  4,  2, -3, -3, -2, -2, -2, -1,  1, -2, -1], // L
    [-1, -1, -3, -2,  0, -3, -2,  1, -1,  2,  5, -2, -2,  0, -1, -1, -1,  1, -1, -1], // M
    [-2, -3,  1,  0, -3,  0,  1, -3,  0, -3, -2,  6, -2,  0,  0,  1,  0, -3, -4, -2], // N
    [-1, -3, -1, -1, -4, -2, -2, -3, -1, -3, -2, -2,  7, -1, -2, -1, -1, -2, -4, -3], // P
    [-1, -3,  0,  2, -3, -2,  0, -3,  1, -2,  0,  0, -1,  5,  1,  0, -1, -2, -2, -1], // Q
    [-1, -3, -2,  0, -3, -2,  0, -3,  2, -2, -1,  0, -2,  1,  5, -1, -1, -3, -3, -2], // R
    [ 1, -1,  0,  0, -2,  0, -1, -2,  0, -2, -1,  1, -1,  0, -1,  4,  1, -2, -3, -2], // S
    [ 0, -1, -1, -1, -2, -2, -2, -1, -1, -1, -1,  0, -1, -1, -1,  1,  5,  0, -2, -2], // T
    [ 0, -1, -3, -2, -1, -3, -3,  3, -2,  1,  1, -3, -2, -2, -3, -2,  0,  4, -3, -1], // V
    [-3, -2, -4, -3,  1, -2, -2, -3, -3, -2, -1, -4, -4, -2, -3, -3, -2, -3, 11,  2], // W
    [-2, -2, -3, -2,  3, -3,  2, -1, -2, -1, -1, -2, -3, -1, -2, -2, -2, -1,  2,  7], // Y
];

impl SubstitutionMatrix<Aa20> {
    pub fn blosum62() -> Self {
        Self {
            scores: BLOSUM62.iter().flatten().copied().collect(),
            _alphabet: PhantomData,
        }
    }
}

impl<A: Alphabet> ScoringScheme<A> for SubstitutionMatrix<A> {
    #[inline(always)]
    fn score(&self, a: A, b: A) -> Score {
        self.score_ranks(a.rank(), b.rank())
    }
}

/// Linear (`open == 0`) or affine gap costs.
///
/// A run of `n > 0` gap characters scores `n * extension + open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapScheme {
    pub extension: Score,
    pub open: Score,
}

impl GapScheme {
    pub const fn linear(gap: Score) -> Self {
        Self {
            extension: gap,
            open: 0,
        }
    }

    pub const fn affine(gap: Score, gap_open: Score) -> Self {
        Self {
            extension: gap,
            open: gap_open,
        }
    }

    pub const fn is_linear(&self) -> bool {
        self.open == 0
    }

    pub const fn score(&self, length: usize) -> Score {
        if length == 0 {
            0
        } else {
            length as Score * self.extension + self.open
        }
    }
}

impl Default for GapScheme {
    fn default() -> Self {
        Self::affine(GAP_SCORE, GAP_OPEN_SCORE)
    }
}
