//! Traceback over recorded trace directions.
//!
//! The walker starts at the optimum and follows `DIAGONAL`, then `UP`, then
//! `LEFT` when several directions tie. Inside a gap it stays in the gap
//! state until it meets the cell where that gap was opened.

use std::fmt;

use super::cigar::{self, CigarOp};
use super::matrix::TraceSource;
use super::scoring::{GapScheme, ScoringScheme};
use super::types::{MatrixCoordinate, Score, TraceDirections};
use crate::alphabet::Alphabet;
use crate::error::{Error, Result};

/// One column entry of an aligned sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gapped<A> {
    Symbol(A),
    Gap,
}

impl<A: Alphabet> Gapped<A> {
    pub fn is_gap(&self) -> bool {
        matches!(self, Gapped::Gap)
    }

    pub fn to_char(&self) -> char {
        match self {
            Gapped::Symbol(a) => a.to_char(),
            Gapped::Gap => '-',
        }
    }
}

/// Two gapped sequences of equal length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment<A> {
    pub sequence1: Vec<Gapped<A>>,
    pub sequence2: Vec<Gapped<A>>,
}

impl<A: Alphabet> Alignment<A> {
    pub fn len(&self) -> usize {
        self.sequence1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence1.is_empty()
    }

    /// Aligned rows as printable strings.
    pub fn rows(&self) -> (String, String) {
        (
            self.sequence1.iter().map(Gapped::to_char).collect(),
            self.sequence2.iter().map(Gapped::to_char).collect(),
        )
    }

    /// Run-length encoded operations, sequence 1 as reference.
    pub fn cigar(&self) -> Vec<(CigarOp, u32)> {
        let mut ops: Vec<(CigarOp, u32)> = self
            .sequence1
            .iter()
            .zip(&self.sequence2)
            .filter_map(|pair| {
                let op = match pair {
                    (Gapped::Symbol(a), Gapped::Symbol(b)) if a == b => CigarOp::Eq,
                    (Gapped::Symbol(_), Gapped::Symbol(_)) => CigarOp::X,
                    (Gapped::Gap, Gapped::Symbol(_)) => CigarOp::I,
                    (Gapped::Symbol(_), Gapped::Gap) => CigarOp::D,
                    (Gapped::Gap, Gapped::Gap) => return None,
                };
                Some((op, 1))
            })
            .collect();
        cigar::normalize_in_place(&mut ops);
        ops
    }

    pub fn cigar_string(&self) -> String {
        cigar::to_string(&self.cigar())
    }

    /// Rebuild the gapped pair that `ops` describes over the aligned slices
    /// `sequence1` and `sequence2`.
    ///
    /// # Errors
    /// `Error::Input` when the operations do not span both slices exactly, or
    /// an `=`/`X` run disagrees with the symbols it covers.
    pub fn from_cigar(ops: &[(CigarOp, u32)], sequence1: &[A], sequence2: &[A]) -> Result<Self> {
        let (span1, span2) = cigar::spans(ops);
        if (span1, span2) != (sequence1.len(), sequence2.len()) {
            return Err(Error::input(format!(
                "CIGAR spans {span1}x{span2} symbols but the sequences have {}x{}",
                sequence1.len(),
                sequence2.len()
            )));
        }

        let columns = ops.iter().map(|&(_, len)| len as usize).sum();
        let mut alignment = Alignment {
            sequence1: Vec::with_capacity(columns),
            sequence2: Vec::with_capacity(columns),
        };
        let (mut i, mut j) = (0, 0);
        for &(op, len) in ops {
            for _ in 0..len {
                let x = if op.consumes_sequence1() {
                    i += 1;
                    Gapped::Symbol(sequence1[i - 1])
                } else {
                    Gapped::Gap
                };
                let y = if op.consumes_sequence2() {
                    j += 1;
                    Gapped::Symbol(sequence2[j - 1])
                } else {
                    Gapped::Gap
                };
                if let (Gapped::Symbol(a), Gapped::Symbol(b)) = (x, y) {
                    if (a == b) != (op == CigarOp::Eq) {
                        return Err(Error::input(format!(
                            "CIGAR {} does not fit {}/{} at ({}, {})",
                            op.to_byte() as char,
                            a.to_char(),
                            b.to_char(),
                            i - 1,
                            j - 1
                        )));
                    }
                }
                alignment.sequence1.push(x);
                alignment.sequence2.push(y);
            }
        }
        Ok(alignment)
    }

    /// [`Alignment::from_cigar`] for the text form, e.g. `3=1I2X`.
    pub fn from_cigar_str(text: &str, sequence1: &[A], sequence2: &[A]) -> Result<Self> {
        let ops = cigar::parse(text).ok_or_else(|| Error::input(format!("malformed CIGAR {text:?}")))?;
        Self::from_cigar(&ops, sequence1, sequence2)
    }

    /// Score of this alignment under `scoring` and `gap`.
    ///
    /// Each maximal gap run in either row costs `gap.score(run_length)`.
    pub fn rescore<S: ScoringScheme<A>>(&self, scoring: &S, gap: GapScheme) -> Score {
        let mut total = 0;
        let mut run1 = 0usize;
        let mut run2 = 0usize;
        for (x, y) in self.sequence1.iter().zip(&self.sequence2) {
            if x.is_gap() {
                run1 += 1;
            } else if run1 > 0 {
                total += gap.score(run1);
                run1 = 0;
            }
            if y.is_gap() {
                run2 += 1;
            } else if run2 > 0 {
                total += gap.score(run2);
                run2 = 0;
            }
            if let (Gapped::Symbol(a), Gapped::Symbol(b)) = (x, y) {
                total += scoring.score(*a, *b);
            }
        }
        if run1 > 0 {
            total += gap.score(run1);
        }
        if run2 > 0 {
            total += gap.score(run2);
        }
        total
    }
}

impl<A: Alphabet> fmt::Display for Alignment<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (top, bottom) = self.rows();
        writeln!(f, "{top}")?;
        write!(f, "{bottom}")
    }
}

/// Where the walker may legally stop on a cell without directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TracebackRule {
    pub local: bool,
    pub first_row_free: bool,
    pub first_column_free: bool,
}

impl TracebackRule {
    fn may_stop(&self, coordinate: MatrixCoordinate) -> bool {
        self.local
            || (coordinate.row() == 0 && self.first_row_free)
            || (coordinate.col() == 0 && self.first_column_free)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    Current,
    InUp,
    InLeft,
}

/// Alignment plus the cell where the walk stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traceback<A> {
    pub alignment: Alignment<A>,
    pub begin: MatrixCoordinate,
}

fn malformed(coordinate: MatrixCoordinate, state: WalkState) -> Error {
    log::error!("Traceback hit a cell without directions at {coordinate} ({state:?})");
    Error::Internal(format!(
        "malformed trace: no direction at {coordinate} while in {state:?} state"
    ))
}

/// Walk from `end` back to the alignment start.
pub fn trace_back<A: Alphabet, T: TraceSource + ?Sized>(
    trace: &T,
    sequence1: &[A],
    sequence2: &[A],
    end: MatrixCoordinate,
    rule: TracebackRule,
) -> Result<Traceback<A>> {
    if sequence1.len() + 1 != trace.columns() || sequence2.len() + 1 != trace.rows() {
        return Err(Error::input(format!(
            "trace matrix is {}x{} but sequences have lengths {} and {}",
            trace.rows(),
            trace.columns(),
            sequence1.len(),
            sequence2.len()
        )));
    }
    if end.row() >= trace.rows() || end.col() >= trace.columns() {
        return Err(Error::input(format!("traceback start {end} lies outside the matrix")));
    }

    let mut row1: Vec<Gapped<A>> = Vec::with_capacity(end.row() + end.col());
    let mut row2: Vec<Gapped<A>> = Vec::with_capacity(end.row() + end.col());
    let (mut row, mut col) = (end.row(), end.col());
    let mut state = WalkState::Current;

    loop {
        let here = MatrixCoordinate::new(row, col);
        let cell = trace.trace_at(here);
        match state {
            WalkState::Current => {
                if row == 0 && col == 0 {
                    break;
                }
                let directions = cell.current;
                if directions.is_none() {
                    if rule.may_stop(here) {
                        break;
                    }
                    return Err(malformed(here, state));
                }
                if directions.contains(TraceDirections::DIAGONAL) && row > 0 && col > 0 {
                    row1.push(Gapped::Symbol(sequence1[col - 1]));
                    row2.push(Gapped::Symbol(sequence2[row - 1]));
                    row -= 1;
                    col -= 1;
                } else if directions.contains(TraceDirections::UP) {
                    state = WalkState::InUp;
                } else if directions.contains(TraceDirections::LEFT) {
                    state = WalkState::InLeft;
                } else {
                    return Err(malformed(here, state));
                }
            }
            WalkState::InUp => {
                if cell.up.is_none() || row == 0 {
                    return Err(malformed(here, state));
                }
                row1.push(Gapped::Gap);
                row2.push(Gapped::Symbol(sequence2[row - 1]));
                row -= 1;
                if cell.up.contains(TraceDirections::UP_OPEN) {
                    state = WalkState::Current;
                }
            }
            WalkState::InLeft => {
                if cell.left.is_none() || col == 0 {
                    return Err(malformed(here, state));
                }
                row1.push(Gapped::Symbol(sequence1[col - 1]));
                row2.push(Gapped::Gap);
                col -= 1;
                if cell.left.contains(TraceDirections::LEFT_OPEN) {
                    state = WalkState::Current;
                }
            }
        }
    }

    row1.reverse();
    row2.reverse();
    if log::log_enabled!(log::Level::Trace) {
        log::trace!(
            "Traceback {} -> {} ({} columns)",
            MatrixCoordinate::new(row, col),
            end,
            row1.len()
        );
    }
    Ok(Traceback {
        alignment: Alignment {
            sequence1: row1,
            sequence2: row2,
        },
        begin: MatrixCoordinate::new(row, col),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Dna4;
    use crate::core::alignment::matrix::FullTraceMatrix;
    use crate::core::alignment::scoring::MatchMismatch;
    use crate::core::alignment::types::TraceCell;

    fn dna(s: &str) -> Vec<Dna4> {
        Dna4::encode(s.as_bytes()).unwrap()
    }

    #[test]
    fn cigar_text_rebuilds_gapped_pair() {
        let alignment = Alignment::from_cigar_str("1I1X5=1I1X", &dna("ACGGTGG"), &dna("GCCGGTGCC")).unwrap();
        assert_eq!(alignment.rows(), ("-ACGGTG-G".to_string(), "GCCGGTGCC".to_string()));
        assert_eq!(alignment.cigar_string(), "1I1X5=1I1X");

        let empty = Alignment::<Dna4>::from_cigar_str("*", &[], &[]).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn cigar_that_does_not_fit_is_rejected() {
        let s1 = dna("ACG");
        let s2 = dna("ACT");
        for text in ["3=", "2=1D", "2=1X1I", "3M", "=3"] {
            let err = Alignment::from_cigar_str(text, &s1, &s2).unwrap_err();
            assert!(matches!(err, Error::Input(_)), "{text}: got {err:?}");
        }
        assert!(Alignment::from_cigar_str("2=1X", &s1, &s2).is_ok());
    }

    // Tests for the walker on hand-built trace matrices

    #[test]
    fn diagonal_walk_to_origin() {
        let s = dna("AC");
        let mut trace = FullTraceMatrix::with_dimensions(2, 2).unwrap();
        for i in 1..=2 {
            trace.set(
                MatrixCoordinate::new(i, i),
                TraceCell {
                    current: TraceDirections::DIAGONAL,
                    ..TraceCell::NONE
                },
            );
        }
        let tb = trace_back(&trace, &s, &s, MatrixCoordinate::new(2, 2), TracebackRule::default()).unwrap();
        assert_eq!(tb.begin, MatrixCoordinate::new(0, 0));
        assert_eq!(tb.alignment.to_string(), "AC\nAC");
        assert_eq!(tb.alignment.cigar_string(), "2=");
    }

    #[test]
    fn gap_state_runs_until_open() {
        // seq1 = "A", seq2 = "AGG": one diagonal then a two-long vertical gap.
        let s1 = dna("A");
        let s2 = dna("AGG");
        let mut trace = FullTraceMatrix::with_dimensions(1, 3).unwrap();
        trace.set(
            MatrixCoordinate::new(1, 1),
            TraceCell {
                current: TraceDirections::DIAGONAL,
                ..TraceCell::NONE
            },
        );
        trace.set(
            MatrixCoordinate::new(2, 1),
            TraceCell {
                current: TraceDirections::UP,
                up: TraceDirections::UP_OPEN,
                left: TraceDirections::NONE,
            },
        );
        trace.set(
            MatrixCoordinate::new(3, 1),
            TraceCell {
                current: TraceDirections::UP,
                up: TraceDirections::UP,
                left: TraceDirections::NONE,
            },
        );
        let tb = trace_back(&trace, &s1, &s2, MatrixCoordinate::new(3, 1), TracebackRule::default()).unwrap();
        assert_eq!(tb.alignment.rows(), ("A--".to_string(), "AGG".to_string()));
        assert_eq!(tb.alignment.cigar_string(), "1=2I");
    }

    #[test]
    fn empty_cell_is_an_error_unless_allowed() {
        let s = dna("AC");
        let trace = FullTraceMatrix::with_dimensions(2, 2).unwrap();
        let err = trace_back(&trace, &s, &s, MatrixCoordinate::new(2, 2), TracebackRule::default());
        assert!(matches!(err, Err(Error::Internal(_))), "got {err:?}");

        let local = TracebackRule {
            local: true,
            ..TracebackRule::default()
        };
        let tb = trace_back(&trace, &s, &s, MatrixCoordinate::new(2, 2), local).unwrap();
        assert!(tb.alignment.is_empty());
        assert_eq!(tb.begin, MatrixCoordinate::new(2, 2));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let trace = FullTraceMatrix::with_dimensions(2, 2).unwrap();
        let err = trace_back(&trace, &dna("ACG"), &dna("AC"), MatrixCoordinate::new(2, 2), TracebackRule::default());
        assert!(matches!(err, Err(Error::Input(_))));
    }

    #[test]
    fn rescore_charges_each_gap_run() {
        let alignment = Alignment {
            sequence1: vec![
                Gapped::Symbol(Dna4::A),
                Gapped::Gap,
                Gapped::Gap,
                Gapped::Symbol(Dna4::C),
            ],
            sequence2: vec![
                Gapped::Symbol(Dna4::A),
                Gapped::Symbol(Dna4::G),
                Gapped::Symbol(Dna4::G),
                Gapped::Symbol(Dna4::T),
            ],
        };
        let scoring = MatchMismatch::new(4, -5);
        assert_eq!(alignment.rescore(&scoring, GapScheme::affine(-2, -8)), 4 - 12 - 5);
        assert_eq!(alignment.rescore(&scoring, GapScheme::linear(-1)), 4 - 2 - 5);
    }
}
