//! Affine-gap cell recurrence and boundary initialisation.

use super::scoring::GapScheme;
use super::types::{AffineCell, Score, TraceCell, TraceDirections};
use crate::defaults::MINUS_INFINITY;

/// Computes one cell from its predecessors.
pub trait CellRecurrence {
    /// Cell `(0, 0)`.
    fn origin(&self) -> (AffineCell, TraceCell);

    /// Cell `(row, 0)` for `row > 0`, given the cell above it.
    fn first_column(&self, above: &AffineCell) -> (AffineCell, TraceCell);

    /// Cell `(0, col)` for `col > 0`, given the cell left of it.
    fn first_row(&self, left: &AffineCell) -> (AffineCell, TraceCell);

    /// Any cell with `row > 0` and `col > 0`.
    fn inner(
        &self,
        diagonal: Score,
        up: &AffineCell,
        left: &AffineCell,
        substitution: Score,
    ) -> (AffineCell, TraceCell);
}

/// Gotoh three-state recurrence. `LOCAL` adds the implicit zero.
#[derive(Debug, Clone, Copy)]
pub struct AffineRecurrence<const LOCAL: bool> {
    extension: Score,
    /// `gap_open + gap`: cost of the first character of a gap run.
    open: Score,
    first_row_free: bool,
    first_column_free: bool,
}

pub type GlobalRecurrence = AffineRecurrence<false>;
pub type LocalRecurrence = AffineRecurrence<true>;

impl<const LOCAL: bool> AffineRecurrence<LOCAL> {
    pub fn new(gap: GapScheme, first_row_free: bool, first_column_free: bool) -> Self {
        Self {
            extension: gap.extension,
            open: gap.open + gap.extension,
            first_row_free: first_row_free && !LOCAL,
            first_column_free: first_column_free && !LOCAL,
        }
    }

    /// Best gap state entering from `from`, and whether it opens a new run.
    #[inline(always)]
    fn gap_from(&self, from_current: Score, from_gap: Score) -> (Score, bool) {
        let open = from_current + self.open;
        let extend = from_gap + self.extension;
        // Unreachable chains must not drift towards overflow.
        if open >= extend {
            (open.max(MINUS_INFINITY), true)
        } else {
            (extend.max(MINUS_INFINITY), false)
        }
    }

    #[inline(always)]
    fn free_boundary() -> (AffineCell, TraceCell) {
        (
            AffineCell {
                current: 0,
                up: MINUS_INFINITY,
                left: MINUS_INFINITY,
            },
            TraceCell::NONE,
        )
    }
}

impl<const LOCAL: bool> CellRecurrence for AffineRecurrence<LOCAL> {
    #[inline(always)]
    fn origin(&self) -> (AffineCell, TraceCell) {
        Self::free_boundary()
    }

    #[inline(always)]
    fn first_column(&self, above: &AffineCell) -> (AffineCell, TraceCell) {
        if LOCAL || self.first_column_free {
            return Self::free_boundary();
        }
        let (up, opened) = self.gap_from(above.current, above.up);
        (
            AffineCell {
                current: up,
                up,
                left: MINUS_INFINITY,
            },
            TraceCell {
                current: TraceDirections::UP,
                up: if opened {
                    TraceDirections::UP_OPEN
                } else {
                    TraceDirections::UP
                },
                left: TraceDirections::NONE,
            },
        )
    }

    #[inline(always)]
    fn first_row(&self, left: &AffineCell) -> (AffineCell, TraceCell) {
        if LOCAL || self.first_row_free {
            return Self::free_boundary();
        }
        let (w_left, opened) = self.gap_from(left.current, left.left);
        (
            AffineCell {
                current: w_left,
                up: MINUS_INFINITY,
                left: w_left,
            },
            TraceCell {
                current: TraceDirections::LEFT,
                up: TraceDirections::NONE,
                left: if opened {
                    TraceDirections::LEFT_OPEN
                } else {
                    TraceDirections::LEFT
                },
            },
        )
    }

    #[inline(always)]
    fn inner(
        &self,
        diagonal: Score,
        up: &AffineCell,
        left: &AffineCell,
        substitution: Score,
    ) -> (AffineCell, TraceCell) {
        let candidate_diagonal = diagonal + substitution;
        let (candidate_up, up_opened) = self.gap_from(up.current, up.up);
        let (candidate_left, left_opened) = self.gap_from(left.current, left.left);

        let mut best = candidate_diagonal.max(candidate_up).max(candidate_left);
        if LOCAL {
            best = best.max(0);
        }

        let mut current = TraceDirections::NONE;
        if candidate_diagonal == best {
            current |= TraceDirections::DIAGONAL;
        }
        if candidate_up == best {
            current |= TraceDirections::UP;
        }
        if candidate_left == best {
            current |= TraceDirections::LEFT;
        }

        (
            AffineCell {
                current: best.max(MINUS_INFINITY),
                up: candidate_up,
                left: candidate_left,
            },
            TraceCell {
                current,
                up: if up_opened {
                    TraceDirections::UP_OPEN
                } else {
                    TraceDirections::UP
                },
                left: if left_opened {
                    TraceDirections::LEFT_OPEN
                } else {
                    TraceDirections::LEFT
                },
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_column_accumulates_affine_gap() {
        let rec = GlobalRecurrence::new(GapScheme::affine(-1, -10), false, false);
        let (origin, trace) = rec.origin();
        assert_eq!(origin.current, 0);
        assert!(trace.current.is_none());

        let (c1, t1) = rec.first_column(&origin);
        assert_eq!(c1.current, -11);
        assert_eq!(t1.up, TraceDirections::UP_OPEN);
        let (c2, t2) = rec.first_column(&c1);
        assert_eq!(c2.current, -12);
        assert_eq!(t2.up, TraceDirections::UP);
        assert_eq!(t2.current, TraceDirections::UP);
    }

    #[test]
    fn free_leading_gaps_zero_the_boundary() {
        let rec = GlobalRecurrence::new(GapScheme::linear(-1), true, false);
        let (origin, _) = rec.origin();
        let (cell, trace) = rec.first_row(&origin);
        assert_eq!(cell.current, 0);
        assert!(trace.current.is_none(), "free boundary cells end the traceback");
        let (cell, _) = rec.first_column(&origin);
        assert_eq!(cell.current, -1);
    }

    #[test]
    fn inner_cell_records_ties() {
        let rec = GlobalRecurrence::new(GapScheme::linear(-1), false, false);
        let up = AffineCell {
            current: 0,
            up: MINUS_INFINITY,
            left: MINUS_INFINITY,
        };
        let left = up;
        let (cell, trace) = rec.inner(1, &up, &left, -2);
        assert_eq!(cell.current, -1);
        assert_eq!(
            trace.current,
            TraceDirections::DIAGONAL | TraceDirections::UP | TraceDirections::LEFT
        );
        assert_eq!(trace.up, TraceDirections::UP_OPEN);
    }

    #[test]
    fn local_cell_floors_at_zero() {
        let rec = LocalRecurrence::new(GapScheme::affine(-1, -5), true, true);
        let (_, t) = rec.first_row(&AffineCell::UNREACHABLE);
        assert!(t.current.is_none());
        let zero = AffineCell {
            current: 0,
            up: MINUS_INFINITY,
            left: MINUS_INFINITY,
        };
        let (cell, trace) = rec.inner(0, &zero, &zero, -3);
        assert_eq!(cell.current, 0);
        assert!(trace.current.is_none(), "only the implicit zero won");
    }
}
