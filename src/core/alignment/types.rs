//! Shared value types for the dynamic-programming kernels.

use std::fmt;
use std::ops::{BitOr, BitOrAssign, Range};

use crate::defaults::MINUS_INFINITY;

pub type Score = i32;

/// Row of the alignment matrix (indexes sequence 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RowIndex(pub usize);

/// Column of the alignment matrix (indexes sequence 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ColumnIndex(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MatrixCoordinate {
    pub row: RowIndex,
    pub col: ColumnIndex,
}

impl MatrixCoordinate {
    pub const fn new(row: usize, col: usize) -> Self {
        Self {
            row: RowIndex(row),
            col: ColumnIndex(col),
        }
    }

    #[inline(always)]
    pub const fn row(&self) -> usize {
        self.row.0
    }

    #[inline(always)]
    pub const fn col(&self) -> usize {
        self.col.0
    }

    /// Diagonal index `col - row`, the quantity a band constrains.
    #[inline(always)]
    pub fn diagonal(&self) -> isize {
        self.col.0 as isize - self.row.0 as isize
    }

    /// Apply a signed offset; `None` if the result leaves the non-negative quadrant.
    pub fn offset_by(&self, offset: MatrixOffset) -> Option<Self> {
        let row = self.row.0.checked_add_signed(offset.row)?;
        let col = self.col.0.checked_add_signed(offset.col)?;
        Some(Self::new(row, col))
    }
}

impl fmt::Display for MatrixCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(row={}, col={})", self.row.0, self.col.0)
    }
}

/// Signed delta between two coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatrixOffset {
    pub row: isize,
    pub col: isize,
}

pub const DIAGONAL_STEP: MatrixOffset = MatrixOffset { row: -1, col: -1 };
pub const UP_STEP: MatrixOffset = MatrixOffset { row: -1, col: 0 };
pub const LEFT_STEP: MatrixOffset = MatrixOffset { row: 0, col: -1 };

/// Diagonal corridor `lower_diagonal <= col - row <= upper_diagonal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub lower_diagonal: isize,
    pub upper_diagonal: isize,
}

impl Band {
    pub const fn new(lower_diagonal: isize, upper_diagonal: isize) -> Self {
        Self {
            lower_diagonal,
            upper_diagonal,
        }
    }

    /// Number of diagonals in the band, saturating at `usize::MAX`.
    pub const fn width(&self) -> usize {
        if self.upper_diagonal < self.lower_diagonal {
            return 0;
        }
        self.upper_diagonal.abs_diff(self.lower_diagonal).saturating_add(1)
    }

    /// The band restricted to diagonals `[-rows, columns]` of a `rows x columns`
    /// matrix. Membership of every matrix cell is unchanged.
    pub fn clipped(&self, rows: usize, columns: usize) -> Self {
        let floor = -(rows as isize);
        let ceiling = columns as isize;
        Self {
            lower_diagonal: self.lower_diagonal.clamp(floor, ceiling),
            upper_diagonal: self.upper_diagonal.clamp(floor, ceiling),
        }
    }

    #[inline(always)]
    pub fn contains(&self, coordinate: MatrixCoordinate) -> bool {
        let d = coordinate.diagonal();
        self.lower_diagonal <= d && d <= self.upper_diagonal
    }

    /// Rows of column `col` inside the band, clipped to `[0, rows)`.
    pub fn rows_in_column(&self, col: usize, rows: usize) -> Range<usize> {
        let col = col as isize;
        let first = col.saturating_sub(self.upper_diagonal).max(0);
        let last = col.saturating_sub(self.lower_diagonal).min(rows as isize - 1);
        if last < first {
            return 0..0;
        }
        first as usize..last as usize + 1
    }
}

/// Set of predecessor directions that produced a cell's score.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TraceDirections(u8);

impl TraceDirections {
    pub const NONE: Self = Self(0);
    pub const DIAGONAL: Self = Self(1);
    pub const UP_OPEN: Self = Self(2);
    pub const UP: Self = Self(4);
    pub const LEFT_OPEN: Self = Self(8);
    pub const LEFT: Self = Self(16);

    #[inline(always)]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    #[inline(always)]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for TraceDirections {
    type Output = Self;

    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TraceDirections {
    #[inline(always)]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for TraceDirections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("NONE");
        }
        let names = [
            (Self::DIAGONAL, "DIAGONAL"),
            (Self::UP_OPEN, "UP_OPEN"),
            (Self::UP, "UP"),
            (Self::LEFT_OPEN, "LEFT_OPEN"),
            (Self::LEFT, "LEFT"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Score view of one matrix cell (three-state affine recurrence).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffineCell {
    /// Best score of any alignment ending here.
    pub current: Score,
    /// Best score ending in a vertical gap (sequence 2 symbol against a gap).
    pub up: Score,
    /// Best score ending in a horizontal gap (sequence 1 symbol against a gap).
    pub left: Score,
}

impl AffineCell {
    pub const UNREACHABLE: Self = Self {
        current: MINUS_INFINITY,
        up: MINUS_INFINITY,
        left: MINUS_INFINITY,
    };
}

impl Default for AffineCell {
    fn default() -> Self {
        Self::UNREACHABLE
    }
}

/// Trace view of one matrix cell.
///
/// `current` is a subset of `DIAGONAL | UP | LEFT`; `up` is `UP_OPEN` or `UP`
/// and says whether the vertical gap ending here was opened or extended;
/// `left` likewise with `LEFT_OPEN` / `LEFT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceCell {
    pub current: TraceDirections,
    pub up: TraceDirections,
    pub left: TraceDirections,
}

impl TraceCell {
    pub const NONE: Self = Self {
        current: TraceDirections::NONE,
        up: TraceDirections::NONE,
        left: TraceDirections::NONE,
    };
}

/// Running optimum, replaced only by a strictly greater score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentOptimum {
    pub score: Score,
    pub coordinate: MatrixCoordinate,
}

impl Default for AlignmentOptimum {
    fn default() -> Self {
        Self {
            score: MINUS_INFINITY,
            coordinate: MatrixCoordinate::default(),
        }
    }
}

impl AlignmentOptimum {
    #[inline(always)]
    pub fn update(&mut self, score: Score, coordinate: MatrixCoordinate) {
        if score > self.score {
            self.score = score;
            self.coordinate = coordinate;
        }
    }

    /// Whether some cell with a finite score was recorded.
    pub fn is_reachable(&self) -> bool {
        is_reachable(self.score)
    }
}

#[inline(always)]
pub fn is_reachable(score: Score) -> bool {
    score > MINUS_INFINITY / 2
}

/// Begin or end position of an alignment in both sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlignmentPositions {
    pub sequence1: usize,
    pub sequence2: usize,
}

impl From<MatrixCoordinate> for AlignmentPositions {
    fn from(c: MatrixCoordinate) -> Self {
        Self {
            sequence1: c.col(),
            sequence2: c.row(),
        }
    }
}
