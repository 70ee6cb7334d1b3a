//! Alignment matrix storage.
//!
//! Scores live either in a single column (`SingleColumnScores`, O(rows)
//! memory, overwritten in place) or in a full matrix (`FullScoreMatrix`).
//! Trace directions are kept separately in a `TraceStore`; traceback reads
//! them back through `TraceSource`. With a band every store holds only the
//! in-band window of each column.

use std::ops::Range;

use super::types::{AffineCell, Band, MatrixCoordinate, Score, TraceCell};
use crate::defaults::MINUS_INFINITY;
use crate::error::{Error, Result};

/// Geometry of one alignment matrix: `(len2 + 1) x (len1 + 1)`, optionally banded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixLayout {
    rows: usize,
    columns: usize,
    band: Option<Band>,
    /// Cells stored per column.
    height: usize,
    /// Added to `row - col` to get the slot inside a banded column.
    slot_shift: isize,
    banded_storage: bool,
}

impl MatrixLayout {
    pub fn new(sequence1_len: usize, sequence2_len: usize, band: Option<Band>) -> Self {
        let rows = sequence2_len + 1;
        let columns = sequence1_len + 1;
        let band = band.map(|b| b.clipped(rows, columns));
        let mut layout = Self {
            rows,
            columns,
            band,
            height: rows,
            slot_shift: 0,
            banded_storage: false,
        };
        if let Some(b) = band {
            // Tighten to diagonals that hold cells.
            let lower = b.lower_diagonal.max(-(rows as isize - 1));
            let upper = b.upper_diagonal.min(columns as isize - 1);
            if upper >= lower {
                let width = (upper - lower + 1) as usize;
                if width < rows {
                    layout.height = width;
                    layout.slot_shift = upper;
                    layout.banded_storage = true;
                }
            } else {
                layout.height = 0;
                layout.banded_storage = true;
            }
        }
        layout
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn band(&self) -> Option<Band> {
        self.band
    }

    /// Rows of `col` that are materialised, ascending.
    #[inline(always)]
    pub fn rows_in_column(&self, col: usize) -> Range<usize> {
        match self.band {
            Some(band) => band.rows_in_column(col, self.rows),
            None => 0..self.rows,
        }
    }

    #[inline(always)]
    pub fn contains(&self, coordinate: MatrixCoordinate) -> bool {
        coordinate.row() < self.rows
            && coordinate.col() < self.columns
            && self.band.map_or(true, |b| b.contains(coordinate))
    }

    /// False when the band misses the matrix entirely.
    pub fn intersects(&self) -> bool {
        (0..self.columns).any(|c| !self.rows_in_column(c).is_empty())
    }

    /// Number of cells a full store allocates.
    pub fn cell_count(&self) -> Option<usize> {
        self.columns.checked_mul(self.height)
    }

    #[inline(always)]
    fn slot(&self, coordinate: MatrixCoordinate) -> Option<usize> {
        if !self.contains(coordinate) {
            return None;
        }
        let within = if self.banded_storage {
            (coordinate.row() as isize + self.slot_shift - coordinate.col() as isize) as usize
        } else {
            coordinate.row()
        };
        Some(coordinate.col() * self.height + within)
    }
}

fn allocate<T: Clone>(buffer: &mut Vec<T>, cells: Option<usize>, fill: T) -> Result<()> {
    let cells = cells.ok_or(Error::Resource { cells: usize::MAX })?;
    buffer.clear();
    buffer
        .try_reserve_exact(cells)
        .map_err(|_| Error::Resource { cells })?;
    buffer.resize(cells, fill);
    Ok(())
}

/// Score storage driven column by column, rows ascending.
///
/// For each column the driver calls `begin_column` once, then for every
/// materialised row `predecessors` followed by `commit`.
pub trait ScoreMatrix {
    fn reset(&mut self, layout: &MatrixLayout) -> Result<()>;

    fn begin_column(&mut self, col: usize);

    /// `(diagonal.current, left)` for `row` of the current column.
    fn predecessors(&self, row: usize) -> (Score, AffineCell);

    fn commit(&mut self, row: usize, cell: AffineCell);
}

/// One column of cells plus the diagonal cache.
///
/// Writing row `r` destroys the previous column's value at `r`, which row
/// `r + 1` still needs as its diagonal; it is saved in `diagonal` first.
#[derive(Debug, Default)]
pub struct SingleColumnScores {
    column: Vec<AffineCell>,
    layout: Option<MatrixLayout>,
    previous_rows: Range<usize>,
    current_rows: Range<usize>,
    diagonal: Score,
}

impl SingleColumnScores {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreMatrix for SingleColumnScores {
    fn reset(&mut self, layout: &MatrixLayout) -> Result<()> {
        allocate(&mut self.column, Some(layout.rows()), AffineCell::UNREACHABLE)?;
        self.layout = Some(*layout);
        self.previous_rows = 0..0;
        self.current_rows = 0..0;
        self.diagonal = MINUS_INFINITY;
        Ok(())
    }

    fn begin_column(&mut self, col: usize) {
        let Some(layout) = self.layout else {
            return;
        };
        self.previous_rows = std::mem::replace(&mut self.current_rows, layout.rows_in_column(col));
        let first = self.current_rows.start;
        self.diagonal = if first > 0 && self.previous_rows.contains(&(first - 1)) {
            self.column[first - 1].current
        } else {
            MINUS_INFINITY
        };
    }

    #[inline(always)]
    fn predecessors(&self, row: usize) -> (Score, AffineCell) {
        let left = if self.previous_rows.contains(&row) {
            self.column[row]
        } else {
            AffineCell::UNREACHABLE
        };
        (self.diagonal, left)
    }

    #[inline(always)]
    fn commit(&mut self, row: usize, cell: AffineCell) {
        self.diagonal = if self.previous_rows.contains(&row) {
            self.column[row].current
        } else {
            MINUS_INFINITY
        };
        self.column[row] = cell;
    }
}

/// Every cell retained; random access after the sweep.
#[derive(Debug, Default)]
pub struct FullScoreMatrix {
    cells: Vec<AffineCell>,
    layout: Option<MatrixLayout>,
    col: usize,
}

impl FullScoreMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored cell, or `UNREACHABLE` outside the band / matrix.
    pub fn at(&self, coordinate: MatrixCoordinate) -> AffineCell {
        self.layout
            .and_then(|l| l.slot(coordinate))
            .map_or(AffineCell::UNREACHABLE, |i| self.cells[i])
    }
}

impl ScoreMatrix for FullScoreMatrix {
    fn reset(&mut self, layout: &MatrixLayout) -> Result<()> {
        allocate(&mut self.cells, layout.cell_count(), AffineCell::UNREACHABLE)?;
        self.layout = Some(*layout);
        self.col = 0;
        Ok(())
    }

    fn begin_column(&mut self, col: usize) {
        self.col = col;
    }

    #[inline(always)]
    fn predecessors(&self, row: usize) -> (Score, AffineCell) {
        if self.col == 0 {
            return (MINUS_INFINITY, AffineCell::UNREACHABLE);
        }
        let left = self.at(MatrixCoordinate::new(row, self.col - 1));
        let diagonal = if row > 0 {
            self.at(MatrixCoordinate::new(row - 1, self.col - 1)).current
        } else {
            MINUS_INFINITY
        };
        (diagonal, left)
    }

    #[inline(always)]
    fn commit(&mut self, row: usize, cell: AffineCell) {
        if let Some(i) = self.layout.and_then(|l| l.slot(MatrixCoordinate::new(row, self.col))) {
            self.cells[i] = cell;
        }
    }
}

/// Sink for per-cell trace directions during the sweep.
pub trait TraceStore {
    fn reset(&mut self, layout: &MatrixLayout) -> Result<()>;

    fn record(&mut self, coordinate: MatrixCoordinate, trace: TraceCell);
}

/// Score-only computation: traces are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTrace;

impl TraceStore for NoTrace {
    fn reset(&mut self, _layout: &MatrixLayout) -> Result<()> {
        Ok(())
    }

    #[inline(always)]
    fn record(&mut self, _coordinate: MatrixCoordinate, _trace: TraceCell) {}
}

/// Read access to trace directions for traceback.
pub trait TraceSource {
    fn rows(&self) -> usize;

    fn columns(&self) -> usize;

    /// Directions at `coordinate`; `TraceCell::NONE` for cells never computed.
    fn trace_at(&self, coordinate: MatrixCoordinate) -> TraceCell;
}

/// Trace directions for every (in-band) cell.
#[derive(Debug, Default, Clone)]
pub struct FullTraceMatrix {
    cells: Vec<TraceCell>,
    layout: Option<MatrixLayout>,
}

impl FullTraceMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unbanded, all-`NONE` matrix for sequences of the given lengths.
    pub fn with_dimensions(sequence1_len: usize, sequence2_len: usize) -> Result<Self> {
        let mut matrix = Self::new();
        matrix.reset(&MatrixLayout::new(sequence1_len, sequence2_len, None))?;
        Ok(matrix)
    }

    pub fn set(&mut self, coordinate: MatrixCoordinate, trace: TraceCell) {
        self.record(coordinate, trace);
    }
}

impl TraceStore for FullTraceMatrix {
    fn reset(&mut self, layout: &MatrixLayout) -> Result<()> {
        allocate(&mut self.cells, layout.cell_count(), TraceCell::NONE)?;
        self.layout = Some(*layout);
        Ok(())
    }

    #[inline(always)]
    fn record(&mut self, coordinate: MatrixCoordinate, trace: TraceCell) {
        if let Some(i) = self.layout.and_then(|l| l.slot(coordinate)) {
            self.cells[i] = trace;
        }
    }
}

impl TraceSource for FullTraceMatrix {
    fn rows(&self) -> usize {
        self.layout.map_or(0, |l| l.rows())
    }

    fn columns(&self) -> usize {
        self.layout.map_or(0, |l| l.columns())
    }

    fn trace_at(&self, coordinate: MatrixCoordinate) -> TraceCell {
        self.layout
            .and_then(|l| l.slot(coordinate))
            .map_or(TraceCell::NONE, |i| self.cells[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alignment::types::TraceDirections;

    fn cell(score: Score) -> AffineCell {
        AffineCell {
            current: score,
            up: score,
            left: score,
        }
    }

    #[test]
    fn banded_layout_stores_only_the_window() {
        let layout = MatrixLayout::new(10, 10, Some(Band::new(-2, 1)));
        assert_eq!(layout.cell_count(), Some(11 * 4));
        assert!(layout.contains(MatrixCoordinate::new(5, 4)));
        assert!(!layout.contains(MatrixCoordinate::new(5, 8)));
        assert!(layout.intersects());
    }

    #[test]
    fn unbounded_band_covers_the_whole_matrix() {
        let layout = MatrixLayout::new(6, 5, Some(Band::new(isize::MIN, isize::MAX)));
        assert_eq!(layout.cell_count(), Some(7 * 6));
        assert_eq!(layout.rows_in_column(0), 0..6);
        assert_eq!(layout.rows_in_column(6), 0..6);
        assert!(layout.contains(MatrixCoordinate::new(5, 0)));
        assert!(layout.contains(MatrixCoordinate::new(0, 6)));
    }

    #[test]
    fn band_outside_matrix_does_not_intersect() {
        let layout = MatrixLayout::new(3, 3, Some(Band::new(5, 9)));
        assert!(!layout.intersects());
        assert_eq!(layout.cell_count(), Some(0));
    }

    #[test]
    fn single_column_keeps_diagonal_before_overwrite() {
        let layout = MatrixLayout::new(2, 2, None);
        let mut scores = SingleColumnScores::new();
        scores.reset(&layout).unwrap();

        scores.begin_column(0);
        for row in 0..3 {
            scores.commit(row, cell(row as Score * 10));
        }

        scores.begin_column(1);
        let (diag, left) = scores.predecessors(0);
        assert_eq!(diag, MINUS_INFINITY);
        assert_eq!(left.current, 0);
        scores.commit(0, cell(100));

        let (diag, left) = scores.predecessors(1);
        assert_eq!(diag, 0, "diagonal of row 1 is the old row 0 value");
        assert_eq!(left.current, 10);
        scores.commit(1, cell(101));

        let (diag, _) = scores.predecessors(2);
        assert_eq!(diag, 10);
    }

    #[test]
    fn full_matrix_reads_previous_column() {
        let layout = MatrixLayout::new(1, 1, None);
        let mut scores = FullScoreMatrix::new();
        scores.reset(&layout).unwrap();
        scores.begin_column(0);
        scores.commit(0, cell(0));
        scores.commit(1, cell(-1));
        scores.begin_column(1);
        assert_eq!(scores.predecessors(1), (0, cell(-1)));
        assert_eq!(scores.at(MatrixCoordinate::new(1, 0)).current, -1);
    }

    #[test]
    fn trace_matrix_outside_band_is_none() {
        let layout = MatrixLayout::new(4, 4, Some(Band::new(0, 0)));
        let mut trace = FullTraceMatrix::new();
        trace.reset(&layout).unwrap();
        let t = TraceCell {
            current: TraceDirections::DIAGONAL,
            ..TraceCell::NONE
        };
        trace.record(MatrixCoordinate::new(2, 2), t);
        trace.record(MatrixCoordinate::new(1, 2), t);
        assert_eq!(trace.trace_at(MatrixCoordinate::new(2, 2)), t);
        assert_eq!(trace.trace_at(MatrixCoordinate::new(1, 2)), TraceCell::NONE);
    }
}
