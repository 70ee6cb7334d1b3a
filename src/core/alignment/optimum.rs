//! Optimum tracking over the swept matrix.

use super::types::{AlignmentOptimum, MatrixCoordinate, Score};

/// Decides which cells may hold the reported optimum.
///
/// `every_cell` (local alignment) overrides the other two flags. Last-row
/// cells are checked as the sweep produces them. Last-column cells are
/// buffered and checked once the column is complete, so the bottom cell seen
/// by the last-row check keeps ties. With no flag set only the bottom-right
/// cell is considered. Replacement needs a strictly greater score.
#[derive(Debug, Clone)]
pub struct OptimumTracker {
    every_cell: bool,
    last_row: bool,
    last_column: bool,
    final_row: usize,
    final_column: usize,
    pending_column: Vec<(Score, MatrixCoordinate)>,
    optimum: AlignmentOptimum,
}

impl OptimumTracker {
    pub fn new(every_cell: bool, last_row: bool, last_column: bool) -> Self {
        Self {
            every_cell,
            last_row: last_row && !every_cell,
            last_column: last_column && !every_cell,
            final_row: 0,
            final_column: 0,
            pending_column: Vec::new(),
            optimum: AlignmentOptimum::default(),
        }
    }

    /// Prepare for a matrix with the given dimensions.
    pub fn reset(&mut self, rows: usize, columns: usize) {
        self.final_row = rows.saturating_sub(1);
        self.final_column = columns.saturating_sub(1);
        self.pending_column.clear();
        self.optimum = AlignmentOptimum::default();
    }

    /// Called for each cell as the sweep produces it.
    #[inline(always)]
    pub fn track_cell(&mut self, score: Score, coordinate: MatrixCoordinate) {
        if self.every_cell {
            self.optimum.update(score, coordinate);
            return;
        }
        let in_last_row = coordinate.row() == self.final_row;
        let in_last_column = coordinate.col() == self.final_column;
        if self.last_row && in_last_row {
            self.optimum.update(score, coordinate);
        }
        if self.last_column && in_last_column {
            self.pending_column.push((score, coordinate));
        }
        if !self.last_row && !self.last_column && in_last_row && in_last_column {
            self.optimum.update(score, coordinate);
        }
    }

    /// Called after every column has been swept.
    pub fn finish_column(&mut self, col: usize) {
        if col != self.final_column {
            return;
        }
        for (score, coordinate) in self.pending_column.drain(..) {
            self.optimum.update(score, coordinate);
        }
    }

    pub fn optimum(&self) -> AlignmentOptimum {
        self.optimum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(every: bool, row: bool, col: bool, rows: usize, cols: usize) -> OptimumTracker {
        let mut t = OptimumTracker::new(every, row, col);
        t.reset(rows, cols);
        t
    }

    #[test]
    fn final_cell_only_by_default() {
        let mut t = tracker(false, false, false, 3, 4);
        t.track_cell(10, MatrixCoordinate::new(1, 1));
        t.track_cell(-2, MatrixCoordinate::new(2, 3));
        t.finish_column(3);
        assert_eq!(t.optimum().score, -2);
        assert_eq!(t.optimum().coordinate, MatrixCoordinate::new(2, 3));
    }

    #[test]
    fn last_row_scan_keeps_first_maximum() {
        let mut t = tracker(false, true, false, 3, 4);
        for col in 0..4 {
            t.track_cell(5, MatrixCoordinate::new(2, col));
            t.finish_column(col);
        }
        t.track_cell(9, MatrixCoordinate::new(1, 3));
        assert_eq!(t.optimum().coordinate, MatrixCoordinate::new(2, 0));
        assert_eq!(t.optimum().score, 5);
    }

    #[test]
    fn bottom_cell_wins_ties_against_last_column() {
        let mut t = tracker(false, true, true, 3, 2);
        for row in 0..3 {
            t.track_cell(1, MatrixCoordinate::new(row, 1));
        }
        t.finish_column(1);
        assert_eq!(t.optimum().coordinate, MatrixCoordinate::new(2, 1));

        let mut t = tracker(false, false, true, 3, 2);
        for row in 0..3 {
            t.track_cell(1, MatrixCoordinate::new(row, 1));
        }
        t.finish_column(1);
        assert_eq!(t.optimum().coordinate, MatrixCoordinate::new(0, 1));
    }

    #[test]
    fn every_cell_overrides_other_flags() {
        let mut t = tracker(true, true, true, 3, 3);
        t.track_cell(0, MatrixCoordinate::new(0, 0));
        t.track_cell(4, MatrixCoordinate::new(1, 1));
        t.track_cell(4, MatrixCoordinate::new(2, 2));
        assert_eq!(t.optimum().coordinate, MatrixCoordinate::new(1, 1));
    }
}
