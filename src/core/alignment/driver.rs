//! Pairwise alignment driver.
//!
//! `PairwiseAligner::bind` validates an `AlignmentConfig` and picks one of
//! three engines:
//! - the bit-parallel edit distance, when the configuration is a unit-cost
//!   edit distance (global, or semi-global over sequence 1) without a band;
//! - the lane-batched sweep, when vectorised score output is requested;
//! - the general affine sweep otherwise.
//!
//! The general sweep is monomorphised over the recurrence (global or local),
//! the score storage and the trace store, so the inner cell loop carries no
//! dynamic dispatch.

use std::marker::PhantomData;

use rayon::prelude::*;

use super::batch::{BatchAligner, LANES};
use super::config::{AlignmentConfig, FreeEndGaps, MatrixStorage, Method};
use super::edit_distance::MyersEditDistance;
use super::matrix::{MatrixLayout, NoTrace, ScoreMatrix, TraceStore};
use super::optimum::OptimumTracker;
use super::recurrence::{CellRecurrence, GlobalRecurrence, LocalRecurrence};
use super::scoring::ScoringScheme;
use super::traceback::{trace_back, Alignment, Traceback, TracebackRule};
use super::types::{AffineCell, AlignmentOptimum, AlignmentPositions, MatrixCoordinate, Score};
use super::workspace::{with_workspace, AlignmentWorkspace};
use crate::alphabet::Alphabet;
use crate::error::{Error, Result};

/// Fields of one computed pair; which are `Some` is fixed by the output configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentResult<A> {
    pub sequence1_id: usize,
    pub sequence2_id: usize,
    /// `None` when no alignment exists (band misses the required cells, or
    /// the error bound is exceeded).
    pub score: Option<Score>,
    /// Symbols of each sequence consumed up to the end of the alignment.
    pub end_positions: Option<AlignmentPositions>,
    /// Symbols of each sequence skipped before the alignment starts.
    pub begin_positions: Option<AlignmentPositions>,
    pub alignment: Option<Alignment<A>>,
}

impl<A> AlignmentResult<A> {
    fn empty(id: usize) -> Self {
        Self {
            sequence1_id: id,
            sequence2_id: id,
            score: None,
            end_positions: None,
            begin_positions: None,
            alignment: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Dynamic,
    EditDistance(MyersEditDistance),
    Batch,
}

/// A bound, validated alignment configuration.
#[derive(Debug, Clone)]
pub struct PairwiseAligner<A, S> {
    config: AlignmentConfig<S>,
    engine: Engine,
    _alphabet: PhantomData<fn() -> A>,
}

impl<A: Alphabet, S: ScoringScheme<A>> PairwiseAligner<A, S> {
    /// Validate `config` and fix the engine.
    ///
    /// # Errors
    /// `Error::Configuration` for a band with `lower > upper`, positive gap
    /// scores, begin/alignment output without trace capture, `max_errors`
    /// outside unit-cost global/semi-global edit distance, or vectorised
    /// computation combined with traceback output, a band, an error bound or
    /// free end gaps.
    pub fn bind(config: AlignmentConfig<S>) -> Result<Self> {
        if let Some(band) = config.band {
            if band.lower_diagonal > band.upper_diagonal {
                return Err(Error::config(format!(
                    "band lower diagonal {} exceeds upper diagonal {}",
                    band.lower_diagonal, band.upper_diagonal
                )));
            }
        }
        if config.gap.extension > 0 || config.gap.open > 0 {
            return Err(Error::config(format!(
                "gap scores must not be positive (gap {}, open {})",
                config.gap.extension, config.gap.open
            )));
        }
        if config.output.needs_trace() && config.storage == MatrixStorage::ScoreOnly {
            return Err(Error::config(
                "begin position and alignment output need trace capture, which score-only storage disables",
            ));
        }

        let edit_distance = Self::edit_distance_engine(&config);
        if config.max_errors.is_some() && edit_distance.is_none() {
            return Err(Error::config(
                "max_errors requires unit-cost global or semi-global edit distance without a band",
            ));
        }

        let engine = if config.vectorised {
            if config.output.needs_trace() {
                return Err(Error::config("vectorised alignment computes scores and end positions only"));
            }
            if config.band.is_some() || config.max_errors.is_some() || config.method.free_end_gaps().any() {
                return Err(Error::config(
                    "vectorised alignment supports unbanded global (no free end gaps) or local alignment",
                ));
            }
            Engine::Batch
        } else {
            match edit_distance {
                Some(myers) => Engine::EditDistance(myers.with_max_errors(config.max_errors)),
                None => Engine::Dynamic,
            }
        };

        log::debug!(
            "Bound pairwise aligner: engine={:?}, method={:?}, output={:?}, storage={:?}, band={:?}",
            engine,
            config.method,
            config.output,
            config.storage,
            config.band
        );

        Ok(Self {
            config,
            engine,
            _alphabet: PhantomData,
        })
    }

    fn edit_distance_engine(config: &AlignmentConfig<S>) -> Option<MyersEditDistance> {
        let unit_gaps = config.gap.extension == -1 && config.gap.open == 0;
        if !unit_gaps || config.band.is_some() || !config.scoring.is_edit_distance() {
            return None;
        }
        match config.method {
            Method::Global(free) if free == FreeEndGaps::NONE => Some(MyersEditDistance::global()),
            Method::Global(free) if free.is_semi_global() => Some(MyersEditDistance::semi_global()),
            _ => None,
        }
    }

    pub fn config(&self) -> &AlignmentConfig<S> {
        &self.config
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// Align one pair; both ids are 0.
    pub fn align_pair(&self, sequence1: &[A], sequence2: &[A]) -> Result<AlignmentResult<A>> {
        match self.engine {
            Engine::Batch => {
                let mut batch = self.batch_aligner();
                let optimum = batch.align(&[(sequence1, sequence2)]);
                Ok(self.package(0, optimum[0], None))
            }
            _ => self.align_indexed(0, sequence1, sequence2),
        }
    }

    /// Align every pair in order, invoking `callback` once per pair.
    ///
    /// Stops at the first pair that fails; earlier callbacks have run.
    pub fn align_pairs<P, Q, F>(&self, pairs: &[(P, Q)], mut callback: F) -> Result<()>
    where
        P: AsRef<[A]>,
        Q: AsRef<[A]>,
        F: FnMut(AlignmentResult<A>),
    {
        if self.engine == Engine::Batch {
            let mut batch = self.batch_aligner();
            for (chunk_index, chunk) in pairs.chunks(LANES).enumerate() {
                for (lane, optimum) in batch.align(chunk).into_iter().enumerate() {
                    callback(self.package(chunk_index * LANES + lane, optimum, None));
                }
            }
            return Ok(());
        }
        for (id, (s1, s2)) in pairs.iter().enumerate() {
            callback(self.align_indexed(id, s1.as_ref(), s2.as_ref())?);
        }
        Ok(())
    }

    /// Like [`align_pairs`](Self::align_pairs), computing pairs on rayon
    /// workers. Callbacks still run in input order on the calling thread.
    pub fn align_pairs_parallel<P, Q, F>(&self, pairs: &[(P, Q)], callback: F) -> Result<()>
    where
        P: AsRef<[A]> + Sync,
        Q: AsRef<[A]> + Sync,
        F: FnMut(AlignmentResult<A>),
    {
        let compute = || -> Result<Vec<AlignmentResult<A>>> {
            if self.engine == Engine::Batch {
                let chunks: Vec<Vec<AlignmentResult<A>>> = pairs
                    .par_chunks(LANES)
                    .enumerate()
                    .map_init(
                        || self.batch_aligner(),
                        |batch, (chunk_index, chunk)| {
                            batch
                                .align(chunk)
                                .into_iter()
                                .enumerate()
                                .map(|(lane, optimum)| self.package(chunk_index * LANES + lane, optimum, None))
                                .collect()
                        },
                    )
                    .collect();
                return Ok(chunks.into_iter().flatten().collect());
            }
            pairs
                .par_iter()
                .enumerate()
                .map(|(id, (s1, s2))| self.align_indexed(id, s1.as_ref(), s2.as_ref()))
                .collect()
        };

        let results = match self.config.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| Error::config(format!("cannot build a {threads}-thread pool: {e}")))?;
                log::debug!("Aligning {} pairs on {} threads", pairs.len(), threads);
                pool.install(compute)?
            }
            None => compute()?,
        };
        results.into_iter().for_each(callback);
        Ok(())
    }

    fn batch_aligner(&self) -> BatchAligner<S> {
        BatchAligner::new(self.config.scoring.clone(), self.config.gap, self.config.method.is_local())
    }

    fn traceback_rule(&self) -> TracebackRule {
        let free = self.config.method.free_end_gaps();
        TracebackRule {
            local: self.config.method.is_local(),
            first_row_free: free.sequence1_leading,
            first_column_free: free.sequence2_leading,
        }
    }

    fn align_indexed(&self, id: usize, sequence1: &[A], sequence2: &[A]) -> Result<AlignmentResult<A>> {
        match self.engine {
            Engine::EditDistance(myers) => self.align_edit_distance(id, myers, sequence1, sequence2),
            _ => with_workspace(|ws| self.align_dynamic(ws, id, sequence1, sequence2)),
        }
    }

    fn align_edit_distance(
        &self,
        id: usize,
        myers: MyersEditDistance,
        sequence1: &[A],
        sequence2: &[A],
    ) -> Result<AlignmentResult<A>> {
        let outcome = if self.config.output.needs_trace() {
            myers.distance_with_trace(sequence1, sequence2)?
        } else {
            myers.distance(sequence1, sequence2)?
        };
        let Some(distance) = outcome.distance else {
            return Ok(AlignmentResult::empty(id));
        };
        let optimum = AlignmentOptimum {
            score: -(distance as Score),
            coordinate: MatrixCoordinate::new(sequence2.len(), outcome.end_column),
        };
        let traceback = match &outcome.trace {
            Some(trace) => Some(trace_back(
                trace,
                sequence1,
                sequence2,
                optimum.coordinate,
                self.traceback_rule(),
            )?),
            None => None,
        };
        Ok(self.package(id, optimum, traceback))
    }

    fn align_dynamic(
        &self,
        ws: &mut AlignmentWorkspace,
        id: usize,
        sequence1: &[A],
        sequence2: &[A],
    ) -> Result<AlignmentResult<A>> {
        let layout = MatrixLayout::new(sequence1.len(), sequence2.len(), self.config.band);
        let free = self.config.method.free_end_gaps();
        let local = self.config.method.is_local();
        let mut tracker = OptimumTracker::new(local, free.sequence1_trailing, free.sequence2_trailing);
        tracker.reset(layout.rows(), layout.columns());

        if local {
            let recurrence = LocalRecurrence::new(self.config.gap, false, false);
            self.sweep_with_storage(&recurrence, ws, sequence1, sequence2, &layout, &mut tracker)?;
        } else {
            let recurrence =
                GlobalRecurrence::new(self.config.gap, free.sequence1_leading, free.sequence2_leading);
            self.sweep_with_storage(&recurrence, ws, sequence1, sequence2, &layout, &mut tracker)?;
        }

        let optimum = tracker.optimum();
        if !optimum.is_reachable() {
            log::debug!("Pair {id}: no reachable optimum");
            return Ok(AlignmentResult::empty(id));
        }
        let traceback = if self.config.output.needs_trace() {
            Some(trace_back(
                &ws.trace,
                sequence1,
                sequence2,
                optimum.coordinate,
                self.traceback_rule(),
            )?)
        } else {
            None
        };
        Ok(self.package(id, optimum, traceback))
    }

    fn sweep_with_storage<R: CellRecurrence>(
        &self,
        recurrence: &R,
        ws: &mut AlignmentWorkspace,
        sequence1: &[A],
        sequence2: &[A],
        layout: &MatrixLayout,
        tracker: &mut OptimumTracker,
    ) -> Result<()> {
        let scoring = &self.config.scoring;
        let trace = self.config.output.needs_trace();
        match (self.config.storage, trace) {
            (MatrixStorage::Full, true) => sweep(
                recurrence, scoring, sequence1, sequence2, layout, &mut ws.scores, &mut ws.trace, tracker,
            ),
            (MatrixStorage::Full, false) => sweep(
                recurrence, scoring, sequence1, sequence2, layout, &mut ws.scores, &mut NoTrace, tracker,
            ),
            (_, true) => sweep(
                recurrence, scoring, sequence1, sequence2, layout, &mut ws.column, &mut ws.trace, tracker,
            ),
            (_, false) => sweep(
                recurrence, scoring, sequence1, sequence2, layout, &mut ws.column, &mut NoTrace, tracker,
            ),
        }
    }

    fn package(&self, id: usize, optimum: AlignmentOptimum, traceback: Option<Traceback<A>>) -> AlignmentResult<A> {
        if !optimum.is_reachable() {
            return AlignmentResult::empty(id);
        }
        let output = self.config.output;
        let (begin, alignment) = match traceback {
            Some(tb) => (Some(AlignmentPositions::from(tb.begin)), Some(tb.alignment)),
            None => (None, None),
        };
        AlignmentResult {
            sequence1_id: id,
            sequence2_id: id,
            score: Some(optimum.score),
            end_positions: output.end().then(|| AlignmentPositions::from(optimum.coordinate)),
            begin_positions: if output.begin() { begin } else { None },
            alignment: if output.alignment() { alignment } else { None },
        }
    }
}

/// Column-major sweep of one matrix.
#[allow(clippy::too_many_arguments)]
fn sweep<A, S, R, M, T>(
    recurrence: &R,
    scoring: &S,
    sequence1: &[A],
    sequence2: &[A],
    layout: &MatrixLayout,
    scores: &mut M,
    trace: &mut T,
    tracker: &mut OptimumTracker,
) -> Result<()>
where
    A: Alphabet,
    S: ScoringScheme<A>,
    R: CellRecurrence,
    M: ScoreMatrix,
    T: TraceStore,
{
    scores.reset(layout)?;
    trace.reset(layout)?;
    if !layout.intersects() {
        log::debug!("Band {:?} misses the {}x{} matrix", layout.band(), layout.rows(), layout.columns());
        return Ok(());
    }

    for col in 0..layout.columns() {
        scores.begin_column(col);
        let mut above = AffineCell::UNREACHABLE;
        for row in layout.rows_in_column(col) {
            let (cell, directions) = if col == 0 {
                if row == 0 {
                    recurrence.origin()
                } else {
                    recurrence.first_column(&above)
                }
            } else {
                let (diagonal, left) = scores.predecessors(row);
                if row == 0 {
                    recurrence.first_row(&left)
                } else {
                    let substitution = scoring.score(sequence1[col - 1], sequence2[row - 1]);
                    recurrence.inner(diagonal, &above, &left, substitution)
                }
            };
            let coordinate = MatrixCoordinate::new(row, col);
            scores.commit(row, cell);
            trace.record(coordinate, directions);
            tracker.track_cell(cell.current, coordinate);
            above = cell;
        }
        tracker.finish_column(col);
    }
    Ok(())
}
