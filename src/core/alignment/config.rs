//! Pairwise alignment configuration.
//!
//! `AlignmentConfig` is a plain set of named options assembled with builder
//! methods in any order. Nothing is validated here; `PairwiseAligner::bind`
//! checks the combination once and fixes the engine.

use super::scoring::{GapScheme, MatchMismatch};
use super::types::Band;
use crate::defaults;

/// Which ends of each sequence may be covered by gaps at no cost.
///
/// Leading gaps of sequence 1 are the first matrix row, leading gaps of
/// sequence 2 the first column. Trailing flags select the last row / last
/// column as candidate optimum cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FreeEndGaps {
    pub sequence1_leading: bool,
    pub sequence1_trailing: bool,
    pub sequence2_leading: bool,
    pub sequence2_trailing: bool,
}

impl FreeEndGaps {
    pub const NONE: Self = Self {
        sequence1_leading: false,
        sequence1_trailing: false,
        sequence2_leading: false,
        sequence2_trailing: false,
    };

    pub const ALL: Self = Self {
        sequence1_leading: true,
        sequence1_trailing: true,
        sequence2_leading: true,
        sequence2_trailing: true,
    };

    /// Sequence 2 may align anywhere inside sequence 1.
    pub const fn semi_global() -> Self {
        Self {
            sequence1_leading: true,
            sequence1_trailing: true,
            sequence2_leading: false,
            sequence2_trailing: false,
        }
    }

    pub const fn any(&self) -> bool {
        self.sequence1_leading || self.sequence1_trailing || self.sequence2_leading || self.sequence2_trailing
    }

    pub(crate) fn is_semi_global(&self) -> bool {
        *self == Self::semi_global()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Global(FreeEndGaps),
    Local,
}

impl Default for Method {
    fn default() -> Self {
        Method::Global(FreeEndGaps::NONE)
    }
}

impl Method {
    pub const fn global() -> Self {
        Method::Global(FreeEndGaps::NONE)
    }

    pub const fn semi_global() -> Self {
        Method::Global(FreeEndGaps::semi_global())
    }

    pub const fn is_local(&self) -> bool {
        matches!(self, Method::Local)
    }

    pub const fn free_end_gaps(&self) -> FreeEndGaps {
        match self {
            Method::Global(free) => *free,
            Method::Local => FreeEndGaps::NONE,
        }
    }
}

/// Result fields to produce, each level including the previous ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputFields {
    #[default]
    Score,
    ScoreEnd,
    ScoreEndBegin,
    Alignment,
}

impl OutputFields {
    pub const fn end(&self) -> bool {
        !matches!(self, OutputFields::Score)
    }

    pub const fn begin(&self) -> bool {
        matches!(self, OutputFields::ScoreEndBegin | OutputFields::Alignment)
    }

    pub const fn alignment(&self) -> bool {
        matches!(self, OutputFields::Alignment)
    }

    /// Begin positions and alignments both come from traceback.
    pub const fn needs_trace(&self) -> bool {
        self.begin()
    }
}

/// How the score matrix is kept during the sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MatrixStorage {
    /// All score cells, plus the trace matrix when traceback is needed.
    Full,
    /// One score column, plus the trace matrix when traceback is needed.
    #[default]
    SingleColumn,
    /// One score column and no trace capture at all.
    ScoreOnly,
}

#[derive(Debug, Clone)]
pub struct AlignmentConfig<S> {
    pub method: Method,
    pub scoring: S,
    pub gap: GapScheme,
    pub output: OutputFields,
    pub band: Option<Band>,
    pub max_errors: Option<usize>,
    pub storage: MatrixStorage,
    pub vectorised: bool,
    /// Worker threads for parallel alignment; `None` uses the ambient rayon pool.
    pub threads: Option<usize>,
}

impl Default for AlignmentConfig<MatchMismatch> {
    fn default() -> Self {
        Self::new(MatchMismatch::default())
    }
}

impl AlignmentConfig<MatchMismatch> {
    /// Unit-cost edit distance, global, score only.
    pub fn edit_distance() -> Self {
        Self::new(MatchMismatch::edit_distance()).gap(GapScheme::linear(defaults::GAP_SCORE))
    }
}

impl<S> AlignmentConfig<S> {
    /// Global alignment with linear gaps, score output.
    pub fn new(scoring: S) -> Self {
        Self {
            method: Method::default(),
            scoring,
            gap: GapScheme::linear(defaults::GAP_SCORE),
            output: OutputFields::default(),
            band: None,
            max_errors: None,
            storage: MatrixStorage::default(),
            vectorised: false,
            threads: None,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn scoring<T>(self, scoring: T) -> AlignmentConfig<T> {
        AlignmentConfig {
            method: self.method,
            scoring,
            gap: self.gap,
            output: self.output,
            band: self.band,
            max_errors: self.max_errors,
            storage: self.storage,
            vectorised: self.vectorised,
            threads: self.threads,
        }
    }

    pub fn gap(mut self, gap: GapScheme) -> Self {
        self.gap = gap;
        self
    }

    pub fn output(mut self, output: OutputFields) -> Self {
        self.output = output;
        self
    }

    pub fn band(mut self, band: Band) -> Self {
        self.band = Some(band);
        self
    }

    pub fn max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = Some(max_errors);
        self
    }

    pub fn storage(mut self, storage: MatrixStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn vectorised(mut self, vectorised: bool) -> Self {
        self.vectorised = vectorised;
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }
}
