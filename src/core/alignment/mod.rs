//! Core alignment kernels - generic pairwise alignment framework.
//!
//! The driver composes narrow components, each chosen once when a
//! configuration is bound: a scoring scheme, matrix storage, the affine cell
//! recurrence, optimum tracking and traceback. Unit-cost edit distance is
//! delegated to a bit-parallel engine; vectorised score-only runs go through
//! a lane-batched sweep.

pub mod batch; // Structure-of-arrays batched scoring
pub mod cigar;
pub mod config;
pub mod driver;
pub mod edit_distance; // Myers bit-vector edit distance
pub mod matrix;
pub mod optimum;
pub mod recurrence;
pub mod scoring;
pub mod traceback;
pub mod types;
pub mod workspace; // Thread-local buffer pools for allocation reuse

pub use config::{AlignmentConfig, FreeEndGaps, MatrixStorage, Method, OutputFields};
pub use driver::{AlignmentResult, Engine, PairwiseAligner};
pub use scoring::{GapScheme, MatchMismatch, ScoringScheme, SubstitutionMatrix};
pub use traceback::{Alignment, Gapped};
pub use types::{AlignmentPositions, Band, Score};
