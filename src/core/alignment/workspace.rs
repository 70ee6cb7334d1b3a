//! Thread-local workspace for reusable matrix storage
//!
//! Each thread keeps one set of score and trace buffers that is reset (not
//! reallocated, unless a larger pair needs more room) before every pair.

use std::cell::RefCell;

use super::matrix::{FullScoreMatrix, FullTraceMatrix, SingleColumnScores};

// Thread-local workspace for alignment buffers
thread_local! {
    static WORKSPACE: RefCell<AlignmentWorkspace> = RefCell::new(AlignmentWorkspace::new());
}

/// Reusable buffers for the dynamic-programming driver
#[derive(Debug, Default)]
pub struct AlignmentWorkspace {
    /// Single-column score storage
    pub column: SingleColumnScores,
    /// Full score matrix
    pub scores: FullScoreMatrix,
    /// Trace directions for traceback
    pub trace: FullTraceMatrix,
}

impl AlignmentWorkspace {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Execute a closure with the thread-local workspace
///
/// # Example
/// ```ignore
/// with_workspace(|ws| {
///     ws.trace.reset(&layout)?;
///     // sweep into ws.column / ws.trace
/// });
/// ```
pub fn with_workspace<F, R>(f: F) -> R
where
    F: FnOnce(&mut AlignmentWorkspace) -> R,
{
    WORKSPACE.with(|ws| f(&mut ws.borrow_mut()))
}
