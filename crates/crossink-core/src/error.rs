//! Engine error taxonomy.
//!
//! Every failure here is local and recoverable; nothing in the engine is
//! fatal to the process. The worst outcome for a caller is a loading or
//! stale view.

use thiserror::Error;

/// Errors surfaced by engine mutation entrypoints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Coordinates outside the grid. Never clamped: silently clamping
    /// would corrupt an unrelated cell.
    #[error("coordinate out of range: ({row}, {col})")]
    InvalidCoordinate { row: usize, col: usize },

    /// The store holds no document yet. Transient; callers show a
    /// loading state and retry on the next snapshot.
    #[error("no document loaded yet")]
    NotReady,

    /// An active freeze power-up targets this cell; the edit is rejected.
    #[error("cell ({row}, {col}) is frozen")]
    CellFrozen { row: usize, col: usize },
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
