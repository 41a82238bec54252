//! The persisted game document.
//!
//! This is the wire/storage contract shared with the replicated store: one
//! document per puzzle instance, field names and nesting exactly as they
//! round-trip through JSON:
//!
//! ```text
//! { pid, grid, solution, circles, shades,
//!   clues: { across, down },
//!   cursors, pings, users,
//!   clock: { lastUpdated, totalTime, paused },
//!   solved, optimisticCounter }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::clock::ClockState;
use crate::grid::{matrix_dims, Grid, Solution};
use crate::presence::{Cursor, Ping};

/// Errors building or validating a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("matrix is ragged: {0}")]
    Ragged(&'static str),
    #[error("{matrix} is {found_rows}x{found_cols}, expected {rows}x{cols}")]
    DimensionMismatch {
        matrix: &'static str,
        rows: usize,
        cols: usize,
        found_rows: usize,
        found_cols: usize,
    },
}

/// Clue texts indexed by clue number, partitioned by direction. The arrays
/// are sparse; absent numbers serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueSet {
    #[serde(default)]
    pub across: Vec<Option<String>>,
    #[serde(default)]
    pub down: Vec<Option<String>>,
}

/// Roster entry for an editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub color: String,
}

/// Full replicated state for one puzzle instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDocument {
    pub pid: String,
    pub grid: Grid,
    pub solution: Solution,
    pub circles: Vec<Vec<bool>>,
    pub shades: Vec<Vec<bool>>,
    pub clues: ClueSet,
    pub cursors: Vec<Cursor>,
    pub pings: Vec<Ping>,
    pub users: BTreeMap<String, UserInfo>,
    pub clock: ClockState,
    pub solved: bool,
    pub optimistic_counter: u64,
}

impl GameDocument {
    /// Create a fresh document for a puzzle: an all-empty grid sized to
    /// the solution. Missing decoration matrices default to all-false at
    /// the solution's dimensions.
    pub fn new(
        solution: Solution,
        circles: Option<Vec<Vec<bool>>>,
        shades: Option<Vec<Vec<bool>>>,
        clues: ClueSet,
    ) -> Result<Self, DocumentError> {
        let (rows, cols) =
            matrix_dims(&solution).ok_or(DocumentError::Ragged("solution"))?;
        let circles = circles.unwrap_or_else(|| vec![vec![false; cols]; rows]);
        let shades = shades.unwrap_or_else(|| vec![vec![false; cols]; rows]);

        let doc = Self {
            pid: Uuid::new_v4().to_string(),
            grid: Grid::empty(rows, cols),
            solution,
            circles,
            shades,
            clues,
            cursors: Vec::new(),
            pings: Vec::new(),
            users: BTreeMap::new(),
            clock: ClockState::default(),
            solved: rows == 0,
            optimistic_counter: 0,
        };
        doc.validate()?;
        Ok(doc)
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    /// Check the dimension invariant: grid, solution, circles and shades
    /// all share one rectangle. Documents arriving from the store are
    /// re-validated; a malformed document is treated as "not ready", not
    /// as a fatal error.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if !self.grid.is_rectangular() {
            return Err(DocumentError::Ragged("grid"));
        }
        let rows = self.rows();
        let cols = self.cols();
        for (name, (found_rows, found_cols)) in [
            (
                "solution",
                matrix_dims(&self.solution).ok_or(DocumentError::Ragged("solution"))?,
            ),
            (
                "circles",
                matrix_dims(&self.circles).ok_or(DocumentError::Ragged("circles"))?,
            ),
            (
                "shades",
                matrix_dims(&self.shades).ok_or(DocumentError::Ragged("shades"))?,
            ),
        ] {
            if (found_rows, found_cols) != (rows, cols) {
                return Err(DocumentError::DimensionMismatch {
                    matrix: name,
                    rows,
                    cols,
                    found_rows,
                    found_cols,
                });
            }
        }
        Ok(())
    }

    /// Recompute the solved flag from the grid.
    pub fn recompute_solved(&mut self) {
        self.solved = self.grid.is_solved(&self.solution);
    }
}
