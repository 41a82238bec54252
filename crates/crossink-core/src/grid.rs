//! Canonical per-cell grid state.
//!
//! The grid is a rectangular matrix of [`Cell`]s whose dimensions are fixed
//! for the lifetime of a puzzle and always match the solution and the
//! decoration matrices. Blocked squares are not stored per cell; a square
//! is blocked iff the solution holds [`BLOCK`] at that coordinate.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Solution marker for a blocked (black) square.
pub const BLOCK: &str = ".";

/// Solution matrix: one entry per square, [`BLOCK`] for black squares.
pub type Solution = Vec<Vec<String>>;

/// A grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Tri-state correctness flag for a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Correctness {
    #[default]
    Unknown,
    Correct,
    Incorrect,
}

/// One square of the shared grid.
///
/// `value` is the empty string for an empty square. `owner_id` records the
/// editor whose edit last set the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub pencil: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub correct: Correctness,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

impl Cell {
    /// An empty square has no value (confirmed-correct protection and
    /// `check` both key off this).
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// Rectangular matrix of cells. Serializes as a bare 2D array so the
/// persisted document shape stays `grid: [[cell, ...], ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// Create an all-empty grid of the given dimensions.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            cells: vec![vec![Cell::default(); cols]; rows],
        }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.row < self.rows() && coord.col < self.cols()
    }

    /// All cells must live in a rectangle; a ragged matrix is malformed.
    pub fn is_rectangular(&self) -> bool {
        let cols = self.cols();
        self.cells.iter().all(|row| row.len() == cols)
    }

    pub fn cell(&self, coord: Coord) -> EngineResult<&Cell> {
        self.cells
            .get(coord.row)
            .and_then(|row| row.get(coord.col))
            .ok_or(EngineError::InvalidCoordinate {
                row: coord.row,
                col: coord.col,
            })
    }

    pub fn cell_mut(&mut self, coord: Coord) -> EngineResult<&mut Cell> {
        self.cells
            .get_mut(coord.row)
            .and_then(|row| row.get_mut(coord.col))
            .ok_or(EngineError::InvalidCoordinate {
                row: coord.row,
                col: coord.col,
            })
    }

    /// Iterate coordinates row-major.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        let cols = self.cols();
        (0..self.rows()).flat_map(move |row| (0..cols).map(move |col| Coord::new(row, col)))
    }

    /// Compare the cell's value against the solution and set the
    /// correctness flag. Empty cells stay `Unknown`: checking nothing
    /// proves nothing. Never alters the value.
    pub fn check_cell(&mut self, coord: Coord, solution: &Solution) -> EngineResult<()> {
        let answer = solution_at(solution, coord).to_string();
        let cell = self.cell_mut(coord)?;
        if !cell.is_empty() {
            cell.correct = if cell.value == answer {
                Correctness::Correct
            } else {
                Correctness::Incorrect
            };
        }
        Ok(())
    }

    /// Write the solution value into the cell and confirm it, overwriting
    /// any pencil/ink state unconditionally.
    pub fn reveal_cell(&mut self, coord: Coord, solution: &Solution) -> EngineResult<()> {
        let answer = solution_at(solution, coord).to_string();
        let cell = self.cell_mut(coord)?;
        if answer != BLOCK {
            cell.value = answer;
            cell.pencil = false;
            cell.correct = Correctness::Correct;
        }
        Ok(())
    }

    /// Clear the cell. Without `force`, confirmed-correct cells are left
    /// untouched.
    pub fn reset_cell(&mut self, coord: Coord, force: bool) -> EngineResult<()> {
        let cell = self.cell_mut(coord)?;
        if force || cell.correct != Correctness::Correct {
            cell.value.clear();
            cell.pencil = false;
            cell.color = None;
            cell.correct = Correctness::Unknown;
            cell.owner_id = None;
        }
        Ok(())
    }

    /// True iff every playable cell's value matches the solution.
    pub fn is_solved(&self, solution: &Solution) -> bool {
        self.coords().all(|coord| {
            let answer = solution_at(solution, coord);
            answer == BLOCK
                || self
                    .cell(coord)
                    .map(|cell| cell.value == answer)
                    .unwrap_or(false)
        })
    }
}

/// Solution entry at a coordinate; out-of-range reads as blocked so a
/// malformed solution never widens the playable area.
pub fn solution_at(solution: &Solution, coord: Coord) -> &str {
    solution
        .get(coord.row)
        .and_then(|row| row.get(coord.col))
        .map_or(BLOCK, String::as_str)
}

/// A square is playable iff the solution does not block it there.
pub fn is_playable(solution: &Solution, coord: Coord) -> bool {
    solution_at(solution, coord) != BLOCK
}

/// Dimensions of a rectangular matrix, or `None` if ragged.
pub fn matrix_dims<T>(matrix: &[Vec<T>]) -> Option<(usize, usize)> {
    let cols = matrix.first().map_or(0, Vec::len);
    matrix
        .iter()
        .all(|row| row.len() == cols)
        .then_some((matrix.len(), cols))
}
