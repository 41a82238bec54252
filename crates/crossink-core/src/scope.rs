//! Scope resolution: from a logical selection strategy to concrete
//! coordinates.
//!
//! The engine works on tagged variants resolved by exhaustive match; raw
//! string tokens only exist at the boundary, where an unknown token maps to
//! `None` and callers treat it as the empty scope (a no-op, never an
//! error).

use crate::grid::{is_playable, Coord, Solution};

/// Selection strategy for bulk operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The selected square only.
    Square,
    /// The selected square plus the rest of the highlighted word.
    Word,
    /// Every playable square.
    Puzzle,
}

impl Scope {
    /// Parse a raw scope token from the presentation layer.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "square" => Some(Self::Square),
            "word" => Some(Self::Word),
            "puzzle" => Some(Self::Puzzle),
            _ => None,
        }
    }
}

/// Direction of the active word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Across,
    Down,
}

/// The editor's current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub cursor: Coord,
    pub direction: Direction,
}

/// Resolve a scope against the current selection, ordered row-major (for
/// `Puzzle`) or along the word. Blocked and out-of-range squares never
/// appear in the result.
pub fn resolve(scope: Scope, selection: &Selection, solution: &Solution) -> Vec<Coord> {
    match scope {
        Scope::Square => {
            if is_playable(solution, selection.cursor) {
                vec![selection.cursor]
            } else {
                Vec::new()
            }
        }
        Scope::Word => word_at(selection, solution),
        Scope::Puzzle => {
            let rows = solution.len();
            let cols = solution.first().map_or(0, Vec::len);
            (0..rows)
                .flat_map(|row| (0..cols).map(move |col| Coord::new(row, col)))
                .filter(|&coord| is_playable(solution, coord))
                .collect()
        }
    }
}

/// The maximal contiguous run of playable squares through the selection in
/// the active direction. Empty if the selected square itself is blocked.
fn word_at(selection: &Selection, solution: &Solution) -> Vec<Coord> {
    let Coord { row, col } = selection.cursor;
    if !is_playable(solution, selection.cursor) {
        return Vec::new();
    }
    let step = |coord: Coord, back: bool| -> Option<Coord> {
        match (selection.direction, back) {
            (Direction::Across, true) => coord.col.checked_sub(1).map(|c| Coord::new(coord.row, c)),
            (Direction::Across, false) => Some(Coord::new(coord.row, coord.col + 1)),
            (Direction::Down, true) => coord.row.checked_sub(1).map(|r| Coord::new(r, coord.col)),
            (Direction::Down, false) => Some(Coord::new(coord.row + 1, coord.col)),
        }
    };

    let mut start = Coord::new(row, col);
    while let Some(prev) = step(start, true) {
        if !is_playable(solution, prev) {
            break;
        }
        start = prev;
    }

    let mut cells = Vec::new();
    let mut cursor = Some(start);
    while let Some(coord) = cursor {
        if !is_playable(solution, coord) {
            break;
        }
        cells.push(coord);
        cursor = step(coord, false);
    }
    cells
}
