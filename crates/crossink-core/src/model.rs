//! The mutation façade.
//!
//! `GameModel` is the only component that writes into the grid, presence
//! and clock state. Each operation loads the store's current document,
//! applies one mutation atomically against it, bumps the optimistic
//! counter and writes the result back. The store is the serialization
//! point between editors (last-applied-wins); the model's responsibility
//! is never to apply a mutation against state older than what it has
//! already produced.

use std::collections::BTreeSet;

use crate::clock::{ClockAction, Millis, SystemClock, TimeSource};
use crate::document::GameDocument;
use crate::error::{EngineError, EngineResult};
use crate::grid::{is_playable, Coord, Correctness};
use crate::presence;
use crate::storage::SharedStore;

/// Notification to the presentation layer after an accepted mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A plain edit by an editor.
    Edit,
    /// A forced change (reveal) that the UI may want to call out.
    Forced,
}

type Observer = Box<dyn Fn(ChangeEvent)>;

/// Sole mutation surface over the shared document store.
pub struct GameModel {
    store: SharedStore,
    time: Box<dyn TimeSource>,
    /// Highest counter this model has produced; guards against a replica
    /// serving state older than our own writes.
    last_applied: u64,
    /// Cells currently protected by an active freeze power-up, pushed in
    /// by the composition layer.
    frozen: BTreeSet<Coord>,
    observer: Option<Observer>,
}

impl GameModel {
    pub fn new(store: SharedStore) -> Self {
        Self::with_time_source(store, Box::new(SystemClock))
    }

    pub fn with_time_source(store: SharedStore, time: Box<dyn TimeSource>) -> Self {
        Self {
            store,
            time,
            last_applied: 0,
            frozen: BTreeSet::new(),
            observer: None,
        }
    }

    /// Register the change observer. The previous observer, if any, is
    /// replaced.
    pub fn on_change(&mut self, observer: impl Fn(ChangeEvent) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Replace the set of cells blocked by active freeze power-ups.
    pub fn set_active_freezes(&mut self, cells: BTreeSet<Coord>) {
        self.frozen = cells;
    }

    // --- Cell edits ---

    /// Write a value into a cell.
    ///
    /// Out-of-range coordinates and frozen cells are rejected; blocked
    /// squares and confirmed-correct cells are silent no-ops. With
    /// `autocheck` the correctness flag is recomputed immediately, but the
    /// edit itself always lands: autocheck never blocks or reverts.
    #[allow(clippy::too_many_arguments)]
    pub fn update_cell(
        &mut self,
        row: usize,
        col: usize,
        editor_id: &str,
        color: &str,
        pencil: bool,
        value: &str,
        autocheck: bool,
    ) -> EngineResult<()> {
        let coord = Coord::new(row, col);
        let frozen = self.frozen.contains(&coord);
        let editor_id = editor_id.to_string();
        let color = color.to_string();
        let value = value.to_string();

        let changed = self.apply(move |doc, _now| {
            if !doc.grid.in_bounds(coord) {
                return Err(EngineError::InvalidCoordinate { row, col });
            }
            if frozen {
                return Err(EngineError::CellFrozen { row, col });
            }
            if !is_playable(&doc.solution, coord) {
                return Ok(false);
            }
            if doc.grid.cell(coord)?.correct == Correctness::Correct {
                // Confirmed-correct cells only yield to reset(force).
                return Ok(false);
            }
            {
                let cell = doc.grid.cell_mut(coord)?;
                cell.value = value;
                cell.pencil = pencil;
                cell.color = Some(color);
                cell.owner_id = Some(editor_id);
                cell.correct = Correctness::Unknown;
            }
            if autocheck {
                let solution = doc.solution.clone();
                doc.grid.check_cell(coord, &solution)?;
            }
            doc.recompute_solved();
            Ok(true)
        })?;

        if changed {
            self.notify(ChangeEvent::Edit);
        }
        Ok(())
    }

    // --- Presence ---

    /// Move an editor's cursor.
    ///
    /// Once the puzzle is solved, editors without an existing cursor are
    /// ignored. Preserved source behavior; a product policy (it keeps
    /// late spectators out of the cursor display), not an engineering
    /// necessity.
    pub fn update_cursor(&mut self, row: usize, col: usize, editor_id: &str) -> EngineResult<()> {
        let editor_id = editor_id.to_string();
        self.apply(move |doc, now| {
            if !doc.grid.in_bounds(Coord::new(row, col)) {
                return Err(EngineError::InvalidCoordinate { row, col });
            }
            let known = doc.cursors.iter().any(|c| c.editor_id == editor_id);
            if doc.solved && !known {
                return Ok(false);
            }
            doc.users.entry(editor_id.clone()).or_default();
            presence::set_cursor(&mut doc.cursors, &editor_id, row, col, now);
            Ok(true)
        })?;
        Ok(())
    }

    /// Drop a ping marker. Always accepted; expired pings are pruned on
    /// the way through.
    pub fn add_ping(&mut self, row: usize, col: usize, editor_id: &str) -> EngineResult<()> {
        let editor_id = editor_id.to_string();
        self.apply(move |doc, now| {
            if !doc.grid.in_bounds(Coord::new(row, col)) {
                return Err(EngineError::InvalidCoordinate { row, col });
            }
            presence::prune_pings(&mut doc.pings, now);
            presence::add_ping(&mut doc.pings, &editor_id, row, col, now);
            Ok(true)
        })?;
        Ok(())
    }

    /// Assign an editor's roster color.
    pub fn update_color(&mut self, editor_id: &str, color: &str) -> EngineResult<()> {
        let editor_id = editor_id.to_string();
        let color = color.to_string();
        self.apply(move |doc, _now| {
            doc.users.entry(editor_id).or_default().color = color;
            Ok(true)
        })?;
        Ok(())
    }

    // --- Clock ---

    pub fn update_clock(&mut self, action: ClockAction) -> EngineResult<()> {
        self.apply(move |doc, now| {
            let before = doc.clock;
            doc.clock.apply(action, now);
            // Idempotent self-transitions don't mint a new version.
            Ok(doc.clock != before)
        })?;
        Ok(())
    }

    // --- Bulk operations over a resolved scope ---

    /// Set the correctness flag for every non-empty cell in scope. Never
    /// alters values.
    pub fn check(&mut self, scope: &[Coord]) -> EngineResult<()> {
        if scope.is_empty() {
            return Ok(());
        }
        let scope = scope.to_vec();
        self.apply(move |doc, _now| {
            validate_scope(doc, &scope)?;
            let solution = doc.solution.clone();
            let mut changed = false;
            for &coord in &scope {
                let before = doc.grid.cell(coord)?.correct;
                doc.grid.check_cell(coord, &solution)?;
                changed |= doc.grid.cell(coord)?.correct != before;
            }
            // A check that settles no new flags doesn't mint a version.
            Ok(changed)
        })?;
        Ok(())
    }

    /// Write the solution into every cell in scope and confirm it.
    /// Notifies the observer of a forced change.
    pub fn reveal(&mut self, scope: &[Coord]) -> EngineResult<()> {
        if scope.is_empty() {
            return Ok(());
        }
        let scope = scope.to_vec();
        let changed = self.apply(move |doc, _now| {
            validate_scope(doc, &scope)?;
            let solution = doc.solution.clone();
            for &coord in &scope {
                doc.grid.reveal_cell(coord, &solution)?;
            }
            doc.recompute_solved();
            Ok(true)
        })?;
        if changed {
            self.notify(ChangeEvent::Forced);
        }
        Ok(())
    }

    /// Clear every cell in scope. Without `force`, confirmed-correct cells
    /// survive.
    pub fn reset(&mut self, scope: &[Coord], force: bool) -> EngineResult<()> {
        if scope.is_empty() {
            return Ok(());
        }
        let scope = scope.to_vec();
        self.apply(move |doc, _now| {
            validate_scope(doc, &scope)?;
            for &coord in &scope {
                doc.grid.reset_cell(coord, force)?;
            }
            doc.recompute_solved();
            Ok(true)
        })?;
        Ok(())
    }

    // --- Internals ---

    /// Load the current document, run one mutation against it, bump the
    /// counter and write back. Returns whether a new document was
    /// produced.
    fn apply<F>(&mut self, mutate: F) -> EngineResult<bool>
    where
        F: FnOnce(&mut GameDocument, Millis) -> EngineResult<bool>,
    {
        let Some(mut doc) = self.store.borrow().get() else {
            return Err(EngineError::NotReady);
        };
        if doc.optimistic_counter < self.last_applied {
            // A replica served state older than our own writes; mutating
            // it would silently regress newer cells.
            log::warn!(
                "skipping mutation against stale document (counter {} < {})",
                doc.optimistic_counter,
                self.last_applied
            );
            return Ok(false);
        }

        let now = self.time.now_ms();
        if !mutate(&mut doc, now)? {
            return Ok(false);
        }

        doc.optimistic_counter += 1;
        let counter = doc.optimistic_counter;
        match self.store.borrow_mut().put(doc) {
            Ok(()) => {
                // Only a write that landed may advance the stale guard;
                // recording the counter early would wedge the model after
                // one transient store failure.
                self.last_applied = counter;
                Ok(true)
            }
            Err(err) => {
                log::error!("failed to write document: {err}");
                Ok(false)
            }
        }
    }

    fn notify(&self, event: ChangeEvent) {
        if let Some(observer) = &self.observer {
            observer(event);
        }
    }
}

/// Bulk operations fail fast on any out-of-range coordinate before a
/// single cell is touched, so an invalid scope never half-applies.
fn validate_scope(doc: &GameDocument, scope: &[Coord]) -> EngineResult<()> {
    for &coord in scope {
        if !doc.grid.in_bounds(coord) {
            return Err(EngineError::InvalidCoordinate {
                row: coord.row,
                col: coord.col,
            });
        }
    }
    Ok(())
}
