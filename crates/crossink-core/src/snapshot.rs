//! Immutable, versioned snapshots of the full game state.
//!
//! `SnapshotStore` is the only surface other subsystems read from. It wraps
//! the shared document store and guarantees that, for one puzzle, the
//! optimistic counter it hands out never goes backwards: a replica serving
//! stale state is answered with the newer snapshot already seen.

use std::cell::RefCell;
use std::rc::Rc;

use crate::document::GameDocument;
use crate::storage::SharedStore;

/// An immutable point-in-time read of the full game state. Cheap to clone.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    doc: Rc<GameDocument>,
}

impl Snapshot {
    pub fn new(doc: GameDocument) -> Self {
        Self { doc: Rc::new(doc) }
    }

    pub fn doc(&self) -> &GameDocument {
        &self.doc
    }

    pub fn pid(&self) -> &str {
        &self.doc.pid
    }

    pub fn solved(&self) -> bool {
        self.doc.solved
    }

    pub fn optimistic_counter(&self) -> u64 {
        self.doc.optimistic_counter
    }
}

impl From<GameDocument> for Snapshot {
    fn from(doc: GameDocument) -> Self {
        Self::new(doc)
    }
}

/// Read side of the engine (the history wrapper).
pub struct SnapshotStore {
    store: SharedStore,
    last: RefCell<Option<Snapshot>>,
}

impl SnapshotStore {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            last: RefCell::new(None),
        }
    }

    /// Latest snapshot, or `None` only before the first load.
    ///
    /// Malformed documents and counter regressions are both answered with
    /// the last good snapshot, so consumers at worst render a stale view,
    /// never a broken one.
    pub fn get_snapshot(&self) -> Option<Snapshot> {
        let current = self.store.borrow().get();
        let mut last = self.last.borrow_mut();

        let Some(doc) = current else {
            return last.clone();
        };
        if let Err(err) = doc.validate() {
            log::warn!("ignoring malformed document for pid {}: {err}", doc.pid);
            return last.clone();
        }
        let snapshot = Snapshot::new(doc);

        if let Some(prev) = last.as_ref() {
            if prev.pid() == snapshot.pid()
                && snapshot.optimistic_counter() < prev.optimistic_counter()
            {
                log::warn!(
                    "stale document for pid {}: counter {} < {}",
                    snapshot.pid(),
                    snapshot.optimistic_counter(),
                    prev.optimistic_counter()
                );
                return Some(prev.clone());
            }
        }
        *last = Some(snapshot.clone());
        Some(snapshot)
    }
}
