//! CrossInk Core Library
//!
//! State engine for real-time collaborative crossword play: the canonical
//! grid, presence signals, the shared clock, scoped bulk operations, and
//! the power-up composition that merges two players' snapshots into the
//! effective views a battle UI renders. Transport and rendering are
//! external collaborators; the engine reads and writes one replicated
//! document per puzzle instance through the [`storage::DocumentStore`]
//! seam.

pub mod clock;
pub mod document;
pub mod error;
pub mod grid;
pub mod model;
pub mod powerups;
pub mod prefs;
pub mod presence;
pub mod scope;
pub mod snapshot;
pub mod storage;
pub mod view;

pub use clock::{ClockAction, ClockState, SystemClock, TimeSource};
pub use document::{ClueSet, GameDocument, UserInfo};
pub use error::{EngineError, EngineResult};
pub use grid::{Cell, Coord, Correctness, Grid, Solution};
pub use model::{ChangeEvent, GameModel};
pub use powerups::{
    prune_expired, AppliesTo, Composed, EffectiveView, PowerupEffect, PowerupEngine, PowerupKind,
};
pub use prefs::{MemoryPreferences, PreferenceStore};
pub use presence::{Cursor, Ping, PING_TTL_MS};
pub use scope::{resolve, Direction, Scope, Selection};
pub use snapshot::{Snapshot, SnapshotStore};
pub use storage::{shared, DocumentStore, MemoryStore, SharedStore};
pub use view::ViewState;
