//! Storage abstraction over the replicated document store.
//!
//! The real transport/replication layer is an external collaborator; the
//! engine only needs a place to read the latest document from and write
//! mutated documents to. Operations are synchronous: the engine runs on a
//! single UI-driving thread and never suspends internally.

mod memory;

pub use memory::MemoryStore;

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use crate::document::GameDocument;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// One replicated document per puzzle instance.
///
/// `get` returns `None` only before the first load; after that every read
/// observes the store's current document. Writes are last-applied-wins:
/// the store itself is the serialization point between editors.
pub trait DocumentStore {
    /// Latest document, if one has been loaded.
    fn get(&self) -> Option<GameDocument>;

    /// Replace the current document.
    fn put(&mut self, doc: GameDocument) -> StorageResult<()>;
}

/// Handle shared between the mutation surface and snapshot readers within
/// one process.
pub type SharedStore = Rc<RefCell<dyn DocumentStore>>;

/// Wrap a store in a shareable handle.
pub fn shared<S: DocumentStore + 'static>(store: S) -> SharedStore {
    Rc::new(RefCell::new(store))
}
