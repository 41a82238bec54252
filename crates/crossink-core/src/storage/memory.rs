//! In-memory document store.
//!
//! Stand-in for the external replicated store; also the test substrate.

use super::{DocumentStore, StorageResult};
use crate::document::GameDocument;

/// Holds the single current document for a puzzle instance.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Option<GameDocument>,
}

impl MemoryStore {
    /// Create an empty store (no document loaded yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding a document, as if the first remote
    /// load had completed.
    pub fn with_document(doc: GameDocument) -> Self {
        Self { doc: Some(doc) }
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self) -> Option<GameDocument> {
        self.doc.clone()
    }

    fn put(&mut self, doc: GameDocument) -> StorageResult<()> {
        self.doc = Some(doc);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ClueSet, GameDocument};

    fn doc() -> GameDocument {
        GameDocument::new(vec![vec!["A".to_string()]], None, None, ClueSet::default())
            .expect("build document")
    }

    #[test]
    fn test_empty_until_first_put() {
        let store = MemoryStore::new();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_put_then_get() {
        let mut store = MemoryStore::new();
        let doc = doc();
        store.put(doc.clone()).unwrap();
        assert_eq!(store.get(), Some(doc));
    }

    #[test]
    fn test_put_replaces() {
        let doc = doc();
        let mut store = MemoryStore::with_document(doc.clone());
        let mut next = doc;
        next.optimistic_counter = 7;
        store.put(next.clone()).unwrap();
        assert_eq!(store.get(), Some(next));
    }
}
