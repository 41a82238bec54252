//! Cursor and ping presence signals.
//!
//! Each editor owns exactly one live cursor (last write wins per editor).
//! Pings are append-only markers that expire after a fixed TTL; any reader
//! may garbage-collect expired pings, not just the editor that placed them.

use serde::{Deserialize, Serialize};

use crate::clock::Millis;

/// How long a ping stays visible.
pub const PING_TTL_MS: Millis = 10_000;

/// An editor's cursor position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub editor_id: String,
    pub row: usize,
    pub col: usize,
    pub updated_at: Millis,
}

/// A transient "look here" marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ping {
    pub editor_id: String,
    pub row: usize,
    pub col: usize,
    pub created_at: Millis,
}

impl Ping {
    pub fn is_live(&self, now: Millis) -> bool {
        now.saturating_sub(self.created_at) < PING_TTL_MS
    }
}

/// Move an editor's cursor, replacing any previous position for that
/// editor.
pub fn set_cursor(cursors: &mut Vec<Cursor>, editor_id: &str, row: usize, col: usize, now: Millis) {
    let cursor = Cursor {
        editor_id: editor_id.to_string(),
        row,
        col,
        updated_at: now,
    };
    match cursors.iter_mut().find(|c| c.editor_id == editor_id) {
        Some(existing) => *existing = cursor,
        None => cursors.push(cursor),
    }
}

/// Append a ping. Multiple pings may coexist, including from one editor.
pub fn add_ping(pings: &mut Vec<Ping>, editor_id: &str, row: usize, col: usize, now: Millis) {
    pings.push(Ping {
        editor_id: editor_id.to_string(),
        row,
        col,
        created_at: now,
    });
}

/// Drop expired pings. Returns how many were removed.
pub fn prune_pings(pings: &mut Vec<Ping>, now: Millis) -> usize {
    let before = pings.len();
    pings.retain(|ping| ping.is_live(now));
    let removed = before - pings.len();
    if removed > 0 {
        log::debug!("pruned {removed} expired ping(s)");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_last_write_wins_per_editor() {
        let mut cursors = Vec::new();
        set_cursor(&mut cursors, "alice", 0, 0, 10);
        set_cursor(&mut cursors, "bob", 1, 1, 11);
        set_cursor(&mut cursors, "alice", 2, 3, 12);

        assert_eq!(cursors.len(), 2);
        let alice = cursors.iter().find(|c| c.editor_id == "alice").unwrap();
        assert_eq!((alice.row, alice.col, alice.updated_at), (2, 3, 12));
    }

    #[test]
    fn test_multiple_pings_coexist() {
        let mut pings = Vec::new();
        add_ping(&mut pings, "alice", 3, 4, 0);
        add_ping(&mut pings, "alice", 3, 4, 1);
        assert_eq!(pings.len(), 2);
    }

    #[test]
    fn test_ping_expires_after_ttl() {
        let mut pings = Vec::new();
        add_ping(&mut pings, "bob", 3, 4, 1_000);

        assert_eq!(prune_pings(&mut pings, 1_000 + PING_TTL_MS - 1), 0);
        assert_eq!(pings.len(), 1);

        assert_eq!(prune_pings(&mut pings, 1_000 + PING_TTL_MS), 1);
        assert!(pings.is_empty());
    }
}
