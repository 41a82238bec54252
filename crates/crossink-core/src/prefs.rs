//! Editor preference persistence.
//!
//! Preferences live outside the replicated document (they are per-browser,
//! per-person) behind a small get/set interface the presentation layer
//! injects. Failure policy: a corrupt entry is logged and replaced with the
//! default; corruption never reaches the engine.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Storage key for the keybinding-mode preference.
pub const KEYBIND_MODE_KEY: &str = "vim-mode";

/// Raw string-keyed preference storage (browser local storage, a config
/// file, or memory).
pub trait PreferenceStore {
    fn get_raw(&self, key: &str) -> Option<String>;
    fn set_raw(&mut self, key: &str, value: String);
}

/// Read a preference, falling back to the default on absence or
/// corruption.
pub fn get_or_default<T: DeserializeOwned + Default>(
    store: &dyn PreferenceStore,
    key: &str,
) -> T {
    match store.get_raw(key) {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                log::error!("corrupt preference {key:?} ({err}); using default");
                T::default()
            }
        },
        None => T::default(),
    }
}

/// Write a preference. Serialization failures are logged and dropped; a
/// preference write is never worth failing an interaction over.
pub fn set<T: Serialize>(store: &mut dyn PreferenceStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set_raw(key, raw),
        Err(err) => log::error!("failed to serialize preference {key:?}: {err}"),
    }
}

/// Whether the editor prefers vim-style keybindings.
pub fn keybind_mode(store: &dyn PreferenceStore) -> bool {
    get_or_default(store, KEYBIND_MODE_KEY)
}

pub fn set_keybind_mode(store: &mut dyn PreferenceStore, enabled: bool) {
    set(store, KEYBIND_MODE_KEY, &enabled);
}

/// In-memory preference store for tests and headless use.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    entries: HashMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_raw(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_preference_yields_default() {
        let store = MemoryPreferences::new();
        assert!(!keybind_mode(&store));
    }

    #[test]
    fn test_round_trip() {
        let mut store = MemoryPreferences::new();
        set_keybind_mode(&mut store, true);
        assert!(keybind_mode(&store));
    }

    #[test]
    fn test_corrupt_entry_falls_back_to_default() {
        let mut store = MemoryPreferences::new();
        store.set_raw(KEYBIND_MODE_KEY, "{not json".to_string());
        assert!(!keybind_mode(&store));
        // The corrupt raw value is left in place; only the read is defaulted.
        assert_eq!(store.get_raw(KEYBIND_MODE_KEY).as_deref(), Some("{not json"));
    }
}
