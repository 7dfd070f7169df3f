//! Persistence adapter: named JSON records in a string key-value store.
//!
//! Every record is a self-contained JSON document written as a full overwrite.
//! Reads never fail: a missing or unparsable record comes back as `None` (the
//! parse error is logged) and the caller falls back to a default.
//!
//! In the browser the store is `window.localStorage`; native builds and tests
//! use an in-memory map.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::error::{Error, Result};

/// The logical records the engine persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    UserProfile,
    WordStates,
    GameState,
    Settings,
    CurrentSession,
}

impl RecordKind {
    pub const ALL: [RecordKind; 5] = [
        RecordKind::UserProfile,
        RecordKind::WordStates,
        RecordKind::GameState,
        RecordKind::Settings,
        RecordKind::CurrentSession,
    ];

    /// Stable logical key, also used as the snapshot field name.
    pub fn key(self) -> &'static str {
        match self {
            RecordKind::UserProfile => "userProfile",
            RecordKind::WordStates => "wordStates",
            RecordKind::GameState => "gameState",
            RecordKind::Settings => "settings",
            RecordKind::CurrentSession => "currentSession",
        }
    }
}

/// Minimal string key-value store (the shape of `localStorage`).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String>;
    fn remove(&mut self, key: &str);
}

/// In-memory store. `fail_writes` simulates a full or read-only store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        if self.fail_writes {
            return Err("quota exceeded".to_string());
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// `window.localStorage`. When storage is unavailable (private mode, worker
/// context) reads return nothing and writes fail.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage().and_then(|s| s.get_item(key).ok().flatten())
    }

    fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        let storage = Self::storage().ok_or_else(|| "localStorage unavailable".to_string())?;
        storage
            .set_item(key, value)
            .map_err(|e| format!("setItem rejected: {:?}", e))
    }

    fn remove(&mut self, key: &str) {
        if let Some(s) = Self::storage() {
            let _ = s.remove_item(key);
        }
    }
}

/// Store used by the process-scoped engine on this target.
#[cfg(target_arch = "wasm32")]
pub type PlatformStore = LocalStorage;
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStore = MemoryStore;

/// Typed record access over a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct Storage<S> {
    store: S,
    prefix: String,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(store: S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    fn full_key(&self, kind: RecordKind) -> String {
        format!("{}{}", self.prefix, kind.key())
    }

    pub fn load<T: DeserializeOwned>(&self, kind: RecordKind) -> Option<T> {
        let key = self.full_key(kind);
        let raw = self.store.get(&key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(%key, error = %err, "discarding unreadable record");
                None
            }
        }
    }

    /// Raw JSON of a record, if present. Used to roll back a failed import.
    pub fn load_raw(&self, kind: RecordKind) -> Option<String> {
        self.store.get(&self.full_key(kind))
    }

    pub fn save<T: Serialize>(&mut self, kind: RecordKind, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.save_raw(kind, &json)
    }

    pub fn save_raw(&mut self, kind: RecordKind, json: &str) -> Result<()> {
        let key = self.full_key(kind);
        self.store.set(&key, json).map_err(|message| {
            tracing::warn!(%key, %message, "write failed");
            Error::Storage { key: key.clone(), message }
        })?;
        tracing::debug!(%key, bytes = json.len(), "record saved");
        Ok(())
    }

    pub fn remove(&mut self, kind: RecordKind) {
        let key = self.full_key(kind);
        self.store.remove(&key);
        tracing::debug!(%key, "record removed");
    }

    pub fn clear(&mut self) {
        for kind in RecordKind::ALL {
            self.remove(kind);
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
