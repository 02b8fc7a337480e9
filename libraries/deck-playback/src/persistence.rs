//! Persistence of listener preferences
//!
//! Volume, mute, loop mode and track index survive page navigations through a
//! string key-value store. Keys are `{prefix}_vol`, `{prefix}_muted`,
//! `{prefix}_loopMode` and `{prefix}_trackIndex`.
//!
//! Storage is best effort. A failing backend is logged and ignored, and a
//! malformed or out-of-range value loads as "not set".

use crate::{
    error::StorageError,
    numeric::{clamp01, parse_index, parse_number},
    types::LoopMode,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, warn};

/// Durable string key-value store
pub trait KeyValueStore {
    /// Read a key; `Ok(None)` when it was never written
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a key
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store
///
/// Clones share the same map, so a test can keep a handle while the engine
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a key directly, bypassing the trait's error channel
    pub fn value(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    /// Seed a key directly
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.borrow_mut().insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.value(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.insert(key, value);
        Ok(())
    }
}

/// Store with no backend at all; every call fails as unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStore;

impl KeyValueStore for NoStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

/// Values restored from storage; `None` means "not set or invalid"
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PersistedState {
    pub volume: Option<f32>,
    pub muted: Option<bool>,
    pub loop_mode: Option<LoopMode>,
    pub track_index: Option<usize>,
}

/// Prefix-namespaced reader/writer of [`PersistedState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceAdapter {
    prefix: String,
    enabled: bool,
}

impl PersistenceAdapter {
    pub fn new(prefix: impl Into<String>, enabled: bool) -> Self {
        Self {
            prefix: prefix.into(),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn volume_key(&self) -> String {
        format!("{}_vol", self.prefix)
    }

    pub fn muted_key(&self) -> String {
        format!("{}_muted", self.prefix)
    }

    pub fn loop_mode_key(&self) -> String {
        format!("{}_loopMode", self.prefix)
    }

    pub fn track_index_key(&self) -> String {
        format!("{}_trackIndex", self.prefix)
    }

    /// Load everything that is stored and valid for a playlist of `playlist_len`
    pub fn load(&self, store: &dyn KeyValueStore, playlist_len: usize) -> PersistedState {
        if !self.enabled {
            return PersistedState::default();
        }

        let volume = self
            .read(store, &self.volume_key())
            .and_then(|v| parse_number(&v))
            .map(|v| clamp01(v as f32));

        let muted = self
            .read(store, &self.muted_key())
            .and_then(|v| match v.trim() {
                "1" => Some(true),
                "0" => Some(false),
                _ => None,
            });

        let loop_mode = self
            .read(store, &self.loop_mode_key())
            .and_then(|v| v.parse::<LoopMode>().ok());

        let track_index = self
            .read(store, &self.track_index_key())
            .and_then(|v| parse_index(&v))
            .filter(|&i| i < playlist_len);

        let state = PersistedState {
            volume,
            muted,
            loop_mode,
            track_index,
        };
        debug!(prefix = %self.prefix, ?state, "Loaded persisted state");
        state
    }

    /// Persist target volume and mute flag
    pub fn save_volume(&self, store: &mut dyn KeyValueStore, volume: f32, muted: bool) {
        self.write(store, &self.volume_key(), &clamp01(volume).to_string());
        self.write(store, &self.muted_key(), if muted { "1" } else { "0" });
    }

    pub fn save_loop_mode(&self, store: &mut dyn KeyValueStore, mode: LoopMode) {
        self.write(store, &self.loop_mode_key(), mode.as_str());
    }

    pub fn save_track_index(&self, store: &mut dyn KeyValueStore, index: usize) {
        self.write(store, &self.track_index_key(), &index.to_string());
    }

    fn read(&self, store: &dyn KeyValueStore, key: &str) -> Option<String> {
        match store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to read persisted value");
                None
            }
        }
    }

    fn write(&self, store: &mut dyn KeyValueStore, key: &str, value: &str) {
        if !self.enabled {
            return;
        }
        if let Err(e) = store.set(key, value) {
            warn!(key, error = %e, "Failed to persist value");
        }
    }
}

impl Default for PersistenceAdapter {
    fn default() -> Self {
        Self::new(crate::types::DEFAULT_STORAGE_PREFIX, true)
    }
}
