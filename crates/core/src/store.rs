// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The concurrency-safe key/value store mutated by operations during a run.
//!
//! [`Store`] and [`crate::stats::CodaStats`] live behind a single lock
//! ([`EngineState`]) so that a store write and its corresponding stats
//! update are always applied as one atomic step.

use crate::stats::CodaStats;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::{Arc, RwLock};

/// Insertion-ordered string -> JSON map. Order is preserved for round-trip
/// serialization fidelity.
pub type StoreMap = IndexMap<String, Value>;

/// The mutable state shared between the engine's main loop and any
/// in-flight asynchronous operations: the store itself and the stats
/// counters, guarded by one lock.
#[derive(Debug, Default)]
pub struct EngineState {
    pub store: StoreMap,
    pub stats: CodaStats,
}

/// A cloneable handle around the shared, lock-protected engine state.
#[derive(Clone, Debug, Default)]
pub struct Store {
    inner: Arc<RwLock<EngineState>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: StoreMap) -> Self {
        Self { inner: Arc::new(RwLock::new(EngineState { store: map, stats: CodaStats::default() })) }
    }

    /// Acquires the write lock and runs `f` against the shared state.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned, i.e. a prior holder panicked while
    /// writing. This mirrors the rest of the engine: a poisoned lock means a
    /// programming bug, not a recoverable runtime condition.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut EngineState) -> R) -> R {
        #[allow(clippy::unwrap_used)]
        let mut guard = self.inner.write().unwrap();
        f(&mut guard)
    }

    /// Acquires the read lock and runs `f` against the shared state.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    pub fn with<R>(&self, f: impl FnOnce(&EngineState) -> R) -> R {
        #[allow(clippy::unwrap_used)]
        let guard = self.inner.read().unwrap();
        f(&guard)
    }

    /// Snapshot of the current store contents as a plain JSON object.
    pub fn snapshot(&self) -> StoreMap {
        self.with(|state| state.store.clone())
    }

    pub fn stats_snapshot(&self) -> CodaStats {
        self.with(|state| state.stats.clone())
    }

    /// Writes `result` under `key`, following the dotted-path rules of
    /// the rules below. A no-op if `result` is `Value::Null` (treated as
    /// "empty").
    pub fn write(&self, key: &str, result: Value) {
        if result.is_null() {
            return;
        }
        self.with_mut(|state| {
            if key.contains('.') {
                write_nested(&mut state.store, key, result);
            } else {
                state.store.insert(key.to_string(), result);
            }
        });
    }
}

/// Implements the dotted-path write: the root segment must hold an object
/// (created or destructively replaced if it currently holds something
/// else), intermediate segments are created or replaced the same way, and
/// the final segment is set to `result`.
fn write_nested(store: &mut StoreMap, path: &str, result: Value) {
    let parts: Vec<&str> = path.split('.').collect();
    debug_assert!(parts.len() >= 2, "write_nested called with an undotted key");

    let root_key = parts[0];
    let mut root_obj = match store.get(root_key) {
        Some(Value::Object(map)) => map.clone(),
        _ => serde_json::Map::new(),
    };

    {
        let mut current = &mut root_obj;
        for segment in &parts[1..parts.len() - 1] {
            let entry = current
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(serde_json::Map::new());
            }
            current = entry
                .as_object_mut()
                .expect("entry was just forced to Value::Object above");
        }
        let last_key = parts[parts.len() - 1];
        current.insert(last_key.to_string(), result);
    }

    store.insert(root_key.to_string(), Value::Object(root_obj));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn simple_write_sets_key() {
        let store = Store::new();
        store.write("out", json!("hi"));
        assert_eq!(store.snapshot().get("out"), Some(&json!("hi")));
    }

    #[test]
    fn null_result_is_a_no_op() {
        let store = Store::new();
        store.write("out", Value::Null);
        assert!(store.snapshot().get("out").is_none());
    }

    #[test]
    fn dotted_write_creates_nested_object() {
        let store = Store::new();
        store.write("nested.deep.leaf", json!({"k": 1}));
        assert_eq!(
            store.snapshot().get("nested"),
            Some(&json!({"deep": {"leaf": {"k": 1}}}))
        );
    }

    #[test]
    fn dotted_write_destructively_replaces_non_object_root() {
        let store = Store::new();
        store.write("nested", json!("scalar"));
        store.write("nested.leaf", json!(42));
        assert_eq!(store.snapshot().get("nested"), Some(&json!({"leaf": 42})));
    }

    #[test]
    fn dotted_write_destructively_replaces_non_object_intermediate() {
        let store = Store::new();
        store.write("nested.mid", json!("scalar"));
        store.write("nested.mid.leaf", json!(1));
        assert_eq!(
            store.snapshot().get("nested"),
            Some(&json!({"mid": {"leaf": 1}}))
        );
    }
}
