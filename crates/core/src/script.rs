// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The in-memory `Script`: a loaded graph of [`Operation`]s plus the
//! mutable state (store, stats, logs, blacklist) the engine walks during a
//! run.
//!
//! A `Script` is produced once by the loader (`coda-api`) and then owned
//! exclusively by the engine for the duration of one run; the loader never
//! touches it again afterward, and the serializer only reads it once the
//! run has finished.

use crate::category::Category;
use crate::error::CodaError;
use crate::operation::{Operation, Settings, SourceFormat};
use crate::stats::CodaStats;
use crate::store::Store;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// A fully loaded, runnable script.
pub struct Script {
    pub settings: Settings,
    pub store: Store,
    pub secrets: IndexMap<String, Value>,
    pub operations: HashMap<String, Operation>,
    pub logs: Vec<String>,
    pub blacklist: HashSet<Category>,
    pub source: SourceFormat,
}

impl Script {
    pub fn new(
        settings: Settings,
        store: IndexMap<String, Value>,
        secrets: IndexMap<String, Value>,
        operations: HashMap<String, Operation>,
        source: SourceFormat,
        blacklist: HashSet<Category>,
    ) -> Self {
        Self {
            settings,
            store: Store::from_map(store),
            secrets,
            operations,
            logs: Vec::new(),
            blacklist,
            source,
        }
    }

    pub fn log(&mut self, line: impl Into<String>) {
        self.logs.push(line.into());
    }

    pub fn stats(&self) -> CodaStats {
        self.store.stats_snapshot()
    }

    /// Returns the UID of the script's unique entrypoint operation.
    ///
    /// # Errors
    ///
    /// Returns `GraphError` if zero or more than one operation declares
    /// itself an entrypoint.
    pub fn find_entrypoint(&self) -> Result<&str, CodaError> {
        let mut found: Option<&str> = None;
        for (uid, op) in &self.operations {
            if op.entrypoint {
                if found.is_some() {
                    return Err(CodaError::GraphError(
                        "script declares more than one entrypoint".to_string(),
                    ));
                }
                found = Some(uid.as_str());
            }
        }
        found.ok_or_else(|| CodaError::GraphError("script declares no entrypoint".to_string()))
    }

    /// Validates every `onSuccess`/`onFail` edge: it must be empty, or else
    /// name an existing UID that isn't the operation's own.
    ///
    /// # Errors
    ///
    /// Returns `GraphError` describing the first offending edge found.
    pub fn validate_links(&self) -> Result<(), CodaError> {
        for (uid, op) in &self.operations {
            for (label, target) in [("onSuccess", &op.on_success), ("onFail", &op.on_fail)] {
                let Some(target) = target else { continue };
                if target == uid {
                    return Err(CodaError::GraphError(format!(
                        "operation '{uid}' has a self-referential {label} edge"
                    )));
                }
                if !self.operations.contains_key(target) {
                    return Err(CodaError::GraphError(format!(
                        "operation '{uid}' has a {label} edge to unknown UID '{target}'"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Projects the full script state as one JSON document, the lookup
    /// context used by the variable resolver. Store and stats are read
    /// together under one lock acquisition, so a concurrently running
    /// background operation can't be observed mid-write.
    pub fn state_snapshot(&self) -> Value {
        let coda = serde_json::json!({
            "logs": self.settings.logs,
            "stats": self.settings.stats,
            "extended": self.settings.extended,
        });
        let (store, stats) = self.store.with(|state| (state.store.clone(), state.stats.clone()));
        let operations: serde_json::Map<String, Value> = self
            .operations
            .iter()
            .map(|(uid, op)| (uid.clone(), op.to_json()))
            .collect();
        serde_json::json!({
            "coda": coda,
            "store": store,
            "secrets": self.secrets,
            "stats": stats,
            "logs": self.logs,
            "operations": operations,
        })
    }
}
