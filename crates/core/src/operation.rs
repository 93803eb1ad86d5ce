// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The canonical, in-memory graph-form `Operation` node.
//!
//! This is the internal shape the engine walks. The list form accepted at
//! the document boundary (see `coda-api`) is lowered into this shape by the
//! loader before the engine ever sees it.

use serde_json::Value;

/// A single node in a script's flow graph, identified by its UID in the
/// owning `Script::operations` map.
#[derive(Debug, Clone)]
pub struct Operation {
    pub action: String,
    pub params: Value,
    pub store: Option<String>,
    pub on_success: Option<String>,
    pub on_fail: Option<String>,
    pub entrypoint: bool,
    pub is_async: bool,
}

impl Operation {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: Value::Null,
            store: None,
            on_success: None,
            on_fail: None,
            entrypoint: false,
            is_async: false,
        }
    }

    /// Projects this operation into the JSON shape used by the variable
    /// resolver's `${operations.<uid>...}` namespace, mirroring the wire
    /// field names.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "action": self.action,
            "params": self.params,
            "store": self.store,
            "onSuccess": self.on_success,
            "onFail": self.on_fail,
            "entrypoint": self.entrypoint,
            "async": self.is_async,
        })
    }
}

/// Output-inclusion flags carried by a script's `coda` settings block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub logs: bool,
    pub stats: bool,
    pub extended: bool,
}

/// The document's original encoding, remembered so the Serializer can
/// round-trip into the same format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Yaml,
}
