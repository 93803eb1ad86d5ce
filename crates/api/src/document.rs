// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Serde DTOs for the document boundary: what a script looks like on the
//! wire, before it is lowered into `coda_core::Script`.
//!
//! These types are intentionally permissive (lots of `Option`/`#[serde(default)]`)
//! because the real validation happens against the generated schema in
//! [`crate::load`], not through serde's own error messages.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `coda` settings block.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSettings {
    #[serde(default)]
    pub logs: bool,
    #[serde(default)]
    pub stats: bool,
    #[serde(default)]
    pub extended: bool,
}

/// One operation in the canonical graph-form document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawOperation {
    pub action: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    #[serde(default, rename = "onSuccess", skip_serializing_if = "Option::is_none")]
    pub on_success: Option<String>,
    #[serde(default, rename = "onFail", skip_serializing_if = "Option::is_none")]
    pub on_fail: Option<String>,
    #[serde(default)]
    pub entrypoint: bool,
    #[serde(default, rename = "async")]
    pub is_async: bool,
}

/// One step in the flat list form (the alternate, implicitly-sequential
/// input shape lowered into the canonical graph at load time).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListStep {
    pub action: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    #[serde(default, rename = "onFail", skip_serializing_if = "Option::is_none")]
    pub on_fail: Option<Vec<ListStep>>,
    #[serde(default, rename = "async")]
    pub is_async: bool,
}

/// `operations` is either the canonical UID -> operation map, or the flat
/// list form the loader lowers before the engine ever sees it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OperationsShape {
    Graph(IndexMap<String, RawOperation>),
    List(Vec<ListStep>),
}

/// The top-level wire document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coda: Option<RawSettings>,
    #[serde(default)]
    pub store: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub secrets: IndexMap<String, Value>,
    pub operations: OperationsShape,
}
