// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Serializes a finished [`Script`] back into its original document format.
//!
//! `store` is always present, `secrets` is never present, and
//! `logs`/`stats`/`extended` (settings + the operations map, for debugging)
//! are included only when their matching settings flag is set. For YAML
//! output the document is marshaled to JSON first and then re-marshaled to
//! YAML, so both formats see identical field ordering and value handling.

use crate::document::RawOperation;
use crate::Format;
use coda_core::{CodaError, Script};
use indexmap::IndexMap;
use serde_json::{json, Value};

/// Serializes `script`'s current state into `format`.
///
/// # Errors
///
/// Returns `CodaError::InternalError` if the assembled document cannot be
/// marshaled in the target format — an engine invariant violation, since
/// the document is built entirely from valid JSON values.
pub fn serialize(script: &Script, format: Format) -> Result<Vec<u8>, CodaError> {
    tracing::debug!(?format, extended = script.settings.extended, "serializing script state");

    let mut doc = serde_json::Map::new();
    doc.insert("store".to_string(), Value::Object(
        script.store.snapshot().into_iter().collect(),
    ));

    if script.settings.logs {
        doc.insert("logs".to_string(), json!(script.logs));
    }
    if script.settings.stats {
        doc.insert("stats".to_string(), serde_json::to_value(script.stats())
            .map_err(|e| CodaError::InternalError(format!("failed to marshal stats: {e}")))?);
    }
    if script.settings.extended {
        doc.insert(
            "coda".to_string(),
            json!({
                "logs": script.settings.logs,
                "stats": script.settings.stats,
                "extended": script.settings.extended,
            }),
        );
        let operations: IndexMap<String, RawOperation> = script
            .operations
            .iter()
            .map(|(uid, op)| {
                (
                    uid.clone(),
                    RawOperation {
                        action: op.action.clone(),
                        params: op.params.clone(),
                        store: op.store.clone(),
                        on_success: op.on_success.clone(),
                        on_fail: op.on_fail.clone(),
                        entrypoint: op.entrypoint,
                        is_async: op.is_async,
                    },
                )
            })
            .collect();
        doc.insert(
            "operations".to_string(),
            serde_json::to_value(operations)
                .map_err(|e| CodaError::InternalError(format!("failed to marshal operations: {e}")))?,
        );
    }

    let value = Value::Object(doc);

    match format {
        Format::Json => serde_json::to_vec_pretty(&value)
            .map_err(|e| CodaError::InternalError(format!("failed to marshal JSON output: {e}"))),
        Format::Yaml => serde_saphyr::to_string(&value)
            .map(String::into_bytes)
            .map_err(|e| CodaError::InternalError(format!("failed to marshal YAML output: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coda_core::{Operation, Settings, SourceFormat};
    use std::collections::{HashMap, HashSet};

    fn minimal_script(settings: Settings) -> Script {
        let mut store = indexmap::IndexMap::new();
        store.insert("out".to_string(), json!("hi"));
        let mut ops = HashMap::new();
        ops.insert("a".to_string(), Operation::new("string.echo"));
        Script::new(settings, store, indexmap::IndexMap::new(), ops, SourceFormat::Json, HashSet::new())
    }

    #[test]
    fn store_is_always_present() {
        let script = minimal_script(Settings::default());
        let out = serialize(&script, Format::Json).unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["store"]["out"], json!("hi"));
    }

    #[test]
    fn secrets_never_appear() {
        let mut script = minimal_script(Settings { extended: true, ..Settings::default() });
        script.secrets.insert("api_key".to_string(), json!("s3cr3t"));
        let out = serialize(&script, Format::Json).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("s3cr3t"));
        assert!(!text.contains("secrets"));
    }

    #[test]
    fn logs_omitted_unless_enabled() {
        let script = minimal_script(Settings::default());
        let out = serialize(&script, Format::Json).unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert!(value.get("logs").is_none());
    }

    #[test]
    fn logs_included_when_enabled() {
        let mut script = minimal_script(Settings { logs: true, ..Settings::default() });
        script.log("started");
        let out = serialize(&script, Format::Json).unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["logs"], json!(["started"]));
    }

    #[test]
    fn extended_includes_settings_and_operations() {
        let script = minimal_script(Settings { extended: true, ..Settings::default() });
        let out = serialize(&script, Format::Json).unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert!(value.get("coda").is_some());
        assert!(value["operations"].get("a").is_some());
    }
}
