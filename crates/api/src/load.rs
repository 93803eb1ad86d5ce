// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Parses a raw document (JSON or YAML) into a runnable [`coda_core::Script`].
//!
//! YAML input that looks like JSON-in-disguise (starts with `{` or `[`) is
//! rejected outright — the caller should have used the JSON pathway.
//! Everything else is converted to a `serde_json::Value` first and
//! validated against the schema generated from the engine's handler
//! registry, so both formats go through exactly one validation path.

use crate::document::{Document, OperationsShape, RawOperation};
use crate::list;
use crate::Format;
use coda_core::{CodaError, HandlerRegistry, Operation, Script, Settings, SourceFormat};
use std::collections::{HashMap, HashSet};

/// Loads `input` as `format`, validating it against `registry`'s generated
/// schema and seeding the script's blacklist from `default_blacklist`.
///
/// # Errors
///
/// Returns `CodaError::BadInput` for a JSON-in-disguise YAML document, a
/// parse failure, or a schema violation.
pub fn load(
    input: &[u8],
    format: Format,
    registry: &HandlerRegistry,
    default_blacklist: &HashSet<coda_core::Category>,
) -> Result<Script, CodaError> {
    tracing::debug!(?format, bytes = input.len(), "loading script document");

    if matches!(format, Format::Yaml) {
        reject_json_in_disguise(input)?;
    }

    let as_json: serde_json::Value = match format {
        Format::Json => serde_json::from_slice(input)
            .map_err(|e| CodaError::BadInput(format!("invalid JSON: {e}")))?,
        Format::Yaml => {
            let text = std::str::from_utf8(input)
                .map_err(|e| CodaError::BadInput(format!("YAML input is not UTF-8: {e}")))?;
            serde_saphyr::from_str(text)
                .map_err(|e| CodaError::BadInput(format!("invalid YAML: {e}")))?
        }
    };

    let schema = coda_core::schema::build(registry);
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| CodaError::InternalError(format!("invalid generated schema: {e}")))?;
    if let jsonschema::BasicOutput::Invalid(errors) = validator.apply(&as_json).basic() {
        let messages = errors.iter().fold(String::new(), |acc, e| {
            format!("{acc}\n{} at {}", e.error_description(), e.instance_location())
        });
        return Err(CodaError::BadInput(format!("schema violation:{messages}")));
    }

    let document: Document = serde_json::from_value(as_json)
        .map_err(|e| CodaError::BadInput(format!("document did not match expected shape: {e}")))?;

    let graph = match document.operations {
        OperationsShape::Graph(map) => map,
        OperationsShape::List(steps) => list::lower(steps),
    };

    let operations = graph
        .into_iter()
        .map(|(uid, raw)| (uid, to_core_operation(raw)))
        .collect::<HashMap<_, _>>();

    let settings = document.coda.map_or_else(Settings::default, |s| Settings {
        logs: s.logs,
        stats: s.stats,
        extended: s.extended,
    });

    let source = match format {
        Format::Json => SourceFormat::Json,
        Format::Yaml => SourceFormat::Yaml,
    };

    tracing::debug!(operations = operations.len(), "script document loaded");

    Ok(Script::new(
        settings,
        document.store,
        document.secrets,
        operations,
        source,
        default_blacklist.clone(),
    ))
}

fn to_core_operation(raw: RawOperation) -> Operation {
    Operation {
        action: raw.action,
        params: raw.params,
        store: raw.store,
        on_success: raw.on_success,
        on_fail: raw.on_fail,
        entrypoint: raw.entrypoint,
        is_async: raw.is_async,
    }
}

fn reject_json_in_disguise(input: &[u8]) -> Result<(), CodaError> {
    let first_non_ws = input.iter().find(|b| !b.is_ascii_whitespace());
    if matches!(first_non_ws, Some(b'{') | Some(b'[')) {
        return Err(CodaError::BadInput(
            "input declared as YAML begins with '{' or '[' — use the JSON pathway instead"
                .to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coda_core::registry::{HandlerContext, ParamDescriptor};
    use coda_core::Category;
    use std::sync::Arc;

    fn registry() -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        registry.register(
            "string.echo",
            "echoes its input",
            Category::String,
            vec![ParamDescriptor::new("value", "the value to echo").mandatory()],
            Arc::new(|_: HandlerContext, params| Box::pin(async move { Ok(params) })),
        );
        registry
    }

    #[test]
    fn rejects_yaml_that_looks_like_json() {
        let registry = registry();
        let err = load(b"{\"operations\": {}}", Format::Yaml, &registry, &HashSet::new())
            .unwrap_err();
        assert!(matches!(err, CodaError::BadInput(_)));
    }

    #[test]
    fn loads_a_minimal_graph_form_document() {
        let registry = registry();
        let input = br#"{
            "operations": {
                "a": { "action": "string.echo", "entrypoint": true, "params": { "value": "hi" } }
            }
        }"#;
        let script = load(input, Format::Json, &registry, &HashSet::new()).unwrap();
        assert_eq!(script.operations.len(), 1);
        assert!(script.operations["a"].entrypoint);
    }

    #[test]
    fn loads_a_list_form_document_and_lowers_it() {
        let registry = registry();
        let input = br#"{
            "operations": [
                { "action": "string.echo", "params": { "value": "a" } },
                { "action": "string.echo", "params": { "value": "b" } }
            ]
        }"#;
        let script = load(input, Format::Json, &registry, &HashSet::new()).unwrap();
        assert_eq!(script.operations.len(), 2);
        assert!(script.operations["step_0"].entrypoint);
        assert_eq!(script.operations["step_0"].on_success.as_deref(), Some("step_1"));
    }

    #[test]
    fn rejects_document_with_unknown_action() {
        let registry = registry();
        let input = br#"{
            "operations": {
                "a": { "action": "does.not.exist", "entrypoint": true }
            }
        }"#;
        let err = load(input, Format::Json, &registry, &HashSet::new()).unwrap_err();
        assert!(matches!(err, CodaError::BadInput(_)));
    }
}
