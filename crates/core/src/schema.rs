// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Builds the JSON-Schema-style validation document derived from a
//! [`HandlerRegistry`]'s current contents, and validates incoming script
//! documents against it.
//!
//! The schema is assembled by hand rather than derived, because it has to
//! be generated dynamically from whatever handlers happen to be registered
//! at engine-construction time — there is no static Rust type whose shape
//! mirrors "one `Operation` variant per registered action".

use crate::registry::{HandlerRegistry, ParamType};
use serde_json::{json, Map, Value};

/// Builds the top-level validation schema for the given registry.
///
/// The schema shape is a top-level object with `coda`, `store`, and
/// `operations` properties, where `operations` maps UIDs to the `anyOf`
/// disjunction of every registered operation variant.
#[must_use]
pub fn build(registry: &HandlerRegistry) -> Value {
    tracing::debug!(handlers = registry.len(), "building validation schema");

    let mut defs = Map::new();
    let mut variant_refs = Vec::new();

    let mut names: Vec<&str> = registry.iter().map(|e| e.name.as_str()).collect();
    names.sort_unstable();

    for name in names {
        let entry = registry.get(name).expect("name came from this registry");
        let def_name = format!("Operation_{name}");
        let mut param_props = Map::new();
        let mut required = Vec::new();

        for param in &entry.params {
            param_props.insert(param.name.clone(), param_type_schema(&param.ty));
            if param.mandatory {
                required.push(Value::String(param.name.clone()));
            }
        }

        let mut operation_props = Map::new();
        operation_props.insert("action".to_string(), json!({ "const": entry.name }));
        operation_props.insert(
            "params".to_string(),
            json!({
                "type": "object",
                "properties": param_props,
                "required": required,
                "additionalProperties": false,
            }),
        );
        operation_props.insert("store".to_string(), json!({ "type": "string" }));
        operation_props.insert("onSuccess".to_string(), json!({ "type": "string" }));
        operation_props.insert("onFail".to_string(), json!({ "type": "string" }));
        operation_props.insert("entrypoint".to_string(), json!({ "type": "boolean" }));
        operation_props.insert("async".to_string(), json!({ "type": "boolean" }));

        let def = json!({
            "type": "object",
            "properties": operation_props,
            "required": ["action"],
            "additionalProperties": false,
        });

        defs.insert(def_name.clone(), def);
        variant_refs.push(json!({ "$ref": format!("#/$defs/{def_name}") }));
    }

    defs.insert("Operation".to_string(), json!({ "anyOf": variant_refs }));

    // The flat list form is validated loosely — only that each step names
    // an `action` — since it is lowered into the canonical graph form (and
    // validated per-handler there) before the engine ever sees it.
    defs.insert(
        "ListStep".to_string(),
        json!({
            "type": "object",
            "properties": {
                "action": { "type": "string" },
                "params": {},
                "store": { "type": "string" },
                "async": { "type": "boolean" },
                "onFail": { "type": "array", "items": { "$ref": "#/$defs/ListStep" } },
            },
            "required": ["action"],
            "additionalProperties": false,
        }),
    );

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": {
            "coda": {
                "type": "object",
                "properties": {
                    "logs": { "type": "boolean" },
                    "stats": { "type": "boolean" },
                    "extended": { "type": "boolean" },
                },
                "additionalProperties": false,
            },
            "store": { "type": "object" },
            "secrets": { "type": "object" },
            "operations": {
                "anyOf": [
                    {
                        "type": "object",
                        "additionalProperties": { "$ref": "#/$defs/Operation" },
                    },
                    {
                        "type": "array",
                        "items": { "$ref": "#/$defs/ListStep" },
                    },
                ],
            },
        },
        "required": ["operations"],
        "additionalProperties": false,
        "$defs": defs,
    })
}

/// A parameter's declared type always admits `string` in addition to its
/// own type, so that unresolved `${...}` expressions validate prior to
/// resolution.
fn param_type_schema(ty: &ParamType) -> Value {
    let mut types = match ty {
        ParamType::Any => return json!({}),
        ParamType::Single(t) => vec![t.clone()],
        ParamType::Union(ts) => ts.clone(),
    };
    if !types.iter().any(|t| t == "string") {
        types.push("string".to_string());
    }
    if types.len() == 1 {
        json!({ "type": types[0] })
    } else {
        json!({ "type": types })
    }
}
