// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! `string.echo`: returns its `value` parameter unchanged. The canonical
//! no-op fixture handler, used throughout the engine's own tests.

use coda_core::registry::{HandlerContext, ParamDescriptor};
use coda_core::{Category, CodaError, HandlerRegistry};
use serde_json::Value;
use std::sync::Arc;

pub fn register(registry: &mut HandlerRegistry) {
    registry.register(
        "string.echo",
        "returns its `value` parameter unchanged",
        Category::String,
        vec![ParamDescriptor::new("value", "the value to echo").mandatory()],
        Arc::new(|_ctx: HandlerContext, params: Value| {
            Box::pin(async move { echo(&params) })
        }),
    );
}

fn echo(params: &Value) -> Result<Value, CodaError> {
    Ok(params.get("value").cloned().unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn echoes_the_value_parameter() {
        assert_eq!(echo(&json!({"value": "hi"})).unwrap(), json!("hi"));
    }

    #[test]
    fn missing_value_echoes_null() {
        assert_eq!(echo(&json!({})).unwrap(), Value::Null);
    }
}
