// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! `time.sleep`: suspends for `duration_ms` milliseconds, returns `null`.
//! The reference async-friendly handler — commonly combined with `async: true`
//! so routing proceeds immediately while the sleep runs in the background.

use coda_core::registry::{HandlerContext, ParamDescriptor, ParamType};
use coda_core::{Category, CodaError, HandlerRegistry};
use serde_json::Value;
use std::sync::Arc;

pub fn register(registry: &mut HandlerRegistry) {
    registry.register(
        "time.sleep",
        "suspends for `duration_ms` milliseconds",
        Category::Time,
        vec![ParamDescriptor::new("duration_ms", "milliseconds to sleep")
            .mandatory()
            .typed(ParamType::Single("number".to_string()))],
        Arc::new(|_ctx: HandlerContext, params: Value| {
            Box::pin(async move {
                let duration_ms = duration_ms(&params)?;
                tokio::time::sleep(std::time::Duration::from_millis(duration_ms)).await;
                Ok(Value::Null)
            })
        }),
    );
}

fn duration_ms(params: &Value) -> Result<u64, CodaError> {
    params
        .get("duration_ms")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| CodaError::HandlerError {
            uid: String::new(),
            action: "time.sleep".to_string(),
            message: "missing or non-numeric parameter 'duration_ms'".to_string(),
        })
}
