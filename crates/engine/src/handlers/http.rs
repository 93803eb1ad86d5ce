// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! `http.request`: performs an HTTP call and returns `{status, headers, body}`.

use super::require_str;
use coda_core::registry::{HandlerContext, ParamDescriptor, ParamType};
use coda_core::{Category, CodaError, HandlerRegistry};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub fn register(registry: &mut HandlerRegistry, default_timeout_ms: u64) {
    registry.register(
        "http.request",
        "performs an HTTP call and returns {status, headers, body}",
        Category::Http,
        vec![
            ParamDescriptor::new("url", "the request URL").mandatory(),
            ParamDescriptor::new("method", "HTTP method, default GET"),
            ParamDescriptor::new("headers", "request headers")
                .typed(ParamType::Single("object".to_string())),
            ParamDescriptor::new("body", "request body").typed(ParamType::Any),
            ParamDescriptor::new("timeout_ms", "overrides the engine's default request timeout")
                .typed(ParamType::Single("number".to_string())),
        ],
        Arc::new(move |_ctx: HandlerContext, params: Value| {
            Box::pin(request(params, default_timeout_ms))
        }),
    );
}

async fn request(params: Value, default_timeout_ms: u64) -> Result<Value, CodaError> {
    let url = require_str(&params, "url", "http.request")?;
    let method = params
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or("GET")
        .to_uppercase();

    let timeout_ms = params.get("timeout_ms").and_then(Value::as_u64).unwrap_or(default_timeout_ms);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| CodaError::HandlerError {
            uid: String::new(),
            action: "http.request".to_string(),
            message: format!("failed to build HTTP client: {e}"),
        })?;

    let method = reqwest::Method::from_bytes(method.as_bytes()).map_err(|e| CodaError::HandlerError {
        uid: String::new(),
        action: "http.request".to_string(),
        message: format!("invalid HTTP method: {e}"),
    })?;

    let mut builder = client.request(method, url);

    if let Some(headers) = params.get("headers").and_then(Value::as_object) {
        for (name, value) in headers {
            if let Some(value) = value.as_str() {
                builder = builder.header(name, value);
            }
        }
    }

    if let Some(body) = params.get("body") {
        if !body.is_null() {
            builder = builder.json(body);
        }
    }

    let response = builder.send().await.map_err(|e| CodaError::HandlerError {
        uid: String::new(),
        action: "http.request".to_string(),
        message: format!("request to '{url}' failed: {e}"),
    })?;

    let status = response.status().as_u16();
    let headers: serde_json::Map<String, Value> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value.to_str().ok().map(|v| (name.to_string(), Value::String(v.to_string())))
        })
        .collect();

    let body = response.text().await.map_err(|e| CodaError::HandlerError {
        uid: String::new(),
        action: "http.request".to_string(),
        message: format!("failed to read response body from '{url}': {e}"),
    })?;

    Ok(json!({ "status": status, "headers": headers, "body": body }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_a_url() {
        let params = json!({});
        assert!(require_str(&params, "url", "http.request").is_err());
    }
}
