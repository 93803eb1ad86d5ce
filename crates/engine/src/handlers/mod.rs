// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The built-in handler set: a small, representative catalogue
//! registered by default so the engine is exercisable end-to-end without a
//! caller supplying anything. Not an exhaustive operation library — a
//! production deployment registers additional handlers (S3 transfer,
//! AI/LLM calls, chat notifications) against the same `HandlerRegistry`
//! contract.

mod file;
mod http;
mod os;
mod string;
mod time;

use coda_core::HandlerRegistry;

/// Registers every built-in handler into `registry`.
pub fn register_all(registry: &mut HandlerRegistry, http_default_timeout_ms: u64) {
    string::register(registry);
    time::register(registry);
    file::register(registry);
    http::register(registry, http_default_timeout_ms);
    os::register(registry);
}

/// Extracts a mandatory string parameter, returning a `HandlerError` (UID
/// filled in later by the engine) if it is absent or the wrong type.
fn require_str<'a>(params: &'a serde_json::Value, name: &str, action: &str) -> Result<&'a str, coda_core::CodaError> {
    params
        .get(name)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| coda_core::CodaError::HandlerError {
            uid: String::new(),
            action: action.to_string(),
            message: format!("missing or non-string parameter '{name}'"),
        })
}
