// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The variable resolver: expands `${path|filter:arg|...}` expressions
//! found inside operation parameters against the live store, applying an
//! optional chain of filters to the resolved value.
//!
//! Resolution walks the parameter tree depth-first. Every string leaf is
//! scanned for expressions; a leaf that is *exactly one* expression (and
//! nothing else) is replaced by the resolved value's own JSON type, so
//! `"${count}"` can become a number or an object. A leaf with an expression
//! embedded in surrounding text has the resolved value stringified and
//! spliced in, the way `"hello ${name}"` becomes `"hello world"`.
//!
//! A path that doesn't resolve to anything in the store is not an error —
//! it resolves to `null`, mirroring the originating implementation's
//! "absent means empty" stance. The only failure mode is a malformed
//! expression (e.g. an empty path, or a filter that requires an argument
//! but wasn't given one).

use crate::error::CodaError;
use crate::stats::CodaStats;
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use sha2::Digest as _;

static EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^{}]*)\}").expect("static regex is valid"));

/// Resolves every `${...}` expression found anywhere in `value` against
/// `context` (typically a snapshot of the store), accumulating variable
/// counters into `stats`.
pub fn resolve(value: &Value, context: &Value, stats: &mut CodaStats) -> Result<Value, CodaError> {
    match value {
        Value::String(s) => resolve_string(s, context, stats).map(|v| v),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(resolve(item, context, stats)?);
            }
            Ok(Value::Array(out))
        }
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), resolve(v, context, stats)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn resolve_string(s: &str, context: &Value, stats: &mut CodaStats) -> Result<Value, CodaError> {
    let Some(whole) = as_single_expression(s) else {
        if !EXPRESSION.is_match(s) {
            return Ok(Value::String(s.to_string()));
        }
        let mut failed = false;
        let mut err = None;
        let expanded = EXPRESSION.replace_all(s, |caps: &regex::Captures| {
            stats.record_variable_attempt();
            match evaluate_expression(&caps[1], context) {
                Ok(v) => {
                    stats.record_variable_success();
                    stringify(&v)
                }
                Err(e) => {
                    stats.record_variable_failure();
                    failed = true;
                    err = Some(e);
                    String::new()
                }
            }
        });
        if failed {
            return Err(err.expect("failed implies err is set"));
        }
        return Ok(Value::String(expanded.into_owned()));
    };

    stats.record_variable_attempt();
    match evaluate_expression(whole, context) {
        Ok(v) => {
            stats.record_variable_success();
            Ok(v)
        }
        Err(e) => {
            stats.record_variable_failure();
            Err(e)
        }
    }
}

/// If `s` is exactly one `${...}` expression with no surrounding text,
/// returns the expression's inner contents.
fn as_single_expression(s: &str) -> Option<&str> {
    let caps = EXPRESSION.captures(s)?;
    let m = caps.get(0)?;
    if m.start() == 0 && m.end() == s.len() {
        Some(caps.get(1)?.as_str())
    } else {
        None
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn evaluate_expression(expr: &str, context: &Value) -> Result<Value, CodaError> {
    let mut parts = expr.split('|');
    let path = parts.next().unwrap_or("").trim();
    if path.is_empty() {
        return Err(CodaError::ResolveError {
            uid: String::new(),
            message: format!("empty variable path in expression '${{{expr}}}'"),
        });
    }

    let mut value = lookup_path(context, path);
    for filter in parts {
        value = apply_filter(filter.trim(), value);
    }
    Ok(value)
}

fn lookup_path(context: &Value, path: &str) -> Value {
    let mut current = context;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(next) => current = next,
            None => return Value::Null,
        }
    }
    current.clone()
}

/// Applies a single named filter to `value`. Filter application never
/// fails: an unknown filter or a type mismatch simply yields the input
/// value unchanged. `join` only operates on a `Value::Array`; every other
/// filter below except `string`/`jsonEncode` only operates on a
/// `Value::String` input — any other JSON type passes through untouched,
/// matching the originating implementation's `if s, ok := val.(string); ok
/// { ... }` guard on each such filter.
fn apply_filter(filter: &str, value: Value) -> Value {
    let (name, arg) = match filter.split_once(':') {
        Some((n, a)) => (n, Some(a)),
        None => (filter, None),
    };

    if name == "string" {
        return Value::String(text(&value));
    }
    if name == "jsonEncode" {
        return Value::String(value.to_string());
    }
    if name == "join" {
        let sep = arg.unwrap_or(",");
        return match &value {
            Value::Array(items) => {
                Value::String(items.iter().map(text).collect::<Vec<_>>().join(sep))
            }
            _ => value,
        };
    }

    let Value::String(s) = &value else {
        // Unknown filters and every remaining string-only filter pass a
        // non-string input through unchanged.
        return value;
    };

    match name {
        "upper" => Value::String(s.to_uppercase()),
        "lower" => Value::String(s.to_lowercase()),
        "trim" => Value::String(s.trim().to_string()),
        "split" => {
            let sep = arg.unwrap_or(".");
            Value::Array(s.split(sep).map(|p| Value::String(p.to_string())).collect())
        }
        "md5" => Value::String(format!("{:x}", md5::Md5::digest(s.as_bytes()))),
        "sha1" => Value::String(format!("{:x}", sha1::Sha1::digest(s.as_bytes()))),
        "sha256" => Value::String(format!("{:x}", sha2::Sha256::digest(s.as_bytes()))),
        "sha512" => Value::String(format!("{:x}", sha2::Sha512::digest(s.as_bytes()))),
        "base64Encode" => {
            Value::String(base64::engine::general_purpose::STANDARD.encode(s.as_bytes()))
        }
        "base64Decode" => match base64::engine::general_purpose::STANDARD.decode(s.as_bytes()) {
            Ok(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
            Err(_) => Value::String(s.clone()),
        },
        "jsonDecode" => serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.clone())),
        // Unknown filters pass the value through unchanged.
        _ => Value::String(s.clone()),
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
