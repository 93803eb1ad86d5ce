// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! `file.read` / `file.write`: read or write a UTF-8 text file at `path`.

use super::require_str;
use coda_core::registry::{HandlerContext, ParamDescriptor};
use coda_core::{Category, CodaError, HandlerRegistry};
use serde_json::Value;
use std::sync::Arc;

pub fn register(registry: &mut HandlerRegistry) {
    registry.register(
        "file.read",
        "reads a UTF-8 text file at `path`",
        Category::File,
        vec![ParamDescriptor::new("path", "filesystem path to read").mandatory()],
        Arc::new(|_ctx: HandlerContext, params: Value| Box::pin(read(params))),
    );

    registry.register(
        "file.write",
        "writes `content` to a UTF-8 text file at `path`",
        Category::File,
        vec![
            ParamDescriptor::new("path", "filesystem path to write").mandatory(),
            ParamDescriptor::new("content", "text content to write").mandatory(),
        ],
        Arc::new(|_ctx: HandlerContext, params: Value| Box::pin(write(params))),
    );
}

async fn read(params: Value) -> Result<Value, CodaError> {
    let path = require_str(&params, "path", "file.read")?;
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| CodaError::HandlerError {
        uid: String::new(),
        action: "file.read".to_string(),
        message: format!("failed to read '{path}': {e}"),
    })?;
    Ok(Value::String(contents))
}

async fn write(params: Value) -> Result<Value, CodaError> {
    let path = require_str(&params, "path", "file.write")?.to_string();
    let content = require_str(&params, "content", "file.write")?.to_string();
    tokio::fs::write(&path, content).await.map_err(|e| CodaError::HandlerError {
        uid: String::new(),
        action: "file.write".to_string(),
        message: format!("failed to write '{path}': {e}"),
    })?;
    Ok(Value::Null)
}
