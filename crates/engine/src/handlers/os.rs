// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! `os.exec` / `os.env.get`: run a subprocess or read an environment variable.

use super::require_str;
use coda_core::registry::{HandlerContext, ParamDescriptor, ParamType};
use coda_core::{Category, CodaError, HandlerRegistry};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn register(registry: &mut HandlerRegistry) {
    registry.register(
        "os.exec",
        "runs `command` with `arguments`, returns {stdout, stderr, status}",
        Category::Os,
        vec![
            ParamDescriptor::new("command", "the executable to run").mandatory(),
            ParamDescriptor::new("arguments", "command-line arguments")
                .typed(ParamType::Single("array".to_string())),
        ],
        Arc::new(|_ctx: HandlerContext, params: Value| Box::pin(exec(params))),
    );

    registry.register(
        "os.env.get",
        "returns the value of environment variable `name`, or null",
        Category::Os,
        vec![ParamDescriptor::new("name", "environment variable name").mandatory()],
        Arc::new(|_ctx: HandlerContext, params: Value| Box::pin(async move { env_get(&params) })),
    );
}

async fn exec(params: Value) -> Result<Value, CodaError> {
    let command = require_str(&params, "command", "os.exec")?;
    let arguments: Vec<String> = params
        .get("arguments")
        .and_then(Value::as_array)
        .map(|args| args.iter().filter_map(|a| a.as_str().map(str::to_string)).collect())
        .unwrap_or_default();

    let output = tokio::process::Command::new(command)
        .args(&arguments)
        .output()
        .await
        .map_err(|e| CodaError::HandlerError {
            uid: String::new(),
            action: "os.exec".to_string(),
            message: format!("failed to run '{command}': {e}"),
        })?;

    Ok(json!({
        "stdout": String::from_utf8_lossy(&output.stdout),
        "stderr": String::from_utf8_lossy(&output.stderr),
        "status": output.status.code().unwrap_or(-1),
    }))
}

fn env_get(params: &Value) -> Result<Value, CodaError> {
    let name = require_str(params, "name", "os.env.get")?;
    Ok(std::env::var(name).map_or(Value::Null, Value::String))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_a_command_and_captures_stdout() {
        let result = exec(json!({"command": "echo", "arguments": ["hi"]})).await.unwrap();
        assert_eq!(result["stdout"].as_str().unwrap().trim(), "hi");
        assert_eq!(result["status"], json!(0));
    }

    #[test]
    fn missing_env_var_resolves_to_null() {
        let result = env_get(&json!({"name": "CODA_DOES_NOT_EXIST_12345"})).unwrap();
        assert_eq!(result, Value::Null);
    }
}
