// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! End-to-end graph scenarios exercising the engine against the built-in
//! handler set.

use coda_api::{load, serialize, Format};
use coda_core::CodaError;
use coda_engine::{blacklist, Engine};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[tokio::test]
async fn linear_success_chains_through_on_success() {
    init_tracing();
    let engine = Engine::new();
    let input = br#"{
        "operations": {
            "a": {
                "action": "string.echo",
                "entrypoint": true,
                "params": { "value": "first" },
                "store": "first_out",
                "onSuccess": "b"
            },
            "b": {
                "action": "string.echo",
                "params": { "value": "second" },
                "store": "second_out"
            }
        }
    }"#;
    let mut script = load(input, Format::Json, engine.registry(), &Default::default()).unwrap();
    engine.run(&mut script).await.unwrap();

    let store = script.store.snapshot();
    assert_eq!(store["first_out"], "first");
    assert_eq!(store["second_out"], "second");
}

#[tokio::test]
async fn on_fail_routes_to_recovery_node() {
    let engine = Engine::new();
    // The schema rejects an unregistered action outright, so this scenario
    // is exercised against the in-memory graph directly rather than via the
    // loader's validation path.
    let mut ops = std::collections::HashMap::new();
    let mut a = coda_core::Operation::new("missing.handler");
    a.entrypoint = true;
    a.on_fail = Some("recover".to_string());
    let mut recover = coda_core::Operation::new("string.echo");
    recover.params = serde_json::json!({"value": "recovered"});
    recover.store = Some("out".to_string());
    ops.insert("a".to_string(), a);
    ops.insert("recover".to_string(), recover);

    let mut script = coda_core::Script::new(
        coda_core::Settings::default(),
        indexmap::IndexMap::new(),
        indexmap::IndexMap::new(),
        ops,
        coda_core::SourceFormat::Json,
        std::collections::HashSet::new(),
    );
    engine.run(&mut script).await.unwrap();
    assert_eq!(script.store.snapshot()["out"], "recovered");
    assert_eq!(script.stats().operations_failed_total, 1.0);
    assert_eq!(script.stats().operations_successful_total, 1.0);
}

#[tokio::test]
async fn blacklisted_category_bypasses_on_fail() {
    let engine = Engine::new();
    let mut ops = std::collections::HashMap::new();
    let mut a = coda_core::Operation::new("string.echo");
    a.entrypoint = true;
    a.params = serde_json::json!({"value": "hi"});
    a.on_fail = Some("recover".to_string());
    let recover = coda_core::Operation::new("string.echo");
    ops.insert("a".to_string(), a);
    ops.insert("recover".to_string(), recover);

    let mut script = coda_core::Script::new(
        coda_core::Settings::default(),
        indexmap::IndexMap::new(),
        indexmap::IndexMap::new(),
        ops,
        coda_core::SourceFormat::Json,
        std::collections::HashSet::new(),
    );
    blacklist(&mut script, coda_core::Category::String);

    let err = engine.run(&mut script).await.unwrap_err();
    assert!(matches!(err, CodaError::Blacklisted { .. }));
    assert_eq!(script.stats().operations_blacklisted_total, 1.0);
    assert_eq!(script.stats().operations_failed_total, 0.0);
}

#[tokio::test]
async fn variable_expression_with_filter_resolves_from_store() {
    let engine = Engine::new();
    let input = br#"{
        "store": { "name": "world" },
        "operations": {
            "a": {
                "action": "string.echo",
                "entrypoint": true,
                "params": { "value": "${store.name|upper}" },
                "store": "greeting"
            }
        }
    }"#;
    let mut script = load(input, Format::Json, engine.registry(), &Default::default()).unwrap();
    engine.run(&mut script).await.unwrap();
    assert_eq!(script.store.snapshot()["greeting"], "WORLD");
}

#[tokio::test]
async fn variable_expression_can_read_the_operations_namespace() {
    let engine = Engine::new();
    let input = br#"{
        "operations": {
            "a": {
                "action": "string.echo",
                "entrypoint": true,
                "params": { "value": "${operations.a.action}" },
                "store": "out"
            }
        }
    }"#;
    let mut script = load(input, Format::Json, engine.registry(), &Default::default()).unwrap();
    engine.run(&mut script).await.unwrap();
    assert_eq!(script.store.snapshot()["out"], "string.echo");
}

#[tokio::test]
async fn dotted_store_key_writes_nested_object() {
    let engine = Engine::new();
    let input = br#"{
        "operations": {
            "a": {
                "action": "string.echo",
                "entrypoint": true,
                "params": { "value": "nested" },
                "store": "result.nested.value"
            }
        }
    }"#;
    let mut script = load(input, Format::Json, engine.registry(), &Default::default()).unwrap();
    engine.run(&mut script).await.unwrap();
    assert_eq!(script.store.snapshot()["result"]["nested"]["value"], "nested");
}

#[tokio::test]
async fn async_dispatch_continues_immediately() {
    let engine = Engine::new();
    let input = br#"{
        "operations": {
            "a": {
                "action": "time.sleep",
                "entrypoint": true,
                "params": { "duration_ms": 20 },
                "async": true,
                "store": "slept",
                "onSuccess": "b"
            },
            "b": {
                "action": "string.echo",
                "params": { "value": "done" },
                "store": "out"
            }
        }
    }"#;
    let mut script = load(input, Format::Json, engine.registry(), &Default::default()).unwrap();
    engine.run(&mut script).await.unwrap();

    // The run completed without waiting for the background sleep.
    assert_eq!(script.store.snapshot()["out"], "done");

    // Give the background task a chance to finish before asserting on its effects.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(script.stats().operations_total, 2.0);
}

#[tokio::test]
async fn list_form_is_lowered_and_runs_as_a_chain() {
    let engine = Engine::new();
    let input = br#"{
        "operations": [
            { "action": "string.echo", "params": { "value": "one" }, "store": "a" },
            { "action": "string.echo", "params": { "value": "two" }, "store": "b" }
        ]
    }"#;
    let mut script = load(input, Format::Json, engine.registry(), &Default::default()).unwrap();
    assert!(script.operations["step_0"].entrypoint);
    engine.run(&mut script).await.unwrap();

    let store = script.store.snapshot();
    assert_eq!(store["a"], "one");
    assert_eq!(store["b"], "two");
}

#[tokio::test]
async fn serialized_output_never_contains_secrets() {
    let engine = Engine::new();
    let input = br#"{
        "coda": { "stats": true, "logs": true },
        "secrets": { "api_key": "s3cr3t" },
        "operations": {
            "a": { "action": "string.echo", "entrypoint": true, "params": { "value": "hi" }, "store": "out" }
        }
    }"#;
    let mut script = load(input, Format::Json, engine.registry(), &Default::default()).unwrap();
    engine.run(&mut script).await.unwrap();

    let out = serialize(&script, Format::Json).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(!text.contains("s3cr3t"));
    assert!(text.contains("\"stats\""));
}
