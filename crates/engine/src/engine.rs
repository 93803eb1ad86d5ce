// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The execution engine: entrypoint discovery, link validation, and the
//! graph walk that dispatches each operation and routes on success/failure.

use crate::config::EngineConfig;
use crate::handlers;
use coda_core::{Category, CodaError, HandlerRegistry, Script};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

/// The engine: a process-wide handler registry plus the resolved
/// `EngineConfig` it was constructed with.
pub struct Engine {
    registry: HandlerRegistry,
    config: EngineConfig,
    async_slots: Arc<Semaphore>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Builds an engine with every built-in handler registered and its
    /// configuration resolved from `CODA_*` environment variables.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::from_env())
    }

    /// Builds an engine with every built-in handler registered and an
    /// explicit configuration, bypassing environment resolution entirely.
    pub fn with_config(config: EngineConfig) -> Self {
        let mut registry = HandlerRegistry::new();
        handlers::register_all(&mut registry, config.http_default_timeout_ms);
        let async_slots = Arc::new(Semaphore::new(config.task_channel_capacity.max(1)));
        Self { registry, config, async_slots }
    }

    pub const fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs `script` to completion, starting at its entrypoint.
    ///
    /// # Errors
    ///
    /// Returns the error of whichever operation terminated the run, per the
    /// termination states: a graph/schema problem found before any handler
    /// runs, an unrecoverable operation failure with no `onFail` edge, or a
    /// blacklist rejection (which always bypasses `onFail`).
    pub async fn run(&self, script: &mut Script) -> Result<(), CodaError> {
        let mut uid = script.find_entrypoint()?.to_string();
        script.validate_links()?;
        tracing::debug!(entrypoint = %uid, operations = script.operations.len(), "starting run");

        let run_start = Instant::now();
        let result = loop {
            match self.step(script, &uid).await {
                Ok(Some(next)) => uid = next,
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        script.store.with_mut(|state| {
            state.stats.coda_runtime_total_ms += run_start.elapsed().as_secs_f64() * 1000.0;
        });

        match &result {
            Ok(()) => tracing::debug!("run completed"),
            Err(e) => tracing::warn!(error = %e, "run terminated with an error"),
        }
        result
    }

    /// Executes the operation at `uid` and returns the next UID to visit,
    /// or `None` if the run terminated successfully.
    async fn step(&self, script: &mut Script, uid: &str) -> Result<Option<String>, CodaError> {
        let op = script
            .operations
            .get(uid)
            .ok_or_else(|| CodaError::GraphError(format!("operation '{uid}' does not exist")))?
            .clone();

        let start = Instant::now();

        let entry = self.registry.get(&op.action).cloned();
        let Some(entry) = entry else {
            let err = CodaError::UnknownAction { uid: uid.to_string(), action: op.action.clone() };
            script.store.with_mut(|state| state.stats.record_operation(0.0, false));
            return self.route_failure(script, uid, &op, err);
        };

        if script.blacklist.contains(&entry.category) {
            script.store.with_mut(|state| state.stats.record_blacklisted());
            tracing::warn!(uid, category = %entry.category, "operation blacklisted");
            return Err(CodaError::Blacklisted {
                uid: uid.to_string(),
                category: entry.category.to_string(),
            });
        }

        let context_json = script.state_snapshot();
        let resolved_params = match script
            .store
            .with_mut(|state| coda_core::variables::resolve(&op.params, &context_json, &mut state.stats))
        {
            Ok(params) => params,
            Err(e) => {
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                script.store.with_mut(|state| state.stats.record_operation(elapsed_ms, false));
                return self.route_failure(script, uid, &op, e.with_uid(uid));
            }
        };

        let store_key = op.store.clone();
        let handler_ctx = coda_core::registry::HandlerContext::new(script.store.clone());

        if op.is_async {
            tracing::debug!(uid, action = %op.action, "dispatching asynchronously");
            self.spawn_background(entry.invoke.clone(), handler_ctx, resolved_params, store_key, start);
            return Ok(op.on_success.clone());
        }

        let result = (entry.invoke)(handler_ctx, resolved_params).await;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(value) => {
                script.store.with_mut(|state| state.stats.record_operation(elapsed_ms, true));
                if let Some(key) = store_key {
                    script.store.write(&key, value);
                }
                Ok(op.on_success.clone())
            }
            Err(e) => {
                script.store.with_mut(|state| state.stats.record_operation(elapsed_ms, false));
                self.route_failure(script, uid, &op, e.with_uid(uid))
            }
        }
    }

    fn route_failure(
        &self,
        script: &mut Script,
        uid: &str,
        op: &coda_core::Operation,
        err: CodaError,
    ) -> Result<Option<String>, CodaError> {
        tracing::debug!(uid, action = %op.action, error = %err, "operation failed");
        if err.bypasses_on_fail() {
            return Err(err);
        }
        match &op.on_fail {
            Some(next) => Ok(Some(next.clone())),
            None => Err(err),
        }
    }

    /// Dispatches a handler on a background task without awaiting it;
    /// routing has already continued along `onSuccess` by the time this
    /// returns. The task's own completion updates counters and writes its
    /// result under the store lock, but never traverses `onFail` — that
    /// edge was already taken synchronously.
    fn spawn_background(
        &self,
        invoke: coda_core::HandlerFn,
        ctx: coda_core::registry::HandlerContext,
        params: serde_json::Value,
        store_key: Option<String>,
        start: Instant,
    ) {
        let slots = self.async_slots.clone();
        let store = ctx.store().clone();
        tokio::spawn(async move {
            let Ok(_permit) = slots.acquire_owned().await else {
                return;
            };
            let result = invoke(ctx, params).await;
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            match result {
                Ok(value) => {
                    store.with_mut(|state| state.stats.record_operation(elapsed_ms, true));
                    if let Some(key) = store_key {
                        store.write(&key, value);
                    }
                }
                Err(e) => {
                    store.with_mut(|state| state.stats.record_operation(elapsed_ms, false));
                    tracing::warn!(error = %e, "background operation failed");
                }
            }
        });
    }
}

/// Adds `category` to `script`'s blacklist, rejecting any not-yet-dispatched
/// operation whose handler belongs to it.
pub fn blacklist(script: &mut Script, category: Category) {
    script.blacklist.insert(category);
}
