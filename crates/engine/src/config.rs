// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Process-wide engine defaults, layered compiled-in defaults → `CODA_*`
//! environment variables → an explicit override passed to `Engine::new`.

use coda_core::Category;
use std::collections::HashSet;
use std::str::FromStr;

const DEFAULT_TASK_CHANNEL_CAPACITY: usize = 64;
const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;

/// Engine-wide defaults applied to every `Script` the engine runs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Capacity of the background-task bookkeeping channel used for
    /// `async: true` operation dispatch.
    pub task_channel_capacity: usize,
    /// Default request timeout for the built-in `http.request` handler.
    pub http_default_timeout_ms: u64,
    /// Categories blacklisted on every script unless the script overrides it.
    pub default_blacklist: HashSet<Category>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            task_channel_capacity: DEFAULT_TASK_CHANNEL_CAPACITY,
            http_default_timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
            default_blacklist: HashSet::new(),
        }
    }
}

impl EngineConfig {
    /// Resolves compiled-in defaults overridden by `CODA_TASK_CHANNEL_CAPACITY`,
    /// `CODA_HTTP_TIMEOUT_MS`, and `CODA_DEFAULT_BLACKLIST` (comma-separated
    /// category names), read once.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("CODA_TASK_CHANNEL_CAPACITY") {
            match raw.parse() {
                Ok(v) => config.task_channel_capacity = v,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid CODA_TASK_CHANNEL_CAPACITY"),
            }
        }

        if let Ok(raw) = std::env::var("CODA_HTTP_TIMEOUT_MS") {
            match raw.parse() {
                Ok(v) => config.http_default_timeout_ms = v,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid CODA_HTTP_TIMEOUT_MS"),
            }
        }

        if let Ok(raw) = std::env::var("CODA_DEFAULT_BLACKLIST") {
            let mut categories = HashSet::new();
            for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                match Category::from_str(name) {
                    Ok(cat) => {
                        categories.insert(cat);
                    }
                    Err(e) => tracing::warn!(category = name, error = %e, "ignoring unknown category in CODA_DEFAULT_BLACKLIST"),
                }
            }
            config.default_blacklist = categories;
        }

        config
    }
}
