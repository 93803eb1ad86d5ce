// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Handler factory registry and discovery.
//!
//! This module provides the catalogue of operation handlers the engine can
//! dispatch to:
//! - [`HandlerRegistry`]: the process-wide table of registered handlers
//! - [`HandlerEntry`] / [`ParamDescriptor`]: handler metadata used by the
//!   Schema Builder and for introspection
//! - [`HandlerFn`]: the invocation function type every handler must supply

use crate::category::Category;
use crate::error::CodaError;
use crate::store::Store;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Context handed to a handler at invocation time.
///
/// Handlers receive already-resolved parameters (variable expressions never
/// reach them); the context exists so a handler can, if it needs to, read
/// the live store directly rather than only through its resolved params.
#[derive(Clone)]
pub struct HandlerContext {
    store: Store,
}

impl HandlerContext {
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &Store {
        &self.store
    }
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, CodaError>> + Send>>;

/// A handler's invocation function, cloneable via `Arc` so registry entries
/// can be cheaply handed out to spawned (async) tasks.
pub type HandlerFn = Arc<dyn Fn(HandlerContext, Value) -> HandlerFuture + Send + Sync>;

/// The declared type of a handler parameter, as consumed by the Schema
/// Builder. Does not participate in per-call coercion — handlers parse
/// their own JSON parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// No type constraint at all.
    Any,
    /// A single JSON type (`"string"`, `"number"`, `"boolean"`, `"object"`, `"array"`).
    Single(String),
    /// A comma-separated union of JSON types.
    Union(Vec<String>),
}

impl Default for ParamType {
    fn default() -> Self {
        Self::Single("string".to_string())
    }
}

/// Describes a single handler parameter for schema generation and introspection.
#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    pub name: String,
    pub description: String,
    pub mandatory: bool,
    pub ty: ParamType,
    pub enum_values: Option<Vec<String>>,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            mandatory: false,
            ty: ParamType::default(),
            enum_values: None,
        }
    }

    #[must_use]
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    #[must_use]
    pub fn typed(mut self, ty: ParamType) -> Self {
        self.ty = ty;
        self
    }

    #[must_use]
    pub fn with_enum(mut self, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// A registered handler: its metadata plus the invocation function.
#[derive(Clone)]
pub struct HandlerEntry {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub params: Vec<ParamDescriptor>,
    pub invoke: HandlerFn,
}

/// The process-wide table mapping an `action` name (dotted-lowercase, e.g.
/// `file.read`) to its [`HandlerEntry`].
///
/// Registration happens once during engine initialization. Lookups at run
/// time are read-only and need no additional locking.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    entries: HashMap<String, HandlerEntry>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under `name`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already registered. Duplicate registration is a
    /// programming error in the binary wiring the engine together, not a
    /// recoverable runtime condition.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        params: Vec<ParamDescriptor>,
        invoke: HandlerFn,
    ) {
        let name = name.into();
        let entry = HandlerEntry {
            name: name.clone(),
            description: description.into(),
            category,
            params,
            invoke,
        };
        assert!(
            self.entries.insert(name.clone(), entry).is_none(),
            "duplicate handler registration for action '{name}'"
        );
    }

    pub fn get(&self, name: &str) -> Option<&HandlerEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HandlerEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_handler() -> HandlerFn {
        Arc::new(|_ctx, params| Box::pin(async move { Ok(params) }))
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = HandlerRegistry::new();
        registry.register(
            "string.echo",
            "echoes its input",
            Category::String,
            vec![ParamDescriptor::new("value", "the value to echo").mandatory()],
            noop_handler(),
        );
        assert!(registry.contains("string.echo"));
        assert_eq!(registry.get("string.echo").unwrap().category, Category::String);
        assert!(!registry.contains("file.read"));
    }

    #[test]
    #[should_panic(expected = "duplicate handler registration")]
    fn duplicate_registration_panics() {
        let mut registry = HandlerRegistry::new();
        registry.register("a", "first", Category::String, vec![], noop_handler());
        registry.register("a", "second", Category::String, vec![], noop_handler());
    }
}
