// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Structured error types for the Coda engine.
//!
//! Every execution error carries the UID of the operation that actually
//! failed, rather than whatever operation last happened to run. Blacklist
//! rejection is its own variant so callers can discriminate it without
//! resorting to message matching.

use thiserror::Error;

/// The primary error type returned by every fallible Coda operation.
#[derive(Debug, Error)]
pub enum CodaError {
    /// Malformed document or schema violation, detected before any operation runs.
    #[error("bad input: {0}")]
    BadInput(String),

    /// Missing/duplicate entrypoint, a dangling link, or a self-link.
    #[error("graph error: {0}")]
    GraphError(String),

    /// `action` names a handler that is not registered.
    #[error("unknown action '{action}' at operation '{uid}'")]
    UnknownAction { uid: String, action: String },

    /// The handler's category is in the script's blacklist. Always terminates
    /// the run, bypassing `onFail`.
    #[error("category '{category}' is blacklisted at operation '{uid}'")]
    Blacklisted { uid: String, category: String },

    /// A variable expression could not be evaluated (malformed grammar only;
    /// an unmatched path resolves to `null`, it is not an error).
    #[error("failed to resolve variables at operation '{uid}': {message}")]
    ResolveError { uid: String, message: String },

    /// Propagated from a handler invocation.
    #[error("handler error at operation '{uid}' ({action}): {message}")]
    HandlerError { uid: String, action: String, message: String },

    /// Marshal/unmarshal failure inside the engine itself.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl CodaError {
    /// The UID of the operation this error is attached to, if any.
    ///
    /// `BadInput`, `GraphError`, and `InternalError` occur before or outside
    /// any single operation's execution and so carry no UID.
    pub fn uid(&self) -> Option<&str> {
        match self {
            Self::UnknownAction { uid, .. }
            | Self::Blacklisted { uid, .. }
            | Self::ResolveError { uid, .. }
            | Self::HandlerError { uid, .. } => Some(uid),
            Self::BadInput(_) | Self::GraphError(_) | Self::InternalError(_) => None,
        }
    }

    /// True if this variant must bypass `onFail` and terminate the run
    /// immediately (currently only blacklist rejection).
    pub const fn bypasses_on_fail(&self) -> bool {
        matches!(self, Self::Blacklisted { .. })
    }

    /// Attaches `uid` to a `ResolveError` or `HandlerError` raised before the
    /// caller knew which operation it belonged to (the resolver and handlers
    /// are themselves UID-agnostic). Leaves every other variant untouched.
    #[must_use]
    pub fn with_uid(self, uid: &str) -> Self {
        match self {
            Self::ResolveError { message, .. } => {
                Self::ResolveError { uid: uid.to_string(), message }
            }
            Self::HandlerError { action, message, .. } => {
                Self::HandlerError { uid: uid.to_string(), action, message }
            }
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, CodaError>;
