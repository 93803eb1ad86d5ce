// SPDX-FileCopyrightText: © 2025 Coda Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Coda API - the document boundary: wire-format DTOs, list-form lowering,
//! schema-validated loading, and settings-driven serialization.
//!
//! Everything here is format-agnostic internally: both JSON and YAML are
//! converted to a `serde_json::Value` before validation, so there is only
//! one validation and lowering path regardless of which format a caller
//! chooses.

pub mod document;
pub mod list;
pub mod load;
pub mod serialize;

pub use document::{Document, ListStep, OperationsShape, RawOperation, RawSettings};
pub use load::load;
pub use serialize::serialize;

/// The wire encoding of a script document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}
