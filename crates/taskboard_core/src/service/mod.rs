//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate scope resolution, validation, ordering, and row writes into
//!   use-case level APIs.
//! - Own transaction boundaries: every ordering write is one retried
//!   `BEGIN IMMEDIATE` transaction.
//!
//! # Invariants
//! - Request validation happens before a transaction is opened.
//! - Names and titles are stored trimmed with inner whitespace collapsed.

use crate::ordering::error::{InvalidArgument, OrderingResult};
use once_cell::sync::Lazy;
use regex::Regex;

pub mod board_service;
pub mod maintenance_service;
pub mod project_service;
pub mod task_service;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Normalizes a required single-line label.
pub(crate) fn normalize_label(field: &'static str, value: String) -> OrderingResult<String> {
    let collapsed = WHITESPACE_RE.replace_all(value.trim(), " ");
    if collapsed.is_empty() {
        return Err(InvalidArgument::BlankField(field).into());
    }
    Ok(collapsed.into_owned())
}

/// Normalizes an optional free-form body; blank input becomes `None`.
pub(crate) fn normalize_body(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
