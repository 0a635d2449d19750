//! AIDEN OSINT Core
//!
//! Foundational error types and the investigation subject model for the
//! AIDEN OSINT workspace. This crate has zero dependencies on the oracle,
//! the tool adapters or the HTTP layer.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `subject` - Validated investigation subject (`Subject`)

pub mod error;
pub mod subject;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Subject ────────────────────────────────────────────────────────────
pub use subject::{is_valid_hostname, Subject};
