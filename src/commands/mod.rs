//! Commands
//!
//! The two public operations. The HTTP boundary in `server` is a thin
//! wrapper over these.

pub mod osint;

pub use osint::*;
