//! AIDEN OSINT - Rust Backend Library
//!
//! Security-awareness OSINT agent. It includes:
//! - A bounded ReAct loop that drives OSINT tools through a language model
//! - Structured ranking of the gathered findings
//! - Simulated phishing emails built from those findings
//! - An HTTP request boundary exposing both operations

pub mod commands;
pub mod models;
pub mod server;
pub mod services;
pub mod state;
pub mod utils;

pub use commands::{gather_osint, generate_phishing};
pub use models::response::*;
pub use models::settings::AppConfig;
pub use state::AppState;
pub use utils::error::{AppError, AppResult, ExtractionError, ExtractionErrorKind};
