//! Request and Response Types
//!
//! Bodies accepted and returned by the two public operations.

use serde::{Deserialize, Serialize};

/// Body of `POST /gather_osint`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatherOsintRequest {
    pub full_name: String,
    pub email: String,
    pub domain: String,
}

/// Result of `gather_osint`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatherOsintResponse {
    /// Chronological Thought/Action/Observation text plus the final answer
    pub raw_results: String,
    /// RankedReport as canonical JSON text
    pub ranked: String,
}

/// Body of `POST /generate_phishing`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePhishingRequest {
    pub full_name: String,
    pub email: String,
    pub osint_data: String,
}

/// Error body returned by every failing request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_results: Option<String>,
}

impl From<&crate::utils::error::AppError> for ErrorResponse {
    fn from(err: &crate::utils::error::AppError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind().to_string(),
            raw_results: err.raw_results().map(str::to_string),
        }
    }
}
