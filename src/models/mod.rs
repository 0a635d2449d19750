//! Data Models
//!
//! Data structures shared by services, commands and the HTTP boundary.

pub mod phishing;
pub mod report;
pub mod response;
pub mod settings;
pub mod trace;

pub use phishing::PhishingArtifact;
pub use report::{RankedReport, RiskLevel};
pub use response::{ErrorResponse, GatherOsintRequest, GatherOsintResponse, GeneratePhishingRequest};
pub use settings::AppConfig;
pub use trace::{AbortReason, LoopOutcome, Observation, SessionTrace, Termination, TraceStep};
