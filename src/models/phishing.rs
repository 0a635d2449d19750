//! Phishing Simulation Models

use serde::{Deserialize, Serialize};

/// A simulated spear-phishing email for awareness training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhishingArtifact {
    /// Subject line
    pub subject: String,
    /// Spoofed sender display name
    pub from_name: String,
    /// Spoofed sender address
    pub from_email: String,
    /// HTML body
    pub body: String,
    /// Which red flags the trainee should have spotted
    pub explanation: String,
}
