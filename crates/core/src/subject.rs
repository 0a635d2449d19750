//! Investigation Subject
//!
//! The employee an OSINT session is about. A `Subject` is validated once at
//! construction and is immutable for the lifetime of the session.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Maximum length of a DNS name, excluding the optional trailing dot.
const MAX_HOSTNAME_LEN: usize = 253;

fn hostname_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)+$")
            .expect("hostname regex is valid")
    })
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+$").expect("email regex is valid"))
}

/// The person an OSINT session investigates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    full_name: String,
    email: String,
    domain: String,
}

impl Subject {
    /// Validate and build a subject.
    ///
    /// All three fields are trimmed and must be non-empty. The domain is
    /// lowercased, a trailing dot is dropped, and it must look like a
    /// hostname with at least two labels. Nothing is resolved.
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        domain: impl Into<String>,
    ) -> CoreResult<Self> {
        let full_name = full_name.into().trim().to_string();
        let email = email.into().trim().to_string();
        let domain = normalize_domain(&domain.into());

        if full_name.is_empty() {
            return Err(CoreError::validation("full_name must not be empty"));
        }
        if email.is_empty() {
            return Err(CoreError::validation("email must not be empty"));
        }
        if !email_regex().is_match(&email) {
            return Err(CoreError::validation(format!(
                "email '{}' is not a valid address",
                email
            )));
        }
        if domain.is_empty() {
            return Err(CoreError::validation("domain must not be empty"));
        }
        if !is_valid_hostname(&domain) {
            return Err(CoreError::validation(format!(
                "domain '{}' is not a valid hostname",
                domain
            )));
        }

        Ok(Self {
            full_name,
            email,
            domain,
        })
    }

    /// Build a subject whose domain is taken from the email address.
    ///
    /// Used by operations that only receive a name and an email.
    pub fn from_email(full_name: impl Into<String>, email: impl Into<String>) -> CoreResult<Self> {
        let email = email.into();
        let domain = email
            .trim()
            .rsplit_once('@')
            .map(|(_, d)| d.to_string())
            .ok_or_else(|| {
                CoreError::validation(format!("email '{}' is not a valid address", email.trim()))
            })?;
        Self::new(full_name, email, domain)
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

fn normalize_domain(raw: &str) -> String {
    raw.trim().trim_end_matches('.').to_lowercase()
}

/// Syntactic hostname check (labels of 1-63 alphanumerics/hyphens, no
/// leading or trailing hyphen, at least one dot).
pub fn is_valid_hostname(candidate: &str) -> bool {
    candidate.len() <= MAX_HOSTNAME_LEN && hostname_regex().is_match(candidate)
}
