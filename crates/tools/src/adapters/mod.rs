//! Concrete reconnaissance tools.

pub mod harvester;
pub mod hibp;
pub mod sherlock;

pub use harvester::{
    extract_domain, HarvesterConfig, HarvesterTool, DEFAULT_HARVESTER_SOURCES, HARVESTER_NO_DATA,
    HARVESTER_TOOL_NAME,
};
pub use hibp::{
    format_breach_response, HibpConfig, HibpTool, BREACH_NOT_FOUND, BREACH_TOOL_NAME,
    DEFAULT_HIBP_BASE_URL,
};
pub use sherlock::{usernames_for_input, SherlockConfig, SherlockTool, SHERLOCK_NO_ACCOUNTS, SHERLOCK_TOOL_NAME};
