//! Integration Tests Module
//!
//! End-to-end tests for the AIDEN OSINT agent. The oracle is always a
//! scripted stand-in; tools are canned closures or the real adapters
//! pointed at local stand-ins.

// Scripted oracle and canned tools
mod common;

// Agent loop bounds, failures and cancellation
mod orchestrator_test;

// Rank extractor and phishing synthesizer
mod extraction_test;

// gather_osint scenarios, including the fallback
mod scenario_test;
