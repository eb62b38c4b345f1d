//! Lab Intelligence Chatbot preflight
//!
//! Verifies configuration, installed packages, database connectivity and
//! model API access before the chatbot is started.

/// Build-time information (rustc, target, git SHA)
pub mod build_info;

/// Preflight settings loaded from defaults, file and environment
pub mod config;

/// Read-only environment snapshot handed to the checks
pub mod env;

/// Collaborator error types
pub mod error;

/// Check framework, built-in checks and reporting
pub mod health;
