//! Preflight check system for validating that the chatbot can start
//!
//! This module provides a small framework for running independent checks,
//! useful for:
//! - Validating a fresh checkout before the first start
//! - CI/CD gates ahead of deployment
//! - Debugging configuration and connectivity issues
//!
//! # Example
//!
//! ```no_run
//! use lab_preflight::config::PreflightConfig;
//! use lab_preflight::env::EnvSnapshot;
//! use lab_preflight::health;
//!
//! let config = PreflightConfig::default();
//! let report = health::default_runner(&config).run(&EnvSnapshot::from_process());
//!
//! if report.all_passed() {
//!     println!("Ready to start!");
//! }
//! ```

pub mod check;
pub mod checks;
pub mod reporter;
pub mod runner;

pub use check::{CheckResult, CheckStatus, SystemCheck};
pub use reporter::{format_report, print_report};
pub use runner::{PreflightReport, PreflightRunner};

use crate::config::PreflightConfig;
use checks::{
    DatabaseCheck, EnvironmentCheck, OpenAiCheck, OpenAiConnector, PackagesCheck, PostgresProbe,
    PythonImporter,
};

/// Builds a runner with the four standard checks, in their fixed order
///
/// Environment Variables, Package Imports, Database Connection,
/// OpenAI Connection.
pub fn default_runner(config: &PreflightConfig) -> PreflightRunner {
    PreflightRunner::new()
        .add_check(EnvironmentCheck::from_config(config))
        .add_check(PackagesCheck::new(
            config.packages.clone(),
            PythonImporter::new(&config.python),
            &config.install_hint,
        ))
        .add_check(DatabaseCheck::new(PostgresProbe::new(config.timeout())))
        .add_check(OpenAiCheck::new(
            &config.api_key_var,
            OpenAiConnector::new(&config.openai.base_url, config.timeout()),
        ))
}
