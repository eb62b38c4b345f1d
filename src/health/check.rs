//! Core preflight check trait and types

use std::time::Duration;

use crate::env::EnvSnapshot;

/// Status of a preflight check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Precondition satisfied
    Pass,
    /// Precondition not satisfied
    Fail,
}

impl CheckStatus {
    /// Returns true if the check passed
    pub fn is_ok(&self) -> bool {
        matches!(self, CheckStatus::Pass)
    }

    /// Returns true if the check failed
    pub fn is_fail(&self) -> bool {
        matches!(self, CheckStatus::Fail)
    }

    /// Returns the summary label, e.g. `✅ PASS`
    pub fn label(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "✅ PASS",
            CheckStatus::Fail => "❌ FAIL",
        }
    }

    /// Returns the summary label colored for the terminal
    pub fn as_colored_str(&self) -> String {
        use colored::Colorize;
        match self {
            CheckStatus::Pass => self.label().green().to_string(),
            CheckStatus::Fail => self.label().red().to_string(),
        }
    }
}

/// Result of a preflight check
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    /// The status of the check
    pub status: CheckStatus,
    /// Brief message describing the result
    pub message: String,
    /// Diagnostic lines, in the order they were produced
    pub details: Vec<String>,
    /// How long the check took
    pub duration: Duration,
}

impl CheckResult {
    /// Creates a passing check result
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Pass,
            message: message.into(),
            details: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Creates a failing check result
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Fail,
            message: message.into(),
            details: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Returns true if the check passed
    pub fn passed(&self) -> bool {
        self.status.is_ok()
    }

    /// Sets the diagnostic lines
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    /// Sets the duration for this check
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Trait for preflight checks
///
/// A check reads only the environment snapshot it is given and reports
/// every problem through its [`CheckResult`]; it never panics on missing
/// configuration or collaborator failures.
pub trait SystemCheck {
    /// Display name used in the summary (e.g. "Database Connection")
    fn name(&self) -> &'static str;

    /// Heading printed before the check's diagnostic lines
    fn heading(&self) -> &'static str;

    /// Perform the check
    fn check(&self, env: &EnvSnapshot) -> CheckResult;
}
