//! Runner for orchestrating preflight checks

use std::time::Instant;

use tracing::{debug, info, warn};

use super::check::{CheckResult, CheckStatus, SystemCheck};
use crate::env::EnvSnapshot;

/// Results from running a preflight suite
#[derive(Debug, Clone, PartialEq)]
pub struct PreflightReport {
    /// Individual check results with their names, in execution order
    pub results: Vec<(String, CheckResult)>,
    /// Total number of checks run
    pub total: usize,
    /// Number of passing checks
    pub passed: usize,
    /// Number of failing checks
    pub failed: usize,
}

impl PreflightReport {
    /// Returns true if every check passed
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|(_, result)| result.passed())
    }

    /// Looks up a result by check name
    pub fn get(&self, name: &str) -> Option<&CheckResult> {
        self.results
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, result)| result)
    }

    /// Returns the pass/fail outcome of each check, in execution order
    pub fn outcomes(&self) -> Vec<(&str, bool)> {
        self.results
            .iter()
            .map(|(name, result)| (name.as_str(), result.passed()))
            .collect()
    }

    /// Returns the process exit code for this report
    /// 0 = all pass, 1 = any fail
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() { 0 } else { 1 }
    }
}

/// Orchestrates running checks and collecting results
pub struct PreflightRunner {
    checks: Vec<Box<dyn SystemCheck>>,
}

impl PreflightRunner {
    /// Creates a new runner with no checks
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Adds a check to the runner
    ///
    /// Names are unique within a run: a check whose name is already
    /// registered is ignored.
    pub fn add_check<C: SystemCheck + 'static>(mut self, check: C) -> Self {
        if self.checks.iter().any(|c| c.name() == check.name()) {
            warn!(check = check.name(), "Duplicate check name, ignoring");
            return self;
        }
        self.checks.push(Box::new(check));
        self
    }

    /// Names of the registered checks, in execution order
    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Runs every registered check and returns a report
    pub fn run(&self, env: &EnvSnapshot) -> PreflightReport {
        self.run_with(env, |_| {}, |_, _| {})
    }

    /// Runs every registered check, calling `on_start` before each one and
    /// `on_result` as it finishes
    ///
    /// A failing check never stops the run.
    pub fn run_with<S, F>(
        &self,
        env: &EnvSnapshot,
        mut on_start: S,
        mut on_result: F,
    ) -> PreflightReport
    where
        S: FnMut(&dyn SystemCheck),
        F: FnMut(&dyn SystemCheck, &CheckResult),
    {
        let mut results = Vec::with_capacity(self.checks.len());
        let mut passed = 0;
        let mut failed = 0;

        for check in &self.checks {
            debug!(check = check.name(), "Check started");
            on_start(check.as_ref());

            let start = Instant::now();
            let result = check.check(env).with_duration(start.elapsed());

            info!(
                check = check.name(),
                passed = result.passed(),
                duration = ?result.duration,
                "Check finished"
            );

            match result.status {
                CheckStatus::Pass => passed += 1,
                CheckStatus::Fail => failed += 1,
            }

            on_result(check.as_ref(), &result);
            results.push((check.name().to_string(), result));
        }

        let total = results.len();

        PreflightReport {
            results,
            total,
            passed,
            failed,
        }
    }
}

impl Default for PreflightRunner {
    fn default() -> Self {
        Self::new()
    }
}
