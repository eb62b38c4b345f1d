//! Integration tests for the preflight check system

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lab_preflight::config::{PackageSpec, PreflightConfig};
use lab_preflight::env::EnvSnapshot;
use lab_preflight::error::{LoadError, ProbeError, ServiceError};
use lab_preflight::health::checks::*;
use lab_preflight::health::{self, CheckStatus, PreflightRunner, SystemCheck, reporter};

const CHECK_NAMES: [&str; 4] = [
    "Environment Variables",
    "Package Imports",
    "Database Connection",
    "OpenAI Connection",
];

struct StubLoader {
    missing: Vec<&'static str>,
}

impl ModuleLoader for StubLoader {
    fn load(&self, module: &str) -> Result<(), LoadError> {
        if self.missing.contains(&module) {
            Err(LoadError::NotFound {
                module: module.to_string(),
                reason: format!("ModuleNotFoundError: No module named '{module}'"),
            })
        } else {
            Ok(())
        }
    }
}

#[derive(Clone, Copy)]
enum ProbeOutcome {
    Reachable,
    Unreachable,
    Raises,
}

struct StubProbe {
    outcome: ProbeOutcome,
    probes: Rc<Cell<usize>>,
}

impl DatabaseProbe for StubProbe {
    fn init_pool(&self, _env: &EnvSnapshot) -> Result<(), ProbeError> {
        Ok(())
    }

    fn test_connection(&self) -> Result<bool, ProbeError> {
        self.probes.set(self.probes.get() + 1);
        match self.outcome {
            ProbeOutcome::Reachable => Ok(true),
            ProbeOutcome::Unreachable => Ok(false),
            ProbeOutcome::Raises => Err(ProbeError::Other(
                "connection to server at \"db.lab\" failed: Connection refused".to_string(),
            )),
        }
    }
}

struct StubService {
    result: Result<Vec<String>, String>,
}

impl ModelService for StubService {
    fn list_models(&self) -> Result<Vec<String>, ServiceError> {
        self.result.clone().map_err(ServiceError::Other)
    }
}

struct StubConnector {
    result: Result<Vec<String>, String>,
    connects: Rc<Cell<usize>>,
}

impl ServiceConnector for StubConnector {
    fn connect(&self, _api_key: &str) -> Result<Box<dyn ModelService>, ServiceError> {
        self.connects.set(self.connects.get() + 1);
        Ok(Box::new(StubService {
            result: self.result.clone(),
        }))
    }
}

/// Stubbed collaborators plus counters observing them
struct Harness {
    missing_modules: Vec<&'static str>,
    probe: ProbeOutcome,
    service: Result<Vec<String>, String>,
    probes: Rc<Cell<usize>>,
    connects: Rc<Cell<usize>>,
}

impl Harness {
    fn healthy() -> Self {
        Self {
            missing_modules: Vec::new(),
            probe: ProbeOutcome::Reachable,
            service: Ok(vec!["gpt-4o".to_string(), "gpt-4o-mini".to_string()]),
            probes: Rc::new(Cell::new(0)),
            connects: Rc::new(Cell::new(0)),
        }
    }

    fn runner(&self) -> PreflightRunner {
        let config = PreflightConfig::default();
        PreflightRunner::new()
            .add_check(EnvironmentCheck::from_config(&config))
            .add_check(PackagesCheck::new(
                config.packages.clone(),
                StubLoader {
                    missing: self.missing_modules.clone(),
                },
                &config.install_hint,
            ))
            .add_check(DatabaseCheck::new(StubProbe {
                outcome: self.probe,
                probes: Rc::clone(&self.probes),
            }))
            .add_check(OpenAiCheck::new(
                &config.api_key_var,
                StubConnector {
                    result: self.service.clone(),
                    connects: Rc::clone(&self.connects),
                },
            ))
    }
}

fn configured_env() -> EnvSnapshot {
    EnvSnapshot::new()
        .with("DB_HOST", "db.lab.internal")
        .with("DB_NAME", "lab_results")
        .with("DB_USER", "chatbot")
        .with("DB_PASSWORD", "k7#pQ9!x")
        .with("OPENAI_API_KEY", "sk-proj-4f9a2c")
}

#[test]
fn test_all_checks_pass() {
    let harness = Harness::healthy();
    let report = harness.runner().run(&configured_env());

    assert_eq!(report.total, 4);
    assert_eq!(report.passed, 4);
    assert_eq!(report.failed, 0);
    assert!(report.all_passed());
    assert_eq!(report.exit_code(), 0);

    let names: Vec<_> = report.results.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, CHECK_NAMES);

    let openai = report.get("OpenAI Connection").unwrap();
    assert_eq!(openai.details[0], "  ✅ OpenAI API connection successful");
    assert_eq!(openai.message, "2 models available");
}

#[test]
fn test_missing_api_key_skips_network_call() {
    let harness = Harness::healthy();
    let env = configured_env().without("OPENAI_API_KEY");
    let report = harness.runner().run(&env);

    let openai = report.get("OpenAI Connection").unwrap();
    assert_eq!(openai.status, CheckStatus::Fail);
    assert_eq!(openai.details, vec!["  ❌ OPENAI_API_KEY not set"]);
    assert_eq!(harness.connects.get(), 0);

    // The other checks still ran on their own terms
    assert!(report.get("Environment Variables").unwrap().status.is_fail());
    assert!(report.get("Package Imports").unwrap().passed());
    assert!(report.get("Database Connection").unwrap().passed());
    assert_eq!(harness.probes.get(), 1);
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn test_empty_api_key_counts_as_unset() {
    let harness = Harness::healthy();
    let env = configured_env().with("OPENAI_API_KEY", "");
    let report = harness.runner().run(&env);

    assert!(report.get("OpenAI Connection").unwrap().status.is_fail());
    assert_eq!(harness.connects.get(), 0);
}

#[test]
fn test_missing_package_is_reported_individually() {
    let mut harness = Harness::healthy();
    harness.missing_modules = vec!["plotly"];
    let report = harness.runner().run(&configured_env());

    let packages = report.get("Package Imports").unwrap();
    assert!(packages.status.is_fail());
    assert!(
        packages
            .details
            .contains(&"  ❌ Plotly is NOT installed".to_string())
    );
    assert!(
        packages
            .details
            .contains(&"  ✅ Pandas is installed".to_string())
    );
    assert_eq!(
        packages.details.last().unwrap(),
        "⚠️  Some packages are missing. Run: pip install -r requirements.txt -r requirements-frontend.txt"
    );

    assert!(report.get("Environment Variables").unwrap().passed());
    assert!(report.get("Database Connection").unwrap().passed());
    assert!(report.get("OpenAI Connection").unwrap().passed());
    assert_eq!(report.failed, 1);
}

#[test]
fn test_probe_error_is_reported_and_run_completes() {
    let mut harness = Harness::healthy();
    harness.probe = ProbeOutcome::Raises;
    let report = harness.runner().run(&configured_env());

    let database = report.get("Database Connection").unwrap();
    assert!(database.status.is_fail());
    assert_eq!(
        database.details,
        vec![
            "  ❌ Database connection error: connection to server at \"db.lab\" failed: Connection refused"
        ]
    );

    assert_eq!(report.total, 4);
    assert!(report.get("OpenAI Connection").unwrap().passed());
    assert_eq!(harness.connects.get(), 1);
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn test_probe_false_is_a_failure() {
    let mut harness = Harness::healthy();
    harness.probe = ProbeOutcome::Unreachable;
    let report = harness.runner().run(&configured_env());

    let database = report.get("Database Connection").unwrap();
    assert!(database.status.is_fail());
    assert_eq!(database.details, vec!["  ❌ Database connection failed"]);
}

#[test]
fn test_service_error_includes_remediation_hint() {
    let mut harness = Harness::healthy();
    harness.service = Err("Incorrect API key provided".to_string());
    let report = harness.runner().run(&configured_env());

    let openai = report.get("OpenAI Connection").unwrap();
    assert!(openai.status.is_fail());
    assert_eq!(
        openai.details,
        vec![
            "  ❌ OpenAI API connection error: Incorrect API key provided",
            "  Make sure your API key is valid and you have credits",
        ]
    );
}

#[test]
fn test_placeholder_values_fail_environment_check() {
    let harness = Harness::healthy();
    let env = configured_env()
        .with("DB_PASSWORD", "your_password_here")
        .with("OPENAI_API_KEY", "localhost-dev-key")
        .with("DB_HOST", "localhost");
    let report = harness.runner().run(&env);

    let result = report.get("Environment Variables").unwrap();
    assert!(result.status.is_fail());
    assert!(result.details.contains(&"  ✅ DB_HOST is set".to_string()));
    assert!(
        result
            .details
            .contains(&"  ❌ DB_PASSWORD not set or using default value".to_string())
    );
    assert!(
        result
            .details
            .contains(&"⚠️  Missing required variables: DB_PASSWORD, OPENAI_API_KEY".to_string())
    );
    assert_eq!(
        result.details.last().unwrap(),
        "Please edit your .env file and set these values."
    );

    let check = EnvironmentCheck::default();
    assert_eq!(check.missing_vars(&env), vec!["DB_PASSWORD", "OPENAI_API_KEY"]);
}

#[test]
fn test_repeated_runs_are_identical() {
    let mut harness = Harness::healthy();
    harness.missing_modules = vec!["streamlit"];
    let runner = harness.runner();
    let env = configured_env().without("DB_NAME");

    let first = runner.run(&env);
    let second = runner.run(&env);

    assert_eq!(first.outcomes(), second.outcomes());
    assert_eq!(first.exit_code(), second.exit_code());
    for ((_, a), (_, b)) in first.results.iter().zip(&second.results) {
        assert_eq!(a.details, b.details);
    }
}

#[test]
fn test_overall_result_is_conjunction_of_all_four() {
    for mask in 0u8..16 {
        let mut harness = Harness::healthy();
        let mut env = configured_env();
        if mask & 1 != 0 {
            env = env.without("DB_USER");
        }
        if mask & 2 != 0 {
            harness.missing_modules = vec!["fastapi"];
        }
        if mask & 4 != 0 {
            harness.probe = ProbeOutcome::Raises;
        }
        if mask & 8 != 0 {
            harness.service = Err("quota exceeded".to_string());
        }

        let report = harness.runner().run(&env);

        // Every check runs regardless of earlier failures
        assert_eq!(report.total, 4, "mask {mask}");
        assert_eq!(harness.probes.get(), 1, "mask {mask}");
        assert_eq!(harness.connects.get(), 1, "mask {mask}");

        let expected: Vec<bool> = (0..4).map(|bit| mask & (1 << bit) == 0).collect();
        let actual: Vec<bool> = report.outcomes().into_iter().map(|(_, ok)| ok).collect();
        assert_eq!(actual, expected, "mask {mask}");
        assert_eq!(report.all_passed(), mask == 0, "mask {mask}");
        assert_eq!(report.exit_code(), if mask == 0 { 0 } else { 1 });
        assert_eq!(report.failed, mask.count_ones() as usize);
    }
}

#[test]
fn test_duplicate_check_names_run_once() {
    let runner = PreflightRunner::new()
        .add_check(EnvironmentCheck::default())
        .add_check(EnvironmentCheck::default());

    assert_eq!(runner.check_names(), vec!["Environment Variables"]);
    assert_eq!(runner.run(&configured_env()).total, 1);
}

#[test]
fn test_run_with_announces_each_check_before_running_it() {
    let harness = Harness::healthy();
    let events = RefCell::new(Vec::new());
    let db_calls = Rc::clone(&harness.probes);

    let report = harness.runner().run_with(
        &configured_env(),
        |check| {
            if check.name() == "Database Connection" {
                // Heading goes out before the database is touched
                assert_eq!(db_calls.get(), 0);
            }
            events.borrow_mut().push(format!("start {}", check.name()));
        },
        |check, result| {
            events
                .borrow_mut()
                .push(format!("finish {} {}", check.name(), result.passed()));
        },
    );

    let expected: Vec<String> = CHECK_NAMES
        .iter()
        .flat_map(|name| [format!("start {name}"), format!("finish {name} true")])
        .collect();
    assert_eq!(events.into_inner(), expected);
    assert_eq!(harness.probes.get(), 1);
    assert_eq!(report.total, 4);
}

#[test]
fn test_default_runner_order() {
    let runner = health::default_runner(&PreflightConfig::default());
    assert_eq!(runner.check_names(), CHECK_NAMES);
}

#[test]
fn test_report_formatting() {
    let harness = Harness::healthy();
    let config = PreflightConfig::default();
    let report = harness.runner().run(&configured_env());

    let output = reporter::format_report(&report, &config.next_steps, false);
    assert!(output.contains("📊 Test Results Summary"));
    assert!(output.contains("Environment Variables: "));
    assert!(output.contains("✅ PASS"));
    assert!(output.contains("🎉 All tests passed!"));
    assert!(output.contains("  1. Start backend: cd backend && python main.py"));
    assert!(output.contains("  2. Start frontend: streamlit run frontend/app.py"));

    let table = reporter::format_report(&report, &config.next_steps, true);
    assert!(table.contains("Duration"));
    assert!(table.contains("Database Connection"));

    let failing = harness.runner().run(&EnvSnapshot::new());
    let output = reporter::format_report(&failing, &config.next_steps, false);
    assert!(output.contains("❌ FAIL"));
    assert!(output.contains("Some tests failed. Please fix the issues above."));
    assert!(!output.contains("Next steps:"));
}

#[test]
fn test_check_heading_and_details_formatting() {
    let check = EnvironmentCheck::default();
    let result = check.check(&configured_env());

    let heading = reporter::format_check_heading(&check);
    assert!(heading.contains("🔍 Checking environment variables..."));

    let details = reporter::format_check_details(&result);
    let lines: Vec<_> = details.lines().collect();
    assert_eq!(lines[0], "  ✅ DB_HOST is set");
    assert_eq!(lines.len(), 5);
}

#[test]
fn test_custom_package_list() {
    let check = PackagesCheck::new(
        vec![PackageSpec::new("numpy", "NumPy")],
        StubLoader { missing: vec![] },
        "pip install numpy",
    );
    let result = check.check(&EnvSnapshot::new());
    assert!(result.passed());
    assert_eq!(result.details, vec!["  ✅ NumPy is installed"]);
}
