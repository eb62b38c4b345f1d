//! Python package availability check

use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::config::PackageSpec;
use crate::env::EnvSnapshot;
use crate::error::LoadError;
use crate::health::check::{CheckResult, SystemCheck};

/// Loads modules on behalf of [`PackagesCheck`]
pub trait ModuleLoader {
    /// Attempts to load `module`
    fn load(&self, module: &str) -> Result<(), LoadError>;
}

/// Returns true if `module` is a dotted sequence of Python identifiers
pub fn is_valid_module_name(module: &str) -> bool {
    !module.is_empty()
        && module.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
                && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        })
}

/// Imports modules with the application's Python interpreter
pub struct PythonImporter {
    interpreter: String,
}

impl PythonImporter {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }
}

impl ModuleLoader for PythonImporter {
    fn load(&self, module: &str) -> Result<(), LoadError> {
        if !is_valid_module_name(module) {
            return Err(LoadError::InvalidName(module.to_string()));
        }

        let output = Command::new(&self.interpreter)
            .arg("-c")
            .arg(format!("import {module}"))
            .stdin(Stdio::null())
            .output()
            .map_err(|source| LoadError::Interpreter {
                interpreter: self.interpreter.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        // Last stderr line carries the ImportError message
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("import failed")
            .trim()
            .to_string();

        Err(LoadError::NotFound {
            module: module.to_string(),
            reason,
        })
    }
}

/// Checks that every package the application imports is installed
pub struct PackagesCheck {
    packages: Vec<PackageSpec>,
    loader: Box<dyn ModuleLoader>,
    install_hint: String,
}

impl PackagesCheck {
    pub fn new<L: ModuleLoader + 'static>(
        packages: Vec<PackageSpec>,
        loader: L,
        install_hint: impl Into<String>,
    ) -> Self {
        Self {
            packages,
            loader: Box::new(loader),
            install_hint: install_hint.into(),
        }
    }
}

impl SystemCheck for PackagesCheck {
    fn name(&self) -> &'static str {
        "Package Imports"
    }

    fn heading(&self) -> &'static str {
        "📦 Testing package imports..."
    }

    fn check(&self, _env: &EnvSnapshot) -> CheckResult {
        let mut details = Vec::new();
        let mut missing = 0;

        for package in &self.packages {
            match self.loader.load(&package.module) {
                Ok(()) => {
                    debug!(module = %package.module, "Module loaded");
                    details.push(format!("  ✅ {} is installed", package.label));
                }
                Err(e) => {
                    match &e {
                        LoadError::NotFound { .. } => debug!(error = %e, "Module missing"),
                        _ => warn!(error = %e, "Module could not be probed"),
                    }
                    details.push(format!("  ❌ {} is NOT installed", package.label));
                    missing += 1;
                }
            }
        }

        if missing == 0 {
            return CheckResult::pass(format!("{} packages installed", self.packages.len()))
                .with_details(details);
        }

        details.push(String::new());
        details.push(format!(
            "⚠️  Some packages are missing. Run: {}",
            self.install_hint
        ));

        CheckResult::fail(format!(
            "{} of {} packages missing",
            missing,
            self.packages.len()
        ))
        .with_details(details)
    }
}
