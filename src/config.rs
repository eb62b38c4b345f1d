//! Preflight configuration
//!
//! Describes what the checks look for: required variables, placeholder
//! patterns, the packages the chatbot imports, and the API endpoint.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A Python module the application imports, with a human-readable label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Importable module name (e.g. `langchain_openai`)
    pub module: String,
    /// Label shown in the report (e.g. `LangChain OpenAI`)
    pub label: String,
}

impl PackageSpec {
    pub fn new(module: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            label: label.into(),
        }
    }
}

/// External model API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Base URL of an OpenAI-compatible API (without trailing `/models`)
    pub base_url: String,
}

/// Preflight configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightConfig {
    /// Environment variables that must be set to real values
    pub required_vars: Vec<String>,
    /// Variable holding the model API credential
    pub api_key_var: String,
    /// Prefix of template values such as `your_password_here`
    pub placeholder_prefix: String,
    /// Prefix that marks the API credential as a local default
    pub local_default_token: String,
    /// Python interpreter used to probe package imports
    pub python: String,
    /// Packages the application needs
    pub packages: Vec<PackageSpec>,
    /// Remediation shown when packages are missing
    pub install_hint: String,
    /// Model API settings
    pub openai: OpenAiConfig,
    /// Timeout for each network-bound check, in seconds
    pub timeout_secs: u64,
    /// Commands suggested once every check passes
    pub next_steps: Vec<String>,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            required_vars: ["DB_HOST", "DB_NAME", "DB_USER", "DB_PASSWORD", "OPENAI_API_KEY"]
                .into_iter()
                .map(String::from)
                .collect(),
            api_key_var: "OPENAI_API_KEY".to_string(),
            placeholder_prefix: "your_".to_string(),
            local_default_token: "localhost".to_string(),
            python: "python3".to_string(),
            packages: vec![
                PackageSpec::new("fastapi", "FastAPI"),
                PackageSpec::new("langchain", "LangChain"),
                PackageSpec::new("langchain_openai", "LangChain OpenAI"),
                PackageSpec::new("psycopg2", "PostgreSQL driver"),
                PackageSpec::new("streamlit", "Streamlit"),
                PackageSpec::new("plotly", "Plotly"),
                PackageSpec::new("pandas", "Pandas"),
            ],
            install_hint: "pip install -r requirements.txt -r requirements-frontend.txt"
                .to_string(),
            openai: OpenAiConfig {
                base_url: "https://api.openai.com/v1".to_string(),
            },
            timeout_secs: 10,
            next_steps: vec![
                "Start backend: cd backend && python main.py".to_string(),
                "Start frontend: streamlit run frontend/app.py".to_string(),
            ],
        }
    }
}

impl PreflightConfig {
    /// Loads configuration
    ///
    /// Sources, lowest precedence first:
    /// 1. Built-in defaults
    /// 2. `path` if given (must exist), otherwise `config/preflight.toml`
    ///    next to the executable or in the current directory (optional)
    /// 3. Environment variables with prefix PREFLIGHT_
    ///    (e.g., PREFLIGHT_TIMEOUT_SECS=5, PREFLIGHT_OPENAI__BASE_URL=...)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        match path {
            Some(path) => {
                debug!(path = %path.display(), "Using explicit config file");
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if let Some(dir) = Self::find_config_dir() {
                    let file = dir.join("preflight.toml");
                    debug!(path = %file.display(), "Using discovered config file");
                    builder = builder.add_source(File::from(file.as_path()).required(false));
                }
            }
        }

        // Use __ as separator for nested fields (e.g., PREFLIGHT_OPENAI__BASE_URL)
        builder = builder.add_source(
            Environment::with_prefix("PREFLIGHT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Finds the config directory next to the executable or in the current directory
    fn find_config_dir() -> Option<PathBuf> {
        if let Ok(exe_path) = std::env::current_exe()
            && let Some(exe_dir) = exe_path.parent()
        {
            let config_dir = exe_dir.join("config");
            if config_dir.join("preflight.toml").exists() {
                return Some(config_dir);
            }
        }

        let cwd_config = PathBuf::from("config");
        if cwd_config.join("preflight.toml").exists() {
            return Some(cwd_config);
        }

        None
    }

    /// Timeout applied to each network-bound check
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
