//! Required environment variable check

use tracing::debug;

use crate::config::PreflightConfig;
use crate::env::EnvSnapshot;
use crate::health::check::{CheckResult, SystemCheck};

/// Checks that every required variable is set to a real value
pub struct EnvironmentCheck {
    required: Vec<String>,
    api_key_var: String,
    placeholder_prefix: String,
    local_default_token: String,
}

impl EnvironmentCheck {
    /// Creates a check for the variables and patterns in `config`
    pub fn from_config(config: &PreflightConfig) -> Self {
        Self {
            required: config.required_vars.clone(),
            api_key_var: config.api_key_var.clone(),
            placeholder_prefix: config.placeholder_prefix.clone(),
            local_default_token: config.local_default_token.clone(),
        }
    }

    /// Returns true if `key` counts as unset
    ///
    /// A key is missing when its value is absent or empty, starts with the
    /// placeholder prefix, or (API credential only) starts with the
    /// local-default token.
    pub fn is_missing(&self, key: &str, value: Option<&str>) -> bool {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            return true;
        };

        if !self.placeholder_prefix.is_empty() && value.starts_with(&self.placeholder_prefix) {
            return true;
        }

        key == self.api_key_var
            && !self.local_default_token.is_empty()
            && value.starts_with(&self.local_default_token)
    }

    /// Returns the required keys that are missing, in declaration order
    pub fn missing_vars(&self, env: &EnvSnapshot) -> Vec<String> {
        self.required
            .iter()
            .filter(|key| self.is_missing(key, env.get(key)))
            .cloned()
            .collect()
    }
}

impl Default for EnvironmentCheck {
    fn default() -> Self {
        Self::from_config(&PreflightConfig::default())
    }
}

impl SystemCheck for EnvironmentCheck {
    fn name(&self) -> &'static str {
        "Environment Variables"
    }

    fn heading(&self) -> &'static str {
        "🔍 Checking environment variables..."
    }

    fn check(&self, env: &EnvSnapshot) -> CheckResult {
        let missing = self.missing_vars(env);

        let mut details: Vec<String> = self
            .required
            .iter()
            .map(|key| {
                if missing.contains(key) {
                    debug!(key = %key, "Required variable missing");
                    format!("  ❌ {} not set or using default value", key)
                } else {
                    format!("  ✅ {} is set", key)
                }
            })
            .collect();

        if missing.is_empty() {
            return CheckResult::pass(format!("{} variables set", self.required.len()))
                .with_details(details);
        }

        details.push(String::new());
        details.push(format!(
            "⚠️  Missing required variables: {}",
            missing.join(", ")
        ));
        details.push("Please edit your .env file and set these values.".to_string());

        CheckResult::fail(format!("{} variable(s) missing", missing.len())).with_details(details)
    }
}
