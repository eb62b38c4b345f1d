//! Model API reachability check

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::env::EnvSnapshot;
use crate::error::ServiceError;
use crate::health::check::{CheckResult, SystemCheck};

/// A client bound to one API credential
pub trait ModelService {
    /// Lists the model ids visible to the credential
    fn list_models(&self) -> Result<Vec<String>, ServiceError>;
}

/// Builds [`ModelService`] clients for [`OpenAiCheck`]
pub trait ServiceConnector {
    fn connect(&self, api_key: &str) -> Result<Box<dyn ModelService>, ServiceError>;
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Connector for OpenAI-compatible APIs
pub struct OpenAiConnector {
    base_url: String,
    timeout: Duration,
}

impl OpenAiConnector {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }
}

impl ServiceConnector for OpenAiConnector {
    fn connect(&self, api_key: &str) -> Result<Box<dyn ModelService>, ServiceError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("lab-preflight/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ServiceError::Client)?;

        Ok(Box::new(OpenAiClient {
            http,
            models_url: format!("{}/models", self.base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }))
    }
}

/// Blocking client for the `/models` endpoint
pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    models_url: String,
    api_key: String,
}

impl ModelService for OpenAiClient {
    fn list_models(&self) -> Result<Vec<String>, ServiceError> {
        debug!(url = %self.models_url, "Listing models");
        let response = self
            .http
            .get(&self.models_url)
            .bearer_auth(&self.api_key)
            .send()
            .map_err(ServiceError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request rejected")
                    .to_string()
            });
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let list: ModelList = response.json().map_err(ServiceError::Decode)?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }
}

/// Extracts `error.message` from an OpenAI-style error body
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
}

/// Checks that the model API accepts the configured credential
pub struct OpenAiCheck {
    api_key_var: String,
    connector: Box<dyn ServiceConnector>,
}

impl OpenAiCheck {
    pub fn new<C: ServiceConnector + 'static>(api_key_var: impl Into<String>, connector: C) -> Self {
        Self {
            api_key_var: api_key_var.into(),
            connector: Box::new(connector),
        }
    }
}

impl SystemCheck for OpenAiCheck {
    fn name(&self) -> &'static str {
        "OpenAI Connection"
    }

    fn heading(&self) -> &'static str {
        "🤖 Testing OpenAI API connection..."
    }

    fn check(&self, env: &EnvSnapshot) -> CheckResult {
        let Some(api_key) = env.non_empty(&self.api_key_var) else {
            return CheckResult::fail(format!("{} not set", self.api_key_var))
                .with_details(vec![format!("  ❌ {} not set", self.api_key_var)]);
        };

        let outcome = self
            .connector
            .connect(api_key)
            .and_then(|client| client.list_models());

        match outcome {
            Ok(models) => CheckResult::pass(format!("{} models available", models.len()))
                .with_details(vec![
                    "  ✅ OpenAI API connection successful".to_string(),
                    format!("     {} models available", models.len()),
                ]),
            Err(e) => {
                warn!(error = %e, "Model API request failed");
                CheckResult::fail(e.to_string()).with_details(vec![
                    format!("  ❌ OpenAI API connection error: {}", e),
                    "  Make sure your API key is valid and you have credits".to_string(),
                ])
            }
        }
    }
}
