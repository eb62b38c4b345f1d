//! Built-in preflight checks

pub mod database;
pub mod environment;
pub mod openai;
pub mod packages;

pub use database::{DatabaseCheck, DatabaseProbe, DbSettings, PostgresProbe};
pub use environment::EnvironmentCheck;
pub use openai::{ModelService, OpenAiCheck, OpenAiClient, OpenAiConnector, ServiceConnector};
pub use packages::{ModuleLoader, PackagesCheck, PythonImporter, is_valid_module_name};
