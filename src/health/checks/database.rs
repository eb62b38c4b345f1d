//! Database reachability check

use std::sync::Mutex;
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use crate::env::EnvSnapshot;
use crate::error::ProbeError;
use crate::health::check::{CheckResult, SystemCheck};

const DEFAULT_PORT: u16 = 5432;

/// Database layer used by [`DatabaseCheck`]
pub trait DatabaseProbe {
    /// Sets up the connection pool; calling it again is a no-op
    fn init_pool(&self, env: &EnvSnapshot) -> Result<(), ProbeError>;

    /// Returns true if the database is reachable and answers queries
    fn test_connection(&self) -> Result<bool, ProbeError>;
}

/// Connection settings read from `DB_*` variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl DbSettings {
    /// Reads settings from the snapshot; `DB_PORT` is optional
    pub fn from_env(env: &EnvSnapshot) -> Result<Self, ProbeError> {
        let required = |key: &'static str| {
            env.non_empty(key)
                .map(str::to_string)
                .ok_or(ProbeError::MissingSetting(key))
        };

        let host = required("DB_HOST")?;
        let port = match env.non_empty("DB_PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| ProbeError::InvalidPort(port.to_string()))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host,
            port,
            database: required("DB_NAME")?,
            user: required("DB_USER")?,
            password: required("DB_PASSWORD")?,
        })
    }

    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }
}

struct PoolState {
    runtime: Runtime,
    pool: PgPool,
}

/// PostgreSQL probe driven by a private current-thread runtime
pub struct PostgresProbe {
    timeout: Duration,
    state: Mutex<Option<PoolState>>,
}

impl PostgresProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            state: Mutex::new(None),
        }
    }
}

impl DatabaseProbe for PostgresProbe {
    fn init_pool(&self, env: &EnvSnapshot) -> Result<(), ProbeError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ProbeError::Other("probe state poisoned".to_string()))?;
        if state.is_some() {
            return Ok(());
        }

        let settings = DbSettings::from_env(env)?;
        debug!(host = %settings.host, port = settings.port, db = %settings.database, "Creating pool");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProbeError::Runtime)?;

        // Lazy pool: no connection is opened until the probe query
        let pool = {
            let _guard = runtime.enter();
            PgPoolOptions::new()
                .max_connections(1)
                .acquire_timeout(self.timeout)
                .connect_lazy_with(settings.connect_options())
        };

        *state = Some(PoolState { runtime, pool });
        Ok(())
    }

    fn test_connection(&self) -> Result<bool, ProbeError> {
        let state = self
            .state
            .lock()
            .map_err(|_| ProbeError::Other("probe state poisoned".to_string()))?;
        let PoolState { runtime, pool } = state.as_ref().ok_or(ProbeError::NotInitialized)?;

        let query = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool);
        match runtime.block_on(async { tokio::time::timeout(self.timeout, query).await }) {
            Ok(Ok(value)) => Ok(value == 1),
            Ok(Err(e)) => Err(ProbeError::Database(e)),
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        }
    }
}

/// Checks that the application's database answers a trivial query
pub struct DatabaseCheck {
    probe: Box<dyn DatabaseProbe>,
}

impl DatabaseCheck {
    pub fn new<P: DatabaseProbe + 'static>(probe: P) -> Self {
        Self {
            probe: Box::new(probe),
        }
    }
}

impl SystemCheck for DatabaseCheck {
    fn name(&self) -> &'static str {
        "Database Connection"
    }

    fn heading(&self) -> &'static str {
        "🗄️  Testing database connection..."
    }

    fn check(&self, env: &EnvSnapshot) -> CheckResult {
        let outcome = self
            .probe
            .init_pool(env)
            .and_then(|()| self.probe.test_connection());

        match outcome {
            Ok(true) => CheckResult::pass("Database reachable")
                .with_details(vec!["  ✅ Database connection successful".to_string()]),
            Ok(false) => CheckResult::fail("Database probe returned false")
                .with_details(vec!["  ❌ Database connection failed".to_string()]),
            Err(e) => {
                warn!(error = %e, "Database probe failed");
                CheckResult::fail(e.to_string())
                    .with_details(vec![format!("  ❌ Database connection error: {}", e)])
            }
        }
    }
}
