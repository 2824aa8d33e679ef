use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    Mysql,
    Postgres,
    /// `database` is a file path; no credentials are used.
    Sqlite,
}

/// Float-precision reconciliation for numeric literals on the delete path.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NumericFallbackConfig {
    pub enabled: bool,
    /// Maximum relative distance `|a-b| / max(|a|,|b|)` for a candidate.
    pub tolerance: f64,
    /// Upper bound on prefix-matched rows inspected per lookup. A lookup that
    /// hits it is reported as ambiguous.
    pub max_candidates: u64,
}

impl Default for NumericFallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tolerance: 0.01,
            max_candidates: 64,
        }
    }
}

/// Repository manager configuration for database connections.
///
/// **Secret handling**: the database password is resolved at config load time,
/// typically from the `QUADSYNC_DB_PASSWORD` environment variable. It is
/// required for every driver except SQLite.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RepositoryManagerConfigRaw {
    pub driver: DatabaseDriver,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Rows per multi-row statement; bounds statement size for the driver.
    pub max_batch_rows: usize,
    #[serde(default)]
    pub numeric_fallback: NumericFallbackConfig,
}

impl RepositoryManagerConfigRaw {
    pub fn resolve(self) -> Result<RepositoryManagerConfig, ConfigError> {
        let password = match (self.driver, self.password) {
            (DatabaseDriver::Sqlite, password) => password.unwrap_or_default(),
            (_, Some(password)) => password,
            (_, None) => {
                return Err(ConfigError::MissingSecret(
                    "QUADSYNC_DB_PASSWORD env var or password config required".to_string(),
                ));
            }
        };

        if self.max_batch_rows == 0 {
            return Err(ConfigError::InvalidConfig(
                "max_batch_rows must be at least 1".to_string(),
            ));
        }
        if self.max_connections == 0 || self.min_connections > self.max_connections {
            return Err(ConfigError::InvalidConfig(format!(
                "connection pool bounds are invalid (min {}, max {})",
                self.min_connections, self.max_connections
            )));
        }
        let tolerance = self.numeric_fallback.tolerance;
        if !(tolerance > 0.0 && tolerance < 1.0) {
            return Err(ConfigError::InvalidConfig(format!(
                "numeric_fallback.tolerance must be in (0, 1), got {tolerance}"
            )));
        }
        if self.numeric_fallback.max_candidates == 0 {
            return Err(ConfigError::InvalidConfig(
                "numeric_fallback.max_candidates must be at least 1".to_string(),
            ));
        }

        Ok(RepositoryManagerConfig {
            driver: self.driver,
            user: self.user,
            password,
            database: self.database,
            host: self.host,
            port: self.port,
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            max_batch_rows: self.max_batch_rows,
            numeric_fallback: self.numeric_fallback,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RepositoryManagerConfig {
    pub driver: DatabaseDriver,
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_batch_rows: usize,
    pub numeric_fallback: NumericFallbackConfig,
}

impl RepositoryManagerConfig {
    pub fn connection_string(&self) -> String {
        match self.driver {
            DatabaseDriver::Mysql => format!(
                "mysql://{}:{}@{}:{}/{}",
                self.user, self.password, self.host, self.port, self.database
            ),
            DatabaseDriver::Postgres => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.user, self.password, self.host, self.port, self.database
            ),
            DatabaseDriver::Sqlite => format!("sqlite://{}?mode=rwc", self.database),
        }
    }
}
