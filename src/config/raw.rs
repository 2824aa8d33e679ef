use quadsync_index::{IndexBackendType, IndexSyncConfig};
use quadsync_repository::{RepositoryManagerConfig, RepositoryManagerConfigRaw};
use serde::{Deserialize, Serialize};

use crate::{
    config::ConfigError,
    logger::{LoggerConfig, TelemetryConfig},
};

/// Configuration as read from files and environment, secrets unresolved.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConfigRaw {
    pub logger: LoggerConfig,
    pub telemetry: TelemetryConfig,
    pub repository: RepositoryManagerConfigRaw,
    pub index: IndexSyncConfig,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub logger: LoggerConfig,
    pub telemetry: TelemetryConfig,
    pub repository: RepositoryManagerConfig,
    pub index: IndexSyncConfig,
}

impl ConfigRaw {
    pub fn resolve(self) -> Result<Config, ConfigError> {
        validate_index(&self.index)?;
        Ok(Config {
            logger: self.logger,
            telemetry: self.telemetry,
            repository: self.repository.resolve()?,
            index: self.index,
        })
    }
}

fn validate_index(index: &IndexSyncConfig) -> Result<(), ConfigError> {
    if !index.enabled {
        return Ok(());
    }
    if index.backend == IndexBackendType::Sparql && index.url.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(
            "index.url is required for the sparql backend".to_string(),
        ));
    }
    if index.max_concurrent_operations == 0 {
        return Err(ConfigError::InvalidConfig(
            "index.max_concurrent_operations must be at least 1".to_string(),
        ));
    }
    if index.username.is_some() != index.password.is_some() {
        return Err(ConfigError::InvalidConfig(
            "index.username and index.password must be set together".to_string(),
        ));
    }
    Ok(())
}
