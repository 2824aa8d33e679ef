//! Typed defaults: a local SQLite store with an on-disk oxigraph index.
//!
//! Files and `QUADSYNC_` environment variables are layered on top of these
//! by the loader.

use std::path::PathBuf;

use quadsync_index::{
    IndexBackendType, IndexSyncConfig, NumericLiteralPolicy, OxigraphStoreConfig, TimeoutConfig,
};
use quadsync_repository::{DatabaseDriver, NumericFallbackConfig, RepositoryManagerConfigRaw};

use super::ConfigRaw;
use crate::logger::{LogFormat, LoggerConfig, TelemetryConfig, TelemetryMetricsConfig};

pub(crate) fn config() -> ConfigRaw {
    ConfigRaw {
        logger: LoggerConfig {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        },
        telemetry: TelemetryConfig {
            metrics: TelemetryMetricsConfig {
                enabled: false,
                bind_address: "127.0.0.1:9464".to_string(),
            },
        },
        repository: repository(),
        index: index(),
    }
}

fn repository() -> RepositoryManagerConfigRaw {
    RepositoryManagerConfigRaw {
        driver: DatabaseDriver::Sqlite,
        user: "quadsync".to_string(),
        password: None,
        database: "data/quadsync.db".to_string(),
        host: "localhost".to_string(),
        port: 3306,
        max_connections: 16,
        min_connections: 1,
        max_batch_rows: 500,
        numeric_fallback: NumericFallbackConfig::default(),
    }
}

fn index() -> IndexSyncConfig {
    IndexSyncConfig {
        enabled: true,
        backend: IndexBackendType::Oxigraph,
        url: "http://localhost:9999/blazegraph".to_string(),
        username: None,
        password: None,
        connect_max_retries: 10,
        connect_retry_frequency_ms: 10_000,
        timeouts: TimeoutConfig::default(),
        max_concurrent_operations: 16,
        numeric_literals: NumericLiteralPolicy::Preserve,
        oxigraph: OxigraphStoreConfig {
            path: Some(PathBuf::from("data/index")),
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use figment::{Figment, providers::Serialized};

    use super::*;

    #[test]
    fn defaults_round_trip_through_figment() {
        let extracted: ConfigRaw = Figment::from(Serialized::defaults(config()))
            .extract()
            .unwrap();
        assert_eq!(extracted.repository.driver, DatabaseDriver::Sqlite);
        assert_eq!(extracted.index.backend, IndexBackendType::Oxigraph);
    }

    #[test]
    fn defaults_resolve_without_secrets() {
        let resolved = config().resolve().unwrap();
        assert_eq!(
            resolved.repository.connection_string(),
            "sqlite://data/quadsync.db?mode=rwc"
        );
    }
}
