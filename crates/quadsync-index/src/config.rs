use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackendType {
    /// SPARQL 1.1 Protocol endpoint over HTTP, one namespace per dataset
    Sparql,
    /// Embedded oxigraph store, one store per dataset
    Oxigraph,
}

/// How `xsd:double`/`xsd:float` literals are written into generated
/// `INSERT DATA`/`DELETE DATA` blocks.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NumericLiteralPolicy {
    #[default]
    Preserve,
    /// Re-type plain decimal lexical forms as `xsd:decimal`, so the index
    /// keeps the exact digits instead of a binary float.
    Decimal,
}

/// Configuration for the index sync adapter
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct IndexSyncConfig {
    /// When false, writes only reach the authoritative store.
    pub enabled: bool,

    pub backend: IndexBackendType,

    /// Base URL of the SPARQL service (e.g., "http://localhost:9999/blazegraph").
    /// Ignored for oxigraph.
    pub url: String,

    pub username: Option<String>,
    pub password: Option<String>,

    /// Health check attempts on startup (sparql only)
    pub connect_max_retries: u32,

    /// Delay between health check attempts in milliseconds (sparql only)
    pub connect_retry_frequency_ms: u64,

    pub timeouts: TimeoutConfig,

    /// Upper bound on index calls in flight at once.
    pub max_concurrent_operations: usize,

    #[serde(default)]
    pub numeric_literals: NumericLiteralPolicy,

    #[serde(default)]
    pub oxigraph: OxigraphStoreConfig,
}

/// Embedded store location.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct OxigraphStoreConfig {
    /// Directory holding one store per dataset. In-memory when `None`.
    pub path: Option<PathBuf>,
}

/// Timeout configuration for different SPARQL operations
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TimeoutConfig {
    /// Timeout for CONSTRUCT queries in milliseconds
    pub query_ms: u64,

    /// Timeout for UPDATE requests in milliseconds
    pub update_ms: u64,

    /// Timeout for ASK queries in milliseconds
    pub ask_ms: u64,
}

impl TimeoutConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_ms)
    }

    pub fn update_timeout(&self) -> Duration {
        Duration::from_millis(self.update_ms)
    }

    pub fn ask_timeout(&self) -> Duration {
        Duration::from_millis(self.ask_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            query_ms: 60_000,
            update_ms: 30_000,
            ask_ms: 10_000,
        }
    }
}

impl IndexSyncConfig {
    pub fn connect_retry_frequency(&self) -> Duration {
        Duration::from_millis(self.connect_retry_frequency_ms)
    }

    /// SPARQL endpoint of one dataset's namespace.
    pub fn sparql_endpoint(&self, dataset: &str) -> String {
        format!(
            "{}/namespace/{}/sparql",
            self.url.trim_end_matches('/'),
            dataset
        )
    }

    pub fn status_endpoint(&self) -> String {
        format!("{}/status", self.url.trim_end_matches('/'))
    }

    /// In-memory oxigraph index, used by tests and local runs.
    pub fn in_memory() -> Self {
        Self {
            enabled: true,
            backend: IndexBackendType::Oxigraph,
            url: String::new(),
            username: None,
            password: None,
            connect_max_retries: 1,
            connect_retry_frequency_ms: 10,
            timeouts: TimeoutConfig::default(),
            max_concurrent_operations: 4,
            numeric_literals: NumericLiteralPolicy::Preserve,
            oxigraph: OxigraphStoreConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_ignore_trailing_slash() {
        let config = IndexSyncConfig {
            backend: IndexBackendType::Sparql,
            url: "http://localhost:9999/blazegraph/".to_string(),
            ..IndexSyncConfig::in_memory()
        };
        assert_eq!(
            config.sparql_endpoint("kb"),
            "http://localhost:9999/blazegraph/namespace/kb/sparql"
        );
        assert_eq!(
            config.status_endpoint(),
            "http://localhost:9999/blazegraph/status"
        );
    }
}
