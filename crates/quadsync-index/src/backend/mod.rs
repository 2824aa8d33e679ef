mod http;
mod oxigraph_backend;

use std::time::Duration;

use async_trait::async_trait;
pub use http::SparqlHttpBackend;
pub use oxigraph_backend::OxigraphBackend;

use crate::error::Result;

/// Low-level SPARQL execution against one index system.
///
/// Every call names the dataset; backends map it to a namespace, a store,
/// or whatever partitioning they support.
#[async_trait]
pub trait IndexBackend: Send + Sync {
    /// Backend name for logging/metrics
    fn name(&self) -> &'static str;

    /// Health check - verify the index is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Execute a SPARQL UPDATE request
    async fn update(&self, dataset: &str, update: &str, timeout: Duration) -> Result<()>;

    /// Execute a SPARQL CONSTRUCT query
    ///
    /// Returns N-Triples lines
    async fn construct(&self, dataset: &str, query: &str, timeout: Duration) -> Result<String>;

    /// Execute a SPARQL ASK query
    async fn ask(&self, dataset: &str, query: &str, timeout: Duration) -> Result<bool>;
}
