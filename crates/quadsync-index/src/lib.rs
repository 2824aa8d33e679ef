mod backend;
mod config;
pub mod error;
mod metrics;
mod render;

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

pub use backend::{IndexBackend, OxigraphBackend, SparqlHttpBackend};
pub use config::{
    IndexBackendType, IndexSyncConfig, NumericLiteralPolicy, OxigraphStoreConfig, TimeoutConfig,
};
pub use error::{IndexError, Result};
use quadsync_domain::Quad;
use render::{DataOperation, render_data};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};


/// One write to propagate to the index.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexWrite {
    Insert(Vec<Quad>),
    Delete(Vec<Quad>),
    /// SPARQL UPDATE text, sent verbatim.
    Update(String),
}

impl IndexWrite {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Insert(_) => "insert",
            Self::Delete(_) => "delete",
            Self::Update(_) => "update",
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Insert(quads) | Self::Delete(quads) => quads.is_empty(),
            Self::Update(text) => text.trim().is_empty(),
        }
    }
}

/// Index Sync Adapter
///
/// Propagates writes already committed to the authoritative store into the
/// SPARQL index. The index is eventually consistent: a failed sync is counted
/// and reported, never retried or compensated here.
pub struct IndexSyncAdapter {
    backend: Box<dyn IndexBackend>,
    config: IndexSyncConfig,
    /// Semaphore for limiting concurrent index calls
    concurrency_limiter: Arc<Semaphore>,
    sync_failures: AtomicU64,
}

impl IndexSyncAdapter {
    /// Create the configured backend and, for HTTP endpoints, wait until it
    /// answers its health check.
    pub async fn connect(config: &IndexSyncConfig) -> Result<Self> {
        let backend: Box<dyn IndexBackend> = match config.backend {
            IndexBackendType::Sparql => Box::new(SparqlHttpBackend::new(config.clone())?),
            IndexBackendType::Oxigraph => match &config.oxigraph.path {
                Some(path) => Box::new(OxigraphBackend::open(path)?),
                None => Box::new(OxigraphBackend::in_memory()),
            },
        };

        let adapter = Self::from_backend(backend, config.clone());

        if !config.enabled {
            tracing::warn!("Index sync disabled; writes reach the authoritative store only");
        } else if config.backend == IndexBackendType::Sparql {
            adapter.connect_with_retry().await?;
        }

        Ok(adapter)
    }

    /// Wrap an already constructed backend.
    pub fn from_backend(backend: Box<dyn IndexBackend>, config: IndexSyncConfig) -> Self {
        let max_concurrent = config.max_concurrent_operations.max(1);
        if max_concurrent != config.max_concurrent_operations {
            tracing::warn!(
                configured = config.max_concurrent_operations,
                effective = max_concurrent,
                "Index max_concurrent_operations too low; clamped"
            );
        }
        tracing::info!(
            backend = %backend.name(),
            max_concurrent = max_concurrent,
            "Index concurrency limiter initialized"
        );

        Self {
            backend,
            config,
            concurrency_limiter: Arc::new(Semaphore::new(max_concurrent)),
            sync_failures: AtomicU64::new(0),
        }
    }

    async fn connect_with_retry(&self) -> Result<()> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.backend.health_check().await {
                Ok(true) => {
                    tracing::info!(
                        backend = %self.backend.name(),
                        url = %self.config.url,
                        "Connected to index"
                    );
                    return Ok(());
                }
                Ok(false) => {
                    tracing::warn!(
                        backend = %self.backend.name(),
                        attempt = attempts,
                        "Index health check returned false"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        backend = %self.backend.name(),
                        attempt = attempts,
                        error = %e,
                        "Failed to connect to index"
                    );
                }
            }

            if attempts >= self.config.connect_max_retries {
                return Err(IndexError::ConnectionFailed { attempts });
            }

            tokio::time::sleep(self.config.connect_retry_frequency()).await;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Syncs that failed since startup.
    pub fn sync_failures(&self) -> u64 {
        self.sync_failures.load(Ordering::Relaxed)
    }

    /// Send one write to the index.
    ///
    /// Quad writes become `INSERT DATA`/`DELETE DATA` blocks; update text is
    /// forwarded as is. Returns `Ok(false)` when there was nothing to send.
    pub async fn apply(&self, dataset: &str, write: &IndexWrite) -> Result<bool> {
        let started = Instant::now();
        let kind = write.kind();

        let update = match write {
            IndexWrite::Insert(quads) => self.render(dataset, DataOperation::Insert, quads),
            IndexWrite::Delete(quads) => self.render(dataset, DataOperation::Delete, quads),
            IndexWrite::Update(text) if text.trim().is_empty() => None,
            IndexWrite::Update(text) => Some(text.clone()),
        };
        let Some(update) = update else {
            return Ok(false);
        };

        let result = self
            .backend_update(dataset, &update, self.config.timeouts.update_timeout())
            .await;
        metrics::record_sync(dataset, kind, result.as_ref().err(), started.elapsed());

        match result {
            Ok(()) => {
                tracing::debug!(
                    dataset = %dataset,
                    kind = kind,
                    bytes = update.len(),
                    "Index synced"
                );
                Ok(true)
            }
            Err(error) => {
                let failures = self.sync_failures.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(
                    dataset = %dataset,
                    kind = kind,
                    error = %error,
                    sync_failures = failures,
                    "Index sync failed; index lags the authoritative store"
                );
                Err(error)
            }
        }
    }

    fn render(&self, dataset: &str, operation: DataOperation, quads: &[Quad]) -> Option<String> {
        let rendered = render_data(operation, quads, self.config.numeric_literals);
        if rendered.blank_node_quads > 0 {
            metrics::record_blank_node_quads(dataset, operation.kind(), rendered.blank_node_quads);
            match operation {
                DataOperation::Insert => tracing::warn!(
                    dataset = %dataset,
                    quads = rendered.blank_node_quads,
                    "Quads with blank nodes get fresh nodes in the index on every insert; \
                     repeated inserts duplicate them there"
                ),
                DataOperation::Delete => tracing::warn!(
                    dataset = %dataset,
                    skipped = rendered.blank_node_quads,
                    "Quads with blank nodes cannot be deleted from the index by value; skipped"
                ),
            }
        }
        rendered.update
    }

    /// Run an ASK query against a dataset of the index.
    pub async fn ask(&self, dataset: &str, query: &str) -> Result<bool> {
        let backend = self.backend.name();
        let op = "ask";
        let started = Instant::now();
        metrics::record_backend_query_bytes_total(backend, op, query.len());

        let permit = match self.acquire_permit(backend, op).await {
            Ok(permit) => permit,
            Err(error) => {
                metrics::record_backend_operation(backend, op, Some(&error), started.elapsed());
                return Err(error);
            }
        };

        let result = self
            .backend
            .ask(dataset, query, self.config.timeouts.ask_timeout())
            .await;
        drop(permit);
        self.record_permit_snapshot(backend);
        metrics::record_backend_operation(backend, op, result.as_ref().err(), started.elapsed());
        result
    }

    /// Run a CONSTRUCT query; returns N-Triples lines.
    pub async fn construct(&self, dataset: &str, query: &str) -> Result<String> {
        let backend = self.backend.name();
        let op = "construct";
        let started = Instant::now();
        metrics::record_backend_query_bytes_total(backend, op, query.len());

        let permit = match self.acquire_permit(backend, op).await {
            Ok(permit) => permit,
            Err(error) => {
                metrics::record_backend_operation(backend, op, Some(&error), started.elapsed());
                return Err(error);
            }
        };

        let result = self
            .backend
            .construct(dataset, query, self.config.timeouts.query_timeout())
            .await;
        drop(permit);
        self.record_permit_snapshot(backend);
        metrics::record_backend_operation(backend, op, result.as_ref().err(), started.elapsed());
        result
    }

    // ========== Internal Backend Wrappers (with concurrency limiting) ==========

    pub fn max_concurrent_operations(&self) -> usize {
        self.config.max_concurrent_operations.max(1)
    }

    fn record_permit_snapshot(&self, backend: &str) {
        metrics::record_backend_permit_snapshot(
            backend,
            self.max_concurrent_operations(),
            self.concurrency_limiter.available_permits(),
        );
    }

    async fn acquire_permit(&self, backend: &str, op: &str) -> Result<OwnedSemaphorePermit> {
        let wait_started = Instant::now();
        let permit = self
            .concurrency_limiter
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| IndexError::SemaphoreClosed)?;
        metrics::record_backend_permit_wait(backend, op, wait_started.elapsed());
        self.record_permit_snapshot(backend);
        Ok(permit)
    }

    async fn backend_update(&self, dataset: &str, update: &str, timeout: Duration) -> Result<()> {
        let backend = self.backend.name();
        let op = "update";
        let started = Instant::now();
        metrics::record_backend_query_bytes_total(backend, op, update.len());

        let permit = match self.acquire_permit(backend, op).await {
            Ok(permit) => permit,
            Err(error) => {
                metrics::record_backend_operation(backend, op, Some(&error), started.elapsed());
                return Err(error);
            }
        };

        let result = self.backend.update(dataset, update, timeout).await;
        drop(permit);
        self.record_permit_snapshot(backend);
        metrics::record_backend_operation(backend, op, result.as_ref().err(), started.elapsed());
        result
    }
}
