#![allow(clippy::unwrap_used)]

mod scenarios;

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use quadsync_domain::{Quad, Term};
use quadsync_index::{IndexBackend, IndexError, IndexSyncAdapter, IndexSyncConfig, OxigraphBackend};
use quadsync_repository::{
    DatabaseDriver, NumericFallbackConfig, RepositoryManager, RepositoryManagerConfigRaw,
};
use tempfile::TempDir;

use crate::coordinator::DualWriteCoordinator;

pub(super) const DATASET: &str = "kb";

pub(super) struct Harness {
    pub coordinator: DualWriteCoordinator,
    _dir: TempDir,
}

pub(super) async fn setup_with(index: IndexSyncAdapter) -> Harness {
    let dir = TempDir::new().unwrap();
    let config = RepositoryManagerConfigRaw {
        driver: DatabaseDriver::Sqlite,
        user: String::new(),
        password: None,
        database: dir.path().join("quads.db").to_string_lossy().into_owned(),
        host: String::new(),
        port: 0,
        max_connections: 4,
        min_connections: 1,
        max_batch_rows: 100,
        numeric_fallback: NumericFallbackConfig::default(),
    }
    .resolve()
    .unwrap();
    let repository = RepositoryManager::connect(&config).await.unwrap();
    Harness {
        coordinator: DualWriteCoordinator::new(&repository, Arc::new(index)),
        _dir: dir,
    }
}

/// Coordinator over a fresh SQLite store and an in-memory oxigraph index.
pub(super) async fn setup() -> Harness {
    setup_with(IndexSyncAdapter::from_backend(
        Box::new(OxigraphBackend::in_memory()),
        IndexSyncConfig::in_memory(),
    ))
    .await
}

/// Rejects every index update.
pub(super) struct FailingBackend {
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl IndexBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn health_check(&self) -> quadsync_index::Result<bool> {
        Ok(true)
    }

    async fn update(
        &self,
        _dataset: &str,
        _update: &str,
        _timeout: Duration,
    ) -> quadsync_index::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(IndexError::Backend {
            status: 503,
            message: "index unavailable".to_string(),
        })
    }

    async fn construct(
        &self,
        _dataset: &str,
        _query: &str,
        _timeout: Duration,
    ) -> quadsync_index::Result<String> {
        Ok(String::new())
    }

    async fn ask(
        &self,
        _dataset: &str,
        _query: &str,
        _timeout: Duration,
    ) -> quadsync_index::Result<bool> {
        Ok(false)
    }
}

pub(super) fn ex(local: &str) -> Term {
    Term::uri(format!("http://example.org/{local}"))
}

pub(super) fn quad(subject: &str, predicate: &str, object: Term, graph: &str) -> Quad {
    Quad::new(ex(subject), ex(predicate), object, ex(graph))
}

/// Whether the index holds `quad`.
pub(super) async fn indexed(harness: &Harness, quad: &Quad) -> bool {
    let pattern = if quad.graph.is_default_graph() {
        quad.triple_line()
    } else {
        format!("GRAPH {} {{ {} }}", quad.graph, quad.triple_line())
    };
    harness
        .coordinator
        .index()
        .ask(DATASET, &format!("ASK {{ {pattern} }}"))
        .await
        .unwrap()
}
