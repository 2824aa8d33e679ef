#![allow(clippy::unwrap_used)]

mod quad;

use quadsync_domain::{Quad, Term};
use tempfile::TempDir;

use crate::{
    DatabaseDriver, NumericFallbackConfig, RepositoryManager, RepositoryManagerConfigRaw,
};

pub(super) const DATASET: &str = "kb";

pub(super) async fn setup_manager(max_batch_rows: usize) -> (RepositoryManager, TempDir) {
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
        max_batch_rows,
        numeric_fallback: NumericFallbackConfig::default(),
    }
    .resolve()
    .unwrap();
    let manager = RepositoryManager::connect(&config).await.unwrap();
    (manager, dir)
}

pub(super) fn quad(subject: &str, predicate: &str, object: Term, graph: &str) -> Quad {
    Quad::new(
        Term::uri(format!("http://example.org/{subject}")),
        Term::uri(format!("http://example.org/{predicate}")),
        object,
        Term::uri(format!("http://example.org/{graph}")),
    )
}
