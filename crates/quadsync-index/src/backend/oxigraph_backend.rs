use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use dashmap::DashMap;
use oxigraph::{
    sparql::{QueryResults, SparqlEvaluator},
    store::Store,
};

use super::IndexBackend;
use crate::error::{IndexError, Result};

/// Embedded oxigraph index with one store per dataset.
///
/// Stores are opened lazily on first use; on disk each dataset gets its own
/// directory below the configured path.
pub struct OxigraphBackend {
    path: Option<PathBuf>,
    stores: DashMap<String, Store>,
}

impl OxigraphBackend {
    /// Persistent stores below `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        std::fs::create_dir_all(&path)?;
        tracing::info!(path = %path.display(), "Using persistent oxigraph index");
        Ok(Self {
            path: Some(path),
            stores: DashMap::new(),
        })
    }

    pub fn in_memory() -> Self {
        tracing::info!("Using in-memory oxigraph index");
        Self {
            path: None,
            stores: DashMap::new(),
        }
    }

    fn store(&self, dataset: &str) -> Result<Store> {
        if let Some(store) = self.stores.get(dataset) {
            return Ok(store.clone());
        }
        validate_dataset(dataset)?;

        let store = self
            .stores
            .entry(dataset.to_string())
            .or_try_insert_with(|| match &self.path {
                Some(base) => {
                    let dir = base.join(dataset);
                    std::fs::create_dir_all(&dir)?;
                    let store = Store::open(&dir).map_err(|e| {
                        IndexError::Store(format!("Failed to open oxigraph store: {e}"))
                    })?;
                    tracing::debug!(dataset = %dataset, path = %dir.display(), "Opened index store");
                    Ok(store)
                }
                None => Store::new().map_err(|e| {
                    IndexError::Store(format!("Failed to create in-memory oxigraph store: {e}"))
                }),
            })?
            .clone();
        Ok(store)
    }
}

/// Dataset names become directory names.
fn validate_dataset(dataset: &str) -> Result<()> {
    let valid = !dataset.is_empty()
        && !dataset.starts_with('.')
        && dataset
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(IndexError::Store(format!(
            "Dataset name '{dataset}' cannot be used as an index store name"
        )))
    }
}

#[async_trait]
impl IndexBackend for OxigraphBackend {
    fn name(&self) -> &'static str {
        "oxigraph"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn update(&self, dataset: &str, update: &str, _timeout: Duration) -> Result<()> {
        let prepared = SparqlEvaluator::new()
            .parse_update(update)
            .map_err(|e| IndexError::InvalidQuery {
                reason: format!("Failed to parse SPARQL UPDATE: {e}"),
            })?;

        let store = self.store(dataset)?;
        tokio::task::spawn_blocking(move || {
            prepared
                .on_store(&store)
                .execute()
                .map_err(|e| IndexError::Store(format!("SPARQL UPDATE failed: {e}")))
        })
        .await
        .map_err(|e| IndexError::Store(format!("Task join error: {e}")))??;

        Ok(())
    }

    async fn construct(&self, dataset: &str, query: &str, _timeout: Duration) -> Result<String> {
        let prepared = SparqlEvaluator::new()
            .parse_query(query)
            .map_err(|e| IndexError::InvalidQuery {
                reason: format!("Failed to parse SPARQL CONSTRUCT: {e}"),
            })?;

        let store = self.store(dataset)?;
        tokio::task::spawn_blocking(move || {
            let result = prepared
                .on_store(&store)
                .execute()
                .map_err(|e| IndexError::Store(format!("SPARQL CONSTRUCT failed: {e}")))?;

            match result {
                QueryResults::Graph(triples) => {
                    let mut output = Vec::new();
                    for triple in triples {
                        let triple = triple.map_err(|e| {
                            IndexError::Store(format!("Failed to read triple: {e}"))
                        })?;
                        output.push(format!(
                            "{} {} {} .",
                            triple.subject, triple.predicate, triple.object
                        ));
                    }
                    Ok(output.join("\n"))
                }
                _ => Err(IndexError::InvalidQuery {
                    reason: "Expected CONSTRUCT to return graph results".to_string(),
                }),
            }
        })
        .await
        .map_err(|e| IndexError::Store(format!("Task join error: {e}")))?
    }

    async fn ask(&self, dataset: &str, query: &str, _timeout: Duration) -> Result<bool> {
        let prepared = SparqlEvaluator::new()
            .parse_query(query)
            .map_err(|e| IndexError::InvalidQuery {
                reason: format!("Failed to parse SPARQL ASK: {e}"),
            })?;

        let store = self.store(dataset)?;
        tokio::task::spawn_blocking(move || {
            let result = prepared
                .on_store(&store)
                .execute()
                .map_err(|e| IndexError::Store(format!("SPARQL ASK failed: {e}")))?;

            match result {
                QueryResults::Boolean(value) => Ok(value),
                _ => Err(IndexError::InvalidQuery {
                    reason: "Expected ASK to return boolean result".to_string(),
                }),
            }
        })
        .await
        .map_err(|e| IndexError::Store(format!("Task join error: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn datasets_are_isolated() {
        let backend = OxigraphBackend::in_memory();
        backend
            .update(
                "kb",
                "INSERT DATA { GRAPH <g:1> { <s:1> <p:1> <o:1> . } }",
                TIMEOUT,
            )
            .await
            .unwrap();

        let ask = "ASK { GRAPH <g:1> { <s:1> <p:1> <o:1> } }";
        assert!(backend.ask("kb", ask, TIMEOUT).await.unwrap());
        assert!(!backend.ask("other", ask, TIMEOUT).await.unwrap());
    }

    #[tokio::test]
    async fn persistent_store_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        {
            let backend = OxigraphBackend::open(dir.path()).unwrap();
            backend
                .update("kb", "INSERT DATA { <s:1> <p:1> \"v\" . }", TIMEOUT)
                .await
                .unwrap();
        }

        let backend = OxigraphBackend::open(dir.path()).unwrap();
        let triples = backend
            .construct("kb", "CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }", TIMEOUT)
            .await
            .unwrap();
        assert_eq!(triples, "<s:1> <p:1> \"v\" .");
    }

    #[tokio::test]
    async fn rejects_malformed_update() {
        let backend = OxigraphBackend::in_memory();
        let result = backend.update("kb", "INSERT DATA {", TIMEOUT).await;
        assert!(matches!(result, Err(IndexError::InvalidQuery { .. })));
    }

    #[test]
    fn dataset_names_must_be_path_safe() {
        assert!(validate_dataset("kb-1.v2").is_ok());
        assert!(validate_dataset("../etc").is_err());
        assert!(validate_dataset("a/b").is_err());
        assert!(validate_dataset("").is_err());
    }
}
