use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;

use super::IndexBackend;
use crate::{
    config::IndexSyncConfig,
    error::{IndexError, Result},
};

/// SPARQL 1.1 Protocol backend.
///
/// Each dataset is a namespace below the configured base URL.
pub struct SparqlHttpBackend {
    client: Client,
    config: IndexSyncConfig,
}

impl SparqlHttpBackend {
    pub fn new(config: IndexSyncConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            // Overridden per request.
            .timeout(config.timeouts.query_timeout())
            .build()?;

        Ok(Self { client, config })
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match (&self.config.username, &self.config.password) {
            (Some(user), Some(pass)) => builder.basic_auth(user, Some(pass)),
            _ => builder,
        }
    }

    async fn post(
        &self,
        dataset: &str,
        content_type: &str,
        accept: Option<&str>,
        body: &str,
        timeout: Duration,
    ) -> Result<Response> {
        let mut request = self
            .with_auth(self.client.post(self.config.sparql_endpoint(dataset)))
            .header("Content-Type", content_type)
            .timeout(timeout)
            .body(body.to_string());
        if let Some(accept) = accept {
            request = request.header("Accept", accept);
        }
        let response = request.send().await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(IndexError::Backend { status, message })
        }
    }
}

#[async_trait]
impl IndexBackend for SparqlHttpBackend {
    fn name(&self) -> &'static str {
        "sparql"
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .with_auth(self.client.get(self.config.status_endpoint()))
            .timeout(Duration::from_secs(10))
            .send()
            .await?;

        Ok(response.status().is_success())
    }

    async fn update(&self, dataset: &str, update: &str, timeout: Duration) -> Result<()> {
        self.post(dataset, "application/sparql-update", None, update, timeout)
            .await?;
        Ok(())
    }

    async fn construct(&self, dataset: &str, query: &str, timeout: Duration) -> Result<String> {
        let response = self
            .post(
                dataset,
                "application/sparql-query",
                Some("application/n-triples"),
                query,
                timeout,
            )
            .await?;
        Ok(response.text().await?)
    }

    async fn ask(&self, dataset: &str, query: &str, timeout: Duration) -> Result<bool> {
        let response = self
            .post(
                dataset,
                "application/sparql-query",
                Some("application/sparql-results+json"),
                query,
                timeout,
            )
            .await?;
        parse_ask_json(&response.text().await?)
    }
}

#[derive(Deserialize)]
struct SparqlAskResponse {
    boolean: bool,
}

fn parse_ask_json(json: &str) -> Result<bool> {
    let response: SparqlAskResponse =
        serde_json::from_str(json).map_err(|e| IndexError::ParseError {
            reason: format!("Failed to parse ASK response: {e}"),
        })?;

    Ok(response.boolean)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn parses_ask_results() {
        assert!(parse_ask_json(r#"{"head":{},"boolean":true}"#).unwrap());
        assert!(!parse_ask_json(r#"{"boolean":false}"#).unwrap());
        assert!(matches!(
            parse_ask_json("<sparql/>"),
            Err(IndexError::ParseError { .. })
        ));
    }
}
