use thiserror::Error;
use tracing::debug;

use crate::models::{AggregationSummary, QueryRequest, QueryResult, TitleVocabulary};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Network {
        endpoint: &'static str,
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("malformed response from {endpoint}: {source}")]
    Malformed {
        endpoint: &'static str,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Client for the job-listings API. Cheap to clone; each clone shares the
/// underlying connection pool, so spawned tasks can own one.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the distinct-title vocabulary. Zero titles is a valid result.
    pub async fn job_titles(&self) -> Result<Vec<String>> {
        let body = self.get("/api/job_titles", &[]).await?;
        let vocab: TitleVocabulary = parse("/api/job_titles", &body)?;
        debug!(count = vocab.titles.len(), "loaded title vocabulary");
        Ok(vocab.titles)
    }

    /// Run one grid query. The caller keeps the request around to validate
    /// the response against live state when it resolves.
    pub async fn jobs(&self, request: &QueryRequest) -> Result<QueryResult> {
        let body = self.get("/api/jobs", &request.query_pairs()).await?;
        let result: QueryResult = parse("/api/jobs", &body)?;
        debug!(
            rows = result.data.len(),
            total = result.total,
            page = request.page,
            "grid query resolved"
        );
        Ok(result)
    }

    /// Trigger a bulk aggregation from all providers. Observational only:
    /// the client renders nothing from this call beyond its summary.
    pub async fn fetch_all_jobs(&self) -> Result<AggregationSummary> {
        let body = self.get("/api/fetch_all_jobs", &[]).await?;
        parse("/api/fetch_all_jobs", &body)
    }

    async fn get(
        &self,
        endpoint: &'static str,
        query: &[(&'static str, String)],
    ) -> Result<String> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut builder = self.client.get(&url);
        if !query.is_empty() {
            builder = builder.query(query);
        }

        let response = builder
            .send()
            .await
            .map_err(|source| ApiError::Network { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { endpoint, status });
        }

        response
            .text()
            .await
            .map_err(|source| ApiError::Network { endpoint, source })
    }
}

fn parse<T: serde::de::DeserializeOwned>(endpoint: &'static str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|source| ApiError::Malformed { endpoint, source })
}
