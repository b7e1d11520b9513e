//! HTTP client for the external projects API.
//!
//! One `GET {base}/api/v1/projects?limit=N` per revalidation window. Every
//! failure (transport, non-2xx, undecodable body, `success: false`) is logged
//! and reported as `None`; the last good envelope stays cached until its
//! window expires.

use std::{
    num::NonZeroU32,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{
    Client, StatusCode, Url,
    header::{ACCEPT, CONTENT_TYPE},
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::{
    application::source::ProjectSource, config::UpstreamSettings, domain::types::ResultEnvelope,
};

use super::error::InfraError;

const SOURCE: &str = "powerworks::upstream";
const PROJECTS_PATH: &str = "api/v1/projects";
const BODY_SNIPPET_CHARS: usize = 200;

const METRIC_FETCH_TOTAL: &str = "powerworks_upstream_fetch_total";
const METRIC_CACHE_HIT_TOTAL: &str = "powerworks_upstream_cache_hit_total";
const METRIC_FETCH_MS: &str = "powerworks_upstream_fetch_ms";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream responded with status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("upstream rejected the request: {message}")]
    Rejected { message: String },
}

impl FetchError {
    fn outcome(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Status { .. } => "status",
            FetchError::Decode(_) => "decode",
            FetchError::Rejected { .. } => "rejected",
        }
    }
}

struct CachedEnvelope {
    envelope: Arc<ResultEnvelope>,
    fetched_at: Instant,
}

pub struct UpstreamProjects {
    client: Client,
    endpoint: Url,
    revalidate: Duration,
    cache: RwLock<Option<CachedEnvelope>>,
}

impl UpstreamProjects {
    pub fn new(settings: &UpstreamSettings) -> Result<Self, InfraError> {
        let base = settings
            .base_url
            .as_ref()
            .ok_or(InfraError::MissingUpstream)?;
        let endpoint = projects_endpoint(base, settings.limit)?;

        let client = Client::builder()
            .user_agent(user_agent())
            .timeout(settings.timeout)
            .build()
            .map_err(InfraError::HttpClient)?;

        Ok(Self {
            client,
            endpoint,
            revalidate: settings.revalidate,
            cache: RwLock::new(None),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn cached(&self) -> Option<Arc<ResultEnvelope>> {
        if self.revalidate.is_zero() {
            return None;
        }

        let guard = self.cache.read().await;
        guard
            .as_ref()
            .filter(|entry| entry.fetched_at.elapsed() < self.revalidate)
            .map(|entry| Arc::clone(&entry.envelope))
    }

    async fn store(&self, envelope: Arc<ResultEnvelope>) {
        if self.revalidate.is_zero() {
            return;
        }

        *self.cache.write().await = Some(CachedEnvelope {
            envelope,
            fetched_at: Instant::now(),
        });
    }

    async fn fetch_fresh(&self) -> Result<ResultEnvelope, FetchError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes)
                .chars()
                .take(BODY_SNIPPET_CHARS)
                .collect();
            return Err(FetchError::Status { status, body });
        }

        let envelope: ResultEnvelope = serde_json::from_slice(&bytes)?;
        if !envelope.success {
            return Err(FetchError::Rejected {
                message: envelope.message,
            });
        }

        Ok(envelope)
    }
}

#[async_trait]
impl ProjectSource for UpstreamProjects {
    async fn fetch_projects(&self) -> Option<Arc<ResultEnvelope>> {
        if let Some(envelope) = self.cached().await {
            counter!(METRIC_CACHE_HIT_TOTAL).increment(1);
            return Some(envelope);
        }

        let started = Instant::now();
        let result = self.fetch_fresh().await;
        histogram!(METRIC_FETCH_MS).record(started.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok(envelope) => {
                counter!(METRIC_FETCH_TOTAL, "outcome" => "success").increment(1);
                debug!(
                    target = SOURCE,
                    endpoint = %self.endpoint,
                    records = envelope.data.len(),
                    "fetched project list"
                );
                let envelope = Arc::new(envelope);
                self.store(Arc::clone(&envelope)).await;
                Some(envelope)
            }
            Err(err) => {
                counter!(METRIC_FETCH_TOTAL, "outcome" => err.outcome()).increment(1);
                error!(
                    target = SOURCE,
                    endpoint = %self.endpoint,
                    outcome = err.outcome(),
                    error = %err,
                    "failed to fetch project list"
                );
                None
            }
        }
    }
}

fn projects_endpoint(base: &Url, limit: NonZeroU32) -> Result<Url, InfraError> {
    let root = base.as_str().trim_end_matches('/');
    let mut endpoint = Url::parse(&format!("{root}/{PROJECTS_PATH}")).map_err(|source| {
        InfraError::UpstreamEndpoint {
            base: root.to_string(),
            source,
        }
    })?;
    endpoint.set_query(None);
    endpoint
        .query_pairs_mut()
        .append_pair("limit", &limit.to_string());
    Ok(endpoint)
}

fn user_agent() -> &'static str {
    concat!("powerworks/", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).expect("non-zero")
    }

    #[test]
    fn endpoint_appends_path_and_limit() {
        let base = Url::parse("https://api.example.com").expect("url");
        let endpoint = projects_endpoint(&base, limit(50)).expect("endpoint");
        assert_eq!(
            endpoint.as_str(),
            "https://api.example.com/api/v1/projects?limit=50"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let base = Url::parse("https://example.com/backend/").expect("url");
        let endpoint = projects_endpoint(&base, limit(10)).expect("endpoint");
        assert_eq!(
            endpoint.as_str(),
            "https://example.com/backend/api/v1/projects?limit=10"
        );
    }

    #[test]
    fn missing_base_url_is_a_configuration_error() {
        let settings = UpstreamSettings {
            base_url: None,
            limit: limit(50),
            revalidate: Duration::from_secs(60),
            timeout: Duration::from_secs(5),
        };
        let err = UpstreamProjects::new(&settings)
            .err()
            .expect("base url is required");
        assert!(matches!(err, InfraError::MissingUpstream));
        assert!(err.is_configuration());
    }
}
