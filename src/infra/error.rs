use std::net::SocketAddr;

use thiserror::Error;

/// Failures of the process plumbing around the portfolio: the listener, the
/// projects API client and the log pipeline.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("failed to bind {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("http server stopped unexpectedly")]
    Serve(#[source] std::io::Error),
    #[error("upstream.base_url is required to fetch projects")]
    MissingUpstream,
    #[error("invalid projects endpoint under `{base}`")]
    UpstreamEndpoint {
        base: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build the projects api client")]
    HttpClient(#[source] reqwest::Error),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

impl InfraError {
    pub fn bind(addr: SocketAddr, source: std::io::Error) -> Self {
        Self::Bind { addr, source }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }

    /// Whether the operator has to change configuration to recover.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Bind { .. } | Self::MissingUpstream | Self::UpstreamEndpoint { .. }
        )
    }
}
