use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::types::ResultEnvelope;

/// Where the portfolio gets its project list from.
///
/// Implementations never fail past this boundary: every transport, status or
/// decoding problem is logged by the implementation and reported as `None`.
#[async_trait]
pub trait ProjectSource: Send + Sync {
    async fn fetch_projects(&self) -> Option<Arc<ResultEnvelope>>;
}
