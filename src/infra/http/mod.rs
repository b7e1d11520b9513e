mod boundary;
mod middleware;
mod public;

pub use public::{HttpState, build_router};

use axum::http::HeaderMap;

const DATASTAR_REQUEST_HEADER: &str = "datastar-request";

/// Datastar marks its own fetches; those get SSE patches instead of HTML.
pub(crate) fn is_datastar_request(headers: &HeaderMap) -> bool {
    headers.contains_key(DATASTAR_REQUEST_HEADER)
}
