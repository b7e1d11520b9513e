use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use metrics::counter;
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

const METRIC_HTTP_FAILURES_TOTAL: &str = "powerworks_http_failures_total";

/// Which part of the site a request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Full HTML pages.
    Page,
    /// HTML fragments for plain `fetch` clients.
    Fragment,
    /// Datastar SSE patches.
    Live,
    Asset,
    Service,
}

impl Surface {
    pub fn classify(request: &Request<Body>) -> Self {
        let path = request.uri().path();
        if path.starts_with("/static/") {
            Surface::Asset
        } else if path.starts_with("/ui/") {
            if super::is_datastar_request(request.headers()) {
                Surface::Live
            } else {
                Surface::Fragment
            }
        } else if path.starts_with("/_") {
            Surface::Service
        } else {
            Surface::Page
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Surface::Page => "page",
            Surface::Fragment => "fragment",
            Surface::Live => "live",
            Surface::Asset => "asset",
            Surface::Service => "service",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub surface: Surface,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext {
        request_id: Uuid::new_v4(),
        surface: Surface::classify(&request),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// Log every 4xx/5xx once, with the diagnostic the handler attached.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_else(|| RequestContext {
            request_id: Uuid::nil(),
            surface: Surface::classify(&request),
        });

    let mut response = next.run(request).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let report = response.extensions_mut().remove::<ErrorReport>();
    let source = report.as_ref().map_or("unknown", |report| report.source);
    let project = report
        .as_ref()
        .and_then(|report| report.project.clone())
        .unwrap_or_default();
    let chain = report.map(|report| report.messages).unwrap_or_default();
    let detail = chain.first().map_or("no diagnostic available", String::as_str);
    let class = if status.is_server_error() { "server" } else { "client" };

    counter!(
        METRIC_HTTP_FAILURES_TOTAL,
        "surface" => ctx.surface.as_str(),
        "class" => class
    )
    .increment(1);

    if status.is_server_error() {
        error!(
            target = "powerworks::http::response",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            query = uri.query().unwrap_or(""),
            surface = ctx.surface.as_str(),
            project = %project,
            source = source,
            detail = detail,
            chain = ?chain,
            request_id = %ctx.request_id,
            elapsed_ms = started.elapsed().as_millis(),
            "request failed",
        );
    } else {
        warn!(
            target = "powerworks::http::response",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            surface = ctx.surface.as_str(),
            project = %project,
            source = source,
            detail = detail,
            request_id = %ctx.request_id,
            "request rejected",
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, middleware, response::IntoResponse, routing::get};
    use tower::ServiceExt;

    fn request(uri: &str, datastar: bool) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if datastar {
            builder = builder.header("datastar-request", "true");
        }
        builder.body(Body::empty()).expect("request")
    }

    #[test]
    fn surfaces_follow_route_families() {
        assert_eq!(Surface::classify(&request("/projects", false)), Surface::Page);
        assert_eq!(Surface::classify(&request("/projects/beta", false)), Surface::Page);
        assert_eq!(Surface::classify(&request("/ui/projects", false)), Surface::Fragment);
        assert_eq!(
            Surface::classify(&request("/ui/projects/beta/overlay", true)),
            Surface::Live
        );
        assert_eq!(
            Surface::classify(&request("/static/public/site.css", false)),
            Surface::Asset
        );
        assert_eq!(Surface::classify(&request("/_health", false)), Surface::Service);
    }

    #[tokio::test]
    async fn failed_responses_are_stripped_of_reports_and_tagged() {
        let router = Router::new()
            .route(
                "/ui/projects/{slug}/overlay",
                get(|| async {
                    let mut response = (StatusCode::NOT_FOUND, "Project not found").into_response();
                    ErrorReport::from_message("test", StatusCode::NOT_FOUND, "no project")
                        .with_project("gamma")
                        .attach(&mut response);
                    response
                }),
            )
            .layer(middleware::from_fn(log_responses))
            .layer(middleware::from_fn(set_request_context));

        let response = router
            .oneshot(request("/ui/projects/gamma/overlay", true))
            .await
            .expect("router is infallible");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<ErrorReport>().is_none());
        let ctx = response
            .extensions()
            .get::<RequestContext>()
            .expect("context attached");
        assert_eq!(ctx.surface, Surface::Live);
        assert!(!ctx.request_id.is_nil());
    }
}
