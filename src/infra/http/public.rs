use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    middleware,
    response::{Redirect, Response},
    routing::get,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::{
    application::{
        chrome::ChromeService,
        error::{AppError, ErrorReport, HttpError},
        live,
        portfolio::{Portfolio, PortfolioService, filter_form, unavailable_results},
        query::{PROJECTS_PATH, PortfolioQuery, listing_href},
    },
    domain::{error::DomainError, filter::FilterState},
    infra::assets,
    presentation::views::{
        ErrorPageView, LayoutChrome, LayoutContext, OverlayPartial, OverlayView,
        ProjectsTemplate, ResultsPartial, render_error_response, render_not_found_response,
        render_template_response,
    },
};

use super::{
    boundary::PanicResponder,
    is_datastar_request,
    middleware::{log_responses, set_request_context},
};

#[derive(Clone)]
pub struct HttpState {
    pub portfolio: Arc<PortfolioService>,
    pub chrome: Arc<ChromeService>,
}

pub fn build_router(state: HttpState) -> Router {
    let boundary = PanicResponder::new(state.chrome.load());

    Router::new()
        .route("/", get(index))
        .route("/projects", get(projects_page))
        .route("/projects/{slug}", get(project_page))
        .route("/ui/projects", get(projects_partial))
        .route("/ui/projects/{slug}/overlay", get(overlay_partial))
        .route("/_health", get(health))
        .route("/static/public/{*path}", get(assets::serve_public))
        .fallback(fallback)
        .with_state(state)
        .layer(CatchPanicLayer::custom(boundary))
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn index() -> Redirect {
    Redirect::to(PROJECTS_PATH)
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn fallback(State(state): State<HttpState>) -> Response {
    render_not_found_response(state.chrome.load())
}

async fn projects_page(
    State(state): State<HttpState>,
    Query(query): Query<PortfolioQuery>,
) -> Response {
    const SOURCE: &str = "infra::http::public::projects_page";

    let chrome = state.chrome.load_for(PROJECTS_PATH);
    match load_page(&state, &query, query.selected_project(), false).await {
        Ok((portfolio, filter, overlay)) => render_portfolio(chrome, &portfolio, &filter, overlay),
        Err(err) => error_page(SOURCE, chrome, err),
    }
}

async fn project_page(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(query): Query<PortfolioQuery>,
) -> Response {
    const SOURCE: &str = "infra::http::public::project_page";

    let chrome = state.chrome.load_for(&format!("{PROJECTS_PATH}/{slug}"));
    match load_page(&state, &query, Some(&slug), true).await {
        Ok((portfolio, filter, overlay)) => render_portfolio(chrome, &portfolio, &filter, overlay),
        Err(err) => error_page(SOURCE, chrome, err),
    }
}

async fn projects_partial(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Query(query): Query<PortfolioQuery>,
) -> Result<Response, HttpError> {
    const SOURCE: &str = "infra::http::public::projects_partial";

    let filter = query
        .filter_state()
        .map_err(|err| HttpError::from_app(SOURCE, err.into()))?;

    let results = match state.portfolio.load().await {
        Ok(portfolio) => portfolio.results(&filter),
        Err(_) => unavailable_results(),
    };

    if is_datastar_request(&headers) {
        let filters = query.reset_requested().then(|| filter_form(&filter));
        return live::results_response(results, filters, &listing_href(&filter));
    }

    Ok(render_template_response(
        ResultsPartial { results },
        StatusCode::OK,
    ))
}

async fn overlay_partial(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    Query(query): Query<PortfolioQuery>,
) -> Result<Response, HttpError> {
    const SOURCE: &str = "infra::http::public::overlay_partial";

    let (_, filter, overlay) = load_page(&state, &query, Some(&slug), true)
        .await
        .map_err(|err| HttpError::from_app(SOURCE, err))?;

    if is_datastar_request(&headers) {
        let page_href = match overlay.detail.as_ref() {
            Some(detail) => detail.page_href.clone(),
            None => listing_href(&filter),
        };
        return live::overlay_response(overlay, &page_href);
    }

    Ok(render_template_response(
        OverlayPartial { overlay },
        StatusCode::OK,
    ))
}

/// Parse the query, fetch the list and resolve the overlay for `project`.
/// With `required`, an unknown project fails instead of leaving the overlay
/// closed.
async fn load_page(
    state: &HttpState,
    query: &PortfolioQuery,
    project: Option<&str>,
    required: bool,
) -> Result<(Portfolio, FilterState, OverlayView), AppError> {
    let filter = query.filter_state()?;
    let request = query.overlay_request()?;
    let portfolio = state.portfolio.load().await?;

    let overlay = match project {
        Some(key) => match portfolio.overlay(key, &filter, &request) {
            Some(overlay) => overlay,
            None if required => return Err(AppError::project_not_found(key)),
            None => OverlayView::closed(),
        },
        None => OverlayView::closed(),
    };
    Ok((portfolio, filter, overlay))
}

fn render_portfolio(
    chrome: LayoutChrome,
    portfolio: &Portfolio,
    filter: &FilterState,
    overlay: OverlayView,
) -> Response {
    let mut meta = chrome.meta.clone().with_title("Projects".to_string());
    if let Some(detail) = overlay.detail.as_ref() {
        meta = chrome.meta.clone().with_title(detail.title.clone());
    }

    let intro = chrome.meta.description.clone();
    let content = portfolio.page(intro, filter, overlay);
    let view = LayoutContext::new(chrome.with_meta(meta), content);
    render_template_response(ProjectsTemplate { view }, StatusCode::OK)
}

fn error_page(source: &'static str, chrome: LayoutChrome, err: AppError) -> Response {
    let status = err.status();
    let content = match &err {
        AppError::Domain(DomainError::Validation { message }) => {
            ErrorPageView::bad_request(message.clone())
        }
        AppError::ProjectNotFound { .. } => ErrorPageView::not_found(),
        AppError::Unavailable => ErrorPageView::unavailable(),
        AppError::Infra(_) | AppError::Unexpected(_) => ErrorPageView::crashed(),
    };

    let mut report = ErrorReport::from_error(source, status, &err);
    if let Some(project) = err.project() {
        report = report.with_project(project);
    }
    render_error_response(chrome, content, status, report)
}
