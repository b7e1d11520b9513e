//! Datastar responses for the portfolio's in-page interactions.

use std::convert::Infallible;

use askama::Template;
use async_stream::stream;
use axum::response::{
    IntoResponse, Response,
    sse::{Event, Sse},
};
use datastar::prelude::{ElementPatchMode, ExecuteScript, PatchElements};

use crate::{
    application::error::HttpError,
    presentation::views::{
        FilterFormView, FiltersPartial, OverlayPartial, OverlayView, ResultsContext,
        ResultsPartial, TemplateRenderError,
    },
};

const SOURCE: &str = "application::live";

pub const RESULTS_SELECTOR: &str = "#project-results";
pub const FILTERS_SELECTOR: &str = "#project-filters";
pub const OVERLAY_SELECTOR: &str = "#project-overlay";

/// Patch the result grid, and the filter form when it changed underneath the
/// user (reset), then point the address bar at the equivalent page URL.
pub fn results_response(
    results: ResultsContext,
    filters: Option<FilterFormView>,
    page_href: &str,
) -> Result<Response, HttpError> {
    let mut stream = LiveStream::default();

    if let Some(filters) = filters {
        stream.morph(FILTERS_SELECTOR, render(FiltersPartial { filters })?);
    }
    stream.morph(RESULTS_SELECTOR, render(ResultsPartial { results })?);
    stream.address(page_href);

    Ok(stream.into_response())
}

/// The overlay root is swapped rather than morphed so the client sees a new
/// node and re-runs the effects listed on it.
pub fn overlay_response(overlay: OverlayView, page_href: &str) -> Result<Response, HttpError> {
    let mut stream = LiveStream::default();
    stream.swap(OVERLAY_SELECTOR, render(OverlayPartial { overlay })?);
    stream.address(page_href);

    Ok(stream.into_response())
}

fn render<T: Template>(template: T) -> Result<String, HttpError> {
    template.render().map_err(|err| {
        HttpError::from(TemplateRenderError::new(
            SOURCE,
            "Template rendering failed",
            err,
        ))
    })
}

/// Ordered datastar events for one interaction.
#[derive(Default)]
struct LiveStream {
    events: Vec<Event>,
}

impl LiveStream {
    fn morph(&mut self, selector: &str, html: String) {
        self.patch(selector, html, ElementPatchMode::Outer);
    }

    fn swap(&mut self, selector: &str, html: String) {
        self.patch(selector, html, ElementPatchMode::Replace);
    }

    fn patch(&mut self, selector: &str, html: String, mode: ElementPatchMode) {
        self.events.push(
            PatchElements::new(html)
                .selector(selector)
                .mode(mode)
                .write_as_axum_sse_event(),
        );
    }

    /// Rewrite the address bar without adding a history entry.
    fn address(&mut self, href: &str) {
        self.events
            .push(ExecuteScript::new(replace_state_script(href)).write_as_axum_sse_event());
    }

    fn into_response(self) -> Response {
        let events = self.events;
        let stream = stream! {
            for event in events {
                yield Ok::<Event, Infallible>(event);
            }
        };
        Sse::new(stream).into_response()
    }
}

fn replace_state_script(href: &str) -> String {
    // JSON string literals are valid JavaScript string literals.
    let literal = serde_json::to_string(href).unwrap_or_else(|_| "\"/projects\"".to_string());
    format!("window.history.replaceState(null, '', {literal});")
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_text(response: Response) -> String {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("sse body")
            .to_bytes();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn replace_state_quotes_the_href() {
        assert_eq!(
            replace_state_script("/projects?q=it's"),
            "window.history.replaceState(null, '', \"/projects?q=it's\");"
        );
    }

    #[tokio::test]
    async fn swapped_overlay_uses_replace_mode_and_morphed_results_do_not() {
        let mut stream = LiveStream::default();
        stream.swap(OVERLAY_SELECTOR, "<div id=\"project-overlay\"></div>".to_string());
        let body = body_text(stream.into_response()).await;
        assert!(body.contains("selector #project-overlay"));
        assert!(body.contains("mode replace"));

        let mut stream = LiveStream::default();
        stream.morph(RESULTS_SELECTOR, "<div id=\"project-results\"></div>".to_string());
        stream.address("/projects");
        let body = body_text(stream.into_response()).await;
        assert!(body.contains("selector #project-results"));
        assert!(!body.contains("mode replace"));
        assert!(!body.contains("mode outer"));
        assert!(body.find("project-results") < body.find("replaceState"));
    }
}
