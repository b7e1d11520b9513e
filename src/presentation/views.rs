use crate::application::error::{ErrorReport, HttpError};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Render the error page and attach a report for the response logger.
pub fn render_error_response(
    chrome: LayoutChrome,
    content: ErrorPageView,
    status: StatusCode,
    report: ErrorReport,
) -> Response {
    let meta = chrome.meta.clone().with_title(content.title.clone());
    let view = LayoutContext::new(chrome.with_meta(meta), content);
    let mut response = render_template_response(ErrorTemplate { view }, status);
    report.attach(&mut response);
    response
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    render_error_response(
        chrome,
        ErrorPageView::not_found(),
        StatusCode::NOT_FOUND,
        ErrorReport::from_message(
            "presentation::views::render_not_found_response",
            StatusCode::NOT_FOUND,
            "Resource not found",
        ),
    )
}

#[derive(Clone)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
    pub target: Option<String>,
    pub rel: Option<String>,
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
}

impl LayoutChrome {
    pub fn with_canonical(self, canonical: String) -> Self {
        Self {
            meta: self.meta.with_canonical(canonical),
            ..self
        }
    }

    pub fn with_meta(self, meta: PageMetaView) -> Self {
        Self { meta, ..self }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            meta: chrome.meta,
            content,
        }
    }
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
    pub canonical: String,
}

impl PageMetaView {
    pub fn with_canonical(self, canonical: String) -> Self {
        Self { canonical, ..self }
    }

    /// Prefix the site title with a page title.
    pub fn with_title(self, page_title: String) -> Self {
        let title = format!("{page_title} · {}", self.title);
        Self { title, ..self }
    }
}

/// A link that works both as a plain navigation and as a datastar request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkView {
    pub href: String,
    pub live: String,
}

#[derive(Debug, Clone)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

pub struct FilterFormView {
    pub action: String,
    pub live_action: String,
    pub query: String,
    pub sectors: Vec<OptionView>,
    pub statuses: Vec<OptionView>,
    pub sorts: Vec<OptionView>,
    pub is_default: bool,
    pub reset: LinkView,
}

#[derive(Debug, Clone)]
pub struct ProjectCard {
    pub slug: String,
    pub anchor: String,
    pub title: String,
    pub client: String,
    pub role: String,
    pub location: String,
    pub sector_label: &'static str,
    pub status_label: &'static str,
    pub status_class: &'static str,
    pub capacity: Option<String>,
    pub year: Option<i32>,
    pub featured: bool,
    pub thumbnail: Option<String>,
    pub image_count: usize,
    pub open_href: String,
    /// Datastar URL awaiting the page scroll offset as its last value.
    pub open_live_prefix: String,
}

pub struct SectorCountView {
    pub label: &'static str,
    pub count: u64,
}

pub struct CountsView {
    pub total: u64,
    pub ongoing: u64,
    pub completed: u64,
    pub sectors: Vec<SectorCountView>,
}

pub struct ResultsContext {
    pub load_failed: bool,
    pub failure_message: &'static str,
    pub counts: Option<CountsView>,
    pub shown: usize,
    pub featured: Vec<ProjectCard>,
    pub ongoing: Vec<ProjectCard>,
    pub completed: Vec<ProjectCard>,
    pub reset: LinkView,
    /// Way out offered when the list could not be loaded.
    pub home: Option<ErrorAction>,
}

impl ResultsContext {
    pub fn has_results(&self) -> bool {
        self.shown > 0
    }

    pub fn has_active(&self) -> bool {
        !(self.featured.is_empty() && self.ongoing.is_empty())
    }
}

pub struct OverlayTabView {
    pub value: &'static str,
    pub label: &'static str,
    pub active: bool,
    pub link: LinkView,
}

#[derive(Debug, Clone)]
pub struct OverlayImageView {
    pub index: usize,
    pub url: String,
    pub caption: Option<String>,
    pub active: bool,
    pub link: LinkView,
}

pub struct FactView {
    pub label: &'static str,
    pub value: String,
}

pub struct KeyLinkView {
    pub key: &'static str,
    pub link: LinkView,
}

pub struct GalleryNavView {
    pub previous: LinkView,
    pub next: LinkView,
}

pub struct OverlayDetailView {
    pub slug: String,
    /// Page URL reproducing this overlay state.
    pub page_href: String,
    pub title: String,
    pub sector_label: &'static str,
    pub status_label: &'static str,
    pub status_class: &'static str,
    pub client: String,
    pub role: String,
    pub location: String,
    pub facts: Vec<FactView>,
    pub description: Option<String>,
    pub scope_items: Vec<String>,
    pub tabs: Vec<OverlayTabView>,
    pub active_tab: &'static str,
    pub current_image: Option<OverlayImageView>,
    pub thumbnails: Vec<OverlayImageView>,
    pub image_index: usize,
    pub image_position: Option<String>,
    pub gallery_nav: Option<GalleryNavView>,
    pub close: LinkView,
    pub backdrop: LinkView,
    pub keys: Vec<KeyLinkView>,
    pub scroll_threshold: u32,
}

/// The `#project-overlay` container; `detail` is `None` while closed.
pub struct OverlayView {
    pub effects: String,
    pub restore_scroll: Option<u32>,
    pub detail: Option<OverlayDetailView>,
}

impl OverlayView {
    pub fn closed() -> Self {
        Self {
            effects: String::new(),
            restore_scroll: None,
            detail: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.detail.is_some()
    }
}

pub struct PortfolioContext {
    pub intro: String,
    pub filters: FilterFormView,
    pub results: ResultsContext,
    pub overlay: OverlayView,
}

#[derive(Template)]
#[template(path = "projects.html")]
pub struct ProjectsTemplate {
    pub view: LayoutContext<PortfolioContext>,
}

#[derive(Template)]
#[template(path = "partials/results.html")]
pub struct ResultsPartial {
    pub results: ResultsContext,
}

#[derive(Template)]
#[template(path = "partials/filters.html")]
pub struct FiltersPartial {
    pub filters: FilterFormView,
}

#[derive(Template)]
#[template(path = "partials/overlay.html")]
pub struct OverlayPartial {
    pub overlay: OverlayView,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
    pub secondary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Browse the project portfolio to continue.".to_string(),
            primary_action: Some(ErrorAction::home()),
            secondary_action: None,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            title: "Projects Unavailable".to_string(),
            message: "We were unable to load our projects right now. Please try again later."
                .to_string(),
            primary_action: Some(ErrorAction::home()),
            secondary_action: None,
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            title: "Invalid Request".to_string(),
            message: detail.into(),
            primary_action: Some(ErrorAction::projects()),
            secondary_action: None,
        }
    }

    /// Shown when rendering a page failed unexpectedly.
    pub fn crashed() -> Self {
        Self {
            title: "Something Went Wrong".to_string(),
            message: "An unexpected error interrupted this page.".to_string(),
            primary_action: Some(ErrorAction::retry()),
            secondary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Return home".to_string(),
        }
    }

    pub fn projects() -> Self {
        Self {
            href: "/projects".to_string(),
            label: "View all projects".to_string(),
        }
    }

    /// Reload the current URL.
    pub fn retry() -> Self {
        Self {
            href: String::new(),
            label: "Try again".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}
