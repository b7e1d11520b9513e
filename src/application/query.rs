//! Query parameters of the portfolio routes and the links built from them.
//!
//! Filter and overlay state live entirely in the URL so every view the
//! browser can reach is also reachable by a plain link.

use serde::Deserialize;
use url::form_urlencoded::Serializer;

use crate::domain::{
    error::DomainError,
    filter::FilterState,
    overlay::{ExitPath, OverlayKey, OverlayTab},
    types::{Selection, SortKey},
};

pub const PROJECTS_PATH: &str = "/projects";
pub const LIVE_PROJECTS_PATH: &str = "/ui/projects";

/// Raw query parameters accepted by the portfolio routes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PortfolioQuery {
    pub q: Option<String>,
    pub sector: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub reset: Option<String>,
    pub project: Option<String>,
    pub tab: Option<String>,
    pub image: Option<String>,
    pub origin: Option<String>,
    pub action: Option<String>,
    pub exit: Option<String>,
    pub key: Option<String>,
}

impl PortfolioQuery {
    pub fn reset_requested(&self) -> bool {
        matches!(
            self.reset.as_deref().map(str::trim),
            Some("1" | "true" | "yes" | "on")
        )
    }

    /// Filter state named by the query; `reset` wins over everything else.
    pub fn filter_state(&self) -> Result<FilterState, DomainError> {
        if self.reset_requested() {
            return Ok(FilterState::default().reset());
        }

        let sort = match self.sort.as_deref().map(str::trim) {
            None | Some("") => SortKey::default(),
            Some(value) => value.parse()?,
        };

        Ok(FilterState::default()
            .with_query(self.q.clone().unwrap_or_default())
            .with_sector(Selection::parse(self.sector.as_deref())?)
            .with_status(Selection::parse(self.status.as_deref())?)
            .with_sort(sort))
    }

    /// The `project` parameter, when it names anything.
    pub fn selected_project(&self) -> Option<&str> {
        self.project
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn overlay_request(&self) -> Result<OverlayRequest, DomainError> {
        let tab = match self.tab.as_deref().map(str::trim) {
            None | Some("") => OverlayTab::default(),
            Some(value) => value.parse()?,
        };

        let image = match self.image.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(value) => value.parse::<usize>().map_err(|_| {
                DomainError::validation(format!("invalid image index `{value}`"))
            })?,
        };

        // Unparseable offsets restore to the top.
        let origin = self
            .origin
            .as_deref()
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite() && *value >= 0.0)
            .map(|value| value.min(f64::from(u32::MAX)) as u32)
            .unwrap_or(0);

        let action = match (self.key.as_deref(), self.action.as_deref()) {
            (Some(key), _) => {
                let key = OverlayKey::from_key_name(key.trim()).ok_or_else(|| {
                    DomainError::validation(format!("unsupported overlay key `{key}`"))
                })?;
                Some(OverlayAction::Key(key))
            }
            (None, Some(action)) => OverlayAction::parse(action, self.exit.as_deref())?,
            (None, None) => None,
        };

        Ok(OverlayRequest {
            tab,
            image,
            origin,
            action,
        })
    }
}

/// Overlay state carried by one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayRequest {
    pub tab: OverlayTab,
    pub image: usize,
    /// Page scroll offset captured when the overlay was first opened.
    pub origin: u32,
    pub action: Option<OverlayAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAction {
    Next,
    Previous,
    Close(ExitPath),
    Key(OverlayKey),
}

impl OverlayAction {
    fn parse(action: &str, exit: Option<&str>) -> Result<Option<Self>, DomainError> {
        match action.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "next" => Ok(Some(OverlayAction::Next)),
            "prev" | "previous" => Ok(Some(OverlayAction::Previous)),
            "close" => {
                let exit = exit.unwrap_or_default().parse()?;
                Ok(Some(OverlayAction::Close(exit)))
            }
            _ => Err(DomainError::validation(format!(
                "unknown overlay action `{action}`"
            ))),
        }
    }

    fn append_to(self, serializer: &mut Serializer<'_, String>) {
        match self {
            OverlayAction::Next => {
                serializer.append_pair("action", "next");
            }
            OverlayAction::Previous => {
                serializer.append_pair("action", "prev");
            }
            OverlayAction::Close(exit) => {
                serializer.append_pair("action", "close");
                serializer.append_pair("exit", exit.as_str());
            }
            OverlayAction::Key(key) => {
                serializer.append_pair("key", key.as_str());
            }
        }
    }
}

/// Encoded filter parameters; values at their defaults are left out.
pub fn filter_query(state: &FilterState) -> String {
    let mut serializer = Serializer::new(String::new());
    append_filter(&mut serializer, state);
    serializer.finish()
}

fn append_filter(serializer: &mut Serializer<'_, String>, state: &FilterState) {
    let query = state.query.trim();
    if !query.is_empty() {
        serializer.append_pair("q", query);
    }
    if !state.sector.is_all() {
        serializer.append_pair("sector", state.sector.token());
    }
    if !state.status.is_all() {
        serializer.append_pair("status", state.status.token());
    }
    if state.sort != SortKey::default() {
        serializer.append_pair("sort", state.sort.as_str());
    }
}

fn join(path: &str, query: String) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

pub fn listing_href(state: &FilterState) -> String {
    join(PROJECTS_PATH, filter_query(state))
}

pub fn live_listing_href(state: &FilterState) -> String {
    join(LIVE_PROJECTS_PATH, filter_query(state))
}

pub fn live_reset_href() -> String {
    format!("{LIVE_PROJECTS_PATH}?reset=1")
}

/// Page URL with the overlay open on `slug`.
pub fn overlay_page_href(state: &FilterState, slug: &str, tab: OverlayTab, image: usize) -> String {
    let mut serializer = Serializer::new(String::new());
    append_filter(&mut serializer, state);
    serializer.append_pair("project", slug);
    if tab != OverlayTab::default() {
        serializer.append_pair("tab", tab.as_str());
    }
    if image > 0 {
        serializer.append_pair("image", &image.to_string());
    }
    join(PROJECTS_PATH, serializer.finish())
}

pub fn live_overlay_path(slug: &str) -> String {
    format!("{LIVE_PROJECTS_PATH}/{slug}/overlay")
}

/// Datastar URL for one overlay transition.
pub fn overlay_live_href(
    state: &FilterState,
    slug: &str,
    tab: OverlayTab,
    image: usize,
    origin: u32,
    action: Option<OverlayAction>,
) -> String {
    let mut serializer = Serializer::new(String::new());
    append_filter(&mut serializer, state);
    if tab != OverlayTab::default() {
        serializer.append_pair("tab", tab.as_str());
    }
    if image > 0 {
        serializer.append_pair("image", &image.to_string());
    }
    serializer.append_pair("origin", &origin.to_string());
    if let Some(action) = action {
        action.append_to(&mut serializer);
    }
    join(&live_overlay_path(slug), serializer.finish())
}

/// Datastar URL opening the overlay; the caller appends the scroll offset.
pub fn overlay_open_prefix(state: &FilterState, slug: &str) -> String {
    let filter = filter_query(state);
    let separator = if filter.is_empty() { "" } else { "&" };
    format!("{}?{filter}{separator}origin=", live_overlay_path(slug))
}
