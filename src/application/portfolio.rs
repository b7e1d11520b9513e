//! Portfolio page assembly: fetched records, the filter engine and the views.

use std::{collections::HashSet, sync::Arc};

use tracing::debug;

use crate::{
    application::{
        error::AppError,
        query::{
            OverlayAction, OverlayRequest, PROJECTS_PATH, listing_href, live_listing_href,
            live_reset_href, overlay_live_href, overlay_open_prefix, overlay_page_href,
        },
        source::ProjectSource,
    },
    domain::{
        filter::{self, FilterState},
        grouping::{ProjectGroups, Tally},
        overlay::{
            DetailOverlay, ExitPath, OverlayEffect, OverlayKey, OverlayTab, SCROLL_THRESHOLD_PX,
        },
        types::{ProjectRecord, ProjectStatus, ResultEnvelope, Sector, Selection, SortKey},
    },
    presentation::views::{
        CountsView, ErrorAction, FactView, FilterFormView, GalleryNavView, KeyLinkView, LinkView,
        OptionView, OverlayDetailView, OverlayImageView, OverlayTabView, OverlayView,
        PortfolioContext, ProjectCard, ResultsContext, SectorCountView,
    },
};

/// Message shown in place of the results when the project list cannot be loaded.
pub const LOAD_FAILURE_MESSAGE: &str =
    "We were unable to load our projects right now. Please try again later.";

#[derive(Clone)]
pub struct PortfolioService {
    source: Arc<dyn ProjectSource>,
}

impl PortfolioService {
    pub fn new(source: Arc<dyn ProjectSource>) -> Self {
        Self { source }
    }

    pub async fn load(&self) -> Result<Portfolio, AppError> {
        let envelope = self
            .source
            .fetch_projects()
            .await
            .ok_or(AppError::Unavailable)?;
        Ok(Portfolio::from_envelope(&envelope))
    }
}

/// One fetched project list in its initial order.
#[derive(Debug, Clone)]
pub struct Portfolio {
    records: Vec<ProjectRecord>,
    tally: Tally,
}

impl Portfolio {
    pub fn from_envelope(envelope: &ResultEnvelope) -> Self {
        let mut records = filter::initial_order(&envelope.data);
        let mut taken = HashSet::new();
        for record in &mut records {
            record.slug = unique_slug(resolve_slug(record), &record.id, &mut taken);
        }

        let tally = match envelope.counts.as_ref() {
            Some(counts) => Tally::from_counts(counts, envelope.pagination.total),
            None => Tally::count(&records),
        };

        Self { records, tally }
    }

    pub fn records(&self) -> &[ProjectRecord] {
        &self.records
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    /// Look a record up by slug, falling back to its id.
    pub fn find(&self, key: &str) -> Option<&ProjectRecord> {
        self.records
            .iter()
            .find(|record| record.slug == key)
            .or_else(|| self.records.iter().find(|record| record.id == key))
    }

    pub fn filter(&self, state: &FilterState) -> Vec<&ProjectRecord> {
        filter::apply(&self.records, state)
    }

    pub fn results(&self, state: &FilterState) -> ResultsContext {
        let matched = self.filter(state);
        let shown = matched.len();
        let groups = ProjectGroups::partition(matched);
        let card = |record: &&ProjectRecord| project_card(record, state);

        ResultsContext {
            load_failed: false,
            failure_message: LOAD_FAILURE_MESSAGE,
            counts: Some(counts_view(&self.tally)),
            shown,
            featured: groups.featured.iter().map(card).collect(),
            ongoing: groups.ongoing.iter().map(card).collect(),
            completed: groups.completed.iter().map(card).collect(),
            reset: reset_link(),
            home: None,
        }
    }

    pub fn page(&self, intro: String, state: &FilterState, overlay: OverlayView) -> PortfolioContext {
        PortfolioContext {
            intro,
            filters: filter_form(state),
            results: self.results(state),
            overlay,
        }
    }

    /// Replay one overlay request against the record named by `key`.
    pub fn overlay(
        &self,
        key: &str,
        state: &FilterState,
        request: &OverlayRequest,
    ) -> Option<OverlayView> {
        let record = self.find(key)?;

        let mut overlay = DetailOverlay::new();
        let mut effects = overlay.open(record, request.origin);
        overlay.mark_ready();
        overlay.select_tab(request.tab);
        overlay.show_image(request.image);

        match request.action {
            Some(OverlayAction::Next) => {
                overlay.next_image();
            }
            Some(OverlayAction::Previous) => {
                overlay.previous_image();
            }
            Some(OverlayAction::Close(exit)) => effects = overlay.close(exit),
            Some(OverlayAction::Key(key)) => {
                let released = overlay.handle_key(key);
                if !released.is_empty() {
                    effects = released;
                }
            }
            None => {}
        }

        if let Some(exit) = overlay.last_exit() {
            debug!(
                target = "powerworks::overlay",
                project = %record.slug,
                exit = exit.as_str(),
                "overlay closed"
            );
        }

        let restore_scroll = effects.iter().find_map(|effect| match effect {
            OverlayEffect::RestoreScroll { offset } => Some(*offset),
            _ => None,
        });
        let detail = overlay
            .is_open()
            .then(|| overlay_detail(record, &overlay, state, request.origin));

        Some(OverlayView {
            effects: effect_tokens(&effects),
            restore_scroll,
            detail,
        })
    }
}

/// Results section shown when the fetch failed.
pub fn unavailable_results() -> ResultsContext {
    ResultsContext {
        load_failed: true,
        failure_message: LOAD_FAILURE_MESSAGE,
        counts: None,
        shown: 0,
        featured: Vec::new(),
        ongoing: Vec::new(),
        completed: Vec::new(),
        reset: reset_link(),
        home: Some(ErrorAction::home()),
    }
}

pub fn filter_form(state: &FilterState) -> FilterFormView {
    let sectors = selection_options(
        state.sector,
        "All sectors",
        Sector::ALL.map(|sector| (sector, sector.as_str(), sector.label())),
    );
    let statuses = selection_options(
        state.status,
        "All statuses",
        ProjectStatus::ALL.map(|status| (status, status.as_str(), status.label())),
    );
    let sorts = SortKey::ALL
        .into_iter()
        .map(|key| OptionView {
            value: key.as_str().to_string(),
            label: key.label().to_string(),
            selected: key == state.sort,
        })
        .collect();

    FilterFormView {
        action: PROJECTS_PATH.to_string(),
        live_action: live_listing_href(&FilterState::default()),
        query: state.query.clone(),
        sectors,
        statuses,
        sorts,
        is_default: state.is_default(),
        reset: reset_link(),
    }
}

fn selection_options<T, const N: usize>(
    selection: Selection<T>,
    all_label: &str,
    variants: [(T, &'static str, &'static str); N],
) -> Vec<OptionView>
where
    T: Copy + PartialEq,
{
    let mut options = vec![OptionView {
        value: crate::domain::types::ALL_TOKEN.to_string(),
        label: all_label.to_string(),
        selected: selection.is_all(),
    }];
    options.extend(variants.into_iter().map(|(value, token, label)| OptionView {
        value: token.to_string(),
        label: label.to_string(),
        selected: selection.selected() == Some(value),
    }));
    options
}

fn reset_link() -> LinkView {
    LinkView {
        href: listing_href(&FilterState::default()),
        live: live_reset_href(),
    }
}

fn counts_view(tally: &Tally) -> CountsView {
    CountsView {
        total: tally.total,
        ongoing: tally.ongoing,
        completed: tally.completed,
        sectors: Sector::ALL
            .into_iter()
            .map(|sector| SectorCountView {
                label: sector.label(),
                count: tally.sector(sector),
            })
            .collect(),
    }
}

fn project_card(record: &ProjectRecord, state: &FilterState) -> ProjectCard {
    ProjectCard {
        slug: record.slug.clone(),
        anchor: anchor_id(&record.slug),
        title: record.title.clone(),
        client: record.client.clone(),
        role: record.role.clone(),
        location: record.location.clone(),
        sector_label: record.sector.label(),
        status_label: record.status.label(),
        status_class: status_class(record.status),
        capacity: record.capacity.clone(),
        year: record.year,
        featured: record.featured,
        thumbnail: record.images.first().map(|image| image.url.clone()),
        image_count: record.images.len(),
        open_href: overlay_page_href(state, &record.slug, OverlayTab::default(), 0),
        open_live_prefix: overlay_open_prefix(state, &record.slug),
    }
}

fn overlay_detail(
    record: &ProjectRecord,
    overlay: &DetailOverlay,
    state: &FilterState,
    origin: u32,
) -> OverlayDetailView {
    let slug = record.slug.as_str();
    let tab = overlay.tab();
    let index = overlay.image_index();
    let count = overlay.image_count();

    let live = |tab: OverlayTab, image: usize, action: Option<OverlayAction>| {
        overlay_live_href(state, slug, tab, image, origin, action)
    };
    let page = |tab: OverlayTab, image: usize| overlay_page_href(state, slug, tab, image);

    let tabs = OverlayTab::ALL
        .into_iter()
        .map(|candidate| OverlayTabView {
            value: candidate.as_str(),
            label: candidate.label(),
            active: candidate == tab,
            link: LinkView {
                href: page(candidate, index),
                live: live(candidate, index, None),
            },
        })
        .collect();

    let thumbnails: Vec<OverlayImageView> = record
        .images
        .iter()
        .enumerate()
        .map(|(position, image)| OverlayImageView {
            index: position,
            url: image.url.clone(),
            caption: image.caption.clone(),
            active: position == index,
            link: LinkView {
                href: page(tab, position),
                live: live(tab, position, None),
            },
        })
        .collect();
    let current_image = thumbnails.get(index).cloned();

    let (previous_index, next_index) = if count > 1 {
        ((index + count - 1) % count, (index + 1) % count)
    } else {
        (index, index)
    };
    let gallery_nav = (count > 1).then(|| GalleryNavView {
        previous: LinkView {
            href: page(tab, previous_index),
            live: live(tab, index, Some(OverlayAction::Previous)),
        },
        next: LinkView {
            href: page(tab, next_index),
            live: live(tab, index, Some(OverlayAction::Next)),
        },
    });

    let listing = format!("{}#{}", listing_href(state), anchor_id(slug));
    let close = LinkView {
        href: listing.clone(),
        live: live(tab, index, Some(OverlayAction::Close(ExitPath::CloseButton))),
    };
    let backdrop = LinkView {
        href: listing.clone(),
        live: live(tab, index, Some(OverlayAction::Close(ExitPath::Backdrop))),
    };

    let keys = OverlayKey::ALL
        .into_iter()
        .map(|key| {
            let href = match key {
                OverlayKey::Escape => listing.clone(),
                OverlayKey::ArrowLeft => page(tab, previous_index),
                OverlayKey::ArrowRight => page(tab, next_index),
            };
            KeyLinkView {
                key: key.as_str(),
                link: LinkView {
                    href,
                    live: live(tab, index, Some(OverlayAction::Key(key))),
                },
            }
        })
        .collect();

    let facts = [
        ("Capacity", record.capacity.clone()),
        ("Duration", record.duration.clone()),
        ("Year", record.year.map(|year| year.to_string())),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        value
            .filter(|value| !value.trim().is_empty())
            .map(|value| FactView { label, value })
    })
    .collect();

    OverlayDetailView {
        slug: slug.to_string(),
        page_href: page(tab, index),
        title: record.title.clone(),
        sector_label: record.sector.label(),
        status_label: record.status.label(),
        status_class: status_class(record.status),
        client: record.client.clone(),
        role: record.role.clone(),
        location: record.location.clone(),
        facts,
        description: record
            .description
            .clone()
            .filter(|text| !text.trim().is_empty()),
        scope_items: scope_items(&record.scope_of_work),
        tabs,
        active_tab: tab.as_str(),
        current_image,
        thumbnails,
        image_index: index,
        image_position: (count > 0).then(|| format!("{} / {}", index + 1, count)),
        gallery_nav,
        close,
        backdrop,
        keys,
        scroll_threshold: SCROLL_THRESHOLD_PX,
    }
}

fn effect_tokens(effects: &[OverlayEffect]) -> String {
    effects
        .iter()
        .map(|effect| effect.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// One list entry per non-empty line, with leading bullet markers removed.
fn scope_items(scope: &str) -> Vec<String> {
    scope
        .lines()
        .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn status_class(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Ongoing => "status-ongoing",
        ProjectStatus::Completed => "status-completed",
    }
}

fn anchor_id(slug: &str) -> String {
    format!("project-{slug}")
}

/// Suffix colliding slugs with the record id, then a counter.
fn unique_slug(base: String, id: &str, taken: &mut HashSet<String>) -> String {
    let mut candidate = base.clone();
    if taken.contains(&candidate) {
        let id = slug::slugify(id);
        candidate = if id.is_empty() { base.clone() } else { format!("{base}-{id}") };
        let mut counter = 2;
        while taken.contains(&candidate) {
            candidate = format!("{base}-{counter}");
            counter += 1;
        }
    }
    taken.insert(candidate.clone());
    candidate
}

fn resolve_slug(record: &ProjectRecord) -> String {
    [record.slug.as_str(), record.title.as_str(), record.id.as_str()]
        .into_iter()
        .map(slug::slugify)
        .find(|candidate| !candidate.is_empty())
        .unwrap_or_else(|| "project".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ProjectCounts, ProjectImage};
    use powerworks_api_types::{Pagination, instant};

    fn record(id: &str, title: &str, status: ProjectStatus, images: usize) -> ProjectRecord {
        ProjectRecord {
            id: id.to_string(),
            title: title.to_string(),
            slug: String::new(),
            sector: Sector::PowerSector,
            status,
            client: "Client".to_string(),
            role: "EPC Contractor".to_string(),
            location: "Dhaka".to_string(),
            capacity: Some("225 MW".to_string()),
            duration: None,
            year: Some(2023),
            scope_of_work: "- Civil works\n\n* Erection\n".to_string(),
            description: Some("  ".to_string()),
            featured: false,
            images: (0..images)
                .map(|i| ProjectImage {
                    id: format!("{id}-{i}"),
                    url: format!("https://cdn.example.com/{id}/{i}.jpg"),
                    caption: None,
                })
                .collect(),
            created_at: instant::parse("2024-01-01").expect("timestamp"),
            updated_at: None,
        }
    }

    fn envelope(records: Vec<ProjectRecord>) -> ResultEnvelope {
        ResultEnvelope {
            success: true,
            message: String::new(),
            data: records,
            pagination: Pagination::default(),
            counts: None,
        }
    }

    #[test]
    fn duplicate_titles_get_distinct_slugs() {
        let mut first = record("a", "Substation", ProjectStatus::Ongoing, 0);
        first.client = "First Client".to_string();
        let mut second = record("b", "Substation", ProjectStatus::Ongoing, 0);
        second.client = "Second Client".to_string();
        second.created_at = instant::parse("2023-01-01").expect("timestamp");
        let portfolio = Portfolio::from_envelope(&envelope(vec![first, second]));

        let slugs: Vec<(&str, &str)> = portfolio
            .records()
            .iter()
            .map(|record| (record.id.as_str(), record.slug.as_str()))
            .collect();
        assert_eq!(slugs, [("a", "substation"), ("b", "substation-b")]);

        let results = portfolio.results(&FilterState::default());
        let hrefs: Vec<&str> = results
            .ongoing
            .iter()
            .map(|card| card.open_href.as_str())
            .collect();
        assert_eq!(hrefs, ["/projects?project=substation", "/projects?project=substation-b"]);

        let view = portfolio
            .overlay("substation-b", &FilterState::default(), &OverlayRequest::default())
            .expect("second record");
        assert_eq!(view.detail.expect("open").client, "Second Client");
    }

    #[test]
    fn slugs_fall_back_to_title_and_lookup_accepts_ids() {
        let portfolio = Portfolio::from_envelope(&envelope(vec![record(
            "p-1",
            "Bibiyana III Power Plant",
            ProjectStatus::Ongoing,
            0,
        )]));

        let found = portfolio.find("bibiyana-iii-power-plant").expect("by slug");
        assert_eq!(found.id, "p-1");
        assert!(portfolio.find("p-1").is_some());
        assert!(portfolio.find("missing").is_none());
    }

    #[test]
    fn tally_prefers_envelope_counts() {
        let mut env = envelope(vec![record("a", "A", ProjectStatus::Ongoing, 0)]);
        assert_eq!(Portfolio::from_envelope(&env).tally().total, 1);

        env.counts = Some(ProjectCounts {
            completed: 40,
            ongoing: 12,
            by_sector: Default::default(),
        });
        let tally = Portfolio::from_envelope(&env).tally().clone();
        assert_eq!(tally.total, 52);
        assert_eq!(tally.sector(Sector::OilAndGas), 0);
    }

    #[test]
    fn overlay_close_reports_release_effects() {
        let portfolio =
            Portfolio::from_envelope(&envelope(vec![record("a", "A", ProjectStatus::Ongoing, 3)]));
        let request = OverlayRequest {
            image: 2,
            origin: 480,
            action: Some(OverlayAction::Close(ExitPath::Backdrop)),
            ..OverlayRequest::default()
        };

        let view = portfolio
            .overlay("a", &FilterState::default(), &request)
            .expect("known record");
        assert!(!view.is_open());
        assert_eq!(view.effects, "detach-keyboard unlock-scroll restore-scroll");
        assert_eq!(view.restore_scroll, Some(480));
    }

    #[test]
    fn overlay_detail_tracks_position_and_scope() {
        let portfolio =
            Portfolio::from_envelope(&envelope(vec![record("a", "A", ProjectStatus::Ongoing, 3)]));
        let request = OverlayRequest {
            image: 2,
            action: Some(OverlayAction::Next),
            ..OverlayRequest::default()
        };

        let view = portfolio
            .overlay("a", &FilterState::default(), &request)
            .expect("known record");
        assert_eq!(view.effects, "lock-scroll attach-keyboard");
        let detail = view.detail.expect("open");
        assert_eq!(detail.image_index, 0);
        assert_eq!(detail.image_position.as_deref(), Some("1 / 3"));
        assert_eq!(detail.scope_items, ["Civil works", "Erection"]);
        assert!(detail.description.is_none());
        assert_eq!(detail.facts.len(), 2);
        assert!(detail.close.href.ends_with("#project-a"));
    }

    #[test]
    fn escape_key_closes_overlay() {
        let portfolio =
            Portfolio::from_envelope(&envelope(vec![record("a", "A", ProjectStatus::Ongoing, 1)]));
        let request = OverlayRequest {
            action: Some(OverlayAction::Key(OverlayKey::Escape)),
            ..OverlayRequest::default()
        };
        let view = portfolio
            .overlay("a", &FilterState::default(), &request)
            .expect("known record");
        assert!(!view.is_open());
        assert!(view.effects.contains("unlock-scroll"));
    }

    #[test]
    fn filter_form_marks_selected_options() {
        let state = FilterState::default().with_status(Selection::Only(ProjectStatus::Completed));
        let form = filter_form(&state);
        let selected: Vec<&str> = form
            .statuses
            .iter()
            .filter(|option| option.selected)
            .map(|option| option.value.as_str())
            .collect();
        assert_eq!(selected, ["completed"]);
        assert!(!form.is_default);
        assert_eq!(form.sorts.len(), SortKey::ALL.len());
    }
}
