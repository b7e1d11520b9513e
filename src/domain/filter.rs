//! Portfolio ordering and the filter engine.
//!
//! Both entry points are pure: they borrow the fetched list and return a new
//! ordering, leaving the source untouched. Every ordering keeps ongoing projects
//! ahead of completed ones; the selected [`SortKey`] only breaks ties.

use std::cmp::Ordering;

use super::types::{ProjectRecord, ProjectStatus, Sector, Selection, SortKey, status_priority};

/// Transient filter form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub query: String,
    pub sector: Selection<Sector>,
    pub status: Selection<ProjectStatus>,
    pub sort: SortKey,
}

impl FilterState {
    pub fn with_query(self, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..self
        }
    }

    pub fn with_sector(self, sector: Selection<Sector>) -> Self {
        Self { sector, ..self }
    }

    pub fn with_status(self, status: Selection<ProjectStatus>) -> Self {
        Self { status, ..self }
    }

    pub fn with_sort(self, sort: SortKey) -> Self {
        Self { sort, ..self }
    }

    /// Back to the defaults (no query, every sector and status, newest first).
    pub fn reset(self) -> Self {
        Self::default()
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// The trimmed query, or `None` when nothing should be matched.
    pub fn needle(&self) -> Option<String> {
        let trimmed = self.query.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }

    pub fn admits(&self, record: &ProjectRecord) -> bool {
        let text_match = match self.needle() {
            Some(needle) => matches_text(record, &needle),
            None => true,
        };

        text_match && self.sector.admits(record.sector) && self.status.admits(record.status)
    }
}

/// Ongoing first, then newest first. Used once per fetch.
pub fn initial_order(records: &[ProjectRecord]) -> Vec<ProjectRecord> {
    let mut ordered = records.to_vec();
    ordered.sort_by(|left, right| compare(left, right, SortKey::Newest));
    ordered
}

/// Apply every active predicate of `state` and order the survivors.
pub fn apply<'a>(records: &'a [ProjectRecord], state: &FilterState) -> Vec<&'a ProjectRecord> {
    let needle = state.needle();
    let mut matched: Vec<&ProjectRecord> = records
        .iter()
        .filter(|record| needle.as_deref().is_none_or(|n| matches_text(record, n)))
        .filter(|record| state.sector.admits(record.sector))
        .filter(|record| state.status.admits(record.status))
        .collect();

    matched.sort_by(|left, right| compare(left, right, state.sort));
    matched
}

/// Search covers title, client and location only.
fn matches_text(record: &ProjectRecord, needle: &str) -> bool {
    [&record.title, &record.client, &record.location]
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
}

pub fn compare(left: &ProjectRecord, right: &ProjectRecord, sort: SortKey) -> Ordering {
    status_priority(left.status)
        .cmp(&status_priority(right.status))
        .then_with(|| tie_break(left, right, sort))
}

fn tie_break(left: &ProjectRecord, right: &ProjectRecord, sort: SortKey) -> Ordering {
    match sort {
        SortKey::Newest => newest_first(left, right),
        SortKey::Oldest => left.created_at.cmp(&right.created_at),
        SortKey::NameAsc => compare_titles(left, right),
        SortKey::NameDesc => compare_titles(right, left),
        SortKey::YearAsc => {
            compare_years(left.year, right.year, false).then_with(|| newest_first(left, right))
        }
        SortKey::YearDesc => {
            compare_years(left.year, right.year, true).then_with(|| newest_first(left, right))
        }
    }
}

fn newest_first(left: &ProjectRecord, right: &ProjectRecord) -> Ordering {
    right.created_at.cmp(&left.created_at)
}

fn compare_titles(left: &ProjectRecord, right: &ProjectRecord) -> Ordering {
    left.title
        .to_lowercase()
        .cmp(&right.title.to_lowercase())
        .then_with(|| left.title.cmp(&right.title))
}

// Missing years sort last in both directions.
fn compare_years(left: Option<i32>, right: Option<i32>, descending: bool) -> Ordering {
    match (left, right) {
        (Some(l), Some(r)) if descending => r.cmp(&l),
        (Some(l), Some(r)) => l.cmp(&r),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powerworks_api_types::instant;

    fn record(title: &str, status: ProjectStatus, created: &str) -> ProjectRecord {
        ProjectRecord {
            id: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            slug: String::new(),
            sector: Sector::PowerSector,
            status,
            client: "Client".to_string(),
            role: "EPC".to_string(),
            location: "Dhaka".to_string(),
            capacity: None,
            duration: None,
            year: None,
            scope_of_work: String::new(),
            description: None,
            featured: false,
            images: Vec::new(),
            created_at: instant::parse(created).expect("timestamp"),
            updated_at: None,
        }
    }

    fn titles(records: &[&ProjectRecord]) -> Vec<String> {
        records.iter().map(|record| record.title.clone()).collect()
    }

    #[test]
    fn initial_order_puts_ongoing_first_then_newest() {
        let records = vec![
            record("Old Ongoing", ProjectStatus::Ongoing, "2020-01-01"),
            record("New Completed", ProjectStatus::Completed, "2025-01-01"),
            record("New Ongoing", ProjectStatus::Ongoing, "2024-01-01"),
        ];

        let ordered = initial_order(&records);
        let names: Vec<&str> = ordered.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(names, ["New Ongoing", "Old Ongoing", "New Completed"]);
        assert_eq!(records[0].title, "Old Ongoing");
    }

    #[test]
    fn name_sort_only_breaks_ties_within_status() {
        let records = vec![
            record("beta", ProjectStatus::Ongoing, "2021-01-01"),
            record("Alpha", ProjectStatus::Completed, "2021-01-01"),
            record("alpha", ProjectStatus::Ongoing, "2021-01-01"),
        ];

        let state = FilterState::default().with_sort(SortKey::NameAsc);
        assert_eq!(titles(&apply(&records, &state)), ["alpha", "beta", "Alpha"]);

        let state = state.with_sort(SortKey::NameDesc);
        assert_eq!(titles(&apply(&records, &state)), ["beta", "alpha", "Alpha"]);
    }

    #[test]
    fn year_sort_places_missing_years_last() {
        let mut a = record("A", ProjectStatus::Completed, "2021-01-01");
        a.year = Some(2019);
        let mut b = record("B", ProjectStatus::Completed, "2022-01-01");
        b.year = Some(2023);
        let c = record("C", ProjectStatus::Completed, "2023-01-01");
        let records = vec![c, a, b];

        let asc = FilterState::default().with_sort(SortKey::YearAsc);
        assert_eq!(titles(&apply(&records, &asc)), ["A", "B", "C"]);

        let desc = FilterState::default().with_sort(SortKey::YearDesc);
        assert_eq!(titles(&apply(&records, &desc)), ["B", "A", "C"]);
    }

    #[test]
    fn oldest_first_reverses_recency() {
        let records = vec![
            record("One", ProjectStatus::Completed, "2021-01-01"),
            record("Two", ProjectStatus::Completed, "2023-01-01"),
        ];
        let state = FilterState::default().with_sort(SortKey::Oldest);
        assert_eq!(titles(&apply(&records, &state)), ["One", "Two"]);
    }

    #[test]
    fn whitespace_query_does_not_filter() {
        let records = vec![record("Alpha", ProjectStatus::Ongoing, "2021-01-01")];
        let state = FilterState::default().with_query("   ");
        assert_eq!(apply(&records, &state).len(), 1);
        assert!(state.needle().is_none());
    }

    #[test]
    fn reset_restores_defaults() {
        let state = FilterState::default()
            .with_query("plant")
            .with_sector(Selection::Only(Sector::OilAndGas))
            .with_status(Selection::Only(ProjectStatus::Completed))
            .with_sort(SortKey::NameDesc);
        assert!(!state.is_default());
        assert!(state.reset().is_default());
    }

    #[test]
    fn admits_agrees_with_apply() {
        let records = vec![
            record("Gas Line", ProjectStatus::Ongoing, "2021-01-01"),
            record("Substation", ProjectStatus::Completed, "2022-01-01"),
        ];
        let state = FilterState::default().with_query("LINE");
        let applied = apply(&records, &state);
        assert_eq!(applied.len(), 1);
        assert!(records.iter().filter(|r| state.admits(r)).count() == 1);
    }

    #[test]
    fn empty_source_yields_empty_output() {
        let state = FilterState::default().with_query("anything");
        assert!(apply(&[], &state).is_empty());
        assert!(initial_order(&[]).is_empty());
    }
}
