//! Portfolio enumerations and the selection wrappers used by the filter form.

use std::str::FromStr;

pub use powerworks_api_types::{
    ProjectCounts, ProjectImage, ProjectRecord, ProjectStatus, ResultEnvelope, Sector,
};

use super::error::DomainError;

/// Form value meaning "do not filter on this field".
pub const ALL_TOKEN: &str = "all";

/// Ordering applied after the ongoing-first rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    NameAsc,
    NameDesc,
    YearAsc,
    YearDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::Newest,
        SortKey::Oldest,
        SortKey::NameAsc,
        SortKey::NameDesc,
        SortKey::YearAsc,
        SortKey::YearDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
            SortKey::YearAsc => "year-asc",
            SortKey::YearDesc => "year-desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Newest => "Newest first",
            SortKey::Oldest => "Oldest first",
            SortKey::NameAsc => "Name (A-Z)",
            SortKey::NameDesc => "Name (Z-A)",
            SortKey::YearAsc => "Year (oldest)",
            SortKey::YearDesc => "Year (latest)",
        }
    }
}

impl FromStr for SortKey {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let token = value.trim().to_ascii_lowercase().replace('_', "-");
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == token)
            .ok_or_else(|| DomainError::validation(format!("unknown sort key `{value}`")))
    }
}

/// Either every value of `T` or exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: Copy + PartialEq> Selection<T> {
    pub fn admits(&self, value: T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(selected) => *selected == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn selected(&self) -> Option<T> {
        match self {
            Selection::All => None,
            Selection::Only(value) => Some(*value),
        }
    }
}

impl<T> Selection<T>
where
    T: FromStr,
    DomainError: From<T::Err>,
{
    /// Parse a form value; empty input and `all` select everything.
    pub fn parse(raw: Option<&str>) -> Result<Self, DomainError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Selection::All),
            Some(value) if value.eq_ignore_ascii_case(ALL_TOKEN) => Ok(Selection::All),
            Some(value) => Ok(Selection::Only(value.parse()?)),
        }
    }
}

impl Selection<Sector> {
    pub fn token(&self) -> &'static str {
        self.selected().map(Sector::as_str).unwrap_or(ALL_TOKEN)
    }
}

impl Selection<ProjectStatus> {
    pub fn token(&self) -> &'static str {
        self.selected()
            .map(ProjectStatus::as_str)
            .unwrap_or(ALL_TOKEN)
    }
}

/// Ongoing projects rank ahead of everything else.
pub fn status_priority(status: ProjectStatus) -> u8 {
    match status {
        ProjectStatus::Ongoing => 0,
        ProjectStatus::Completed => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_keys_parse_from_form_tokens() {
        assert_eq!("name-desc".parse::<SortKey>().unwrap(), SortKey::NameDesc);
        assert_eq!("YEAR_ASC".parse::<SortKey>().unwrap(), SortKey::YearAsc);
        assert!("popular".parse::<SortKey>().is_err());
    }

    #[test]
    fn selection_treats_blank_and_all_as_everything() {
        assert_eq!(Selection::<Sector>::parse(None).unwrap(), Selection::All);
        assert_eq!(Selection::<Sector>::parse(Some(" ")).unwrap(), Selection::All);
        assert_eq!(Selection::<Sector>::parse(Some("ALL")).unwrap(), Selection::All);
        assert_eq!(
            Selection::<Sector>::parse(Some("oil-and-gas")).unwrap(),
            Selection::Only(Sector::OilAndGas)
        );
        assert!(Selection::<ProjectStatus>::parse(Some("paused")).is_err());
    }

    #[test]
    fn selection_admits() {
        let only = Selection::Only(ProjectStatus::Ongoing);
        assert!(only.admits(ProjectStatus::Ongoing));
        assert!(!only.admits(ProjectStatus::Completed));
        assert!(Selection::<ProjectStatus>::All.admits(ProjectStatus::Completed));
        assert_eq!(only.token(), "ongoing");
    }
}
