//! Splits a filtered listing into the sections shown on the portfolio page.

use std::collections::BTreeMap;

use super::types::{ProjectCounts, ProjectRecord, ProjectStatus, Sector};

/// Featured ongoing projects that get the enlarged treatment.
pub const FEATURED_LIMIT: usize = 2;

#[derive(Debug, Default)]
pub struct ProjectGroups<'a> {
    pub featured: Vec<&'a ProjectRecord>,
    pub ongoing: Vec<&'a ProjectRecord>,
    pub completed: Vec<&'a ProjectRecord>,
}

impl<'a> ProjectGroups<'a> {
    /// Partition an already ordered listing; relative order is kept in every group.
    pub fn partition<I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ProjectRecord>,
    {
        let mut groups = Self::default();
        for record in records {
            match record.status {
                ProjectStatus::Ongoing
                    if record.featured && groups.featured.len() < FEATURED_LIMIT =>
                {
                    groups.featured.push(record)
                }
                ProjectStatus::Ongoing => groups.ongoing.push(record),
                ProjectStatus::Completed => groups.completed.push(record),
            }
        }
        groups
    }

    pub fn active_count(&self) -> usize {
        self.featured.len() + self.ongoing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0 && self.completed.is_empty()
    }
}

/// Per-status and per-sector totals over a record list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    pub total: u64,
    pub ongoing: u64,
    pub completed: u64,
    pub by_sector: BTreeMap<Sector, u64>,
}

impl Tally {
    pub fn count<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ProjectRecord>,
    {
        let mut tally = Self::default();
        for record in records {
            tally.total = tally.total.saturating_add(1);
            let bucket = match record.status {
                ProjectStatus::Ongoing => &mut tally.ongoing,
                ProjectStatus::Completed => &mut tally.completed,
            };
            *bucket = bucket.saturating_add(1);
            let sector = tally.by_sector.entry(record.sector).or_default();
            *sector = sector.saturating_add(1);
        }
        tally
    }

    /// Totals reported by the API. `total` falls back to the status sum when
    /// the pagination block is missing.
    pub fn from_counts(counts: &ProjectCounts, total: u64) -> Self {
        // Upstream values are untrusted.
        let status_sum = counts.ongoing.saturating_add(counts.completed);
        Self {
            total: if total == 0 { status_sum } else { total },
            ongoing: counts.ongoing,
            completed: counts.completed,
            by_sector: counts.by_sector.clone(),
        }
    }

    pub fn sector(&self, sector: Sector) -> u64 {
        self.by_sector.get(&sector).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_upstream_counts_saturate() {
        let counts = ProjectCounts {
            completed: u64::MAX,
            ongoing: 1,
            by_sector: BTreeMap::new(),
        };

        let tally = Tally::from_counts(&counts, 0);
        assert_eq!(tally.total, u64::MAX);
        assert_eq!(tally.ongoing, 1);
        assert_eq!(tally.completed, u64::MAX);
    }

    #[test]
    fn reported_total_wins_over_status_sum() {
        let counts = ProjectCounts {
            completed: 3,
            ongoing: 2,
            by_sector: BTreeMap::from([(Sector::OilAndGas, 4)]),
        };

        let tally = Tally::from_counts(&counts, 9);
        assert_eq!(tally.total, 9);
        assert_eq!(tally.sector(Sector::OilAndGas), 4);
        assert_eq!(tally.sector(Sector::PowerSector), 0);
    }
}
