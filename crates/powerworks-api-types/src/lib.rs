//! Wire types for the external projects API (`GET /api/v1/projects`).
//!
//! The upstream service is not part of this repository; these types describe the
//! JSON body it returns so both the site server and its tests agree on one shape.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub mod instant;

/// Industry sector a project belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sector {
    #[serde(rename = "OIL_AND_GAS", alias = "oil-and-gas", alias = "oil_and_gas")]
    OilAndGas,
    #[serde(rename = "POWER_SECTOR", alias = "power-sector", alias = "power_sector")]
    PowerSector,
}

impl Sector {
    pub const ALL: [Sector; 2] = [Sector::OilAndGas, Sector::PowerSector];

    /// Stable identifier used in URLs and form values.
    pub fn as_str(self) -> &'static str {
        match self {
            Sector::OilAndGas => "oil-and-gas",
            Sector::PowerSector => "power-sector",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sector::OilAndGas => "Oil & Gas",
            Sector::PowerSector => "Power Sector",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sector {
    type Err = ParseVariantError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize_token(value).as_str() {
            "oil-and-gas" => Ok(Sector::OilAndGas),
            "power-sector" => Ok(Sector::PowerSector),
            _ => Err(ParseVariantError::new("sector", value)),
        }
    }
}

/// Lifecycle bucket of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[serde(rename = "ONGOING", alias = "ongoing")]
    Ongoing,
    #[serde(rename = "COMPLETED", alias = "completed")]
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 2] = [ProjectStatus::Ongoing, ProjectStatus::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Ongoing => "ongoing",
            ProjectStatus::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::Ongoing => "Ongoing",
            ProjectStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = ParseVariantError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize_token(value).as_str() {
            "ongoing" => Ok(ProjectStatus::Ongoing),
            "completed" => Ok(ProjectStatus::Completed),
            _ => Err(ParseVariantError::new("status", value)),
        }
    }
}

/// Returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVariantError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseVariantError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl fmt::Display for ParseVariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} `{}`", self.kind, self.value)
    }
}

impl std::error::Error for ParseVariantError {}

fn normalize_token(value: &str) -> String {
    value.trim().to_ascii_lowercase().replace('_', "-")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectImage {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

/// One infrastructure project as served by the projects API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    pub sector: Sector,
    pub status: ProjectStatus,
    pub client: String,
    #[serde(default)]
    pub role: String,
    pub location: String,
    #[serde(default)]
    pub capacity: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub scope_of_work: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub images: Vec<ProjectImage>,
    #[serde(with = "instant")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "instant::option")]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    #[serde(alias = "pages")]
    pub total_pages: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectCounts {
    pub completed: u64,
    pub ongoing: u64,
    pub by_sector: BTreeMap<Sector, u64>,
}

/// Response body of `GET /api/v1/projects`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "projects")]
    pub data: Vec<ProjectRecord>,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub counts: Option<ProjectCounts>,
}
