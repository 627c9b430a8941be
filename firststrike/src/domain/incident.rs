//! Incident - an emergency call on the tactical map

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Severity, SiteLocation};

/// Category of emergency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncidentCategory {
    Wildfire,
    Flood,
    #[serde(rename = "Structural Fire")]
    StructuralFire,
    Medical,
    Hazmat,
}

impl IncidentCategory {
    /// Wire spelling, also used in prompts
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wildfire => "Wildfire",
            Self::Flood => "Flood",
            Self::StructuralFire => "Structural Fire",
            Self::Medical => "Medical",
            Self::Hazmat => "Hazmat",
        }
    }
}

impl std::fmt::Display for IncidentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IncidentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], " ").as_str() {
            "wildfire" => Ok(Self::Wildfire),
            "flood" => Ok(Self::Flood),
            "structural fire" => Ok(Self::StructuralFire),
            "medical" => Ok(Self::Medical),
            "hazmat" => Ok(Self::Hazmat),
            _ => Err(format!("Unknown incident category: {}", s)),
        }
    }
}

/// Lifecycle of an incident
///
/// Reported -> Dispatched -> On-Scene -> Contained -> Resolved. An on-scene
/// incident may be resolved without passing through containment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum IncidentStatus {
    #[default]
    Reported,
    Dispatched,
    #[serde(rename = "On-Scene")]
    OnScene,
    Contained,
    Resolved,
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reported => write!(f, "Reported"),
            Self::Dispatched => write!(f, "Dispatched"),
            Self::OnScene => write!(f, "On-Scene"),
            Self::Contained => write!(f, "Contained"),
            Self::Resolved => write!(f, "Resolved"),
        }
    }
}

impl std::str::FromStr for IncidentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "reported" => Ok(Self::Reported),
            "dispatched" => Ok(Self::Dispatched),
            "onscene" => Ok(Self::OnScene),
            "contained" => Ok(Self::Contained),
            "resolved" => Ok(Self::Resolved),
            _ => Err(format!("Unknown incident status: {}", s)),
        }
    }
}

/// An emergency incident
///
/// Serialized with the field names the command model sees in its prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Stable identifier, e.g. "INC-001"
    pub id: String,

    #[serde(rename = "type")]
    pub category: IncidentCategory,

    pub location: SiteLocation,

    pub severity: Severity,

    #[serde(default)]
    pub status: IncidentStatus,

    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub description: String,
}

impl Incident {
    /// Create a freshly reported incident
    pub fn new(
        id: impl Into<String>,
        category: IncidentCategory,
        location: SiteLocation,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        let id = id.into();
        debug!(%id, %category, %severity, "Incident::new: called");
        Self {
            id,
            category,
            location,
            severity,
            status: IncidentStatus::Reported,
            timestamp: Utc::now(),
            description: description.into(),
        }
    }

    pub fn with_status(mut self, status: IncidentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
