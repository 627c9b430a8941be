//! Resource - a response unit that can be allocated to incidents

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::GeoPoint;

/// Kind of response unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Drone,
    #[serde(rename = "Fire Engine")]
    FireEngine,
    Ambulance,
    #[serde(rename = "Hazmat Unit")]
    HazmatUnit,
    #[serde(rename = "Air Tanker")]
    AirTanker,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drone => write!(f, "Drone"),
            Self::FireEngine => write!(f, "Fire Engine"),
            Self::Ambulance => write!(f, "Ambulance"),
            Self::HazmatUnit => write!(f, "Hazmat Unit"),
            Self::AirTanker => write!(f, "Air Tanker"),
        }
    }
}

impl std::str::FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "drone" => Ok(Self::Drone),
            "fireengine" => Ok(Self::FireEngine),
            "ambulance" => Ok(Self::Ambulance),
            "hazmatunit" => Ok(Self::HazmatUnit),
            "airtanker" => Ok(Self::AirTanker),
            _ => Err(format!("Unknown resource type: {}", s)),
        }
    }
}

/// Readiness of a response unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ResourceStatus {
    #[default]
    Available,
    #[serde(rename = "En-Route")]
    EnRoute,
    Active,
    Maintenance,
}

impl ResourceStatus {
    /// Whether the unit can take a new assignment
    pub fn is_assignable(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "Available"),
            Self::EnRoute => write!(f, "En-Route"),
            Self::Active => write!(f, "Active"),
            Self::Maintenance => write!(f, "Maintenance"),
        }
    }
}

/// A response unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Stable identifier, e.g. "UNIT-D1"
    pub id: String,

    /// Call sign shown to operators
    pub name: String,

    #[serde(rename = "type")]
    pub kind: ResourceType,

    #[serde(default)]
    pub status: ResourceStatus,

    pub location: GeoPoint,

    /// Free-text capability tags; order is irrelevant
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
}

impl Resource {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ResourceType, location: GeoPoint) -> Self {
        let id = id.into();
        debug!(%id, %kind, "Resource::new: called");
        Self {
            id,
            name: name.into(),
            kind,
            status: ResourceStatus::Available,
            location,
            capabilities: BTreeSet::new(),
        }
    }

    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities.extend(capabilities.into_iter().map(Into::into));
        self
    }

    pub fn has_capability(&self, label: &str) -> bool {
        self.capabilities.iter().any(|c| c.eq_ignore_ascii_case(label))
    }
}
