//! Scenario - the incidents and resources on the board
//!
//! The built-in demo board mirrors the dashboard's mock feed. Alternative
//! boards can be loaded from YAML.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{Duration, Utc};
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{GeoPoint, Incident, IncidentCategory, IncidentStatus, Resource, ResourceStatus, ResourceType, Severity, SiteLocation};

/// A board of incidents and the units available to respond
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub incidents: Vec<Incident>,
    pub resources: Vec<Resource>,
}

impl Scenario {
    /// The demo board: a critical wildfire and a medical call, three units
    pub fn demo() -> Self {
        debug!("Scenario::demo: called");
        let now = Utc::now();

        let incidents = vec![
            Incident::new(
                "INC-001",
                IncidentCategory::Wildfire,
                SiteLocation::new(34.0522, -118.2437, "Angeles National Forest - Sector B"),
                Severity::Critical,
                "Rapidly spreading brush fire near power lines. High winds reported from NW.",
            )
            .with_timestamp(now),
            Incident::new(
                "INC-002",
                IncidentCategory::Medical,
                SiteLocation::new(34.0407, -118.2673, "1234 Crypto.com Arena Blvd"),
                Severity::Medium,
                "Multiple reports of heat exhaustion at outdoor event.",
            )
            .with_status(IncidentStatus::Dispatched)
            .with_timestamp(now - Duration::minutes(15)),
        ];

        let resources = vec![
            Resource::new("UNIT-D1", "Guardian-1", ResourceType::Drone, GeoPoint::new(34.0522, -118.2437))
                .with_capabilities(["Thermal Imaging", "Real-time Video", "Air Quality Sensing"]),
            Resource::new("UNIT-E42", "Engine 42", ResourceType::FireEngine, GeoPoint::new(34.1000, -118.3000))
                .with_capabilities(["Water Pumping", "Rescue Tools"]),
            Resource::new("UNIT-A12", "Medic 12", ResourceType::Ambulance, GeoPoint::new(34.0407, -118.2673))
                .with_status(ResourceStatus::Active)
                .with_capabilities(["Advanced Life Support"]),
        ];

        Self { incidents, resources }
    }

    /// Load a scenario from a YAML file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(?path, "Scenario::load: called");
        let content = fs::read_to_string(path).context(format!("Failed to read scenario {}", path.display()))?;
        let scenario: Self = serde_yaml::from_str(&content).context("Failed to parse scenario file")?;
        scenario.validate()?;
        info!(
            "Loaded scenario from {} ({} incidents, {} resources)",
            path.display(),
            scenario.incidents.len(),
            scenario.resources.len()
        );
        Ok(scenario)
    }

    /// Check identifiers are unique within each list
    ///
    /// Ids are looked up case-insensitively, so `INC-001` and `inc-001` collide.
    pub fn validate(&self) -> Result<()> {
        debug!("Scenario::validate: called");
        let mut seen = HashSet::new();
        for incident in &self.incidents {
            if !seen.insert(incident.id.to_ascii_uppercase()) {
                return Err(eyre!("Duplicate incident id: {}", incident.id));
            }
        }

        let mut seen = HashSet::new();
        for resource in &self.resources {
            if !seen.insert(resource.id.to_ascii_uppercase()) {
                return Err(eyre!("Duplicate resource id: {}", resource.id));
            }
        }
        Ok(())
    }

    /// Find an incident by id (case-insensitive)
    pub fn incident(&self, id: &str) -> Option<&Incident> {
        debug!(%id, "Scenario::incident: called");
        self.incidents.iter().find(|i| i.id.eq_ignore_ascii_case(id))
    }

    /// Incidents ordered most severe first
    pub fn by_severity(&self) -> Vec<&Incident> {
        let mut sorted: Vec<&Incident> = self.incidents.iter().collect();
        sorted.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.id.cmp(&b.id)));
        sorted
    }
}
