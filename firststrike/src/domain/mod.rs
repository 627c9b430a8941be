//! Domain types for FirstStrike
//!
//! Core domain types: Incident, Resource, CommandPlan.
//! Incidents and resources are immutable inputs to plan synthesis; a
//! CommandPlan is produced fresh per generation request and has no identity.

mod geo;
mod incident;
mod plan;
mod resource;
mod scenario;
mod severity;

pub use geo::{GeoPoint, LatLng, SiteLocation};
pub use incident::{Incident, IncidentCategory, IncidentStatus};
pub use plan::{
    AWAITING_ASSESSMENT, Allocation, Citation, CommandPlan, FALLBACK_NEXT_STEPS, FALLBACK_RISK, FALLBACK_SUMMARY_MAX_CHARS,
    GroundingChunk, LINK_DISRUPTED_SUMMARY, PLAN_SYNTHESIZED, PlanErrorKind, QUOTA_OFFLINE_SUMMARY,
};
pub use resource::{Resource, ResourceStatus, ResourceType};
pub use scenario::Scenario;
pub use severity::Severity;
