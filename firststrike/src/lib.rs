//! FirstStrike - AI incident command core
//!
//! Turns a board of incidents and resources into a grounded command plan,
//! generates recon imagery for a selected incident, and speaks tactical
//! briefings. Every generative call goes through one [`genai::GenAiClient`]
//! seam, and none of them fail outward: plans degrade to a fixed fallback,
//! imagery and audio degrade to nothing.
//!
//! # Modules
//!
//! - [`domain`] - Incidents, resources, plans and the demo scenario
//! - [`genai`] - Provider client trait, wire types and the Gemini implementation
//! - [`plan`] - Plan synthesis and tolerant reply extraction
//! - [`recon`] - Recon imagery
//! - [`briefing`] - Speech synthesis, PCM decoding and playback
//! - [`capability`] - Credential selection and geolocation seams
//! - [`session`] - Board state tying the clients together
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod briefing;
pub mod capability;
pub mod cli;
pub mod config;
pub mod domain;
pub mod genai;
pub mod plan;
pub mod prompts;
pub mod recon;
pub mod session;

// Re-export commonly used types
pub use briefing::{AudioBuffer, AudioSink, BriefingClient, BriefingPlayer, ClockSink};
pub use capability::{EnvKeySelector, FixedLocation, KeySelector, LocationError, LocationProvider, NoLocation};
pub use config::{Config, GenAiConfig};
pub use domain::{
    Allocation, CommandPlan, GroundingChunk, Incident, IncidentCategory, IncidentStatus, LatLng, PlanErrorKind,
    Resource, ResourceStatus, ResourceType, Scenario, Severity,
};
pub use genai::{GenAiClient, GenAiError, GeminiClient, GenerateRequest, GenerateResponse, create_client};
pub use plan::{Extraction, PlanClient, plan_from_text};
pub use recon::{ReconClient, ReconImage};
pub use session::{BriefingToggle, CommandSession};
