//! Prompt Loader
//!
//! Loads prompt templates from the operator override directory or falls back
//! to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Context, Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;
use crate::domain::{Incident, LatLng, Resource};

/// Rendered in place of a location when none was acquired
const UNKNOWN_LOCATION: &str = "Unknown";

/// Context for the command plan template
#[derive(Debug, Clone, Serialize)]
pub struct PlanContext {
    /// Incidents as compact JSON
    pub incidents: String,
    /// Resources as compact JSON
    pub resources: String,
    /// Caller location as JSON, or "Unknown"
    pub location: String,
}

impl PlanContext {
    pub fn new(incidents: &[Incident], resources: &[Resource], location: Option<LatLng>) -> Result<Self> {
        debug!(
            incident_count = incidents.len(),
            resource_count = resources.len(),
            has_location = location.is_some(),
            "PlanContext::new: called"
        );
        let location = match location {
            Some(lat_lng) => serde_json::to_string(&lat_lng).context("Failed to serialize location")?,
            None => UNKNOWN_LOCATION.to_string(),
        };

        Ok(Self {
            incidents: serde_json::to_string(incidents).context("Failed to serialize incidents")?,
            resources: serde_json::to_string(resources).context("Failed to serialize resources")?,
            location,
        })
    }
}

/// Context for the recon image template
#[derive(Debug, Clone, Serialize)]
pub struct ReconContext {
    pub category: String,
    pub address: String,
}

impl ReconContext {
    pub fn for_incident(incident: &Incident) -> Self {
        Self {
            category: incident.category.to_string(),
            address: incident.location.address.clone(),
        }
    }
}

/// Context for the spoken briefing template
#[derive(Debug, Clone, Serialize)]
pub struct BriefingContext {
    pub text: String,
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// Operator override directory (e.g., `.firststrike/prompts/`)
    user_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader rooted at `root`, honoring `.firststrike/prompts/` overrides
    pub fn new(root: impl AsRef<Path>) -> Self {
        let user_dir = root.as_ref().join(".firststrike/prompts");
        let user_dir_exists = user_dir.exists();
        debug!(?user_dir, %user_dir_exists, "PromptLoader::new: called");

        Self {
            hbs: Self::engine(),
            user_dir: if user_dir_exists { Some(user_dir) } else { None },
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            user_dir: None,
        }
    }

    /// Prompts are plain text, never HTML
    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks the operator override first, then the embedded default.
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in user override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read user prompt {}: {}", path.display(), e));
            }
        }

        embedded::get_embedded(name)
            .map(str::to_string)
            .ok_or_else(|| eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map(|rendered| rendered.trim().to_string())
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    /// The system instruction sent with every plan request
    pub fn system_instruction(&self) -> Result<String> {
        debug!("PromptLoader::system_instruction: called");
        self.load_template("system").map(|s| s.trim().to_string())
    }
}

impl Default for PromptLoader {
    fn default() -> Self {
        Self::embedded_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Scenario;
    use tempfile::TempDir;

    #[test]
    fn test_plan_context_unknown_location() {
        let scenario = Scenario::demo();
        let ctx = PlanContext::new(&scenario.incidents, &scenario.resources, None).unwrap();
        assert_eq!(ctx.location, "Unknown");
        assert!(ctx.incidents.contains("\"INC-001\""));
        assert!(ctx.resources.contains("\"Guardian-1\""));
    }

    #[test]
    fn test_plan_context_with_location() {
        let ctx = PlanContext::new(&[], &[], Some(LatLng::new(34.5, -118.25))).unwrap();
        assert_eq!(ctx.location, r#"{"latitude":34.5,"longitude":-118.25}"#);
        assert_eq!(ctx.incidents, "[]");
    }

    #[test]
    fn test_render_plan_does_not_escape_json() {
        let loader = PromptLoader::embedded_only();
        let scenario = Scenario::demo();
        let ctx = PlanContext::new(&scenario.incidents, &scenario.resources, None).unwrap();
        let prompt = loader.render("plan", &ctx).unwrap();
        assert!(prompt.contains(r#""id":"INC-001""#));
        assert!(!prompt.contains("&quot;"));
        assert!(prompt.contains("USER LOCATION: Unknown"));
    }

    #[test]
    fn test_render_recon() {
        let loader = PromptLoader::embedded_only();
        let scenario = Scenario::demo();
        let prompt = loader
            .render("recon", &ReconContext::for_incident(&scenario.incidents[0]))
            .unwrap();
        assert_eq!(
            prompt,
            "A high-resolution satellite thermal map view of a Wildfire at Angeles National Forest - Sector B. \
             Tactical HUD overlay style."
        );
    }

    #[test]
    fn test_render_briefing() {
        let loader = PromptLoader::embedded_only();
        let prompt = loader
            .render(
                "briefing",
                &BriefingContext {
                    text: "Hold the ridge & wait".to_string(),
                },
            )
            .unwrap();
        assert_eq!(prompt, "Commander, tactical update: Hold the ridge & wait");
    }

    #[test]
    fn test_user_override_wins() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join(".firststrike/prompts");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("briefing.pmt"), "Attention all units: {{text}}").unwrap();

        let loader = PromptLoader::new(root.path());
        let prompt = loader
            .render("briefing", &BriefingContext { text: "stand by".to_string() })
            .unwrap();
        assert_eq!(prompt, "Attention all units: stand by");

        // Templates without an override still come from the embedded set
        assert!(loader.system_instruction().unwrap().contains("Multi-Agent Orchestrator"));
    }

    #[test]
    fn test_unknown_template() {
        let loader = PromptLoader::embedded_only();
        assert!(loader.render("nonexistent", &BriefingContext { text: String::new() }).is_err());
    }
}
