//! CommandPlan - the synthesized tactical plan
//!
//! A plan is replaced wholesale on every generation request. The list fields
//! are always present after construction so consumers only branch on
//! emptiness, never on existence.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum characters of raw model text kept as a fallback summary
pub const FALLBACK_SUMMARY_MAX_CHARS: usize = 500;

/// Summary used when a fallback is built from empty text
pub const AWAITING_ASSESSMENT: &str = "Awaiting tactical assessment...";

/// Summary used when parsed JSON carries no summary and no preamble
pub const PLAN_SYNTHESIZED: &str = "Plan synthesized.";

/// Summary of the plan returned when the provider quota is exhausted
pub const QUOTA_OFFLINE_SUMMARY: &str = "TACTICAL NODE OFFLINE: Public quota exhausted.";

/// Summary of the plan returned for any other call failure
pub const LINK_DISRUPTED_SUMMARY: &str = "Communication link disrupted. Manual override active.";

/// Next steps every fallback plan carries
pub const FALLBACK_NEXT_STEPS: [&str; 2] = ["Verify manual protocols", "Check secondary communications"];

/// Risk entry every fallback plan carries
pub const FALLBACK_RISK: &str = "Automatic synthesis degraded";

/// Assignment of a resource to an incident
///
/// Both ids are references; nothing checks they exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    #[serde(default)]
    pub resource_id: String,
    #[serde(default)]
    pub incident_id: String,
    #[serde(default)]
    pub task: String,
}

/// Classification attached to a degraded plan the operator can act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanErrorKind {
    /// Provider quota exhausted; remediable by selecting another API key
    #[serde(rename = "QUOTA_LIMIT")]
    QuotaLimit,
}

impl std::fmt::Display for PlanErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaLimit => write!(f, "QUOTA_LIMIT"),
        }
    }
}

/// Title and link of a retrieval citation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Citation {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub uri: String,
}

/// A grounding citation from web or maps search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroundingChunk {
    Web(Citation),
    Maps(Citation),
}

impl GroundingChunk {
    pub fn web(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self::Web(Citation {
            title: title.into(),
            uri: uri.into(),
        })
    }

    pub fn maps(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self::Maps(Citation {
            title: title.into(),
            uri: uri.into(),
        })
    }

    pub fn citation(&self) -> &Citation {
        match self {
            Self::Web(c) | Self::Maps(c) => c,
        }
    }

    pub fn title(&self) -> &str {
        &self.citation().title
    }

    pub fn uri(&self) -> &str {
        &self.citation().uri
    }

    /// Short source label: "web" or "maps"
    pub fn source(&self) -> &'static str {
        match self {
            Self::Web(_) => "web",
            Self::Maps(_) => "maps",
        }
    }
}

/// Tactical command plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandPlan {
    pub summary: String,

    pub next_steps: Vec<String>,

    pub allocations: Vec<Allocation>,

    pub risks: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<PlanErrorKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding: Option<Vec<GroundingChunk>>,
}

impl CommandPlan {
    /// Build the fixed-shape plan used when synthesis cannot be trusted
    ///
    /// The summary is the first 500 characters of `raw_text`, or a placeholder
    /// when the text is empty.
    pub fn fallback(raw_text: &str) -> Self {
        debug!(raw_len = raw_text.len(), "CommandPlan::fallback: called");
        let summary: String = raw_text.chars().take(FALLBACK_SUMMARY_MAX_CHARS).collect();
        let summary = if summary.is_empty() {
            debug!("CommandPlan::fallback: empty text, using placeholder");
            AWAITING_ASSESSMENT.to_string()
        } else {
            summary
        };

        Self {
            summary,
            next_steps: FALLBACK_NEXT_STEPS.iter().map(|s| s.to_string()).collect(),
            allocations: Vec::new(),
            risks: vec![FALLBACK_RISK.to_string()],
            error: None,
            grounding: None,
        }
    }

    /// Fallback plan for an exhausted provider quota, tagged for the operator
    pub fn quota_exhausted() -> Self {
        debug!("CommandPlan::quota_exhausted: called");
        Self {
            error: Some(PlanErrorKind::QuotaLimit),
            ..Self::fallback(QUOTA_OFFLINE_SUMMARY)
        }
    }

    /// Fallback plan for any other call failure
    pub fn link_disrupted() -> Self {
        debug!("CommandPlan::link_disrupted: called");
        Self::fallback(LINK_DISRUPTED_SUMMARY)
    }

    pub fn with_grounding(mut self, grounding: Option<Vec<GroundingChunk>>) -> Self {
        self.grounding = grounding;
        self
    }

    pub fn is_quota_limited(&self) -> bool {
        self.error == Some(PlanErrorKind::QuotaLimit)
    }

    /// Citations attached to this plan, empty when the response carried none
    pub fn citations(&self) -> &[GroundingChunk] {
        self.grounding.as_deref().unwrap_or(&[])
    }

    /// Allocations targeting the given incident (ids compare case-insensitively)
    pub fn allocations_for<'a>(&'a self, incident_id: &'a str) -> impl Iterator<Item = &'a Allocation> + 'a {
        self.allocations
            .iter()
            .filter(move |a| a.incident_id.eq_ignore_ascii_case(incident_id))
    }
}
