//! Tolerant extraction of a command plan from free-form model text
//!
//! Model replies are supposed to be bare JSON but often arrive wrapped in
//! prose or markdown fences. Extraction runs in stages and always ends in
//! exactly one of three outcomes:
//!
//! 1. `Strict`: the whole reply decodes as a plan
//! 2. `Embedded`: the first balanced `{...}` region decodes as a plan
//! 3. `Unparseable`: neither worked; the caller builds the fallback plan

use serde::Deserialize;
use tracing::debug;

use crate::domain::{Allocation, CommandPlan, PLAN_SYNTHESIZED};

/// A plan as the model wrote it; any field may be missing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDraft {
    pub summary: Option<String>,
    pub next_steps: Option<Vec<String>>,
    pub allocations: Option<Vec<Allocation>>,
    pub risks: Option<Vec<String>>,
}

impl PlanDraft {
    /// Complete the draft into a plan
    ///
    /// Missing lists become empty. A missing or empty summary falls back to
    /// `preamble`, then to a generic placeholder.
    pub fn complete(self, preamble: &str) -> CommandPlan {
        debug!(has_summary = self.summary.is_some(), "PlanDraft::complete: called");
        let summary = match self.summary {
            Some(summary) if !summary.is_empty() => summary,
            _ if !preamble.is_empty() => {
                debug!("PlanDraft::complete: using preamble as summary");
                preamble.to_string()
            }
            _ => {
                debug!("PlanDraft::complete: using placeholder summary");
                PLAN_SYNTHESIZED.to_string()
            }
        };

        CommandPlan {
            summary,
            next_steps: self.next_steps.unwrap_or_default(),
            allocations: self.allocations.unwrap_or_default(),
            risks: self.risks.unwrap_or_default(),
            error: None,
            grounding: None,
        }
    }
}

/// Outcome of running a reply through the extraction stages
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The whole reply was a plan object
    Strict(PlanDraft),
    /// A plan object was found inside surrounding text
    Embedded(PlanDraft),
    /// No decodable plan object
    Unparseable,
}

impl Extraction {
    /// Run the extraction stages over a reply
    pub fn run(text: &str) -> Self {
        debug!(text_len = text.len(), "Extraction::run: called");
        let trimmed = text.trim();

        if trimmed.starts_with('{') {
            match serde_json::from_str::<PlanDraft>(trimmed) {
                Ok(draft) => {
                    debug!("Extraction::run: strict decode succeeded");
                    return Self::Strict(draft);
                }
                Err(e) => debug!(error = %e, "Extraction::run: strict decode failed"),
            }
        }

        let Some(region) = first_object_region(text) else {
            debug!("Extraction::run: no balanced object region");
            return Self::Unparseable;
        };

        match serde_json::from_str::<PlanDraft>(region) {
            Ok(draft) => {
                debug!(region_len = region.len(), "Extraction::run: embedded decode succeeded");
                Self::Embedded(draft)
            }
            Err(e) => {
                debug!(error = %e, "Extraction::run: embedded decode failed");
                Self::Unparseable
            }
        }
    }

    /// Turn the outcome into a plan; `text` is the reply it came from
    pub fn into_plan(self, text: &str) -> CommandPlan {
        match self {
            Self::Strict(draft) | Self::Embedded(draft) => draft.complete(preamble(text)),
            Self::Unparseable => CommandPlan::fallback(text),
        }
    }
}

/// Build a plan from a model reply, falling back when nothing decodes
pub fn plan_from_text(text: &str) -> CommandPlan {
    Extraction::run(text).into_plan(text)
}

/// Text before the first `{`, trimmed
pub fn preamble(text: &str) -> &str {
    text.split('{').next().unwrap_or_default().trim()
}

/// Locate the first balanced `{...}` region
///
/// Braces inside JSON string literals (including escaped quotes) do not
/// count toward nesting. Returns None when the first `{` is never closed.
pub fn first_object_region(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }
    None
}
