//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files for plan, recon and
//! briefing requests.
//!
//! Template loading chain:
//! 1. `.firststrike/prompts/{name}.pmt` (operator override)
//! 2. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use loader::{BriefingContext, PlanContext, PromptLoader, ReconContext};
