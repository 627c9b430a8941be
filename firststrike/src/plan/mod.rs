//! Command plan synthesis
//!
//! `PlanClient` issues the grounded model call; `extract` turns whatever
//! text comes back into a plan.

mod client;
pub mod extract;

pub use client::{PlanClient, plan_for_failure};
pub use extract::{Extraction, PlanDraft, plan_from_text};
