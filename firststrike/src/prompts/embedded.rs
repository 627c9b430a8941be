//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// System instruction for command plan synthesis
pub const SYSTEM: &str = include_str!("../../prompts/system.pmt");

/// Command plan request
pub const PLAN: &str = include_str!("../../prompts/plan.pmt");

/// Recon image request
pub const RECON: &str = include_str!("../../prompts/recon.pmt");

/// Spoken briefing wrapper
pub const BRIEFING: &str = include_str!("../../prompts/briefing.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "system" => Some(SYSTEM),
        "plan" => Some(PLAN),
        "recon" => Some(RECON),
        "briefing" => Some(BRIEFING),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
