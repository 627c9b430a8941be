//! GenAI client module for FirstStrike
//!
//! Provides the generate-content transport shared by the plan, recon and
//! briefing clients.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod gemini;
mod types;

pub use client::GenAiClient;
pub use error::{GenAiError, GenerationFailure, RESOURCE_EXHAUSTED, is_quota_signature};
pub use gemini::GeminiClient;
pub use types::{
    Candidate, Content, GenerateRequest, GenerateResponse, GenerationConfig, GroundingMetadata, InlineData, Modality,
    Part, Tool, ToolConfig, WireGroundingChunk,
};

use crate::config::GenAiConfig;

/// Create the GenAI client described by config
pub fn create_client(config: &GenAiConfig) -> Result<Arc<dyn GenAiClient>, GenAiError> {
    debug!(base_url = %config.base_url, "create_client: called");
    Ok(Arc::new(GeminiClient::from_config(config)?))
}
