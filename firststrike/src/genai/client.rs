//! GenAiClient trait definition

use async_trait::async_trait;

use super::{GenAiError, GenerateRequest, GenerateResponse};

/// Stateless generative AI client - each call is independent
///
/// This is the seam every plan, recon and briefing call goes through.
/// Implementations are constructed explicitly and shared behind an `Arc`,
/// so tests substitute scripted doubles.
#[async_trait]
pub trait GenAiClient: Send + Sync {
    /// Send a single generate-content request
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, GenAiError>;
}
