//! Recon imagery - synthetic satellite views of an incident
//!
//! Best-effort decoration: failures never reach the caller.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use eyre::{Context, Result};
use tracing::debug;

use crate::domain::Incident;
use crate::genai::{GenAiClient, GenerateRequest, GenerationFailure};
use crate::prompts::{PromptLoader, ReconContext};

/// A generated image as returned inline by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconImage {
    pub mime_type: String,
    /// Base64 payload, exactly as received
    pub data: String,
}

impl ReconImage {
    /// `data:{mime};base64,{payload}` form for direct embedding
    pub fn data_uri(&self) -> String {
        self.to_string()
    }

    /// Decode the payload to raw image bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD.decode(&self.data).context("Recon payload is not valid base64")
    }

    /// File extension matching the declared media type
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "bin",
        }
    }
}

impl std::fmt::Display for ReconImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Requests recon imagery from an image-generation model
pub struct ReconClient {
    genai: Arc<dyn GenAiClient>,
    prompts: Arc<PromptLoader>,
    model: String,
}

impl ReconClient {
    pub fn new(genai: Arc<dyn GenAiClient>, model: impl Into<String>) -> Self {
        Self {
            genai,
            prompts: Arc::new(PromptLoader::embedded_only()),
            model: model.into(),
        }
    }

    pub fn with_prompts(mut self, prompts: Arc<PromptLoader>) -> Self {
        self.prompts = prompts;
        self
    }

    /// Generate a recon image, reporting why none was produced
    pub async fn try_generate_image(&self, incident: &Incident) -> Result<ReconImage, GenerationFailure> {
        debug!(incident = %incident.id, %self.model, "try_generate_image: called");
        let prompt = self
            .prompts
            .render("recon", &ReconContext::for_incident(incident))
            .map_err(|e| {
                debug!(error = %e, "try_generate_image: prompt render failed");
                GenerationFailure::NotAvailable
            })?;

        let response = self.genai.generate(GenerateRequest::new(&self.model, prompt)).await?;

        response
            .first_inline_data()
            .filter(|inline| !inline.data.trim().is_empty())
            .map(|inline| ReconImage {
                mime_type: inline.mime_type.clone(),
                data: inline.data.clone(),
            })
            .ok_or(GenerationFailure::NotAvailable)
    }

    /// Generate a recon image; `None` on any failure or when no image came back
    pub async fn generate_image(&self, incident: &Incident) -> Option<ReconImage> {
        match self.try_generate_image(incident).await {
            Ok(image) => {
                debug!(mime_type = %image.mime_type, "generate_image: image received");
                Some(image)
            }
            Err(failure) => {
                debug!(%failure, retryable = failure.is_retryable(), "generate_image: no image");
                None
            }
        }
    }
}
