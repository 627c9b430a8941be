//! Briefing client - spoken tactical updates

use std::sync::Arc;

use tracing::debug;

use super::pcm::{AudioBuffer, decode_speech};
use crate::genai::{GenAiClient, GenerateRequest, GenerationConfig, GenerationFailure};
use crate::prompts::{BriefingContext, PromptLoader};

/// Synthesizes spoken briefings with a prebuilt voice
pub struct BriefingClient {
    genai: Arc<dyn GenAiClient>,
    prompts: Arc<PromptLoader>,
    model: String,
    voice: String,
}

impl BriefingClient {
    pub fn new(genai: Arc<dyn GenAiClient>, model: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            genai,
            prompts: Arc::new(PromptLoader::embedded_only()),
            model: model.into(),
            voice: voice.into(),
        }
    }

    pub fn with_prompts(mut self, prompts: Arc<PromptLoader>) -> Self {
        self.prompts = prompts;
        self
    }

    /// Synthesize a briefing, reporting why no audio was produced
    ///
    /// Only the first part of the first candidate is considered; speech
    /// arrives there or not at all.
    pub async fn try_generate_briefing(&self, text: &str) -> Result<AudioBuffer, GenerationFailure> {
        debug!(text_len = text.len(), %self.model, %self.voice, "try_generate_briefing: called");
        let context = BriefingContext { text: text.to_string() };
        let prompt = self.prompts.render("briefing", &context).map_err(|e| {
            debug!(error = %e, "try_generate_briefing: prompt render failed");
            GenerationFailure::NotAvailable
        })?;

        let request =
            GenerateRequest::new(&self.model, prompt).with_generation_config(GenerationConfig::speech(&self.voice));
        let response = self.genai.generate(request).await?;

        let inline = response.leading_inline_data().ok_or(GenerationFailure::NotAvailable)?;
        if inline.data.trim().is_empty() {
            debug!(mime_type = %inline.mime_type, "try_generate_briefing: empty audio payload");
            return Err(GenerationFailure::NotAvailable);
        }
        decode_speech(&inline.data).map_err(|e| {
            debug!(error = %e, "try_generate_briefing: payload is not base64");
            GenerationFailure::NotAvailable
        })
    }

    /// Synthesize a briefing; `None` on any failure or when no audio came back
    pub async fn generate_briefing(&self, text: &str) -> Option<AudioBuffer> {
        match self.try_generate_briefing(text).await {
            Ok(buffer) => {
                debug!(frames = buffer.frame_count(), "generate_briefing: audio received");
                Some(buffer)
            }
            Err(failure) => {
                debug!(%failure, retryable = failure.is_retryable(), "generate_briefing: no audio");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::client::mock::MockGenAiClient;
    use crate::genai::{GenAiError, GenerateResponse, Modality, Part};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    fn briefing(mock: MockGenAiClient) -> (BriefingClient, Arc<MockGenAiClient>) {
        let mock = Arc::new(mock);
        (
            BriefingClient::new(mock.clone(), "gemini-2.5-flash-preview-tts", "Charon"),
            mock,
        )
    }

    fn pcm_part(samples: &[i16]) -> Part {
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        Part::inline("audio/L16;codec=pcm;rate=24000", STANDARD.encode(bytes))
    }

    #[tokio::test]
    async fn test_audio_is_decoded() {
        let response = GenerateResponse::from_parts(vec![pcm_part(&[0, 16384, -32768])]);
        let (client, mock) = briefing(MockGenAiClient::new(vec![Ok(response)]));

        let buffer = client.generate_briefing("Hold the ridge").await.unwrap();

        assert_eq!(buffer.sample_rate(), 24_000);
        assert_eq!(buffer.channel_count(), 1);
        assert_eq!(buffer.channel(0).unwrap(), &[0.0, 0.5, -1.0]);

        let request = &mock.requests()[0];
        assert_eq!(request.model, "gemini-2.5-flash-preview-tts");
        assert_eq!(
            request.contents[0].parts[0].text.as_deref(),
            Some("Commander, tactical update: Hold the ridge")
        );
        let config = request.generation_config.as_ref().unwrap();
        assert_eq!(config.response_modalities, vec![Modality::Audio]);
        assert_eq!(
            config.speech_config.as_ref().unwrap().voice_config.prebuilt_voice_config.voice_name,
            "Charon"
        );
    }

    #[tokio::test]
    async fn test_audio_after_text_part_is_ignored() {
        let response = GenerateResponse::from_parts(vec![Part::text("Here you go"), pcm_part(&[1, 2, 3])]);
        let (client, _) = briefing(MockGenAiClient::new(vec![Ok(response)]));

        let failure = client.try_generate_briefing("x").await.unwrap_err();
        assert!(matches!(failure, GenerationFailure::NotAvailable));
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_not_available() {
        let response = GenerateResponse::from_parts(vec![Part::inline("audio/pcm", "%%%")]);
        let (client, _) = briefing(MockGenAiClient::new(vec![Ok(response)]));

        assert!(client.generate_briefing("x").await.is_none());
    }

    #[tokio::test]
    async fn test_call_failure_is_swallowed() {
        let (client, _) = briefing(MockGenAiClient::failing(GenAiError::RateLimited {
            retry_after: std::time::Duration::from_secs(5),
            message: "RESOURCE_EXHAUSTED".to_string(),
        }));

        let failure = client.try_generate_briefing("x").await.unwrap_err();
        assert!(matches!(failure, GenerationFailure::Failed(ref e) if e.is_quota_exhausted()));
    }

    #[tokio::test]
    async fn test_empty_reply_is_none() {
        let (client, _) = briefing(MockGenAiClient::new(vec![Ok(GenerateResponse::default())]));
        assert!(client.generate_briefing("x").await.is_none());
    }

    #[tokio::test]
    async fn test_empty_payload_is_not_available() {
        let response = GenerateResponse::from_parts(vec![Part::inline("audio/pcm", "")]);
        let (client, _) = briefing(MockGenAiClient::new(vec![Ok(response.clone()), Ok(response)]));

        assert!(client.generate_briefing("x").await.is_none());
        let failure = client.try_generate_briefing("x").await.unwrap_err();
        assert!(matches!(failure, GenerationFailure::NotAvailable));
    }

    #[tokio::test]
    async fn test_inline_part_without_data_is_none() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "audio/pcm"}}]}}]
        }))
        .unwrap();
        let (client, _) = briefing(MockGenAiClient::new(vec![Ok(response)]));

        assert!(client.generate_briefing("x").await.is_none());
    }
}
