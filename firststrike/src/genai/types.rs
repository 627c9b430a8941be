//! GenAI request/response types
//!
//! These model the `generateContent` wire format. Field names serialize in
//! camelCase; absent optionals are omitted.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Citation, GroundingChunk, LatLng};

/// A generate-content request - everything needed for one model call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Model identifier; travels in the URL, not the body
    #[serde(skip)]
    pub model: String,

    pub contents: Vec<Content>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateRequest {
    /// Create a request with a single user text prompt
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        let model = model.into();
        debug!(%model, "GenerateRequest::new: called");
        Self {
            model,
            contents: vec![Content::user(prompt)],
            system_instruction: None,
            tools: Vec::new(),
            tool_config: None,
            generation_config: None,
        }
    }

    pub fn with_system_instruction(mut self, text: impl Into<String>) -> Self {
        self.system_instruction = Some(Content::text(text));
        self
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = tools;
        self
    }

    /// Bias retrieval tools toward a caller location, when one is known
    pub fn with_location(mut self, location: Option<LatLng>) -> Self {
        self.tool_config = location.map(|lat_lng| ToolConfig {
            retrieval_config: RetrievalConfig { lat_lng },
        });
        self
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

/// A turn of content made of parts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Content without a role, as used for system instructions
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }
}

/// One part of a content turn: text, inline binary data, or both absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
        }
    }
}

/// Base64 payload with its declared media type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

/// Retrieval tools the model may call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Tool {
    GoogleSearch {},
    GoogleMaps {},
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub retrieval_config: RetrievalConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    pub lat_lng: LatLng,
}

/// Output modality requested from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modality {
    Audio,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub response_modalities: Vec<Modality>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

impl GenerationConfig {
    /// Audio-only output spoken by a prebuilt voice
    pub fn speech(voice_name: impl Into<String>) -> Self {
        Self {
            response_modalities: vec![Modality::Audio],
            speech_config: Some(SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: voice_name.into(),
                    },
                },
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

/// Response from a generate-content call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,

    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<WireGroundingChunk>,
}

/// A grounding chunk as sent by the provider: one of `web` or `maps` is set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireGroundingChunk {
    #[serde(default)]
    pub web: Option<Citation>,
    #[serde(default)]
    pub maps: Option<Citation>,
}

impl GenerateResponse {
    /// Create a response whose first candidate carries the given parts
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts,
                }),
                grounding_metadata: None,
                finish_reason: Some("STOP".to_string()),
            }],
        }
    }

    /// Create a text-only response
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_parts(vec![Part::text(text)])
    }

    pub fn with_grounding(mut self, chunks: Vec<GroundingChunk>) -> Self {
        let metadata = GroundingMetadata {
            grounding_chunks: chunks
                .into_iter()
                .map(|chunk| match chunk {
                    GroundingChunk::Web(c) => WireGroundingChunk {
                        web: Some(c),
                        maps: None,
                    },
                    GroundingChunk::Maps(c) => WireGroundingChunk {
                        web: None,
                        maps: Some(c),
                    },
                })
                .collect(),
        };
        if let Some(candidate) = self.candidates.first_mut() {
            candidate.grounding_metadata = Some(metadata);
        }
        self
    }

    /// Parts of the first candidate, empty when there is none
    pub fn parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated text of the first candidate's parts
    pub fn text(&self) -> String {
        debug!(candidate_count = self.candidates.len(), "GenerateResponse::text: called");
        self.parts().iter().filter_map(|p| p.text.as_deref()).collect()
    }

    /// First inline payload anywhere in the first candidate's parts
    pub fn first_inline_data(&self) -> Option<&InlineData> {
        debug!("GenerateResponse::first_inline_data: called");
        self.parts().iter().find_map(|p| p.inline_data.as_ref())
    }

    /// Inline payload of the first part only
    pub fn leading_inline_data(&self) -> Option<&InlineData> {
        debug!("GenerateResponse::leading_inline_data: called");
        self.parts().first().and_then(|p| p.inline_data.as_ref())
    }

    /// Grounding citations of the first candidate, if metadata was attached
    pub fn grounding(&self) -> Option<Vec<GroundingChunk>> {
        debug!("GenerateResponse::grounding: called");
        let metadata = self.candidates.first()?.grounding_metadata.as_ref()?;
        Some(
            metadata
                .grounding_chunks
                .iter()
                .filter_map(|chunk| match (&chunk.web, &chunk.maps) {
                    (Some(web), _) => Some(GroundingChunk::Web(web.clone())),
                    (None, Some(maps)) => Some(GroundingChunk::Maps(maps.clone())),
                    (None, None) => {
                        debug!("GenerateResponse::grounding: skipping chunk without citation");
                        None
                    }
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_with_tools_and_location() {
        let request = GenerateRequest::new("gemini-2.5-flash", "plan please")
            .with_system_instruction("You are the orchestrator")
            .with_tools(vec![Tool::GoogleSearch {}, Tool::GoogleMaps {}])
            .with_location(Some(LatLng::new(34.0, -118.0)));

        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("model").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "plan please");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are the orchestrator");
        assert_eq!(body["tools"], serde_json::json!([{ "googleSearch": {} }, { "googleMaps": {} }]));
        assert_eq!(body["toolConfig"]["retrievalConfig"]["latLng"]["latitude"], 34.0);
        assert_eq!(body["toolConfig"]["retrievalConfig"]["latLng"]["longitude"], -118.0);
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_request_body_without_location_omits_tool_config() {
        let request = GenerateRequest::new("m", "p").with_location(None);
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("toolConfig").is_none());
        assert!(body.get("tools").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_speech_generation_config() {
        let request = GenerateRequest::new("tts", "hello").with_generation_config(GenerationConfig::speech("Charon"));
        let body = serde_json::to_value(&request).unwrap();
        let config = &body["generationConfig"];
        assert_eq!(config["responseModalities"], serde_json::json!(["AUDIO"]));
        assert_eq!(
            config["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Charon"
        );
    }

    #[test]
    fn test_parse_wire_response() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "Here is " }, { "text": "the plan" }]
                },
                "finishReason": "STOP",
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://a.example", "title": "A" } },
                        { "maps": { "uri": "https://maps.example/h", "title": "County Hospital" } },
                        {}
                    ]
                }
            }]
        });
        let response: GenerateResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(response.text(), "Here is the plan");

        let grounding = response.grounding().unwrap();
        assert_eq!(grounding.len(), 2);
        assert_eq!(grounding[0], GroundingChunk::web("A", "https://a.example"));
        assert_eq!(grounding[1], GroundingChunk::maps("County Hospital", "https://maps.example/h"));
    }

    #[test]
    fn test_empty_response_accessors() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.text(), "");
        assert!(response.first_inline_data().is_none());
        assert!(response.leading_inline_data().is_none());
        assert!(response.grounding().is_none());
    }

    #[test]
    fn test_inline_data_lookup() {
        let response = GenerateResponse::from_parts(vec![
            Part::text("caption"),
            Part::inline("image/png", "iVBORw0KGgo="),
        ]);
        assert_eq!(response.first_inline_data().unwrap().mime_type, "image/png");
        // Leading lookup only inspects the first part
        assert!(response.leading_inline_data().is_none());
    }

    #[test]
    fn test_with_grounding_round_trips_through_accessor() {
        let chunks = vec![GroundingChunk::web("A", "https://a.example")];
        let response = GenerateResponse::from_text("x").with_grounding(chunks.clone());
        assert_eq!(response.grounding(), Some(chunks));
    }
}
