//! Plan client - grounded command plan synthesis
//!
//! One call per plan. The client never fails outward: malformed replies and
//! call failures both degrade to a renderable fallback plan, and quota
//! exhaustion is tagged so the operator can switch credentials.

use std::sync::Arc;

use eyre::Result;
use tracing::{debug, error, info, warn};

use super::extract::Extraction;
use crate::domain::{CommandPlan, Incident, LatLng, Resource};
use crate::genai::{GenAiClient, GenAiError, GenerateRequest, Tool};
use crate::prompts::{PlanContext, PromptLoader};

/// Synthesizes command plans through a GenAI model with search grounding
pub struct PlanClient {
    genai: Arc<dyn GenAiClient>,
    prompts: Arc<PromptLoader>,
    model: String,
}

impl PlanClient {
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

    /// Build the grounded plan request
    ///
    /// Enables web and maps search; a known location becomes retrieval
    /// context so results lean toward the caller's locale.
    pub fn build_request(
        &self,
        incidents: &[Incident],
        resources: &[Resource],
        location: Option<LatLng>,
    ) -> Result<GenerateRequest> {
        debug!(%self.model, "build_request: called");
        let context = PlanContext::new(incidents, resources, location)?;
        let prompt = self.prompts.render("plan", &context)?;
        let system = self.prompts.system_instruction()?;

        Ok(GenerateRequest::new(&self.model, prompt)
            .with_system_instruction(system)
            .with_tools(vec![Tool::GoogleSearch {}, Tool::GoogleMaps {}])
            .with_location(location))
    }

    /// Generate a command plan for the board
    ///
    /// Always returns a plan. Grounding citations are attached whether or
    /// not the reply decoded.
    pub async fn generate_plan(
        &self,
        incidents: &[Incident],
        resources: &[Resource],
        location: Option<LatLng>,
    ) -> CommandPlan {
        debug!(
            incident_count = incidents.len(),
            resource_count = resources.len(),
            ?location,
            "generate_plan: called"
        );

        let request = match self.build_request(incidents, resources, location) {
            Ok(request) => request,
            Err(e) => {
                error!(error = %e, "generate_plan: failed to build request");
                return CommandPlan::link_disrupted();
            }
        };

        match self.genai.generate(request).await {
            Ok(response) => {
                let text = response.text();
                let extraction = Extraction::run(&text);
                if extraction == Extraction::Unparseable {
                    warn!(text_len = text.len(), "generate_plan: reply held no plan, using fallback");
                }
                let plan = extraction.into_plan(&text).with_grounding(response.grounding());
                info!(
                    allocations = plan.allocations.len(),
                    citations = plan.citations().len(),
                    "Command plan synthesized"
                );
                plan
            }
            Err(e) => plan_for_failure(&e),
        }
    }
}

/// Map a call failure to the plan the operator sees
pub fn plan_for_failure(err: &GenAiError) -> CommandPlan {
    error!(error = %err, "Plan generation failed");
    if err.is_quota_exhausted() {
        debug!("plan_for_failure: quota signature matched");
        CommandPlan::quota_exhausted()
    } else {
        CommandPlan::link_disrupted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GroundingChunk, LINK_DISRUPTED_SUMMARY, PlanErrorKind, QUOTA_OFFLINE_SUMMARY, Scenario};
    use crate::genai::GenerateResponse;
    use crate::genai::client::mock::MockGenAiClient;
    use std::time::Duration;

    fn client(mock: MockGenAiClient) -> (PlanClient, Arc<MockGenAiClient>) {
        let mock = Arc::new(mock);
        (PlanClient::new(mock.clone(), "gemini-2.5-flash"), mock)
    }

    #[tokio::test]
    async fn test_well_formed_reply() {
        let (plan_client, mock) = client(MockGenAiClient::replying(
            r#"{"summary":"Contain","nextSteps":["a"],"allocations":[],"risks":["b"]}"#,
        ));
        let scenario = Scenario::demo();

        let plan = plan_client
            .generate_plan(&scenario.incidents, &scenario.resources, None)
            .await;

        assert_eq!(plan.summary, "Contain");
        assert_eq!(plan.next_steps, vec!["a"]);
        assert_eq!(plan.risks, vec!["b"]);
        assert!(plan.error.is_none());
        assert!(plan.grounding.is_none());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_request_shape() {
        let (plan_client, mock) = client(MockGenAiClient::replying("{}"));
        let scenario = Scenario::demo();
        let location = LatLng::new(34.0, -118.0);

        plan_client
            .generate_plan(&scenario.incidents, &scenario.resources, Some(location))
            .await;

        let request = &mock.requests()[0];
        assert_eq!(request.model, "gemini-2.5-flash");
        assert_eq!(request.tools, vec![Tool::GoogleSearch {}, Tool::GoogleMaps {}]);
        assert_eq!(request.tool_config.as_ref().unwrap().retrieval_config.lat_lng, location);

        let prompt = request.contents[0].parts[0].text.as_deref().unwrap();
        assert!(prompt.contains("INC-001"));
        assert!(prompt.contains("UNIT-D1"));
        assert!(prompt.contains(r#"USER LOCATION: {"latitude":34.0,"longitude":-118.0}"#));

        let system = request.system_instruction.as_ref().unwrap().parts[0].text.as_deref().unwrap();
        assert!(system.contains("Multi-Agent Orchestrator"));
    }

    #[tokio::test]
    async fn test_no_location_means_no_tool_config() {
        let (plan_client, mock) = client(MockGenAiClient::replying("{}"));
        plan_client.generate_plan(&[], &[], None).await;
        assert!(mock.requests()[0].tool_config.is_none());
    }

    #[tokio::test]
    async fn test_grounding_attached_to_fallback() {
        let response = GenerateResponse::from_text("I could not format this as JSON, sorry.")
            .with_grounding(vec![GroundingChunk::maps("County Hospital", "https://maps.example/1")]);
        let (plan_client, _) = client(MockGenAiClient::new(vec![Ok(response)]));

        let plan = plan_client.generate_plan(&[], &[], None).await;

        assert_eq!(plan.summary, "I could not format this as JSON, sorry.");
        assert_eq!(plan.citations().len(), 1);
        assert_eq!(plan.citations()[0].title(), "County Hospital");
    }

    #[tokio::test]
    async fn test_quota_failure_is_tagged() {
        let (plan_client, _) = client(MockGenAiClient::failing(GenAiError::RateLimited {
            retry_after: Duration::from_secs(30),
            message: "RESOURCE_EXHAUSTED".to_string(),
        }));

        let plan = plan_client.generate_plan(&[], &[], None).await;

        assert_eq!(plan.summary, QUOTA_OFFLINE_SUMMARY);
        assert_eq!(plan.error, Some(PlanErrorKind::QuotaLimit));
    }

    #[tokio::test]
    async fn test_generic_failure_is_untagged() {
        let (plan_client, _) = client(MockGenAiClient::failing(GenAiError::ApiError {
            status: 500,
            message: "INTERNAL".to_string(),
        }));

        let plan = plan_client.generate_plan(&[], &[], None).await;

        assert_eq!(plan.summary, LINK_DISRUPTED_SUMMARY);
        assert!(plan.error.is_none());
        assert_eq!(plan.risks, vec!["Automatic synthesis degraded"]);
    }

    #[test]
    fn test_plan_for_failure_message_signatures() {
        let plan = plan_for_failure(&GenAiError::InvalidResponse("429 RESOURCE_EXHAUSTED".to_string()));
        assert!(plan.is_quota_limited());

        let plan = plan_for_failure(&GenAiError::InvalidResponse("socket hang up".to_string()));
        assert!(!plan.is_quota_limited());
    }
}
