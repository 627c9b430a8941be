//! Command session - the operator's view of one scenario
//!
//! Holds the board (incidents and resources), the operator's position and
//! the latest command plan, and routes operator actions to the plan, recon
//! and briefing clients. Overlapping plan refreshes are not coordinated:
//! whichever resolves last is the plan on the board.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eyre::{Result, eyre};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::briefing::{AudioSink, BriefingClient, BriefingPlayer, ClockSink};
use crate::capability::{KeySelector, LocationProvider, NoLocation, acquire_location};
use crate::config::GenAiConfig;
use crate::domain::{CommandPlan, LatLng, Scenario};
use crate::genai::GenAiClient;
use crate::plan::PlanClient;
use crate::prompts::PromptLoader;
use crate::recon::{ReconClient, ReconImage};

/// Outcome of pressing the briefing control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BriefingToggle {
    /// A briefing was playing and has been stopped
    Stopped,
    /// Synthesis succeeded and playback began
    Started,
    /// No plan summary to brief from
    NothingToBrief,
    /// Synthesis produced no audio
    Unavailable,
}

/// Live state for one scenario
pub struct CommandSession {
    scenario: Scenario,
    plans: PlanClient,
    recon: ReconClient,
    briefings: BriefingClient,
    player: BriefingPlayer,
    keys: Arc<dyn KeySelector>,
    locator: Arc<dyn LocationProvider>,
    location: RwLock<Option<LatLng>>,
    plan: RwLock<Option<CommandPlan>>,
    selected: RwLock<Option<(String, Option<ReconImage>)>>,
    key_selected: AtomicBool,
}

impl CommandSession {
    /// Create a session with clients built from provider configuration
    pub fn new(
        scenario: Scenario,
        genai: Arc<dyn GenAiClient>,
        config: &GenAiConfig,
        prompts: Arc<PromptLoader>,
        keys: Arc<dyn KeySelector>,
    ) -> Self {
        debug!(
            incidents = scenario.incidents.len(),
            resources = scenario.resources.len(),
            "CommandSession::new: called"
        );
        Self {
            scenario,
            plans: PlanClient::new(genai.clone(), &config.plan_model).with_prompts(prompts.clone()),
            recon: ReconClient::new(genai.clone(), &config.image_model).with_prompts(prompts.clone()),
            briefings: BriefingClient::new(genai, &config.speech_model, &config.voice).with_prompts(prompts),
            player: BriefingPlayer::new(Arc::new(ClockSink)),
            keys,
            locator: Arc::new(NoLocation),
            location: RwLock::new(None),
            plan: RwLock::new(None),
            selected: RwLock::new(None),
            key_selected: AtomicBool::new(false),
        }
    }

    pub fn with_location_provider(mut self, locator: Arc<dyn LocationProvider>) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_audio_sink(mut self, sink: Arc<dyn AudioSink>) -> Self {
        self.player = BriefingPlayer::new(sink);
        self
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn player(&self) -> &BriefingPlayer {
        &self.player
    }

    pub async fn location(&self) -> Option<LatLng> {
        *self.location.read().await
    }

    pub async fn plan(&self) -> Option<CommandPlan> {
        self.plan.read().await.clone()
    }

    /// Incident currently selected and its recon image, if one came back
    pub async fn selected(&self) -> Option<(String, Option<ReconImage>)> {
        self.selected.read().await.clone()
    }

    /// Whether the key selector last reported a selected key
    pub fn has_selected_key(&self) -> bool {
        self.key_selected.load(Ordering::SeqCst)
    }

    /// Bring the board up
    ///
    /// A plan is requested immediately while the position is acquired; once
    /// a position arrives the plan is requested again with it. Both requests
    /// are in flight together and the last to resolve wins.
    pub async fn boot(&self) {
        debug!("boot: called");
        let initial = async {
            self.refresh_key_status().await;
            self.refresh_plan().await;
        };
        let located = async {
            if self.acquire_location().await.is_some() {
                self.refresh_plan().await;
            }
        };
        futures::join!(initial, located);
    }

    /// One-shot position request; failure leaves the session unlocated
    pub async fn acquire_location(&self) -> Option<LatLng> {
        debug!("acquire_location: called");
        let location = acquire_location(self.locator.as_ref()).await;
        if location.is_some() {
            *self.location.write().await = location;
        }
        location
    }

    /// Re-check whether the operator has a key selected
    pub async fn refresh_key_status(&self) -> bool {
        let selected = self.keys.has_selected_key().await;
        debug!(selected, "refresh_key_status: called");
        self.key_selected.store(selected, Ordering::SeqCst);
        selected
    }

    /// Generate a plan for the current board and put it up
    pub async fn refresh_plan(&self) -> CommandPlan {
        let location = self.location().await;
        debug!(?location, "refresh_plan: called");
        let plan = self
            .plans
            .generate_plan(&self.scenario.incidents, &self.scenario.resources, location)
            .await;

        *self.plan.write().await = Some(plan.clone());
        self.refresh_key_status().await;
        plan
    }

    /// Ask the host for different credentials and re-check key status
    pub async fn request_key_selection(&self) -> bool {
        debug!("request_key_selection: called");
        self.keys.request_key_selection().await;
        self.refresh_key_status().await
    }

    /// Select an incident and fetch its recon image
    ///
    /// Any previous image is cleared as soon as the selection changes.
    pub async fn select_incident(&self, incident_id: &str) -> Result<Option<ReconImage>> {
        debug!(%incident_id, "select_incident: called");
        let incident = self
            .scenario
            .incident(incident_id)
            .ok_or_else(|| eyre!("Unknown incident: {}", incident_id))?;

        *self.selected.write().await = Some((incident.id.clone(), None));
        let image = self.recon.generate_image(incident).await;

        let mut selected = self.selected.write().await;
        if let Some((id, slot)) = selected.as_mut()
            && *id == incident.id
        {
            *slot = image.clone();
        }
        Ok(image)
    }

    /// Press the briefing control
    ///
    /// Stops a playing briefing; otherwise speaks the current plan summary.
    pub async fn toggle_briefing(&self) -> BriefingToggle {
        debug!(speaking = self.player.is_speaking(), "toggle_briefing: called");
        if self.player.is_speaking() {
            self.player.stop();
            return BriefingToggle::Stopped;
        }

        let summary = match self.plan.read().await.as_ref() {
            Some(plan) if !plan.summary.is_empty() => plan.summary.clone(),
            _ => return BriefingToggle::NothingToBrief,
        };

        self.speak(&summary).await
    }

    /// Synthesize and play arbitrary text, replacing any current briefing
    pub async fn speak(&self, text: &str) -> BriefingToggle {
        debug!(text_len = text.len(), "speak: called");
        match self.briefings.generate_briefing(text).await {
            Some(buffer) => {
                info!(duration = ?buffer.duration(), "Briefing started");
                self.player.start(buffer, Box::new(|| debug!("speak: playback ended")));
                BriefingToggle::Started
            }
            None => BriefingToggle::Unavailable,
        }
    }
}
