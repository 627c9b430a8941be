//! Briefing playback - a single playback slot
//!
//! At most one briefing plays at a time. Starting a new one stops the
//! former; stopping and natural completion converge on the same idle state.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::pcm::AudioBuffer;

/// Invoked once when a briefing plays to the end
pub type OnComplete = Box<dyn FnOnce() + Send + 'static>;

/// Output device a briefing is rendered to
///
/// `render` resolves when the buffer has finished playing. The player
/// cancels a render by dropping its future.
#[async_trait]
pub trait AudioSink: Send + Sync {
    async fn render(&self, buffer: Arc<AudioBuffer>);
}

/// Sink that "plays" by waiting out the buffer's duration
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockSink;

#[async_trait]
impl AudioSink for ClockSink {
    async fn render(&self, buffer: Arc<AudioBuffer>) {
        debug!(duration = ?buffer.duration(), "ClockSink::render: called");
        tokio::time::sleep(buffer.duration()).await;
    }
}

/// The render currently occupying the slot
struct Playback {
    id: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Slot {
    current: Option<Playback>,
    next_id: u64,
}

/// Drives one briefing at a time through an [`AudioSink`]
pub struct BriefingPlayer {
    sink: Arc<dyn AudioSink>,
    slot: Arc<Mutex<Slot>>,
    speaking: Arc<watch::Sender<bool>>,
}

impl BriefingPlayer {
    pub fn new(sink: Arc<dyn AudioSink>) -> Self {
        let (speaking, _) = watch::channel(false);
        Self {
            sink,
            slot: Arc::new(Mutex::new(Slot::default())),
            speaking: Arc::new(speaking),
        }
    }

    /// Whether a briefing is currently playing
    pub fn is_speaking(&self) -> bool {
        *self.speaking.borrow()
    }

    /// Observe speaking state changes
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.speaking.subscribe()
    }

    /// Play a buffer, stopping whatever was playing first
    ///
    /// Must be called from within a tokio runtime. `on_complete` runs only
    /// if the buffer plays to the end.
    pub fn start(&self, buffer: AudioBuffer, on_complete: OnComplete) {
        debug!(frames = buffer.frame_count(), duration = ?buffer.duration(), "start: called");
        let mut slot = lock(&self.slot);
        if let Some(previous) = slot.current.take() {
            debug!(id = previous.id, "start: stopping previous briefing");
            previous.handle.abort();
        }

        slot.next_id += 1;
        let id = slot.next_id;
        self.speaking.send_replace(true);

        let sink = self.sink.clone();
        let slot_ref = self.slot.clone();
        let speaking = self.speaking.clone();
        let buffer = Arc::new(buffer);

        let handle = tokio::spawn(async move {
            sink.render(buffer).await;

            // A stop or restart that won the lock has already claimed the slot
            {
                let mut slot = lock(&slot_ref);
                if slot.current.as_ref().map(|playback| playback.id) != Some(id) {
                    debug!(id, "start: playback superseded, skipping completion");
                    return;
                }
                slot.current = None;
                speaking.send_replace(false);
            }

            info!(id, "Briefing complete");
            on_complete();
        });

        slot.current = Some(Playback { id, handle });
    }

    /// Halt playback immediately; a no-op when idle
    pub fn stop(&self) {
        debug!("stop: called");
        let mut slot = lock(&self.slot);
        if let Some(playback) = slot.current.take() {
            debug!(id = playback.id, "stop: aborting briefing");
            playback.handle.abort();
            info!("Briefing stopped");
        }
        self.speaking.send_replace(false);
    }
}

impl Drop for BriefingPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(slot: &Mutex<Slot>) -> std::sync::MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
