//! Spoken briefings: synthesis, PCM decoding and playback

mod client;
pub mod pcm;
mod playback;

pub use client::BriefingClient;
pub use pcm::{AudioBuffer, SPEECH_CHANNELS, SPEECH_SAMPLE_RATE, decode_pcm16, decode_speech};
pub use playback::{AudioSink, BriefingPlayer, ClockSink, OnComplete};
