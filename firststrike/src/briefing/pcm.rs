//! PCM decoding for synthesized speech
//!
//! Speech arrives as base64 of raw little-endian signed 16-bit mono PCM at
//! 24 kHz. Decoding normalizes each sample to `sample / 32768.0`, which is
//! exact in f32.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

/// Sample rate of synthesized speech
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;

/// Channel count of synthesized speech
pub const SPEECH_CHANNELS: usize = 1;

/// Divisor mapping i16 samples onto [-1.0, 1.0)
const I16_SCALE: f32 = 32768.0;

/// Channel-separated floating-point audio ready for playback
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Create a buffer of silence
    pub fn silent(sample_rate: u32, channel_count: usize, frame_count: usize) -> Self {
        Self {
            sample_rate,
            channels: vec![vec![0.0; frame_count]; channel_count],
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel
    pub fn frame_count(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Playback length at the buffer's sample rate
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }
}

/// Decode interleaved little-endian i16 PCM into a channel-separated buffer
///
/// A trailing odd byte is ignored, as is a trailing partial frame.
pub fn decode_pcm16(bytes: &[u8], sample_rate: u32, channel_count: usize) -> AudioBuffer {
    debug!(byte_len = bytes.len(), sample_rate, channel_count, "decode_pcm16: called");
    let channel_count = channel_count.max(1);
    let samples: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let frame_count = samples.len() / channel_count;

    let channels = (0..channel_count)
        .map(|channel| {
            (0..frame_count)
                .map(|frame| samples[frame * channel_count + channel] as f32 / I16_SCALE)
                .collect()
        })
        .collect();

    AudioBuffer { sample_rate, channels }
}

/// Decode a base64 speech payload at the fixed speech format
pub fn decode_speech(payload: &str) -> Result<AudioBuffer, base64::DecodeError> {
    debug!(payload_len = payload.len(), "decode_speech: called");
    let bytes = STANDARD.decode(payload)?;
    Ok(decode_pcm16(&bytes, SPEECH_SAMPLE_RATE, SPEECH_CHANNELS))
}
