//! Offline render of the effects chain.
//!
//! ```text
//! source ─▶ PitchShifter ─▶ Eq3 ─▶ PeakLimiter ─▶ output
//!  (zero-padded to frames + tail)
//! ```
//!
//! Rendering is a single pass over a fixed window of
//! `source frames + round(tail_secs · rate)` frames, so pitch-shift and
//! limiter tails are not truncated.  The chain is pure: the same buffer and
//! profile always render to the same samples.

use thiserror::Error;

use crate::audio::AudioBuffer;
use crate::config::EffectsConfig;

use super::eq::{Eq3, Eq3Crossovers};
use super::limiter::PeakLimiter;
use super::pitch::PitchShifter;
use super::profile::{ProfileError, SoundProfile};

// ---------------------------------------------------------------------------
// RenderError
// ---------------------------------------------------------------------------

/// Reasons the effects chain refuses to render a buffer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("source buffer has no channels")]
    NoChannels,

    #[error("source sample rate is zero")]
    InvalidSampleRate,

    #[error("source channels have different lengths")]
    ChannelLengthMismatch,

    #[error("invalid sound profile: {0}")]
    InvalidProfile(#[from] ProfileError),
}

// ---------------------------------------------------------------------------
// EffectsGraph
// ---------------------------------------------------------------------------

/// Pitch → EQ3 → limiter, rendered offline.
#[derive(Debug, Clone)]
pub struct EffectsGraph {
    tail_secs: f32,
    pitch_window_secs: f32,
    limiter_ceiling_db: f32,
    limiter_release_ms: f32,
    crossovers: Eq3Crossovers,
}

impl Default for EffectsGraph {
    fn default() -> Self {
        Self::from_config(&EffectsConfig::default())
    }
}

impl EffectsGraph {
    /// Build the graph from the `[effects]` settings section.
    pub fn from_config(config: &EffectsConfig) -> Self {
        Self {
            tail_secs: config.tail_secs.max(0.0),
            pitch_window_secs: config.pitch_window_secs,
            limiter_ceiling_db: config.limiter_ceiling_db,
            limiter_release_ms: config.limiter_release_ms,
            crossovers: Eq3Crossovers {
                low_hz: config.eq_low_hz,
                mid_hz: config.eq_mid_hz,
                mid_q: config.eq_mid_q,
                high_hz: config.eq_high_hz,
            },
        }
    }

    /// Length of the render window for a source of `source_frames`.
    pub fn render_frames(&self, source_frames: usize, sample_rate: u32) -> usize {
        source_frames + (self.tail_secs as f64 * sample_rate as f64).round() as usize
    }

    /// Render `source` through the chain configured by `profile`.
    ///
    /// # Errors
    ///
    /// See [`RenderError`].  An empty (zero-frame) source is valid and
    /// renders to silence of tail length.
    ///
    /// # Example
    ///
    /// ```rust
    /// use voice_dataset_studio::audio::AudioBuffer;
    /// use voice_dataset_studio::effects::{EffectsGraph, SoundProfile};
    ///
    /// let source = AudioBuffer::mono(vec![0.25; 22_050], 22_050);
    /// let out = EffectsGraph::default()
    ///     .render(&source, &SoundProfile::identity())
    ///     .unwrap();
    ///
    /// // 1 s of source + 0.1 s tail
    /// assert_eq!(out.frames(), 22_050 + 2_205);
    /// assert_eq!(&out.channel(0)[..22_050], source.channel(0));
    /// ```
    pub fn render(
        &self,
        source: &AudioBuffer,
        profile: &SoundProfile,
    ) -> Result<AudioBuffer, RenderError> {
        if source.channel_count() == 0 {
            return Err(RenderError::NoChannels);
        }
        if source.sample_rate() == 0 {
            return Err(RenderError::InvalidSampleRate);
        }
        if !source.is_consistent() {
            return Err(RenderError::ChannelLengthMismatch);
        }
        profile.validate()?;

        let rate = source.sample_rate();
        let frames = self.render_frames(source.frames(), rate);
        let shifter = PitchShifter::new(profile.pitch as f32, rate, self.pitch_window_secs);

        let mut channels: Vec<Vec<f32>> = source
            .channels()
            .iter()
            .map(|ch| {
                let mut padded = Vec::with_capacity(frames);
                padded.extend_from_slice(ch);
                padded.resize(frames, 0.0);

                let mut shifted = shifter.process(&padded);
                Eq3::new(profile.eq, self.crossovers, rate).process(&mut shifted);
                shifted
            })
            .collect();

        PeakLimiter::new(self.limiter_ceiling_db, self.limiter_release_ms, rate)
            .process(&mut channels);

        Ok(AudioBuffer::new(channels, rate))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
