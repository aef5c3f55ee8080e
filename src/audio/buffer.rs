//! Planar floating-point audio buffer.
//!
//! [`AudioBuffer`] is the in-memory form that flows between the WAV codec,
//! the effects graph and the batch processor.  Samples are stored **planar**
//! (one `Vec<f32>` per channel) with nominal range `[-1.0, 1.0]`.
//!
//! # Example
//!
//! ```rust
//! use voice_dataset_studio::audio::AudioBuffer;
//!
//! // L R L R
//! let buf = AudioBuffer::from_interleaved(&[0.1, -0.1, 0.2, -0.2], 2, 22_050);
//! assert_eq!(buf.channel_count(), 2);
//! assert_eq!(buf.frames(), 2);
//! assert_eq!(buf.channel(1), &[-0.1, -0.2]);
//! assert_eq!(buf.to_interleaved(), vec![0.1, -0.1, 0.2, -0.2]);
//! ```

// ---------------------------------------------------------------------------
// AudioBuffer
// ---------------------------------------------------------------------------

/// A decoded block of audio: `channels` buffers of equal length plus the
/// sample rate they were captured at.
///
/// Constructors do not reject mismatched channel lengths; consumers that care
/// (the effects graph) check [`is_consistent`](Self::is_consistent).
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Wrap planar channel data.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
        }
    }

    /// Convenience constructor for a single channel.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(vec![samples], sample_rate)
    }

    /// `channel_count` channels of `frames` zero samples.
    pub fn silent(channel_count: usize, frames: usize, sample_rate: u32) -> Self {
        Self::new(vec![vec![0.0; frames]; channel_count], sample_rate)
    }

    /// De-interleave `samples` (`L R L R …`) into planar storage.
    ///
    /// A trailing partial frame is dropped.  `channel_count == 0` yields an
    /// empty buffer.
    pub fn from_interleaved(samples: &[f32], channel_count: usize, sample_rate: u32) -> Self {
        if channel_count == 0 {
            return Self::new(Vec::new(), sample_rate);
        }

        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (ch, &s) in channels.iter_mut().zip(frame) {
                ch.push(s);
            }
        }
        Self::new(channels, sample_rate)
    }

    /// Interleave all channels sample-by-sample.
    ///
    /// Channels shorter than the longest one are padded with silence.
    pub fn to_interleaved(&self) -> Vec<f32> {
        let frames = self.frames();
        let n = self.channels.len();
        let mut out = Vec::with_capacity(frames * n);
        for i in 0..frames {
            for ch in &self.channels {
                out.push(ch.get(i).copied().unwrap_or(0.0));
            }
        }
        out
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Length in sample frames (the longest channel).
    pub fn frames(&self) -> usize {
        self.channels.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Duration in seconds, `0.0` when the sample rate is zero.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// `true` when the buffer holds no samples at all.
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// `true` when every channel has the same length.
    pub fn is_consistent(&self) -> bool {
        match self.channels.first() {
            Some(first) => self.channels.iter().all(|c| c.len() == first.len()),
            None => true,
        }
    }

    /// Borrow one channel.
    ///
    /// # Panics
    ///
    /// Panics if `index >= channel_count()`.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// Borrow all channels.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Absolute peak across all channels.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flat_map(|c| c.iter())
            .fold(0.0_f32, |acc, &s| acc.max(s.abs()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleave_roundtrip_stereo() {
        let interleaved = vec![0.1_f32, 0.2, 0.3, 0.4, 0.5, 0.6];
        let buf = AudioBuffer::from_interleaved(&interleaved, 2, 44_100);
        assert_eq!(buf.channel(0), &[0.1, 0.3, 0.5]);
        assert_eq!(buf.channel(1), &[0.2, 0.4, 0.6]);
        assert_eq!(buf.to_interleaved(), interleaved);
    }

    #[test]
    fn trailing_partial_frame_is_dropped() {
        let buf = AudioBuffer::from_interleaved(&[1.0, 2.0, 3.0], 2, 8_000);
        assert_eq!(buf.frames(), 1);
    }

    #[test]
    fn zero_channels_is_empty() {
        let buf = AudioBuffer::from_interleaved(&[1.0, 2.0], 0, 8_000);
        assert_eq!(buf.channel_count(), 0);
        assert!(buf.is_empty());
        assert!(buf.is_consistent());
    }

    #[test]
    fn duration_from_frames_and_rate() {
        let buf = AudioBuffer::silent(1, 22_050, 22_050);
        assert!((buf.duration_secs() - 1.0).abs() < 1e-9);
        assert!((AudioBuffer::silent(1, 10, 0).duration_secs()).abs() < f64::EPSILON);
    }

    #[test]
    fn inconsistent_lengths_are_detected() {
        let buf = AudioBuffer::new(vec![vec![0.0; 4], vec![0.0; 3]], 16_000);
        assert!(!buf.is_consistent());
        assert_eq!(buf.frames(), 4);
        // Short channel is padded when interleaving.
        assert_eq!(buf.to_interleaved().len(), 8);
    }

    #[test]
    fn peak_is_absolute() {
        let buf = AudioBuffer::new(vec![vec![0.2, -0.7], vec![0.5, 0.1]], 16_000);
        assert!((buf.peak() - 0.7).abs() < 1e-6);
    }
}
