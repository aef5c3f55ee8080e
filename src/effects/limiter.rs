//! Peak limiter.
//!
//! Zero-latency, channel-linked gain computer:
//!
//! * target gain per frame = `min(1, ceiling / peak)` where `peak` is the
//!   largest absolute sample across channels;
//! * attack is instant (gain drops to the target on the same frame);
//! * release is a one-pole glide back toward the target.
//!
//! Because attack is instant, no output sample ever exceeds the ceiling, and a
//! signal that never crosses the ceiling is passed through bit-exact.

/// Convert decibels to a linear amplitude factor.
pub fn db_to_linear(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Channel-linked peak limiter.
#[derive(Debug, Clone)]
pub struct PeakLimiter {
    ceiling: f32,
    release_coeff: f32,
    gain: f32,
}

impl PeakLimiter {
    /// `ceiling_db` is clamped to `[-24, 0]`; `release_ms` to at least 1 ms.
    pub fn new(ceiling_db: f32, release_ms: f32, sample_rate: u32) -> Self {
        let ceiling = db_to_linear(ceiling_db.clamp(-24.0, 0.0));
        let release_samples = (release_ms.max(1.0) / 1000.0) * sample_rate.max(1) as f32;
        Self {
            ceiling,
            release_coeff: (-1.0 / release_samples).exp(),
            gain: 1.0,
        }
    }

    /// Linear ceiling.
    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }

    /// Current gain reduction factor (1.0 = none).
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Limit planar `channels` in place.  All channels must be the same
    /// length; frames past the shortest channel are left untouched.
    pub fn process(&mut self, channels: &mut [Vec<f32>]) {
        let frames = channels.iter().map(Vec::len).min().unwrap_or(0);

        for i in 0..frames {
            let peak = channels
                .iter()
                .fold(0.0_f32, |acc, ch| acc.max(ch[i].abs()));

            let target = if peak > self.ceiling {
                self.ceiling / peak
            } else {
                1.0
            };

            if target < self.gain {
                self.gain = target;
            } else {
                self.gain = target + (self.gain - target) * self.release_coeff;
            }

            if self.gain < 1.0 {
                for ch in channels.iter_mut() {
                    ch[i] *= self.gain;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_conversion() {
        assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_linear(-6.0) - 0.501).abs() < 1e-3);
    }

    #[test]
    fn quiet_signal_passes_bit_exact() {
        let input: Vec<f32> = (0..1_000).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let mut channels = vec![input.clone()];
        PeakLimiter::new(-1.0, 50.0, 22_050).process(&mut channels);
        assert_eq!(channels[0], input);
    }

    #[test]
    fn loud_signal_never_exceeds_ceiling() {
        let mut limiter = PeakLimiter::new(-1.0, 50.0, 22_050);
        let ceiling = limiter.ceiling();
        let mut channels = vec![
            (0..5_000).map(|i| (i as f32 * 0.07).sin() * 1.8).collect::<Vec<f32>>(),
            (0..5_000).map(|i| (i as f32 * 0.11).cos() * 0.9).collect::<Vec<f32>>(),
        ];
        limiter.process(&mut channels);

        for ch in &channels {
            for &s in ch {
                assert!(s.abs() <= ceiling + 1e-6, "{s} > {ceiling}");
            }
        }
        assert!(limiter.gain() < 1.0);
    }

    #[test]
    fn gain_recovers_after_transient() {
        let mut limiter = PeakLimiter::new(-1.0, 10.0, 8_000);
        let mut signal = vec![0.0_f32; 8_000];
        signal[0] = 1.0;
        for s in signal.iter_mut().skip(1) {
            *s = 0.1;
        }
        let mut channels = vec![signal];
        limiter.process(&mut channels);

        // 10 ms release at 8 kHz = 80 samples; one second later the gain is
        // fully recovered.
        assert!((channels[0][7_999] - 0.1).abs() < 1e-4);
    }
}
