//! Delay-line pitch shifter.
//!
//! Two read taps sweep through a short delay window half a window apart.
//! Each tap's delay ramps at a constant slope of `1 - ratio` samples per
//! sample, so it reads the input at `ratio` times real speed; when a tap
//! wraps around the window its weight is zero, and the other tap carries
//! the signal.  Weights are `sin²(π·phase)`, which sum to exactly one across
//! the two taps.
//!
//! ```text
//!   delay
//!    W ┤  /|  /|  /|        tap A
//!      │ / | / | / |
//!    0 ┤/  |/  |/  |
//!      └──────────────▶ time     (pitch down: delay grows)
//! ```
//!
//! The shifter is offline: it sees the whole input at once, so the taps
//! interpolate directly from the source slice.

use std::f64::consts::PI;

/// Offline pitch shifter.
#[derive(Debug, Clone)]
pub struct PitchShifter {
    ratio: f64,
    window: f64,
}

impl PitchShifter {
    /// Build a shifter for `semitones` at `sample_rate` with a crossfade
    /// window of `window_secs` (at least two samples).
    pub fn new(semitones: f32, sample_rate: u32, window_secs: f32) -> Self {
        let ratio = 2f64.powf(semitones as f64 / 12.0);
        let window = (window_secs as f64 * sample_rate as f64).max(2.0);
        Self { ratio, window }
    }

    /// Playback-rate ratio (`2^(semitones/12)`).
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// `true` when the shifter would not change the signal.
    pub fn is_bypass(&self) -> bool {
        self.ratio == 1.0
    }

    /// Shift `input`, producing exactly `input.len()` samples.
    pub fn process(&self, input: &[f32]) -> Vec<f32> {
        if self.is_bypass() {
            return input.to_vec();
        }

        let step = (1.0 - self.ratio) / self.window;
        let mut phase = 0.0_f64;
        let mut out = Vec::with_capacity(input.len());

        for n in 0..input.len() {
            let phase_b = (phase + 0.5).rem_euclid(1.0);

            let mut y = 0.0_f64;
            for p in [phase, phase_b] {
                let weight = (PI * p).sin().powi(2);
                if weight > 0.0 {
                    let pos = n as f64 - p * self.window;
                    y += weight * read_interpolated(input, pos);
                }
            }
            out.push(y as f32);

            phase = (phase + step).rem_euclid(1.0);
        }

        out
    }
}

/// Linear interpolation at fractional position `pos`; silence outside the
/// slice.
fn read_interpolated(input: &[f32], pos: f64) -> f64 {
    if pos < 0.0 {
        return 0.0;
    }
    let idx = pos.floor() as usize;
    let frac = pos - idx as f64;
    let a = input.get(idx).copied().unwrap_or(0.0) as f64;
    let b = input.get(idx + 1).copied().unwrap_or(0.0) as f64;
    a + (b - a) * frac
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / rate as f64).sin() as f32 * 0.5)
            .collect()
    }

    /// Count upward zero crossings (frequency estimate).
    fn rising_crossings(x: &[f32]) -> usize {
        x.windows(2).filter(|w| w[0] < 0.0 && w[1] >= 0.0).count()
    }

    #[test]
    fn zero_semitones_is_exact_bypass() {
        let shifter = PitchShifter::new(0.0, 22_050, 0.05);
        assert!(shifter.is_bypass());
        let input = sine(220.0, 22_050, 1_000);
        assert_eq!(shifter.process(&input), input);
    }

    #[test]
    fn output_length_matches_input() {
        let shifter = PitchShifter::new(5.0, 22_050, 0.05);
        assert_eq!(shifter.process(&vec![0.1; 4_321]).len(), 4_321);
    }

    #[test]
    fn octave_up_doubles_frequency() {
        let rate = 22_050;
        let input = sine(200.0, rate, rate as usize);
        let out = PitchShifter::new(12.0, rate, 0.05).process(&input);

        // Skip the first window while the taps warm up.
        let skip = 2_000;
        let before = rising_crossings(&input[skip..]) as f64;
        let after = rising_crossings(&out[skip..]) as f64;
        let ratio = after / before;
        assert!((ratio - 2.0).abs() < 0.15, "ratio {ratio}");
    }

    #[test]
    fn octave_down_halves_frequency() {
        let rate = 22_050;
        let input = sine(400.0, rate, rate as usize);
        let out = PitchShifter::new(-12.0, rate, 0.05).process(&input);

        let skip = 2_000;
        let ratio =
            rising_crossings(&out[skip..]) as f64 / rising_crossings(&input[skip..]) as f64;
        assert!((ratio - 0.5).abs() < 0.1, "ratio {ratio}");
    }

    #[test]
    fn deterministic() {
        let input = sine(330.0, 16_000, 3_000);
        let s = PitchShifter::new(-4.0, 16_000, 0.05);
        assert_eq!(s.process(&input), s.process(&input));
    }

    #[test]
    fn silence_stays_silent() {
        let out = PitchShifter::new(7.0, 16_000, 0.05).process(&[0.0; 2_000]);
        assert!(out.iter().all(|&s| s == 0.0));
    }
}
