//! Three-band EQ built from RBJ cookbook biquads.
//!
//! | Band | Filter      | Default corner |
//! |------|-------------|----------------|
//! | low  | low shelf   | 400 Hz         |
//! | mid  | peaking     | 1 kHz, Q 0.5   |
//! | high | high shelf  | 2.5 kHz        |
//!
//! Filters run in Direct Form II Transposed with `f64` coefficients and
//! state.  A band whose gain is exactly 0 dB is not instantiated, so a flat
//! EQ is a true bypass.

use std::f64::consts::PI;

use super::profile::EqGains;

/// Shelf slope used for the low and high bands (Butterworth-like).
const SHELF_Q: f64 = std::f64::consts::FRAC_1_SQRT_2;

// ---------------------------------------------------------------------------
// Biquad
// ---------------------------------------------------------------------------

/// Supported biquad responses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterType {
    LowShelf,
    Peak,
    HighShelf,
}

/// Single-channel biquad section.
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    z1: f64,
    z2: f64,
}

impl Biquad {
    /// Design a filter with the RBJ Audio EQ Cookbook formulas.
    ///
    /// `frequency` is clamped to `[10 Hz, 0.45·sample_rate]` so a low
    /// sample rate can never push a corner past Nyquist.
    pub fn new(
        filter_type: FilterType,
        sample_rate: u32,
        frequency: f64,
        gain_db: f64,
        q: f64,
    ) -> Self {
        let fs = sample_rate as f64;
        let f0 = frequency.clamp(10.0, fs * 0.45);
        let a = 10f64.powf(gain_db / 40.0);
        let w0 = 2.0 * PI * f0 / fs;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q.max(0.1));
        let sqrt_a_alpha = 2.0 * a.sqrt() * alpha;

        let (b0, b1, b2, a0, a1, a2) = match filter_type {
            FilterType::Peak => (
                1.0 + alpha * a,
                -2.0 * cos_w0,
                1.0 - alpha * a,
                1.0 + alpha / a,
                -2.0 * cos_w0,
                1.0 - alpha / a,
            ),
            FilterType::LowShelf => (
                a * ((a + 1.0) - (a - 1.0) * cos_w0 + sqrt_a_alpha),
                2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w0),
                a * ((a + 1.0) - (a - 1.0) * cos_w0 - sqrt_a_alpha),
                (a + 1.0) + (a - 1.0) * cos_w0 + sqrt_a_alpha,
                -2.0 * ((a - 1.0) + (a + 1.0) * cos_w0),
                (a + 1.0) + (a - 1.0) * cos_w0 - sqrt_a_alpha,
            ),
            FilterType::HighShelf => (
                a * ((a + 1.0) + (a - 1.0) * cos_w0 + sqrt_a_alpha),
                -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w0),
                a * ((a + 1.0) + (a - 1.0) * cos_w0 - sqrt_a_alpha),
                (a + 1.0) - (a - 1.0) * cos_w0 + sqrt_a_alpha,
                2.0 * ((a - 1.0) - (a + 1.0) * cos_w0),
                (a + 1.0) - (a - 1.0) * cos_w0 - sqrt_a_alpha,
            ),
        };

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    #[inline]
    pub fn tick(&mut self, x: f64) -> f64 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }
}

// ---------------------------------------------------------------------------
// Eq3
// ---------------------------------------------------------------------------

/// Band corner frequencies for [`Eq3`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eq3Crossovers {
    pub low_hz: f64,
    pub mid_hz: f64,
    pub mid_q: f64,
    pub high_hz: f64,
}

impl Default for Eq3Crossovers {
    fn default() -> Self {
        Self {
            low_hz: 400.0,
            mid_hz: 1_000.0,
            mid_q: 0.5,
            high_hz: 2_500.0,
        }
    }
}

/// Low-shelf → peak → high-shelf cascade for one channel.
#[derive(Debug, Clone)]
pub struct Eq3 {
    stages: Vec<Biquad>,
}

impl Eq3 {
    pub fn new(gains: EqGains, crossovers: Eq3Crossovers, sample_rate: u32) -> Self {
        let bands = [
            (FilterType::LowShelf, crossovers.low_hz, gains.low, SHELF_Q),
            (FilterType::Peak, crossovers.mid_hz, gains.mid, crossovers.mid_q),
            (FilterType::HighShelf, crossovers.high_hz, gains.high, SHELF_Q),
        ];

        let stages = bands
            .into_iter()
            .filter(|&(_, _, gain, _)| gain != 0.0)
            .map(|(kind, freq, gain, q)| Biquad::new(kind, sample_rate, freq, gain as f64, q))
            .collect();

        Self { stages }
    }

    /// `true` when all bands are flat.
    pub fn is_bypass(&self) -> bool {
        self.stages.is_empty()
    }

    /// Filter `samples` in place.
    pub fn process(&mut self, samples: &mut [f32]) {
        if self.is_bypass() {
            return;
        }
        for s in samples.iter_mut() {
            let mut y = *s as f64;
            for stage in &mut self.stages {
                y = stage.tick(y);
            }
            *s = y as f32;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
