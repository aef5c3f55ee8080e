//! Effects graph: pitch shift, 3-band EQ and peak limiter, rendered offline.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────── EffectsGraph ──────────────────────────┐
//! │                                                                  │
//! │  AudioBuffer ─▶ PitchShifter ─▶ Eq3 ─▶ PeakLimiter ─▶ AudioBuffer │
//! │                 (semitones)    (dB)    (-1 dBFS)                 │
//! │                       ▲          ▲                               │
//! │                       └──── SoundProfile ────┘                   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use voice_dataset_studio::audio::AudioBuffer;
//! use voice_dataset_studio::effects::{EffectsGraph, EqGains, SoundProfile};
//!
//! let profile = SoundProfile::new("deep", "Deep voice", -3, EqGains::new(2.0, 0.0, -1.0));
//! let source = AudioBuffer::mono(vec![0.0; 2_205], 22_050);
//!
//! let rendered = EffectsGraph::default().render(&source, &profile).unwrap();
//! assert_eq!(rendered.sample_rate(), 22_050);
//! ```

pub mod eq;
pub mod graph;
pub mod limiter;
pub mod pitch;
pub mod profile;

pub use eq::{Biquad, Eq3, Eq3Crossovers, FilterType};
pub use graph::{EffectsGraph, RenderError};
pub use limiter::{db_to_linear, PeakLimiter};
pub use pitch::PitchShifter;
pub use profile::{EqGains, ProfileError, SoundProfile, EQ_RANGE_DB, PITCH_RANGE};
