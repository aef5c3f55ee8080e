//! Voice Dataset Studio: batch effects and trainer-ready dataset export for
//! text-to-speech recording projects.
//!
//! # Modules
//!
//! | Module      | Responsibility                                             |
//! |-------------|------------------------------------------------------------|
//! | [`audio`]   | planar buffers, PCM16 WAV encode/decode, resampling        |
//! | [`effects`] | pitch shift → 3-band EQ → peak limiter, rendered offline   |
//! | [`batch`]   | bounded-concurrency processing with per-item outcomes      |
//! | [`project`] | `project.json`, script items, source file resolution       |
//! | [`export`]  | F5 / Piper / XTTS / Fish / LJSpeech zip archives           |
//! | [`config`]  | `settings.toml` and saved sound profiles                   |

pub mod audio;
pub mod batch;
pub mod config;
pub mod effects;
pub mod export;
pub mod project;
