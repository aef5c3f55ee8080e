//! Audio primitives: planar buffers, the PCM16 WAV codec and resampling.
//!
//! # Data flow
//!
//! ```text
//! bytes ──AudioDecoder──▶ AudioBuffer ──EffectsGraph──▶ AudioBuffer
//!                                                         │
//!                               resample_buffer (optional)│
//!                                                         ▼
//!                                           encode_wav ──▶ bytes (PCM16)
//! ```

pub mod buffer;
pub mod resample;
pub mod wav;

pub use buffer::AudioBuffer;
pub use resample::{resample_buffer, ResampleError};
pub use wav::{encode_wav, AudioDecoder, WavDecoder, WavError, WAV_HEADER_LEN};
