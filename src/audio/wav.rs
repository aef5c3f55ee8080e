//! PCM16 WAV encoding and the WAV-backed [`AudioDecoder`].
//!
//! # Encoding
//!
//! [`encode_wav`] turns a planar [`AudioBuffer`] into a RIFF/WAVE byte buffer:
//! format tag 1 (PCM), 16-bit little-endian, channels interleaved
//! sample-by-sample.  The container is always the canonical 44-byte header
//! followed by the `data` chunk; no `LIST`/`fact` chunks and no
//! `WAVE_FORMAT_EXTENSIBLE` block, whatever the channel count.  Mono and
//! stereo go through `hound`; wider layouts are framed by hand because
//! `hound` switches to the extensible header above two channels.
//!
//! Quantisation is asymmetric so both ends of the `i16` range are reachable:
//!
//! | input            | output                 |
//! |------------------|------------------------|
//! | `v >= 0`         | `round(v * 32767)`     |
//! | `v < 0`          | `round(v * 32768)`     |
//!
//! Samples are clamped to `[-1, 1]` first.
//!
//! # Decoding
//!
//! Decoding arbitrary formats is a host capability, modelled by the
//! [`AudioDecoder`] trait.  [`WavDecoder`] is the built-in implementation
//! used by the CLI; it inverts the 16-bit quantiser above exactly.
//!
//! ```rust
//! use voice_dataset_studio::audio::{encode_wav, AudioBuffer, AudioDecoder, WavDecoder};
//!
//! let buf = AudioBuffer::mono(vec![0.0, 0.5, -0.5, 1.0, -1.0], 22_050);
//! let bytes = encode_wav(&buf).unwrap();
//! assert_eq!(bytes.len(), 44 + 5 * 2);
//!
//! let back = WavDecoder.decode(&bytes).unwrap();
//! assert_eq!(back.frames(), 5);
//! assert_eq!(back.sample_rate(), 22_050);
//! ```

use std::io::Cursor;

use thiserror::Error;

use super::AudioBuffer;

/// Size of the canonical PCM WAV header in bytes.
pub const WAV_HEADER_LEN: usize = 44;

const BITS_PER_SAMPLE: u16 = 16;

// ---------------------------------------------------------------------------
// WavError
// ---------------------------------------------------------------------------

/// Errors from the WAV codec.
#[derive(Debug, Clone, Error)]
pub enum WavError {
    /// The buffer could not be written as a WAV container.
    #[error("WAV encode failed: {0}")]
    Encode(String),

    /// The bytes are not a readable WAV stream.
    #[error("WAV decode failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Quantise one sample to signed 16-bit PCM.
///
/// ```rust
/// use voice_dataset_studio::audio::wav::quantize_i16;
///
/// assert_eq!(quantize_i16(1.0), i16::MAX);
/// assert_eq!(quantize_i16(-1.0), i16::MIN);
/// assert_eq!(quantize_i16(2.5), i16::MAX); // clamped
/// assert_eq!(quantize_i16(0.0), 0);
/// ```
pub fn quantize_i16(value: f32) -> i16 {
    let v = value.clamp(-1.0, 1.0);
    if v >= 0.0 {
        (v * 32_767.0).round() as i16
    } else {
        (v * 32_768.0).round() as i16
    }
}

/// Inverse of [`quantize_i16`].
pub fn dequantize_i16(sample: i16) -> f32 {
    if sample >= 0 {
        sample as f32 / 32_767.0
    } else {
        sample as f32 / 32_768.0
    }
}

/// Encode `buffer` as a 16-bit PCM WAV file.
///
/// The caller must supply channels of equal length; shorter channels are
/// padded with silence rather than rejected.
///
/// # Errors
///
/// [`WavError::Encode`] when the container cannot be written (e.g. zero
/// channels or a zero sample rate).
pub fn encode_wav(buffer: &AudioBuffer) -> Result<Vec<u8>, WavError> {
    if buffer.channel_count() == 0 {
        return Err(WavError::Encode("buffer has no channels".into()));
    }
    if buffer.sample_rate() == 0 {
        return Err(WavError::Encode("sample rate is zero".into()));
    }

    if buffer.channel_count() > 2 {
        return Ok(encode_canonical(buffer));
    }

    let spec = hound::WavSpec {
        channels: buffer.channel_count() as u16,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    };

    let frames = buffer.frames();
    let mut output = Vec::with_capacity(WAV_HEADER_LEN + frames * buffer.channel_count() * 2);
    {
        let cursor = Cursor::new(&mut output);
        let mut writer =
            hound::WavWriter::new(cursor, spec).map_err(|e| WavError::Encode(e.to_string()))?;

        for i in 0..frames {
            for ch in buffer.channels() {
                let s = ch.get(i).copied().unwrap_or(0.0);
                writer
                    .write_sample(quantize_i16(s))
                    .map_err(|e| WavError::Encode(e.to_string()))?;
            }
        }

        writer
            .finalize()
            .map_err(|e| WavError::Encode(e.to_string()))?;
    }

    Ok(output)
}

/// Canonical RIFF/WAVE framing with format tag 1, for any channel count.
fn encode_canonical(buffer: &AudioBuffer) -> Vec<u8> {
    let channels = buffer.channel_count() as u16;
    let frames = buffer.frames();
    let block_align = channels * (BITS_PER_SAMPLE / 8);
    let data_len = (frames * block_align as usize) as u32;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16_u32.to_le_bytes());
    out.extend_from_slice(&1_u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&buffer.sample_rate().to_le_bytes());
    out.extend_from_slice(&(buffer.sample_rate() * block_align as u32).to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());

    for i in 0..frames {
        for ch in buffer.channels() {
            let s = ch.get(i).copied().unwrap_or(0.0);
            out.extend_from_slice(&quantize_i16(s).to_le_bytes());
        }
    }
    out
}

// ---------------------------------------------------------------------------
// AudioDecoder trait
// ---------------------------------------------------------------------------

/// Host capability: turn encoded bytes into a planar [`AudioBuffer`].
///
/// Implementations must be `Send + Sync`: the batch processor calls
/// `decode` from the blocking thread pool.
pub trait AudioDecoder: Send + Sync {
    /// Decode `bytes` into planar samples.
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer, WavError>;
}

// Compile-time assertion: Box<dyn AudioDecoder> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn AudioDecoder>) {}
};

// ---------------------------------------------------------------------------
// WavDecoder
// ---------------------------------------------------------------------------

/// Decodes RIFF/WAVE files (PCM int 8/16/24/32-bit, IEEE float 32-bit).
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl AudioDecoder for WavDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer, WavError> {
        let mut reader =
            hound::WavReader::new(Cursor::new(bytes)).map_err(|e| WavError::Decode(e.to_string()))?;

        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(WavError::Decode("WAV header declares zero channels".into()));
        }

        let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
            (hound::SampleFormat::Int, 16) => reader
                .samples::<i16>()
                .map(|s| s.map(dequantize_i16))
                .collect::<Result<Vec<f32>, _>>(),
            (hound::SampleFormat::Int, bits) => {
                let max_val = (1_i64 << bits.saturating_sub(1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<Result<Vec<f32>, _>>()
            }
            (hound::SampleFormat::Float, _) => reader.samples::<f32>().collect::<Result<Vec<f32>, _>>(),
        }
        .map_err(|e| WavError::Decode(e.to_string()))?;

        Ok(AudioBuffer::from_interleaved(
            &interleaved,
            spec.channels as usize,
            spec.sample_rate,
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
