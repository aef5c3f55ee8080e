//! Sample-rate conversion.
//!
//! Recordings are captured at the project's `targetSampleRate` (22 050 Hz by
//! default) but the host decoder may hand back buffers at its own rate.  When
//! [`BatchConfig::target_sample_rate`](crate::config::BatchConfig) is set the
//! batch processor conforms every rendered buffer with [`resample_buffer`].
//!
//! Conversion uses `rubato`'s windowed-sinc [`SincFixedIn`] in a single pass
//! over the whole buffer, then flushes the filter tail and trims the
//! resampler's output delay so the result is time-aligned with the input:
//!
//! ```text
//! input (N frames) ──process──▶ delay | signal ...
//!          zeros   ──flush────▶ ... signal | padding
//!                  ──trim─────▶ ceil(N * target / source) frames
//! ```

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use thiserror::Error;

use super::AudioBuffer;

/// Flush passes allowed before giving up on the filter tail.
const MAX_FLUSHES: usize = 4;

/// Errors from sample-rate conversion.
#[derive(Debug, Clone, Error)]
pub enum ResampleError {
    #[error("invalid sample rate {source_rate} Hz -> {target_rate} Hz")]
    InvalidRate { source_rate: u32, target_rate: u32 },

    #[error("failed to create resampler: {0}")]
    Construction(String),

    #[error("resampling failed: {0}")]
    Process(String),
}

/// Number of frames `frames` input frames occupy at the target rate.
///
/// ```rust
/// use voice_dataset_studio::audio::resample::output_frames;
///
/// assert_eq!(output_frames(480, 48_000, 16_000), 160);
/// assert_eq!(output_frames(1_200, 8_000, 16_000), 2_400);
/// assert_eq!(output_frames(3, 44_100, 22_050), 2); // rounded up
/// ```
pub fn output_frames(frames: usize, source_rate: u32, target_rate: u32) -> usize {
    if source_rate == 0 {
        return 0;
    }
    let num = frames as u64 * target_rate as u64;
    num.div_ceil(source_rate as u64) as usize
}

fn sinc_resampler(
    source_rate: u32,
    target_rate: u32,
    chunk_size: usize,
    channels: usize,
) -> Result<SincFixedIn<f32>, ResampleError> {
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    SincFixedIn::<f32>::new(
        target_rate as f64 / source_rate as f64,
        1.0,
        params,
        chunk_size,
        channels,
    )
    .map_err(|e| ResampleError::Construction(e.to_string()))
}

// ---------------------------------------------------------------------------
// resample_buffer
// ---------------------------------------------------------------------------

/// Resample every channel of `buffer` to `target_rate`.
///
/// * Equal rates return the buffer untouched.
/// * An empty buffer is relabelled with `target_rate`.
/// * Output length is `ceil(frames * target_rate / source_rate)`.
///
/// # Errors
///
/// [`ResampleError::InvalidRate`] for a zero source or target rate; the
/// other variants wrap `rubato` failures.
pub fn resample_buffer(buffer: AudioBuffer, target_rate: u32) -> Result<AudioBuffer, ResampleError> {
    let source_rate = buffer.sample_rate();
    if source_rate == target_rate {
        return Ok(buffer);
    }
    if source_rate == 0 || target_rate == 0 {
        return Err(ResampleError::InvalidRate {
            source_rate,
            target_rate,
        });
    }

    let frames = buffer.frames();
    let channels = buffer.channel_count();
    if frames == 0 || channels == 0 {
        return Ok(AudioBuffer::new(vec![Vec::new(); channels], target_rate));
    }

    log::debug!("resample: {source_rate} Hz -> {target_rate} Hz ({channels} ch, {frames} frames)");

    // Equal-length planar input for rubato.
    let input: Vec<Vec<f32>> = buffer
        .channels()
        .iter()
        .map(|ch| {
            let mut ch = ch.clone();
            ch.resize(frames, 0.0);
            ch
        })
        .collect();

    let mut resampler = sinc_resampler(source_rate, target_rate, frames, channels)?;
    let delay = resampler.output_delay();
    let wanted = output_frames(frames, source_rate, target_rate);

    let mut output = resampler
        .process(&input, None)
        .map_err(|e| ResampleError::Process(e.to_string()))?;

    for _ in 0..MAX_FLUSHES {
        if output[0].len() >= delay + wanted {
            break;
        }
        let tail = resampler
            .process_partial(None::<&[Vec<f32>]>, None)
            .map_err(|e| ResampleError::Process(e.to_string()))?;
        if tail[0].is_empty() {
            break;
        }
        for (out, more) in output.iter_mut().zip(tail) {
            out.extend(more);
        }
    }

    let channels = output
        .into_iter()
        .map(|ch| {
            let mut ch: Vec<f32> = ch.into_iter().skip(delay).take(wanted).collect();
            ch.resize(wanted, 0.0);
            ch
        })
        .collect();

    Ok(AudioBuffer::new(channels, target_rate))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_rate_is_noop() {
        let input: Vec<f32> = (0..160).map(|i| i as f32 / 160.0).collect();
        let out = resample_buffer(AudioBuffer::mono(input.clone(), 22_050), 22_050).unwrap();
        assert_eq!(out.channel(0), &input[..]);
    }

    #[test]
    fn empty_input_takes_target_rate() {
        let out = resample_buffer(AudioBuffer::mono(Vec::new(), 48_000), 22_050).unwrap();
        assert_eq!(out.sample_rate(), 22_050);
        assert_eq!(out.frames(), 0);
    }

    #[test]
    fn zero_rate_is_rejected() {
        let err = resample_buffer(AudioBuffer::mono(vec![0.1, 0.2], 0), 22_050).unwrap_err();
        assert!(matches!(err, ResampleError::InvalidRate { .. }));
    }

    #[test]
    fn downsample_44100_to_22050_halves_length() {
        let out = resample_buffer(AudioBuffer::mono(vec![0.0; 44_100], 44_100), 22_050).unwrap();
        assert_eq!(out.frames(), 22_050);
    }

    #[test]
    fn upsample_16k_to_48k_triples_length() {
        let out = resample_buffer(AudioBuffer::mono(vec![0.0; 160], 16_000), 48_000).unwrap();
        assert_eq!(out.frames(), 480);
    }

    #[test]
    fn constant_signal_keeps_amplitude_away_from_edges() {
        let out = resample_buffer(AudioBuffer::mono(vec![0.5; 4_800], 48_000), 22_050).unwrap();
        let frames = out.frames();
        assert_eq!(frames, 2_205);
        for &s in &out.channel(0)[200..frames - 200] {
            assert!((s - 0.5).abs() < 1e-2, "amplitude drift: {s}");
        }
    }

    #[test]
    fn sine_stays_time_aligned() {
        // 440 Hz at 48 kHz -> 16 kHz: the peak lands on the same instant.
        let src: Vec<f32> = (0..4_800)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 48_000.0).sin())
            .collect();
        let out = resample_buffer(AudioBuffer::mono(src, 48_000), 16_000).unwrap();

        for i in (400..1_200).step_by(37) {
            let expected = (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 16_000.0).sin();
            assert!((out.channel(0)[i] - expected).abs() < 0.12, "frame {i}");
        }
    }

    #[test]
    fn buffer_resample_updates_rate_for_all_channels() {
        let buf = AudioBuffer::new(vec![vec![0.1; 480], vec![-0.1; 480]], 48_000);
        let out = resample_buffer(buf, 16_000).unwrap();
        assert_eq!(out.sample_rate(), 16_000);
        assert_eq!(out.channel_count(), 2);
        assert_eq!(out.frames(), 160);
    }
}
