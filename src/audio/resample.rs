//! Sample-rate conversion and channel upmixing for playback.
//!
//! Speech arrives as 24 kHz mono; output devices usually run at 44.1/48 kHz
//! with two or more channels.  This module provides the two conversion
//! steps applied before samples are handed to the device:
//!
//! 1. [`resample_linear`]: convert between arbitrary sample rates.
//! 2. [`mono_to_interleaved`]: duplicate a mono track across N channels.

// ---------------------------------------------------------------------------
// resample_linear
// ---------------------------------------------------------------------------

/// Resample `samples` from `source_rate` Hz to `target_rate` Hz using linear
/// interpolation.
///
/// * Equal rates return the input unchanged.
/// * Empty input, or a zero rate on either side, returns an empty vector.
///
/// The output length is `ceil(samples.len() * target_rate / source_rate)`.
///
/// # Example
///
/// ```rust
/// use greeting_box::audio::resample_linear;
///
/// // 24 kHz → 48 kHz doubles the length
/// let speech = vec![0.25_f32; 240];
/// let out = resample_linear(&speech, 24_000, 48_000);
/// assert_eq!(out.len(), 480);
/// ```
pub fn resample_linear(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate {
        return samples.to_vec();
    }

    if samples.is_empty() || source_rate == 0 || target_rate == 0 {
        return Vec::new();
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = src_pos - idx as f64;

        let sample = if idx + 1 < samples.len() {
            samples[idx] * (1.0 - frac as f32) + samples[idx + 1] * frac as f32
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

// ---------------------------------------------------------------------------
// mono_to_interleaved
// ---------------------------------------------------------------------------

/// Copy each mono sample into every channel of an interleaved frame.
///
/// * `channels == 1` returns the input as an owned `Vec`.
/// * `channels == 0` returns an empty vector.
pub fn mono_to_interleaved(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => samples
            .iter()
            .flat_map(|&s| std::iter::repeat(s).take(n as usize))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- mono_to_interleaved -----------------------------------------------

    #[test]
    fn interleave_mono_is_identity() {
        let input = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(mono_to_interleaved(&input, 1), input);
    }

    #[test]
    fn interleave_stereo_duplicates_each_sample() {
        let out = mono_to_interleaved(&[0.5_f32, -0.5], 2);
        assert_eq!(out, vec![0.5, 0.5, -0.5, -0.5]);
    }

    #[test]
    fn interleave_zero_channels() {
        assert!(mono_to_interleaved(&[1.0_f32, 2.0], 0).is_empty());
    }

    // ---- resample_linear ---------------------------------------------------

    #[test]
    fn resample_same_rate_is_noop() {
        let input: Vec<f32> = (0..240).map(|i| i as f32 / 240.0).collect();
        let out = resample_linear(&input, 24_000, 24_000);
        assert_eq!(out, input);
    }

    #[test]
    fn resample_empty_input() {
        assert!(resample_linear(&[], 24_000, 48_000).is_empty());
    }

    #[test]
    fn resample_zero_rate_yields_nothing() {
        assert!(resample_linear(&[0.5], 0, 48_000).is_empty());
        assert!(resample_linear(&[0.5], 24_000, 0).is_empty());
    }

    #[test]
    fn resample_24k_to_44100_output_length() {
        // 1 second of speech → ~44 100 output samples
        let input = vec![0.0_f32; 24_000];
        let out = resample_linear(&input, 24_000, 44_100);
        assert!(
            out.len().abs_diff(44_100) <= 1,
            "expected ~44100, got {}",
            out.len()
        );
    }

    #[test]
    fn resample_constant_signal_preserves_amplitude() {
        let input = vec![0.5_f32; 240];
        let out = resample_linear(&input, 24_000, 48_000);
        for &s in &out {
            assert!((s - 0.5).abs() < 1e-5, "amplitude drift: {s}");
        }
    }

    #[test]
    fn resample_upsample_interpolates_midpoints() {
        let out = resample_linear(&[0.0_f32, 1.0], 1, 2);
        assert_eq!(out.len(), 4);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }
}
