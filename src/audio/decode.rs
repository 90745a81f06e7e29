//! Raw PCM16 speech decoding.
//!
//! The speech provider returns base64-encoded, headerless, signed 16-bit
//! little-endian PCM.  [`AudioDecoder`] turns that into an [`AudioBuffer`]
//! of per-channel `f32` samples in `[-1.0, 1.0)`.
//!
//! ```
//! use greeting_box::audio::AudioDecoder;
//!
//! // Two mono samples: 0x4000 (0.5) and 0x8000 (-1.0).
//! let decoder = AudioDecoder::new(24_000, 1);
//! let buffer = decoder.decode("AEAAgA==").unwrap();
//! assert_eq!(buffer.frame_count(), 2);
//! assert_eq!(buffer.channel(0), Some(&[0.5, -1.0][..]));
//! ```

use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

/// Bytes per PCM16 sample.
const BYTES_PER_SAMPLE: usize = 2;

/// Divisor mapping the i16 range onto `[-1.0, 1.0)`.
const PCM16_SCALE: f32 = 32_768.0;

// ---------------------------------------------------------------------------
// AudioError
// ---------------------------------------------------------------------------

/// Errors produced while decoding a speech payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    /// The payload is not valid base64.
    #[error("audio payload is not valid base64: {0}")]
    InvalidBase64(String),

    /// Byte length is not a whole number of frames.
    #[error("malformed audio: {len} bytes is not a multiple of the {frame_bytes}-byte frame")]
    Malformed { len: usize, frame_bytes: usize },

    /// Zero channels or a zero sample rate was requested.
    #[error("invalid audio format: {0}")]
    InvalidFormat(String),
}

// ---------------------------------------------------------------------------
// AudioBuffer
// ---------------------------------------------------------------------------

/// De-interleaved, normalised sample buffer ready for playback.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    /// One equal-length sample vector per channel.
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// A mono buffer with no frames.
    pub fn empty(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: vec![Vec::new()],
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel).
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Playback length in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f32 / self.sample_rate as f32
    }

    /// Average all channels into a single mono track.
    pub fn to_mono(&self) -> Vec<f32> {
        match self.channels.len() {
            0 => Vec::new(),
            1 => self.channels[0].clone(),
            n => (0..self.frame_count())
                .map(|i| self.channels.iter().map(|c| c[i]).sum::<f32>() / n as f32)
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// AudioDecoder
// ---------------------------------------------------------------------------

/// Decoder bound to the fixed format the speech provider emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioDecoder {
    sample_rate: u32,
    channels: u16,
}

impl AudioDecoder {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Decode a base64 PCM16 payload.
    pub fn decode(&self, encoded: &str) -> Result<AudioBuffer, AudioError> {
        decode_pcm16(encoded, self.sample_rate, self.channels)
    }
}

/// Base64-decode `encoded` and de-interleave it as PCM16 LE.
pub fn decode_pcm16(
    encoded: &str,
    sample_rate: u32,
    channel_count: u16,
) -> Result<AudioBuffer, AudioError> {
    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| AudioError::InvalidBase64(e.to_string()))?;
    decode_pcm16_bytes(&bytes, sample_rate, channel_count)
}

/// De-interleave raw PCM16 LE bytes into `channel_count` channels.
///
/// Fails with [`AudioError::Malformed`] when `bytes.len()` is not a multiple
/// of `channel_count * 2`.
pub fn decode_pcm16_bytes(
    bytes: &[u8],
    sample_rate: u32,
    channel_count: u16,
) -> Result<AudioBuffer, AudioError> {
    if channel_count == 0 {
        return Err(AudioError::InvalidFormat("channel count must be > 0".into()));
    }
    if sample_rate == 0 {
        return Err(AudioError::InvalidFormat("sample rate must be > 0".into()));
    }

    let n = channel_count as usize;
    let frame_bytes = n * BYTES_PER_SAMPLE;
    if bytes.len() % frame_bytes != 0 {
        return Err(AudioError::Malformed {
            len: bytes.len(),
            frame_bytes,
        });
    }

    let frames = bytes.len() / frame_bytes;
    let mut channels = vec![Vec::with_capacity(frames); n];

    for (i, pair) in bytes.chunks_exact(BYTES_PER_SAMPLE).enumerate() {
        let sample = i16::from_le_bytes([pair[0], pair[1]]);
        channels[i % n].push(sample as f32 / PCM16_SCALE);
    }

    Ok(AudioBuffer {
        sample_rate,
        channels,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn mono_frame_count_is_half_the_bytes() {
        let bytes = pcm(&[0, 100, -100, 32_767, -32_768]);
        let buf = decode_pcm16_bytes(&bytes, 24_000, 1).unwrap();
        assert_eq!(buf.frame_count(), bytes.len() / 2);
        assert_eq!(buf.channel_count(), 1);
    }

    #[test]
    fn samples_are_normalised_into_half_open_range() {
        let bytes = pcm(&[i16::MIN, -1, 0, 1, i16::MAX]);
        let buf = decode_pcm16_bytes(&bytes, 24_000, 1).unwrap();
        let ch = buf.channel(0).unwrap();
        assert_eq!(ch[0], -1.0);
        assert_eq!(ch[2], 0.0);
        assert!(ch.iter().all(|&s| (-1.0..1.0).contains(&s)));
        assert!((ch[4] - 32_767.0 / 32_768.0).abs() < f32::EPSILON);
    }

    #[test]
    fn stereo_is_deinterleaved_by_channel_offset() {
        // L R L R
        let bytes = pcm(&[16_384, -16_384, 8_192, -8_192]);
        let buf = decode_pcm16_bytes(&bytes, 48_000, 2).unwrap();
        assert_eq!(buf.frame_count(), 2);
        assert_eq!(buf.channel(0), Some(&[0.5, 0.25][..]));
        assert_eq!(buf.channel(1), Some(&[-0.5, -0.25][..]));
    }

    #[test]
    fn odd_byte_length_is_malformed() {
        let err = decode_pcm16_bytes(&[0, 0, 0], 24_000, 1).unwrap_err();
        assert_eq!(err, AudioError::Malformed { len: 3, frame_bytes: 2 });
    }

    #[test]
    fn partial_stereo_frame_is_malformed() {
        // 6 bytes = 3 samples, not a whole number of stereo frames.
        let err = decode_pcm16_bytes(&pcm(&[1, 2, 3]), 24_000, 2).unwrap_err();
        assert!(matches!(err, AudioError::Malformed { len: 6, frame_bytes: 4 }));
    }

    #[test]
    fn zero_channels_is_rejected() {
        let err = decode_pcm16_bytes(&[], 24_000, 0).unwrap_err();
        assert!(matches!(err, AudioError::InvalidFormat(_)));
    }

    #[test]
    fn empty_payload_yields_empty_buffer() {
        let buf = decode_pcm16("", 24_000, 1).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.duration_secs(), 0.0);
    }

    #[test]
    fn invalid_base64_is_reported() {
        let err = decode_pcm16("not base64!!", 24_000, 1).unwrap_err();
        assert!(matches!(err, AudioError::InvalidBase64(_)));
    }

    #[test]
    fn decoder_round_trips_through_base64() {
        let bytes = pcm(&[0; 24_000]);
        let encoded = general_purpose::STANDARD.encode(&bytes);
        let buf = AudioDecoder::new(24_000, 1).decode(&encoded).unwrap();
        assert_eq!(buf.frame_count(), 24_000);
        assert!((buf.duration_secs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn to_mono_averages_channels() {
        let bytes = pcm(&[16_384, -16_384, 16_384, 16_384]);
        let buf = decode_pcm16_bytes(&bytes, 24_000, 2).unwrap();
        assert_eq!(buf.to_mono(), vec![0.0, 0.5]);
    }
}
