//! Speech audio: decode → resample → play.
//!
//! # Pipeline
//!
//! ```text
//! base64 PCM16 (provider) → AudioDecoder → AudioBuffer (f32, per channel)
//!     → PlaybackController → AudioOutput (cpal: resample + upmix → device)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use greeting_box::audio::{AudioDecoder, CpalOutput, PlaybackController, StaticAutoplay};
//!
//! # async fn demo() {
//! let speech = AudioDecoder::new(24_000, 1).decode("AAAAAA==").unwrap();
//! let mut player = PlaybackController::new(
//!     Arc::new(CpalOutput::new()),
//!     Arc::new(StaticAutoplay(true)),
//! );
//! player.play(&Arc::new(speech)).await.unwrap();
//! # }
//! ```

pub mod decode;
pub mod output;
pub mod playback;
pub mod resample;

pub use decode::{decode_pcm16, decode_pcm16_bytes, AudioBuffer, AudioDecoder, AudioError};
pub use output::{CpalOutput, CpalPlayback};
pub use playback::{
    ActivePlayback, AudioOutput, AutoplayPolicy, PlaybackController, PlaybackError,
    StaticAutoplay,
};
pub use resample::{mono_to_interleaved, resample_linear};
