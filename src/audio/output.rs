//! Speaker output via `cpal`.
//!
//! `cpal::Stream` is not `Send` on every platform, so each playback runs on
//! its own thread that opens, plays and drops the stream.  The returned
//! [`CpalPlayback`] handle talks to that thread through two flags.  The
//! device-open result comes back over a oneshot that `start` awaits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::oneshot;

use super::playback::{ActivePlayback, AudioOutput, PlaybackError};
use super::resample::{mono_to_interleaved, resample_linear};
use crate::content::AudioRef;

/// How often the playback thread checks the stop/finished flags.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

// ---------------------------------------------------------------------------
// CpalOutput
// ---------------------------------------------------------------------------

/// [`AudioOutput`] backed by the system default output device.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalOutput;

impl CpalOutput {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioOutput for CpalOutput {
    async fn start(&self, audio: AudioRef) -> Result<Box<dyn ActivePlayback>, PlaybackError> {
        let stop = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = oneshot::channel::<Result<(), PlaybackError>>();

        let thread_stop = Arc::clone(&stop);
        let thread_finished = Arc::clone(&finished);

        std::thread::Builder::new()
            .name("speech-playback".into())
            .spawn(move || {
                let stream = match open_stream(&audio, Arc::clone(&thread_finished)) {
                    Ok(stream) => {
                        let _ = ready_tx.send(Ok(()));
                        stream
                    }
                    Err(e) => {
                        thread_finished.store(true, Ordering::SeqCst);
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                while !thread_stop.load(Ordering::SeqCst)
                    && !thread_finished.load(Ordering::SeqCst)
                {
                    std::thread::sleep(POLL_INTERVAL);
                }

                drop(stream);
                thread_finished.store(true, Ordering::SeqCst);
            })
            .map_err(|e| PlaybackError::Device(e.to_string()))?;

        ready_rx
            .await
            .map_err(|e| PlaybackError::Device(e.to_string()))??;

        Ok(Box::new(CpalPlayback { stop, finished }))
    }
}

// ---------------------------------------------------------------------------
// CpalPlayback
// ---------------------------------------------------------------------------

/// Handle to a stream owned by a playback thread.
pub struct CpalPlayback {
    stop: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl ActivePlayback for CpalPlayback {
    fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst) || self.stop.load(Ordering::SeqCst)
    }
}

impl Drop for CpalPlayback {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Stream setup
// ---------------------------------------------------------------------------

/// Open the default output device and start streaming `audio` into it.
///
/// `finished` is raised by the callback once every sample has been written.
fn open_stream(audio: &AudioRef, finished: Arc<AtomicBool>) -> Result<cpal::Stream, PlaybackError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(PlaybackError::NoDevice)?;

    let supported = device
        .default_output_config()
        .map_err(|e| PlaybackError::Device(e.to_string()))?;

    let channels = supported.channels();
    let device_rate = supported.sample_rate().0;
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    let samples = mono_to_interleaved(
        &resample_linear(&audio.to_mono(), audio.sample_rate(), device_rate),
        channels,
    );
    log::debug!(
        "playback: {} Hz x {} ch, {} samples",
        device_rate,
        channels,
        samples.len()
    );

    let on_error = |err: cpal::StreamError| log::error!("cpal output stream error: {err}");
    let mut pos = 0usize;

    let stream = match sample_format {
        cpal::SampleFormat::F32 => device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for out in data.iter_mut() {
                    *out = next_sample(&samples, &mut pos, &finished);
                }
            },
            on_error,
            None,
        ),
        cpal::SampleFormat::I16 => device.build_output_stream(
            &config,
            move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                for out in data.iter_mut() {
                    *out = (next_sample(&samples, &mut pos, &finished) * i16::MAX as f32) as i16;
                }
            },
            on_error,
            None,
        ),
        other => {
            return Err(PlaybackError::Device(format!(
                "unsupported output sample format: {other:?}"
            )))
        }
    }
    .map_err(|e| PlaybackError::Device(e.to_string()))?;

    stream
        .play()
        .map_err(|e| PlaybackError::Device(e.to_string()))?;
    Ok(stream)
}

/// Next sample, or silence once the buffer is exhausted.
fn next_sample(samples: &[f32], pos: &mut usize, finished: &AtomicBool) -> f32 {
    match samples.get(*pos) {
        Some(&s) => {
            *pos += 1;
            s
        }
        None => {
            finished.store(true, Ordering::SeqCst);
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_sample_walks_then_goes_silent() {
        let finished = AtomicBool::new(false);
        let mut pos = 0;
        let samples = [0.25_f32, -0.25];

        assert_eq!(next_sample(&samples, &mut pos, &finished), 0.25);
        assert_eq!(next_sample(&samples, &mut pos, &finished), -0.25);
        assert!(!finished.load(Ordering::SeqCst));
        assert_eq!(next_sample(&samples, &mut pos, &finished), 0.0);
        assert!(finished.load(Ordering::SeqCst));
    }

    #[test]
    fn handle_stop_marks_finished() {
        let mut handle = CpalPlayback {
            stop: Arc::new(AtomicBool::new(false)),
            finished: Arc::new(AtomicBool::new(false)),
        };
        assert!(!handle.is_finished());
        handle.stop();
        handle.stop();
        assert!(handle.is_finished());
    }

    #[test]
    fn output_is_object_safe() {
        let _: Box<dyn AudioOutput> = Box::new(CpalOutput::new());
    }
}
