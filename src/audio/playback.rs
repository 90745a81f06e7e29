//! Playback control for decoded speech.
//!
//! [`PlaybackController`] owns at most one [`ActivePlayback`] at a time.
//! Starting a new stream stops the previous one first; stopping is
//! idempotent.  The actual device is behind the [`AudioOutput`] trait so the
//! controller can be exercised without sound hardware.
//!
//! Autoplay is gated by an injectable [`AutoplayPolicy`]: when the policy
//! refuses, or the device fails, the automatic attempt fails silently.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::content::AudioRef;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Errors that can occur when starting playback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The current result carries no playable audio.
    #[error("no audio is available for this greeting")]
    NoAudio,

    /// No output device could be opened.
    #[error("no audio output device found")]
    NoDevice,

    /// The device rejected the stream.
    #[error("audio device error: {0}")]
    Device(String),

    /// Automatic start is not permitted without a user gesture.
    #[error("autoplay is not allowed")]
    AutoplayBlocked,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Decides whether audio may start without a fresh user request.
pub trait AutoplayPolicy: Send + Sync {
    fn can_auto_start(&self) -> bool;
}

/// Fixed answer, typically taken from `AudioConfig::autoplay`.
#[derive(Debug, Clone, Copy)]
pub struct StaticAutoplay(pub bool);

impl AutoplayPolicy for StaticAutoplay {
    fn can_auto_start(&self) -> bool {
        self.0
    }
}

/// A device that can play an [`AudioRef`].
///
/// `start` resolves once the stream is running or has failed to open; it
/// must not block the calling task while the device is being set up.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    async fn start(&self, audio: AudioRef) -> Result<Box<dyn ActivePlayback>, PlaybackError>;
}

/// Handle to a stream that is currently playing.
pub trait ActivePlayback: Send {
    /// Stop the stream.  Calling this more than once has no further effect.
    fn stop(&mut self);

    /// `true` once the stream has played to the end or been stopped.
    fn is_finished(&self) -> bool;
}

// ---------------------------------------------------------------------------
// PlaybackController
// ---------------------------------------------------------------------------

/// Holds the single active playback resource for the displayed result.
pub struct PlaybackController {
    output: Arc<dyn AudioOutput>,
    policy: Arc<dyn AutoplayPolicy>,
    active: Option<Box<dyn ActivePlayback>>,
}

impl PlaybackController {
    pub fn new(output: Arc<dyn AudioOutput>, policy: Arc<dyn AutoplayPolicy>) -> Self {
        Self {
            output,
            policy,
            active: None,
        }
    }

    /// Start playing `audio`, stopping any stream that is already active.
    ///
    /// An empty buffer is rejected before the current stream is touched.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::NoAudio`] for an empty buffer, or whatever
    /// the output device reports.
    pub async fn play(&mut self, audio: &AudioRef) -> Result<(), PlaybackError> {
        if audio.is_empty() {
            return Err(PlaybackError::NoAudio);
        }
        self.stop();

        let handle = self.output.start(Arc::clone(audio)).await?;
        log::debug!(
            "playback: started {:.1}s of audio",
            audio.duration_secs()
        );
        self.active = Some(handle);
        Ok(())
    }

    /// One automatic attempt.  Never surfaces an error; returns whether
    /// playback actually started.
    pub async fn try_autoplay(&mut self, audio: &AudioRef) -> bool {
        if !self.policy.can_auto_start() {
            log::debug!("playback: autoplay blocked by policy");
            return false;
        }
        match self.play(audio).await {
            Ok(()) => true,
            Err(e) => {
                log::debug!("playback: autoplay failed silently: {e}");
                false
            }
        }
    }

    /// Stop the active stream, if any.  Returns `true` when a stream was
    /// still playing; one that already ran to its end is released quietly.
    pub fn stop(&mut self) -> bool {
        match self.active.take() {
            Some(mut handle) => {
                let was_playing = !handle.is_finished();
                handle.stop();
                if was_playing {
                    log::debug!("playback: stopped");
                }
                was_playing
            }
            None => false,
        }
    }

    /// `true` while a started stream has not finished.
    pub fn is_playing(&self) -> bool {
        self.active.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
