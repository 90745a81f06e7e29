//! Session phases, run identity, and the messages crossing the
//! presentation boundary.
//!
//! [`SessionPhase`] is the user-visible state machine:
//!
//! ```text
//! Idle ──open──▶ CollectingInput ──submit──▶ Generating ──first snapshot──▶ ShowingResult
//!  │                                          │
//!  └──────── startup with share link ─────────┼───────────────────────────▶ ShowingResult
//!                                             └──fatal──▶ Idle
//! any phase ──reset──▶ Idle
//! ```
//!
//! [`RunId`] tags every generation run; events carrying an id other than the
//! active one are dropped by the session.

use std::fmt;

use thiserror::Error;

use crate::audio::PlaybackError;
use crate::content::{ContentAggregate, InputError};
use crate::share::{ClipboardError, ShareTarget};

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// The four phases the presentation layer renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Landing view.
    #[default]
    Idle,

    /// The name/photo form is open.
    CollectingInput,

    /// A run is in flight and has not produced its first snapshot.
    Generating,

    /// A greeting is displayed; later snapshots update it in place.
    ShowingResult,
}

impl SessionPhase {
    /// Returns `true` while a run is waiting for its text.
    ///
    /// ```
    /// use greeting_box::pipeline::SessionPhase;
    ///
    /// assert!(!SessionPhase::Idle.is_busy());
    /// assert!(!SessionPhase::CollectingInput.is_busy());
    /// assert!(SessionPhase::Generating.is_busy());
    /// assert!(!SessionPhase::ShowingResult.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionPhase::Generating)
    }

    /// A short human-readable label for status lines.
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "Idle",
            SessionPhase::CollectingInput => "Waiting for a name",
            SessionPhase::Generating => "Wrapping your gift",
            SessionPhase::ShowingResult => "Ready",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// Identity of one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

/// Hands out strictly increasing [`RunId`]s.
#[derive(Debug, Default)]
pub struct RunCounter {
    last: u64,
}

impl RunCounter {
    pub fn next(&mut self) -> RunId {
        self.last += 1;
        RunId(self.last)
    }
}

// ---------------------------------------------------------------------------
// Intents and events
// ---------------------------------------------------------------------------

/// Requests from the presentation layer.
#[derive(Debug, Clone)]
pub enum Intent {
    Open,
    /// Raw form contents; validated by the session.
    Submit {
        name: String,
        photo: Option<Vec<u8>>,
    },
    Reset,
    RequestShare(ShareTarget),
    RequestPlayback,
    RequestStopPlayback,
}

/// Updates for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PhaseChanged(SessionPhase),

    /// The aggregate to display.  Replaces the previous one.
    Snapshot(ContentAggregate),

    /// A user-visible message.
    Notice(String),

    /// A share link was produced.  `intent` is the target's web intent URL,
    /// absent for [`ShareTarget::CopyLink`].
    ShareLink {
        target: ShareTarget,
        link: String,
        intent: Option<String>,
    },

    /// The transport lost its share state (e.g. the address bar should now
    /// show this location).
    TransportCleared(String),

    PlaybackStarted,
    PlaybackStopped,
}

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Why a session request was refused.  Each one becomes a notice.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    InvalidInput(#[from] InputError),

    #[error("cannot open the form while {0}")]
    NotIdle(SessionPhase),

    #[error("no form is open (session is {0})")]
    NotCollecting(SessionPhase),

    #[error("there is no greeting to share yet")]
    NoContent,

    #[error("playback failed: {0}")]
    Playback(#[from] PlaybackError),

    #[error("could not copy the link: {0}")]
    Clipboard(#[from] ClipboardError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- SessionPhase ---

    #[test]
    fn only_generating_is_busy() {
        assert!(SessionPhase::Generating.is_busy());
        assert!(!SessionPhase::Idle.is_busy());
        assert!(!SessionPhase::CollectingInput.is_busy());
        assert!(!SessionPhase::ShowingResult.is_busy());
    }

    #[test]
    fn labels_are_distinct() {
        let labels = [
            SessionPhase::Idle.label(),
            SessionPhase::CollectingInput.label(),
            SessionPhase::Generating.label(),
            SessionPhase::ShowingResult.label(),
        ];
        for (i, a) in labels.iter().enumerate() {
            for b in &labels[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(SessionPhase::ShowingResult.to_string(), "Ready");
    }

    #[test]
    fn default_phase_is_idle() {
        assert_eq!(SessionPhase::default(), SessionPhase::Idle);
    }

    // ---- RunCounter ---

    #[test]
    fn run_ids_never_repeat() {
        let mut counter = RunCounter::default();
        let a = counter.next();
        let b = counter.next();
        assert_ne!(a, b);
        assert_eq!(b.to_string(), "run#2");
    }

    // ---- SessionError ---

    #[test]
    fn input_errors_read_as_notices() {
        let err = SessionError::from(InputError::EmptyName);
        assert_eq!(err.to_string(), "a name is required");
    }

    #[test]
    fn event_types_are_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Intent>();
        assert_send::<SessionEvent>();
    }
}
