//! The session state machine: phases, the active run, share and playback.
//!
//! Every handler returns the [`SessionEvent`]s it produced.  Transitions
//! are synchronous; handlers that touch the audio device or the clipboard
//! are async, with the clipboard write pushed onto the blocking pool.
//! [`Session::run`] is the loop that feeds intents and run events in and
//! forwards the results to the presentation layer.

use tokio::sync::mpsc;

use crate::audio::{PlaybackController, PlaybackError};
use crate::content::{random_theme, ContentAggregate, Theme, UserInput};
use crate::share::{
    copy_to_clipboard, intent_url, invitation_text, ClipboardError, ShareCodec, ShareTarget,
};

use super::orchestrator::{GenerationError, GenerationOrchestrator, RunEvent};
use super::state::{Intent, RunCounter, RunId, SessionError, SessionEvent, SessionPhase};

/// Event receiver of the run currently in flight.
struct ActiveRun {
    id: RunId,
    events: mpsc::Receiver<RunEvent>,
}

/// Owns the displayed greeting and everything that acts on it.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tokio::sync::mpsc;
/// use greeting_box::audio::{AudioDecoder, CpalOutput, PlaybackController, StaticAutoplay};
/// use greeting_box::pipeline::{GenerationOrchestrator, Intent, Session};
/// use greeting_box::provider::GeminiProvider;
/// use greeting_box::share::ShareCodec;
///
/// # async fn example(provider: GeminiProvider) {
/// let orchestrator =
///     GenerationOrchestrator::new(Arc::new(provider), AudioDecoder::new(24_000, 1), 2025);
/// let playback =
///     PlaybackController::new(Arc::new(CpalOutput::new()), Arc::new(StaticAutoplay(true)));
/// let share = ShareCodec::new("http://localhost:3000/").unwrap();
///
/// let mut session = Session::new(orchestrator, share, playback);
/// session.startup("http://localhost:3000/");
///
/// let (intent_tx, intent_rx) = mpsc::channel(16);
/// let (event_tx, mut event_rx) = mpsc::channel(64);
/// tokio::spawn(session.run(intent_rx, event_tx));
///
/// intent_tx.send(Intent::Open).await.unwrap();
/// intent_tx
///     .send(Intent::Submit { name: "Ada".into(), photo: None })
///     .await
///     .unwrap();
/// while let Some(event) = event_rx.recv().await {
///     println!("{event:?}");
/// }
/// # }
/// ```
pub struct Session {
    phase: SessionPhase,
    content: Option<ContentAggregate>,
    transport: String,
    runs: RunCounter,
    active: Option<RunId>,
    run: Option<ActiveRun>,
    autoplayed: bool,
    orchestrator: GenerationOrchestrator,
    share: ShareCodec,
    playback: PlaybackController,
}

impl Session {
    pub fn new(
        orchestrator: GenerationOrchestrator,
        share: ShareCodec,
        playback: PlaybackController,
    ) -> Self {
        Self {
            phase: SessionPhase::Idle,
            content: None,
            transport: share.base_url().to_string(),
            runs: RunCounter::default(),
            active: None,
            run: None,
            autoplayed: false,
            orchestrator,
            share,
            playback,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The greeting on display, if any.
    pub fn content(&self) -> Option<&ContentAggregate> {
        self.content.as_ref()
    }

    /// The location the session was started from, minus any share state
    /// once reset.
    pub fn transport(&self) -> &str {
        &self.transport
    }

    pub fn active_run(&self) -> Option<RunId> {
        self.active
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Read share state from `transport`.  A complete share link goes
    /// straight to `ShowingResult`; anything else leaves the session idle.
    pub fn startup(&mut self, transport: &str) -> Vec<SessionEvent> {
        self.transport = transport.to_string();
        if self.phase != SessionPhase::Idle {
            return Vec::new();
        }
        match ShareCodec::decode(transport) {
            Some(shared) => {
                log::info!("session: restored shared greeting ({})", shared.theme());
                let mut events = Vec::new();
                self.set_phase(SessionPhase::ShowingResult, &mut events);
                self.content = Some(shared.clone());
                events.push(SessionEvent::Snapshot(shared));
                events
            }
            None => Vec::new(),
        }
    }

    /// `Idle → CollectingInput`.
    pub fn open(&mut self) -> Result<Vec<SessionEvent>, SessionError> {
        if self.phase != SessionPhase::Idle {
            return Err(SessionError::NotIdle(self.phase));
        }
        let mut events = Vec::new();
        self.set_phase(SessionPhase::CollectingInput, &mut events);
        Ok(events)
    }

    /// Validate the form and start a run with a random theme.
    pub fn submit(
        &mut self,
        name: &str,
        photo: Option<Vec<u8>>,
    ) -> Result<Vec<SessionEvent>, SessionError> {
        if self.phase != SessionPhase::CollectingInput {
            return Err(SessionError::NotCollecting(self.phase));
        }
        let input = UserInput::new(name, photo)?;
        Ok(self.start_run(input, random_theme()))
    }

    fn start_run(&mut self, input: UserInput, theme: Theme) -> Vec<SessionEvent> {
        self.playback.stop();
        let id = self.runs.next();
        log::info!("session: {id} started with theme {:?}", theme.name);

        self.active = Some(id);
        self.content = None;
        self.autoplayed = false;
        self.run = Some(ActiveRun {
            id,
            events: self.orchestrator.run(input, theme),
        });

        let mut events = Vec::new();
        self.set_phase(SessionPhase::Generating, &mut events);
        events
    }

    /// Apply one event from run `id`.  Events from any run other than the
    /// active one are dropped.
    pub async fn apply_run_event(&mut self, id: RunId, event: RunEvent) -> Vec<SessionEvent> {
        if self.active != Some(id) {
            log::debug!("session: dropping event from stale {id}");
            return Vec::new();
        }

        let mut events = Vec::new();
        match event {
            RunEvent::Snapshot(aggregate) => {
                if self.phase == SessionPhase::Generating {
                    self.set_phase(SessionPhase::ShowingResult, &mut events);
                }
                events.push(SessionEvent::Snapshot(aggregate.clone()));

                if !self.autoplayed {
                    if let Some(audio) = aggregate.audio().as_present() {
                        self.autoplayed = true;
                        if self.playback.try_autoplay(audio).await {
                            events.push(SessionEvent::PlaybackStarted);
                        }
                    }
                }
                self.content = Some(aggregate);
            }
            RunEvent::Failed(error) => {
                log::error!("session: {id} failed: {error}");
                self.abandon_run();
                self.content = None;
                self.set_phase(SessionPhase::Idle, &mut events);
                events.push(SessionEvent::Notice(
                    "Something went wrong while preparing your gift. Please try again.".into(),
                ));
            }
        }
        events
    }

    /// Run `id` stopped sending events.
    async fn finish_run(&mut self, id: RunId) -> Vec<SessionEvent> {
        self.run = None;
        if self.active == Some(id) && self.phase == SessionPhase::Generating {
            let error = GenerationError::Fatal("run ended without a greeting".into());
            return self.apply_run_event(id, RunEvent::Failed(error)).await;
        }
        Vec::new()
    }

    /// Back to `Idle` from any phase.  Stops playback, abandons the active
    /// run and strips share state from the transport.
    pub fn reset(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.playback.stop() {
            events.push(SessionEvent::PlaybackStopped);
        }
        self.abandon_run();
        self.content = None;
        self.autoplayed = false;

        let cleared = ShareCodec::clear(&self.transport);
        if cleared != self.transport {
            self.transport = cleared.clone();
            events.push(SessionEvent::TransportCleared(cleared));
        }
        self.set_phase(SessionPhase::Idle, &mut events);
        events
    }

    // -----------------------------------------------------------------------
    // Share and playback
    // -----------------------------------------------------------------------

    pub async fn request_share(
        &mut self,
        target: ShareTarget,
    ) -> Result<Vec<SessionEvent>, SessionError> {
        let content = self.content.as_ref().ok_or(SessionError::NoContent)?;
        let link = self.share.encode(content);
        let mut events = vec![SessionEvent::ShareLink {
            target,
            intent: intent_url(target, &link),
            link: link.clone(),
        }];

        if target == ShareTarget::CopyLink {
            let text = invitation_text(&link);
            let copied = tokio::task::spawn_blocking(move || copy_to_clipboard(&text))
                .await
                .unwrap_or_else(|e| Err(ClipboardError::Access(e.to_string())));
            if let Err(e) = copied {
                log::warn!("session: {e}");
                events.push(SessionEvent::Notice(format!(
                    "{}. Copy this link instead: {link}",
                    SessionError::Clipboard(e)
                )));
            } else {
                events.push(SessionEvent::Notice("Link copied to clipboard!".into()));
            }
        }
        Ok(events)
    }

    /// Manual playback of the displayed greeting's audio.
    pub async fn request_playback(&mut self) -> Result<Vec<SessionEvent>, SessionError> {
        let audio = self
            .content
            .as_ref()
            .and_then(|c| c.audio().as_present())
            .ok_or(PlaybackError::NoAudio)?;
        self.playback.play(audio).await?;
        Ok(vec![SessionEvent::PlaybackStarted])
    }

    pub fn request_stop_playback(&mut self) -> Vec<SessionEvent> {
        if self.playback.stop() {
            vec![SessionEvent::PlaybackStopped]
        } else {
            Vec::new()
        }
    }

    /// Dispatch one intent.  Refused requests become notices.
    pub async fn handle(&mut self, intent: Intent) -> Vec<SessionEvent> {
        let result = match intent {
            Intent::Open => self.open(),
            Intent::Submit { name, photo } => self.submit(&name, photo),
            Intent::Reset => Ok(self.reset()),
            Intent::RequestShare(target) => self.request_share(target).await,
            Intent::RequestPlayback => self.request_playback().await,
            Intent::RequestStopPlayback => Ok(self.request_stop_playback()),
        };
        result.unwrap_or_else(|e| {
            log::debug!("session: refused ({e})");
            vec![SessionEvent::Notice(e.to_string())]
        })
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    /// Drive the session until `intents` closes or the event consumer goes
    /// away.
    pub async fn run(
        mut self,
        mut intents: mpsc::Receiver<Intent>,
        events: mpsc::Sender<SessionEvent>,
    ) {
        loop {
            let batch = tokio::select! {
                intent = intents.recv() => match intent {
                    Some(intent) => self.handle(intent).await,
                    None => break,
                },
                (id, event) = next_run_event(&mut self.run) => match event {
                    Some(event) => self.apply_run_event(id, event).await,
                    None => self.finish_run(id).await,
                },
            };

            for event in batch {
                if events.send(event).await.is_err() {
                    log::info!("session: event consumer closed, shutting down");
                    return;
                }
            }
        }
        log::info!("session: intent channel closed, shutting down");
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn abandon_run(&mut self) {
        if let Some(id) = self.active.take() {
            log::debug!("session: {id} abandoned");
        }
        self.run = None;
    }

    fn set_phase(&mut self, phase: SessionPhase, events: &mut Vec<SessionEvent>) {
        if self.phase != phase {
            log::debug!("session: {:?} → {:?}", self.phase, phase);
            self.phase = phase;
            events.push(SessionEvent::PhaseChanged(phase));
        }
    }
}

/// Next event of the active run; never resolves when there is none.
async fn next_run_event(run: &mut Option<ActiveRun>) -> (RunId, Option<RunEvent>) {
    match run {
        Some(run) => (run.id, run.events.recv().await),
        None => std::future::pending().await,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
