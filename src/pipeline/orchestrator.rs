//! Generation orchestrator: text, image and speech for one greeting.
//!
//! # Task graph
//!
//! ```text
//! run(input, theme)
//!   ├─▶ spawn generate_image ───────────────────────────────┐
//!   └─▶ spawn generate_text                                  │
//!         ├─ Ok    → text                                    │
//!         ├─ Err   → fallback_text(year)     (warn)          │
//!         └─ panic → RunEvent::Failed        (error, stop)   │
//!         │                                                  │
//!         ├─▶ Snapshot #1  {theme, greeting, poem}           │
//!         └─▶ spawn generate_speech(poem) → AudioDecoder ─┐  │
//!                                                         ▼  ▼
//!                                   settle slot, Snapshot #n (settlement order)
//! ```
//!
//! Image and speech failures only mark their slot `Failed`; they are logged
//! and never reach the receiver as errors.  Dropping the receiver abandons
//! the run and aborts whatever is still in flight.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::audio::{AudioDecoder, AudioError};
use crate::content::{AudioRef, ContentAggregate, ImageRef, Modality, Theme, UserInput};
use crate::provider::{fallback_text, GenerationProvider, ProviderError};

/// Capacity of the per-run event channel.  A run emits at most three
/// snapshots.
const RUN_CHANNEL_CAPACITY: usize = 4;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A run produced nothing usable, not even fallback text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("greeting generation failed: {0}")]
    Fatal(String),
}

/// A best-effort modality did not produce a value.  Logged only.
#[derive(Debug, Error)]
pub enum ModalityError {
    #[error("image generation failed: {0}")]
    Image(ProviderError),

    #[error("speech generation failed: {0}")]
    Speech(ProviderError),

    #[error("speech audio is unusable: {0}")]
    Audio(AudioError),

    #[error("{0} task ended without a result")]
    Lost(&'static str),
}

// ---------------------------------------------------------------------------
// RunEvent
// ---------------------------------------------------------------------------

/// What a run reports to its consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// The aggregate after the text step or after a slot settled.
    Snapshot(ContentAggregate),
    /// The run ended before producing its first snapshot.
    Failed(GenerationError),
}

/// A best-effort slot settling.
enum Settled {
    Image(Option<ImageRef>),
    Audio(Option<AudioRef>),
}

/// Aborts the tasks it holds when the run loop exits early.
struct TaskSet(Vec<AbortHandle>);

impl Drop for TaskSet {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// GenerationOrchestrator
// ---------------------------------------------------------------------------

/// Issues the generation requests for a run and reports progressive
/// snapshots.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use greeting_box::audio::AudioDecoder;
/// use greeting_box::config::AppConfig;
/// use greeting_box::content::{random_theme, UserInput};
/// use greeting_box::pipeline::{GenerationOrchestrator, RunEvent};
/// use greeting_box::provider::GeminiProvider;
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let provider = GeminiProvider::from_config(&config.provider, config.greeting.year);
/// let orchestrator = GenerationOrchestrator::new(
///     Arc::new(provider),
///     AudioDecoder::new(config.audio.sample_rate, config.audio.channels),
///     config.greeting.year,
/// );
///
/// let input = UserInput::new("Ada", None).unwrap();
/// let mut events = orchestrator.run(input, random_theme());
/// while let Some(RunEvent::Snapshot(card)) = events.recv().await {
///     println!("{} (settled: {})", card.greeting(), card.is_settled());
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct GenerationOrchestrator {
    provider: Arc<dyn GenerationProvider>,
    decoder: AudioDecoder,
    year: u16,
    speech_enabled: bool,
}

impl GenerationOrchestrator {
    /// Create an orchestrator with speech enabled.
    ///
    /// * `provider`: generation backend (e.g. `GeminiProvider`).
    /// * `decoder`: bound to the format the speech model emits.
    /// * `year`: used for the static fallback text.
    pub fn new(provider: Arc<dyn GenerationProvider>, decoder: AudioDecoder, year: u16) -> Self {
        Self {
            provider,
            decoder,
            year,
            speech_enabled: true,
        }
    }

    /// Turn the speech step on or off.  When off, the audio slot of every
    /// snapshot is `Unavailable`.
    pub fn with_speech(mut self, enabled: bool) -> Self {
        self.speech_enabled = enabled;
        self
    }

    pub fn speech_enabled(&self) -> bool {
        self.speech_enabled
    }

    /// Start a run.  Must be called from within a tokio runtime.
    ///
    /// The receiver yields the text snapshot first, then one snapshot per
    /// settled slot, and closes once every slot has settled.
    pub fn run(&self, input: UserInput, theme: Theme) -> mpsc::Receiver<RunEvent> {
        let (tx, rx) = mpsc::channel(RUN_CHANNEL_CAPACITY);
        let this = self.clone();
        tokio::spawn(async move { this.drive(input, theme, tx).await });
        rx
    }

    async fn drive(self, input: UserInput, theme: Theme, tx: mpsc::Sender<RunEvent>) {
        log::debug!("orchestrator: run started (theme {:?})", theme.name);
        let input = Arc::new(input);
        let (settled_tx, mut settled_rx) = mpsc::unbounded_channel::<Settled>();
        let mut tasks = TaskSet(Vec::with_capacity(2));

        // ── Stage 1: image and text, issued together ─────────────────────
        let image_task = tokio::spawn({
            let provider = Arc::clone(&self.provider);
            let input = Arc::clone(&input);
            let settled_tx = settled_tx.clone();
            async move {
                let image = match provider.generate_image(&input, &theme).await {
                    Ok(image) => Some(image),
                    Err(e) => {
                        log::warn!("orchestrator: {}", ModalityError::Image(e));
                        None
                    }
                };
                let _ = settled_tx.send(Settled::Image(image));
            }
        });
        tasks.0.push(image_task.abort_handle());

        let mut text_task = tokio::spawn({
            let provider = Arc::clone(&self.provider);
            let input = Arc::clone(&input);
            async move { provider.generate_text(&input, &theme).await }
        });
        tasks.0.push(text_task.abort_handle());

        let joined = tokio::select! {
            joined = &mut text_task => joined,
            _ = tx.closed() => {
                log::debug!("orchestrator: run abandoned before text");
                return;
            }
        };
        let text = match joined {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                log::warn!("orchestrator: text generation failed ({e}), using fallback text");
                fallback_text(self.year)
            }
            Err(e) => {
                let error = GenerationError::Fatal(e.to_string());
                log::error!("orchestrator: {error}");
                let _ = tx.send(RunEvent::Failed(error)).await;
                return;
            }
        };

        // ── Text snapshot ────────────────────────────────────────────────
        let audio = if self.speech_enabled {
            Modality::Pending
        } else {
            Modality::Unavailable
        };
        let mut aggregate =
            ContentAggregate::from_text(theme.name, text.greeting, text.poem, Modality::Pending, audio);

        if tx.send(RunEvent::Snapshot(aggregate.clone())).await.is_err() {
            log::debug!("orchestrator: run abandoned after text");
            return;
        }

        // ── Stage 2: speech, gated on the resolved poem ──────────────────
        if self.speech_enabled {
            let provider = Arc::clone(&self.provider);
            let decoder = self.decoder;
            let poem = aggregate.poem().to_string();
            let settled_tx = settled_tx.clone();
            let speech_task = tokio::spawn(async move {
                let audio = match speak(provider.as_ref(), decoder, &poem).await {
                    Ok(audio) => Some(audio),
                    Err(e) => {
                        log::warn!("orchestrator: {e}");
                        None
                    }
                };
                let _ = settled_tx.send(Settled::Audio(audio));
            });
            tasks.0.push(speech_task.abort_handle());
        }
        drop(settled_tx);

        // ── Merge in settlement order ────────────────────────────────────
        loop {
            let settled = tokio::select! {
                settled = settled_rx.recv() => settled,
                _ = tx.closed() => {
                    log::debug!("orchestrator: run abandoned");
                    return;
                }
            };
            let Some(settled) = settled else { break };
            let changed = match settled {
                Settled::Image(image) => aggregate.settle_image(image),
                Settled::Audio(audio) => aggregate.settle_audio(audio),
            };
            if changed && tx.send(RunEvent::Snapshot(aggregate.clone())).await.is_err() {
                log::debug!("orchestrator: run abandoned");
                return;
            }
        }

        // Every sender is gone; a slot still pending means its task died.
        if !aggregate.is_settled() {
            if aggregate.image().is_pending() {
                log::warn!("orchestrator: {}", ModalityError::Lost("image"));
                aggregate.settle_image(None);
            }
            if aggregate.audio().is_pending() {
                log::warn!("orchestrator: {}", ModalityError::Lost("speech"));
                aggregate.settle_audio(None);
            }
            let _ = tx.send(RunEvent::Snapshot(aggregate)).await;
        }
        log::debug!("orchestrator: run finished");
    }
}

/// Speech for `poem`, decoded into a playable buffer.
async fn speak(
    provider: &dyn GenerationProvider,
    decoder: AudioDecoder,
    poem: &str,
) -> Result<AudioRef, ModalityError> {
    let encoded = provider
        .generate_speech(poem)
        .await
        .map_err(ModalityError::Speech)?;
    let buffer = decoder.decode(&encoded).map_err(ModalityError::Audio)?;
    Ok(Arc::new(buffer))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
