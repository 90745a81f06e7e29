//! Generation pipeline and the session that drives it.
//!
//! # Architecture
//!
//! ```text
//! Intent (mpsc) ──▶ Session::run()  ← async tokio task
//!                     │
//!                     ├─ Open / Submit → GenerationOrchestrator::run(input, theme)
//!                     │                    ├─ image ┐
//!                     │                    └─ text ─┴─▶ speech(poem)
//!                     │                  RunEvent::Snapshot … (tagged with RunId)
//!                     ├─ Reset        → stop playback, drop run, clear transport
//!                     ├─ RequestShare → ShareCodec::encode
//!                     └─ RequestPlayback / RequestStopPlayback → PlaybackController
//!                     │
//!                     ▼
//!               SessionEvent (mpsc) ──▶ presentation
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use greeting_box::audio::{AudioDecoder, CpalOutput, PlaybackController, StaticAutoplay};
//! use greeting_box::config::AppConfig;
//! use greeting_box::pipeline::{GenerationOrchestrator, Intent, Session};
//! use greeting_box::provider::GeminiProvider;
//! use greeting_box::share::ShareCodec;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let provider = GeminiProvider::from_config(&config.provider, config.greeting.year);
//!     let orchestrator = GenerationOrchestrator::new(
//!         Arc::new(provider),
//!         AudioDecoder::new(config.audio.sample_rate, config.audio.channels),
//!         config.greeting.year,
//!     );
//!     let playback = PlaybackController::new(
//!         Arc::new(CpalOutput::new()),
//!         Arc::new(StaticAutoplay(config.audio.autoplay)),
//!     );
//!     let share = ShareCodec::new(&config.share.base_url).unwrap();
//!
//!     let (intent_tx, intent_rx) = mpsc::channel(16);
//!     let (event_tx, mut event_rx) = mpsc::channel(64);
//!     tokio::spawn(Session::new(orchestrator, share, playback).run(intent_rx, event_tx));
//!
//!     intent_tx.send(Intent::Open).await.unwrap();
//!     while let Some(event) = event_rx.recv().await {
//!         println!("{event:?}");
//!     }
//! }
//! ```

pub mod orchestrator;
pub mod session;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use orchestrator::{GenerationError, GenerationOrchestrator, ModalityError, RunEvent};
pub use session::Session;
pub use state::{Intent, RunCounter, RunId, SessionError, SessionEvent, SessionPhase};
