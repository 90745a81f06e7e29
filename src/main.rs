//! Application entry point: Greeting Box in the terminal.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Build the generation provider, orchestrator, share codec and player.
//! 4. If the first argument is a share link, restore straight into the
//!    result; otherwise open the name form.
//! 5. Spawn the session loop and an event printer, then read commands from
//!    stdin until `/quit` or end of input.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use greeting_box::{
    audio::{AudioDecoder, CpalOutput, PlaybackController, StaticAutoplay},
    config::{AppConfig, AppPaths},
    content::{ContentAggregate, Modality},
    pipeline::{GenerationOrchestrator, Intent, Session, SessionEvent, SessionPhase},
    provider::GeminiProvider,
    share::{ShareCodec, ShareTarget},
};

const HELP: &str = "\
Type a name to open your gift, or one of:
  /photo <path>   attach a JPEG photo to the next name
  /play           play the poem
  /stop           stop playback
  /share [copy|whatsapp|twitter|facebook]
  /new            start over
  /quit           exit";

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(card: &ContentAggregate) {
    println!();
    println!("  ✦ {} ✦  [{}]", card.theme(), card.display_hint());
    println!("  {}", card.greeting());
    for line in card.poem_lines() {
        println!("    {line}");
    }
    let image = match card.image() {
        Modality::Pending => "painting…".to_string(),
        Modality::Present(img) => format!("{} ({} bytes)", img.mime_type, img.data.len()),
        Modality::Failed => "unavailable".to_string(),
        Modality::Unavailable => "not included in shared links".to_string(),
    };
    let audio = match card.audio() {
        Modality::Pending => "recording…".to_string(),
        Modality::Present(a) => format!("{:.1}s, /play to listen", a.duration_secs()),
        Modality::Failed | Modality::Unavailable => "unavailable".to_string(),
    };
    println!("  image: {image}");
    println!("  voice: {audio}");
}

async fn print_events(mut events: mpsc::Receiver<SessionEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::PhaseChanged(SessionPhase::CollectingInput) => {
                println!("What's your name?");
            }
            SessionEvent::PhaseChanged(phase) => println!("[{}]", phase.label()),
            SessionEvent::Snapshot(card) => render(&card),
            SessionEvent::Notice(message) => println!("! {message}"),
            SessionEvent::ShareLink { link, intent, .. } => {
                println!("Share link: {link}");
                if let Some(intent) = intent {
                    println!("Open to share: {intent}");
                }
            }
            SessionEvent::TransportCleared(location) => log::debug!("location is now {location}"),
            SessionEvent::PlaybackStarted => println!("♪ playing"),
            SessionEvent::PlaybackStopped => println!("♪ stopped"),
        }
    }
}

fn share_target(arg: &str) -> Option<ShareTarget> {
    match arg.trim().to_ascii_lowercase().as_str() {
        "" | "copy" | "link" => Some(ShareTarget::CopyLink),
        "whatsapp" => Some(ShareTarget::WhatsApp),
        "twitter" | "x" => Some(ShareTarget::Twitter),
        "facebook" => Some(ShareTarget::Facebook),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Greeting Box starting up");

    // 2. Configuration
    if AppConfig::is_first_run() {
        log::info!(
            "no settings file yet; defaults in use (see {})",
            AppPaths::new().settings_file.display()
        );
    }
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    if config.provider.resolved_api_key().is_none() {
        log::warn!("no API key configured; greetings will use fallback text only");
    }

    // 3. Collaborators
    let provider = GeminiProvider::from_config(&config.provider, config.greeting.year);
    let orchestrator = GenerationOrchestrator::new(
        Arc::new(provider),
        AudioDecoder::new(config.audio.sample_rate, config.audio.channels),
        config.greeting.year,
    )
    .with_speech(config.provider.speech_enabled);
    let share = ShareCodec::new(&config.share.base_url)
        .with_context(|| format!("invalid share.base_url {:?}", config.share.base_url))?;
    let playback = PlaybackController::new(
        Arc::new(CpalOutput::new()),
        Arc::new(StaticAutoplay(config.audio.autoplay)),
    );

    // 4. Startup shortcut
    let transport = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.share.base_url.clone());
    let mut session = Session::new(orchestrator, share, playback);
    let restored = session.startup(&transport);

    let (intent_tx, intent_rx) = mpsc::channel::<Intent>(16);
    let (event_tx, event_rx) = mpsc::channel::<SessionEvent>(64);

    for event in restored {
        event_tx.send(event).await.context("event channel closed")?;
    }
    if session.phase() == SessionPhase::Idle {
        intent_tx.send(Intent::Open).await?;
    }

    // 5. Session loop + printer
    let driver = tokio::spawn(session.run(intent_rx, event_tx));
    let printer = tokio::spawn(print_events(event_rx));

    println!("{HELP}");
    let mut photo: Option<Vec<u8>> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = line.split_once(' ').unwrap_or((line, ""));

        let intent = match command {
            "" => continue,
            "/quit" | "/exit" => break,
            "/help" => {
                println!("{HELP}");
                continue;
            }
            "/photo" => {
                match tokio::fs::read(arg.trim()).await {
                    Ok(bytes) => {
                        println!("Photo attached ({} bytes).", bytes.len());
                        photo = Some(bytes);
                    }
                    Err(e) => println!("! could not read {}: {e}", arg.trim()),
                }
                continue;
            }
            "/play" => Intent::RequestPlayback,
            "/stop" => Intent::RequestStopPlayback,
            "/share" => match share_target(arg) {
                Some(target) => Intent::RequestShare(target),
                None => {
                    println!("! unknown share target {arg:?}");
                    continue;
                }
            },
            "/new" => {
                intent_tx.send(Intent::Reset).await?;
                Intent::Open
            }
            _ => Intent::Submit {
                name: line.to_string(),
                photo: photo.take(),
            },
        };
        if intent_tx.send(intent).await.is_err() {
            break;
        }
    }

    drop(intent_tx);
    driver.await?;
    printer.await?;
    log::info!("Greeting Box shut down");
    Ok(())
}
