//! Generative provider contract for greeting text, illustration and speech.
//!
//! This module provides:
//! * [`GenerationProvider`]: async trait the orchestrator depends on.
//! * [`GeminiProvider`]: REST implementation on the Gemini
//!   `:generateContent` endpoint.
//! * [`PromptBuilder`]: prompt text for the text and image requests.
//! * [`fallback_text`]: static greeting used when text generation fails.
//! * [`ProviderError`]: error variants for provider calls.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use greeting_box::config::AppConfig;
//! use greeting_box::content::{random_theme, UserInput};
//! use greeting_box::provider::{GeminiProvider, GenerationProvider};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let provider = GeminiProvider::from_config(&config.provider, config.greeting.year);
//!
//!     let input = UserInput::new("Ada", None).unwrap();
//!     let text = provider.generate_text(&input, &random_theme()).await.unwrap();
//!     println!("{}\n{}", text.greeting, text.poem);
//! }
//! ```

pub mod fallback;
pub mod gemini;
pub mod prompt;

use async_trait::async_trait;
use thiserror::Error;

use crate::content::{ImageRef, Theme, UserInput};

pub use fallback::{default_greeting, fallback_text, DEFAULT_POEM, FALLBACK_POEM};
pub use gemini::GeminiProvider;
pub use prompt::PromptBuilder;

// ---------------------------------------------------------------------------
// ProviderError
// ---------------------------------------------------------------------------

/// Errors that can occur during a provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// No API key was configured.
    #[error("no API key configured")]
    MissingApiKey,

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("provider request timed out")]
    Timeout,

    /// The provider answered with a non-success status.
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response could not be parsed as expected JSON.
    #[error("failed to parse provider response: {0}")]
    Parse(String),

    /// The response had no usable content for the requested modality.
    #[error("provider returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// GreetingText
// ---------------------------------------------------------------------------

/// The text step's result: a one-line greeting and a newline-delimited poem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreetingText {
    pub greeting: String,
    pub poem: String,
}

// ---------------------------------------------------------------------------
// GenerationProvider trait
// ---------------------------------------------------------------------------

/// Async provider of the three greeting modalities.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn GenerationProvider>`).
///
/// * `generate_text` may fail; callers supply a fallback.
/// * `generate_image` and `generate_speech` are best-effort.
/// * `generate_speech` returns base64 PCM16 mono at the configured rate.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate_text(
        &self,
        input: &UserInput,
        theme: &Theme,
    ) -> Result<GreetingText, ProviderError>;

    async fn generate_image(
        &self,
        input: &UserInput,
        theme: &Theme,
    ) -> Result<ImageRef, ProviderError>;

    async fn generate_speech(&self, text: &str) -> Result<String, ProviderError>;
}
