//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

/// Environment variable consulted when `provider.api_key` is not set.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

// ---------------------------------------------------------------------------
// ProviderConfig
// ---------------------------------------------------------------------------

/// Settings for the generative provider that produces text, image and speech.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the API endpoint (no trailing slash).
    pub base_url: String,
    /// API key.  `None` means read it from the `GEMINI_API_KEY` environment
    /// variable at startup.
    pub api_key: Option<String>,
    /// Model used for the greeting + poem JSON response.
    pub text_model: String,
    /// Model used for the themed illustration.
    pub image_model: String,
    /// Text-to-speech model used to read the poem aloud.
    pub speech_model: String,
    /// Prebuilt voice name passed to the speech model.
    pub voice: String,
    /// Maximum seconds to wait for any single provider response.
    pub timeout_secs: u64,
    /// Skip the speech request entirely when `false`.
    pub speech_enabled: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            api_key: None,
            text_model: "gemini-2.5-flash".into(),
            image_model: "gemini-2.5-flash-image".into(),
            speech_model: "gemini-2.5-flash-preview-tts".into(),
            voice: "Kore".into(),
            timeout_secs: 60,
            speech_enabled: true,
        }
    }
}

impl ProviderConfig {
    /// The configured key, or the `GEMINI_API_KEY` environment variable.
    ///
    /// Blank values are treated as missing.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Format of the speech payload and playback behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate of the raw PCM16 stream returned by the speech model.
    pub sample_rate: u32,
    /// Interleaved channel count of that stream (the provider sends mono).
    pub channels: u16,
    /// Whether playback may start without an explicit user request.
    pub autoplay: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 24_000,
            channels: 1,
            autoplay: true,
        }
    }
}

// ---------------------------------------------------------------------------
// ShareConfig
// ---------------------------------------------------------------------------

/// Settings for share-link generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Origin + base path every share link is built on.
    pub base_url: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// GreetingConfig
// ---------------------------------------------------------------------------

/// Content settings woven into prompts and fallback text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GreetingConfig {
    /// Year mentioned in the greeting, poem and illustration.
    pub year: u16,
}

impl Default for GreetingConfig {
    fn default() -> Self {
        Self { year: 2025 }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use greeting_box::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Generative provider settings.
    pub provider: ProviderConfig,
    /// Speech payload format and playback settings.
    pub audio: AudioConfig,
    /// Share-link settings.
    pub share: ShareConfig,
    /// Greeting content settings.
    pub greeting: GreetingConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns `true` when no `settings.toml` file exists yet.
    pub fn is_first_run() -> bool {
        !AppPaths::new().settings_file.exists()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.provider.base_url, loaded.provider.base_url);
        assert_eq!(original.provider.api_key, loaded.provider.api_key);
        assert_eq!(original.provider.text_model, loaded.provider.text_model);
        assert_eq!(original.provider.image_model, loaded.provider.image_model);
        assert_eq!(original.provider.speech_model, loaded.provider.speech_model);
        assert_eq!(original.provider.voice, loaded.provider.voice);
        assert_eq!(original.provider.timeout_secs, loaded.provider.timeout_secs);
        assert_eq!(original.audio.sample_rate, loaded.audio.sample_rate);
        assert_eq!(original.audio.channels, loaded.audio.channels);
        assert_eq!(original.audio.autoplay, loaded.audio.autoplay);
        assert_eq!(original.share.base_url, loaded.share.base_url);
        assert_eq!(original.greeting.year, loaded.greeting.year);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.provider.text_model, default.provider.text_model);
        assert_eq!(config.audio.sample_rate, default.audio.sample_rate);
        assert_eq!(config.share.base_url, default.share.base_url);
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.provider.base_url, "https://generativelanguage.googleapis.com");
        assert_eq!(cfg.provider.text_model, "gemini-2.5-flash");
        assert_eq!(cfg.provider.image_model, "gemini-2.5-flash-image");
        assert_eq!(cfg.provider.speech_model, "gemini-2.5-flash-preview-tts");
        assert!(cfg.provider.api_key.is_none());
        assert!(cfg.provider.speech_enabled);
        assert_eq!(cfg.audio.sample_rate, 24_000);
        assert_eq!(cfg.audio.channels, 1);
        assert!(cfg.audio.autoplay);
        assert_eq!(cfg.greeting.year, 2025);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[share]\nbase_url = \"https://cards.example.com/box/\"\n")
            .expect("write");

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.share.base_url, "https://cards.example.com/box/");
        assert_eq!(cfg.audio.sample_rate, 24_000);
        assert_eq!(cfg.provider.voice, "Kore");
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.provider.api_key = Some("test-key".into());
        cfg.provider.timeout_secs = 15;
        cfg.provider.speech_enabled = false;
        cfg.audio.autoplay = false;
        cfg.greeting.year = 2026;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.provider.api_key.as_deref(), Some("test-key"));
        assert_eq!(loaded.provider.timeout_secs, 15);
        assert!(!loaded.provider.speech_enabled);
        assert!(!loaded.audio.autoplay);
        assert_eq!(loaded.greeting.year, 2026);
    }

    #[test]
    fn explicit_api_key_wins_over_environment() {
        let mut cfg = ProviderConfig::default();
        cfg.api_key = Some("from-config".into());
        assert_eq!(cfg.resolved_api_key().as_deref(), Some("from-config"));
    }

    #[test]
    fn blank_api_key_is_treated_as_missing() {
        let mut cfg = ProviderConfig::default();
        cfg.api_key = Some("   ".into());
        assert!(cfg.resolved_api_key().is_none());
    }
}
