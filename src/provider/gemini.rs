//! Gemini `:generateContent` implementation of [`GenerationProvider`].
//!
//! All connection details come from [`ProviderConfig`]; the API key is sent
//! in the `x-goog-api-key` header.  Each modality uses its own model:
//!
//! | Call              | Request                                             |
//! |-------------------|-----------------------------------------------------|
//! | `generate_text`   | JSON response schema `{greeting, poem}`             |
//! | `generate_image`  | prompt (+ user photo as `inlineData`)               |
//! | `generate_speech` | poem text, `responseModalities: ["AUDIO"]` + voice  |

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};

use super::fallback::{default_greeting, DEFAULT_POEM};
use super::prompt::PromptBuilder;
use super::{GenerationProvider, GreetingText, ProviderError};
use crate::config::ProviderConfig;
use crate::content::{ImageRef, Theme, UserInput};

/// MIME type assumed for user photos.
const PHOTO_MIME: &str = "image/jpeg";

/// MIME type assumed when the image part does not declare one.
const DEFAULT_IMAGE_MIME: &str = "image/png";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .into_iter()
            .flat_map(|c| c.parts.iter())
    }

    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.parts().filter_map(|p| p.text.as_deref()).collect()
    }

    /// First inline binary part of the first candidate.
    fn inline_data(&self) -> Option<&InlineData> {
        self.parts().find_map(|p| p.inline_data.as_ref())
    }
}

// ---------------------------------------------------------------------------
// GeminiProvider
// ---------------------------------------------------------------------------

/// Calls the Gemini REST API for all three modalities.
pub struct GeminiProvider {
    client: reqwest::Client,
    config: ProviderConfig,
    api_key: Option<String>,
    prompts: PromptBuilder,
}

impl GeminiProvider {
    /// Build a provider from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default client is used if the builder
    /// fails.
    pub fn from_config(config: &ProviderConfig, year: u16) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            api_key: config.resolved_api_key(),
            prompts: PromptBuilder::new(year),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    async fn generate_content(
        &self,
        model: &str,
        body: &Value,
    ) -> Result<GenerateContentResponse, ProviderError> {
        let key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)?;

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    async fn generate_text(
        &self,
        input: &UserInput,
        theme: &Theme,
    ) -> Result<GreetingText, ProviderError> {
        let prompt = self.prompts.text_prompt(input, theme);
        let response = self
            .generate_content(&self.config.text_model, &text_request_body(&prompt))
            .await?;
        parse_greeting(&response.text(), input.name(), self.prompts.year())
    }

    async fn generate_image(
        &self,
        input: &UserInput,
        theme: &Theme,
    ) -> Result<ImageRef, ProviderError> {
        let prompt = self.prompts.image_prompt(theme, input.photo().is_some());
        let body = image_request_body(&prompt, input.photo());
        let response = self
            .generate_content(&self.config.image_model, &body)
            .await?;

        let inline = response.inline_data().ok_or(ProviderError::EmptyResponse)?;
        let data = general_purpose::STANDARD
            .decode(inline.data.trim())
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        let mime_type = if inline.mime_type.is_empty() {
            DEFAULT_IMAGE_MIME.to_string()
        } else {
            inline.mime_type.clone()
        };
        log::debug!("gemini: image {} ({} bytes)", mime_type, data.len());
        Ok(ImageRef { mime_type, data })
    }

    async fn generate_speech(&self, text: &str) -> Result<String, ProviderError> {
        let body = speech_request_body(text, &self.config.voice);
        let response = self
            .generate_content(&self.config.speech_model, &body)
            .await?;
        response
            .inline_data()
            .map(|d| d.data.clone())
            .filter(|d| !d.is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }
}

// ---------------------------------------------------------------------------
// Request bodies / response parsing
// ---------------------------------------------------------------------------

fn text_request_body(prompt: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "greeting": { "type": "STRING" },
                    "poem":     { "type": "STRING" }
                },
                "required": ["greeting", "poem"]
            }
        }
    })
}

fn image_request_body(prompt: &str, photo: Option<&[u8]>) -> Value {
    let mut parts = Vec::with_capacity(2);
    if let Some(photo) = photo {
        parts.push(json!({
            "inlineData": {
                "mimeType": PHOTO_MIME,
                "data": general_purpose::STANDARD.encode(photo)
            }
        }));
    }
    parts.push(json!({ "text": prompt }));
    json!({ "contents": [{ "parts": parts }] })
}

fn speech_request_body(text: &str, voice: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": text }] }],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": voice }
                }
            }
        }
    })
}

/// Parse the `{greeting, poem}` JSON.  Blank text counts as `{}`; missing or
/// empty fields get defaults.  Text that is not a JSON object is an error.
fn parse_greeting(raw: &str, name: &str, year: u16) -> Result<GreetingText, ProviderError> {
    let raw = raw.trim();
    let json: Value = if raw.is_empty() {
        json!({})
    } else {
        serde_json::from_str(raw).map_err(|e| ProviderError::Parse(e.to_string()))?
    };
    if !json.is_object() {
        return Err(ProviderError::Parse(format!("expected a JSON object, got {json}")));
    }

    let field = |key: &str| {
        json[key]
            .as_str()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    };

    Ok(GreetingText {
        greeting: field("greeting").unwrap_or_else(|| default_greeting(name, year)),
        poem: field("poem").unwrap_or_else(|| DEFAULT_POEM.to_string()),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
