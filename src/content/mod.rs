//! Greeting content: user input, themes, and the evolving content aggregate.
//!
//! [`ContentAggregate`] is the value a generation run builds up.  Its text
//! fields are fixed at construction; the image and audio slots are
//! [`Modality`] values that settle at most once.
//!
//! ```
//! use greeting_box::content::{ContentAggregate, Modality};
//!
//! let shared = ContentAggregate::from_shared("Cozy Cabin", "Hi Ada!", "line1\nline2");
//! assert_eq!(shared.poem_lines().count(), 2);
//! assert!(matches!(shared.image(), Modality::Unavailable));
//! ```

pub mod theme;

use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

use crate::audio::AudioBuffer;

pub use theme::{display_hint_for, find_theme, random_theme, Theme, THEMES};

// ---------------------------------------------------------------------------
// UserInput
// ---------------------------------------------------------------------------

/// Errors raised while validating user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("a name is required")]
    EmptyName,
}

/// What the user submitted: a name and an optional photo.
#[derive(Debug, Clone)]
pub struct UserInput {
    name: String,
    photo: Option<Vec<u8>>,
}

impl UserInput {
    /// Validate and build an input.  The name is stored trimmed.
    pub fn new(name: &str, photo: Option<Vec<u8>>) -> Result<Self, InputError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InputError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            photo: photo.filter(|p| !p.is_empty()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw image bytes (JPEG expected) if the user supplied a photo.
    pub fn photo(&self) -> Option<&[u8]> {
        self.photo.as_deref()
    }
}

// ---------------------------------------------------------------------------
// ImageRef
// ---------------------------------------------------------------------------

/// A generated illustration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImageRef {
    /// Render as a `data:` URL suitable for an `<img src>`.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            general_purpose::STANDARD.encode(&self.data)
        )
    }
}

// ---------------------------------------------------------------------------
// Modality
// ---------------------------------------------------------------------------

/// State of one best-effort output slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Modality<T> {
    /// The producing task has not settled yet.
    Pending,
    /// The task succeeded.
    Present(T),
    /// The task failed; the slot stays empty for the rest of the run.
    Failed,
    /// Never attempted (restored from a share link, or disabled).
    Unavailable,
}

impl<T> Modality<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Modality::Pending)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Modality::Present(_))
    }

    pub fn as_present(&self) -> Option<&T> {
        match self {
            Modality::Present(value) => Some(value),
            _ => None,
        }
    }

    /// Settle a pending slot.  Returns `false` (and leaves the slot as is)
    /// if it has already settled.
    fn settle(&mut self, outcome: Option<T>) -> bool {
        if !self.is_pending() {
            return false;
        }
        *self = match outcome {
            Some(value) => Modality::Present(value),
            None => Modality::Failed,
        };
        true
    }
}

/// Decoded speech attached to an aggregate.
pub type AudioRef = Arc<AudioBuffer>;

// ---------------------------------------------------------------------------
// ContentAggregate
// ---------------------------------------------------------------------------

/// One run's output.  Read-only outside the crate.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentAggregate {
    theme: String,
    greeting: String,
    poem: String,
    image: Modality<ImageRef>,
    audio: Modality<AudioRef>,
}

impl ContentAggregate {
    /// Aggregate produced by the text step; image and audio are still in
    /// flight (or `Unavailable` when the run will not attempt them).
    pub(crate) fn from_text(
        theme: &str,
        greeting: String,
        poem: String,
        image: Modality<ImageRef>,
        audio: Modality<AudioRef>,
    ) -> Self {
        Self {
            theme: theme.to_string(),
            greeting,
            poem,
            image,
            audio,
        }
    }

    /// Aggregate restored from a share link.  Image and audio can never be
    /// carried by a link, so both are permanently `Unavailable`.
    pub fn from_shared(theme: &str, greeting: &str, poem: &str) -> Self {
        Self {
            theme: theme.to_string(),
            greeting: greeting.to_string(),
            poem: poem.to_string(),
            image: Modality::Unavailable,
            audio: Modality::Unavailable,
        }
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn poem(&self) -> &str {
        &self.poem
    }

    /// Poem split on newlines, one entry per rendered line.
    pub fn poem_lines(&self) -> impl Iterator<Item = &str> {
        self.poem.split('\n')
    }

    pub fn image(&self) -> &Modality<ImageRef> {
        &self.image
    }

    pub fn audio(&self) -> &Modality<AudioRef> {
        &self.audio
    }

    /// Presentation hint for the theme, neutral for unknown names.
    pub fn display_hint(&self) -> &'static str {
        display_hint_for(&self.theme)
    }

    /// `true` once no slot is still pending.
    pub fn is_settled(&self) -> bool {
        !self.image.is_pending() && !self.audio.is_pending()
    }

    pub(crate) fn settle_image(&mut self, image: Option<ImageRef>) -> bool {
        self.image.settle(image)
    }

    pub(crate) fn settle_audio(&mut self, audio: Option<AudioRef>) -> bool {
        self.audio.settle(audio)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_aggregate() -> ContentAggregate {
        ContentAggregate::from_text(
            "Cozy Cabin",
            "Hi Ada!".into(),
            "line1\nline2".into(),
            Modality::Pending,
            Modality::Pending,
        )
    }

    #[test]
    fn input_name_is_trimmed() {
        let input = UserInput::new("  Ada \n", None).unwrap();
        assert_eq!(input.name(), "Ada");
        assert!(input.photo().is_none());
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(UserInput::new("   ", None).unwrap_err(), InputError::EmptyName);
        assert_eq!(UserInput::new("", Some(vec![1])).unwrap_err(), InputError::EmptyName);
    }

    #[test]
    fn empty_photo_counts_as_none() {
        let input = UserInput::new("Ada", Some(Vec::new())).unwrap();
        assert!(input.photo().is_none());
    }

    #[test]
    fn image_settles_once() {
        let mut agg = pending_aggregate();
        let img = ImageRef {
            mime_type: "image/png".into(),
            data: vec![1, 2, 3],
        };
        assert!(agg.settle_image(Some(img.clone())));
        assert!(!agg.settle_image(None));
        assert_eq!(agg.image().as_present(), Some(&img));
    }

    #[test]
    fn failed_slot_stays_failed() {
        let mut agg = pending_aggregate();
        assert!(agg.settle_audio(None));
        assert!(matches!(agg.audio(), Modality::Failed));
        assert!(!agg.settle_audio(Some(Arc::new(AudioBuffer::empty(24_000)))));
        assert!(matches!(agg.audio(), Modality::Failed));
    }

    #[test]
    fn settled_only_when_both_slots_settle() {
        let mut agg = pending_aggregate();
        assert!(!agg.is_settled());
        agg.settle_image(None);
        assert!(!agg.is_settled());
        agg.settle_audio(None);
        assert!(agg.is_settled());
    }

    #[test]
    fn shared_aggregate_never_pending() {
        let agg = ContentAggregate::from_shared("Moon Base", "Hello", "a\nb\nc");
        assert!(agg.is_settled());
        assert!(matches!(agg.image(), Modality::Unavailable));
        assert!(matches!(agg.audio(), Modality::Unavailable));
        assert_eq!(agg.poem_lines().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(agg.display_hint(), theme::NEUTRAL_DISPLAY_HINT);
    }

    #[test]
    fn data_url_has_mime_and_base64_payload() {
        let img = ImageRef {
            mime_type: "image/png".into(),
            data: b"png".to_vec(),
        };
        assert_eq!(img.to_data_url(), "data:image/png;base64,cG5n");
    }
}
