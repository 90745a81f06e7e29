//! Share links that carry a greeting's text through a URL query string.
//!
//! A link holds exactly three query keys: `theme`, `greeting`, `poem`.
//! Image and audio are never placed in a link; a greeting restored from one
//! always has both slots `Unavailable`.
//!
//! ```
//! use greeting_box::content::ContentAggregate;
//! use greeting_box::share::ShareCodec;
//!
//! let codec = ShareCodec::new("https://cards.example.com/box/").unwrap();
//! let card = ContentAggregate::from_shared("Cozy Cabin", "Hi Ada!", "line1\nline2");
//!
//! let link = codec.encode(&card);
//! assert_eq!(
//!     link,
//!     "https://cards.example.com/box/?theme=Cozy+Cabin&greeting=Hi+Ada%21&poem=line1%0Aline2"
//! );
//! assert_eq!(ShareCodec::decode(&link), Some(card));
//! ```

pub mod clipboard;
pub mod targets;

use thiserror::Error;
use url::{form_urlencoded, Url};

use crate::content::ContentAggregate;

pub use clipboard::{copy_to_clipboard, ClipboardError};
pub use targets::{intent_url, invitation_text, ShareTarget, SHARE_TEXT};

const KEY_THEME: &str = "theme";
const KEY_GREETING: &str = "greeting";
const KEY_POEM: &str = "poem";

// ---------------------------------------------------------------------------
// ShareLinkError
// ---------------------------------------------------------------------------

/// Reasons a transport string does not hold share state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareLinkError {
    /// The base URL could not be parsed or cannot carry a query.
    #[error("invalid share base URL: {0}")]
    InvalidUrl(String),

    /// At least one of `theme`, `greeting`, `poem` is missing or empty.
    #[error("share link is missing `{0}`")]
    Incomplete(&'static str),
}

// ---------------------------------------------------------------------------
// ShareCodec
// ---------------------------------------------------------------------------

/// Builds and reads share links rooted at a fixed origin + base path.
#[derive(Debug, Clone)]
pub struct ShareCodec {
    base: Url,
}

impl ShareCodec {
    /// Create a codec for `base_url`.  Any query or fragment on the base is
    /// discarded.
    pub fn new(base_url: &str) -> Result<Self, ShareLinkError> {
        let mut base =
            Url::parse(base_url).map_err(|e| ShareLinkError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ShareLinkError::InvalidUrl(base_url.to_string()));
        }
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { base })
    }

    /// Origin + base path, without any share state.
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// Fully-qualified link carrying the aggregate's text fields only.
    pub fn encode(&self, aggregate: &ContentAggregate) -> String {
        let mut link = self.base.clone();
        link.query_pairs_mut()
            .clear()
            .append_pair(KEY_THEME, aggregate.theme())
            .append_pair(KEY_GREETING, aggregate.greeting())
            .append_pair(KEY_POEM, aggregate.poem());
        link.into()
    }

    /// Restore a text-only aggregate from a link, a relative path with a
    /// query, or a bare query string.  Returns `None` when any key is
    /// missing; that is the normal "no share state" answer, not an error.
    pub fn decode(transport: &str) -> Option<ContentAggregate> {
        match Self::parse(transport) {
            Ok(aggregate) => Some(aggregate),
            Err(e) => {
                log::debug!("share: no share state ({e})");
                None
            }
        }
    }

    /// Like [`decode`](Self::decode) but reports which key was missing.
    pub fn parse(transport: &str) -> Result<ContentAggregate, ShareLinkError> {
        let query = query_of(transport);

        let mut theme = None;
        let mut greeting = None;
        let mut poem = None;

        // First occurrence of each key wins.
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match &*key {
                KEY_THEME => &mut theme,
                KEY_GREETING => &mut greeting,
                KEY_POEM => &mut poem,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        let theme = non_empty(theme).ok_or(ShareLinkError::Incomplete(KEY_THEME))?;
        let greeting = non_empty(greeting).ok_or(ShareLinkError::Incomplete(KEY_GREETING))?;
        let poem = non_empty(poem).ok_or(ShareLinkError::Incomplete(KEY_POEM))?;

        Ok(ContentAggregate::from_shared(&theme, &greeting, &poem))
    }

    /// `transport` with its query and fragment removed, so reloading it
    /// starts a fresh session.
    pub fn clear(transport: &str) -> String {
        match Url::parse(transport) {
            Ok(mut url) => {
                url.set_query(None);
                url.set_fragment(None);
                url.into()
            }
            Err(_) => transport
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Extract the query component of an absolute URL, a relative reference,
/// or a bare query string.
fn query_of(transport: &str) -> String {
    if let Ok(url) = Url::parse(transport) {
        return url.query().unwrap_or_default().to_string();
    }
    let without_fragment = transport.split('#').next().unwrap_or_default();
    match without_fragment.split_once('?') {
        Some((_, query)) => query.to_string(),
        None => without_fragment.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Modality;

    fn codec() -> ShareCodec {
        ShareCodec::new("http://localhost:3000/").unwrap()
    }

    #[test]
    fn round_trip_preserves_newlines_and_punctuation() {
        let poem = "Snow is falling, engines roar,\nChristmas cheer & so much more.\n\
                    In twenty-twenty-five we say:\n\"Have a happy holiday!\" 100% #joy";
        let card = ContentAggregate::from_shared("Cyberpunk 2025", "Merry Christmas 2025, Zoë!", poem);

        let restored = ShareCodec::decode(&codec().encode(&card)).expect("complete link");
        assert_eq!(restored.theme(), card.theme());
        assert_eq!(restored.greeting(), card.greeting());
        assert_eq!(restored.poem(), poem);
    }

    #[test]
    fn round_trip_of_plus_and_percent_literals() {
        let card = ContentAggregate::from_shared("8-Bit Retro", "1+1=2", "50%+\r\nend");
        let restored = ShareCodec::decode(&codec().encode(&card)).unwrap();
        assert_eq!(restored, card);
    }

    #[test]
    fn encode_is_fully_qualified_and_keeps_base_path() {
        let codec = ShareCodec::new("https://cards.example.com/app/index.html?old=1#frag").unwrap();
        let link = codec.encode(&ContentAggregate::from_shared("a", "b", "c"));
        assert_eq!(link, "https://cards.example.com/app/index.html?theme=a&greeting=b&poem=c");
    }

    #[test]
    fn decoded_aggregate_has_no_image_or_audio() {
        let agg = ShareCodec::decode("?theme=a&greeting=b&poem=c").unwrap();
        assert!(matches!(agg.image(), Modality::Unavailable));
        assert!(matches!(agg.audio(), Modality::Unavailable));
    }

    #[test]
    fn missing_any_key_means_no_share_state() {
        assert!(ShareCodec::decode("http://localhost:3000/?greeting=b&poem=c").is_none());
        assert!(ShareCodec::decode("http://localhost:3000/?theme=a&poem=c").is_none());
        assert!(ShareCodec::decode("http://localhost:3000/?theme=a&greeting=b").is_none());
        assert!(ShareCodec::decode("http://localhost:3000/").is_none());
        assert!(ShareCodec::decode("").is_none());
    }

    #[test]
    fn parse_names_the_missing_key() {
        assert_eq!(
            ShareCodec::parse("?theme=a&greeting=b").unwrap_err(),
            ShareLinkError::Incomplete("poem")
        );
    }

    #[test]
    fn empty_value_counts_as_missing() {
        assert!(ShareCodec::decode("?theme=&greeting=b&poem=c").is_none());
    }

    #[test]
    fn garbage_input_never_panics() {
        for input in ["%%%", "?=&=&", "theme", "::::", "?theme=%ZZ&greeting=%&poem=%0"] {
            let _ = ShareCodec::decode(input);
        }
    }

    #[test]
    fn relative_and_bare_queries_decode() {
        let bare = ShareCodec::decode("theme=a&greeting=b&poem=c").unwrap();
        let relative = ShareCodec::decode("/box/?theme=a&greeting=b&poem=c#top").unwrap();
        assert_eq!(bare, relative);
    }

    #[test]
    fn first_occurrence_wins_and_extra_keys_are_ignored() {
        let agg = ShareCodec::decode("?theme=a&theme=z&utm=x&greeting=b&poem=c").unwrap();
        assert_eq!(agg.theme(), "a");
    }

    #[test]
    fn clear_strips_share_state() {
        assert_eq!(
            ShareCodec::clear("http://localhost:3000/box/?theme=a&greeting=b&poem=c#x"),
            "http://localhost:3000/box/"
        );
        assert_eq!(ShareCodec::clear("/box/?theme=a"), "/box/");
    }

    #[test]
    fn invalid_base_is_rejected() {
        assert!(matches!(
            ShareCodec::new("not a url"),
            Err(ShareLinkError::InvalidUrl(_))
        ));
        assert!(ShareCodec::new("mailto:someone@example.com").is_err());
    }
}
