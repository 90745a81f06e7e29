//! Static greeting text used when the text model is unavailable.
//!
//! Two levels of fallback exist:
//! * the model answered but left a field out: [`default_greeting`] /
//!   [`DEFAULT_POEM`] fill the gap;
//! * the call failed outright: [`fallback_text`] replaces both fields.

use super::GreetingText;

/// Poem used when a successful response omits the `poem` field.
pub const DEFAULT_POEM: &str = "Snow is falling, engines roar,\n\
Christmas cheer and so much more.\n\
In twenty-twenty-five we say,\n\
Have a happy holiday!";

/// Poem used when text generation fails entirely.
pub const FALLBACK_POEM: &str = "The stars shine bright above the night,\n\
To bring you joy and pure delight.\n\
A magic box just for you,\n\
May all your Christmas wishes come true.";

/// Greeting used when a successful response omits the `greeting` field.
pub fn default_greeting(name: &str, year: u16) -> String {
    format!("Merry Christmas {year}, {name}!")
}

/// Complete replacement text for a failed text request.
///
/// Never empty, so a run always has something to show.
pub fn fallback_text(year: u16) -> GreetingText {
    GreetingText {
        greeting: format!("Happy Holidays {year}!"),
        poem: FALLBACK_POEM.to_string(),
    }
}
