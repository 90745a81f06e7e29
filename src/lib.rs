//! Greeting Box, personalised holiday greetings with text, illustration
//! and spoken poem, delivered progressively and shareable by link.
//!
//! | Module     | Role                                                         |
//! |------------|--------------------------------------------------------------|
//! | `config`   | TOML settings and platform paths                             |
//! | `content`  | user input, themes, the evolving [`content::ContentAggregate`] |
//! | `provider` | generation backend contract + Gemini implementation          |
//! | `audio`    | PCM16 decode, resampling, playback                           |
//! | `share`    | share-link codec, share targets, clipboard                   |
//! | `pipeline` | generation orchestrator and session state machine            |

pub mod audio;
pub mod config;
pub mod content;
pub mod pipeline;
pub mod provider;
pub mod share;
