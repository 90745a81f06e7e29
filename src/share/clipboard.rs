//! Clipboard copy backed by the `arboard` crate.
//!
//! A short-lived [`arboard::Clipboard`] handle is created per call because
//! the handle is not `Send` on all platforms and is cheap to create.

use arboard::Clipboard;
use thiserror::Error;

/// Errors from the system clipboard.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Access(String),

    #[error("failed to write clipboard: {0}")]
    Set(String),
}

/// Write `text` into the system clipboard, replacing whatever was there.
///
/// # Errors
///
/// Returns [`ClipboardError::Access`] if the clipboard cannot be opened, or
/// [`ClipboardError::Set`] if writing fails.  Callers fall back to showing
/// the link so the user can copy it by hand.
pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    let mut clipboard = Clipboard::new().map_err(|e| ClipboardError::Access(e.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|e| ClipboardError::Set(e.to_string()))
}
