//! Social share targets for a finished greeting link.

use url::Url;

/// Invitation shown alongside every shared link.
pub const SHARE_TEXT: &str = "🎁 I have a magical Christmas surprise for you!";

/// Where the user wants to send the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareTarget {
    /// Put the invitation + link on the system clipboard.
    CopyLink,
    WhatsApp,
    Twitter,
    Facebook,
}

/// Text placed on the clipboard for [`ShareTarget::CopyLink`].
pub fn invitation_text(link: &str) -> String {
    format!("{SHARE_TEXT} {link}")
}

/// Web intent URL that opens the target's composer with `link` prefilled.
///
/// Returns `None` for [`ShareTarget::CopyLink`], which has no intent page.
pub fn intent_url(target: ShareTarget, link: &str) -> Option<String> {
    let url = match target {
        ShareTarget::CopyLink => return None,
        ShareTarget::WhatsApp => Url::parse_with_params(
            "https://wa.me/",
            &[(
                "text",
                format!("{SHARE_TEXT} Tap to open Pandora's Box:\n\n{link}"),
            )],
        ),
        ShareTarget::Twitter => Url::parse_with_params(
            "https://twitter.com/intent/tweet",
            &[
                ("text", format!("{SHARE_TEXT} Open Pandora's Box:")),
                ("url", link.to_string()),
            ],
        ),
        ShareTarget::Facebook => Url::parse_with_params(
            "https://www.facebook.com/sharer/sharer.php",
            &[("u", link.to_string())],
        ),
    };
    url.ok().map(String::from)
}
