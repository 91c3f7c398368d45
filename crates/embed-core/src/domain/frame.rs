//! Description of the widget container and the sandboxed iframe.
//!
//! The frame mount in `embed-bootstrap` turns a [`FrameBlueprint`] into real
//! elements.  Keeping the element ids, the sandbox allow-list and the iframe
//! location here means they are fixed by the domain, not by whichever page
//! adapter happens to render them.

use crate::domain::origin::{OriginError, SiteOrigin};
use crate::domain::settings::Settings;

/// Id and class of the top-level widget container.
pub const CONTAINER_ID: &str = "embedded-messaging";

/// Id, class and title of the iframe hosting the chat application.
pub const FRAME_ID: &str = "embedded-messaging-frame";

/// Id of the `<script>` element that loaded the bootstrap.
pub const BOOTSTRAP_SCRIPT_ID: &str = "init-embedded-messaging";

/// Capabilities granted to the embedded document.  Nothing beyond this list.
pub const SANDBOX_ALLOW_LIST: [&str; 6] = [
    "allow-scripts",
    "allow-same-origin",
    "allow-modals",
    "allow-downloads",
    "allow-popups",
    "allow-popups-to-escape-sandbox",
];

/// Permissions policy for the iframe; the microphone backs voice conversations.
pub const FRAME_PERMISSIONS: &str = "microphone";

/// Everything needed to create the iframe element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBlueprint {
    /// Navigation target: site origin plus `?lwc.mode=dev|prod`.
    pub src: String,
    /// Space-separated sandbox tokens.
    pub sandbox: String,
    pub allow: &'static str,
    pub title: &'static str,
}

impl FrameBlueprint {
    /// Builds the blueprint from populated settings.
    ///
    /// # Errors
    ///
    /// Returns [`OriginError`] if the site URL cannot be used as an origin.
    pub fn for_settings(settings: &Settings) -> Result<Self, OriginError> {
        let origin = SiteOrigin::parse(&settings.site_url)?;
        Ok(Self {
            src: origin.frame_url(settings.dev_mode),
            sandbox: SANDBOX_ALLOW_LIST.join(" "),
            allow: FRAME_PERMISSIONS,
            title: FRAME_ID,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
