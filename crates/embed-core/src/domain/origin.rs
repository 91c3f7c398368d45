//! Origin resolution for cross-frame communication.
//!
//! The configured site URL is used twice: as the iframe's initial location and
//! as the `targetOrigin` of every `postMessage` sent to it.  Scoping posts to
//! that single origin is a security boundary.  If the frame is ever navigated
//! to a foreign document, the browser drops the message instead of leaking the
//! configuration to it.  For that reason a [`SiteOrigin`] can never be empty
//! or the `*` wildcard.

use thiserror::Error;

use crate::domain::settings::Settings;

/// Reasons a usable site origin could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OriginError {
    /// `init` has not populated the settings yet.
    #[error("settings have not been populated; call init first")]
    NotConfigured,

    /// The configured site URL is empty or whitespace.
    #[error("site URL is empty")]
    Empty,

    /// The configured site URL is the `*` wildcard, which would post to any
    /// document loaded in the frame.
    #[error("site URL must not be the `*` wildcard")]
    Wildcard,
}

/// A validated site origin, normalized to end with `/`.
///
/// The trailing separator matters for the iframe location: without it the
/// embedded site answers with a redirect before the app loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteOrigin(String);

impl SiteOrigin {
    /// Validates and normalizes a raw site URL.
    ///
    /// # Errors
    ///
    /// Returns [`OriginError::Empty`] for blank input and
    /// [`OriginError::Wildcard`] for `*`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use embed_core::SiteOrigin;
    ///
    /// let origin = SiteOrigin::parse("https://example.com").unwrap();
    /// assert_eq!(origin.as_str(), "https://example.com/");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, OriginError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(OriginError::Empty);
        }
        if trimmed == "*" {
            return Err(OriginError::Wildcard);
        }

        let mut normalized = trimmed.to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        Ok(Self(normalized))
    }

    /// Returns the normalized origin string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the iframe location: the origin plus the mode query string.
    pub fn frame_url(&self, dev_mode: bool) -> String {
        let mode = if dev_mode { "dev" } else { "prod" };
        format!("{}?lwc.mode={mode}", self.0)
    }
}

/// Resolves the trusted origin from the page-scoped settings.
///
/// Callers must not post anything when this fails.
///
/// # Errors
///
/// [`OriginError::NotConfigured`] when `settings` is `None`, otherwise the
/// errors of [`SiteOrigin::parse`].
pub fn resolve_origin(settings: Option<&Settings>) -> Result<SiteOrigin, OriginError> {
    let settings = settings.ok_or(OriginError::NotConfigured)?;
    SiteOrigin::parse(&settings.site_url)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::BootstrapOptions;
    use crate::domain::settings::InitRequest;

    fn settings_with_site(site_url: &str) -> Settings {
        Settings::new(
            InitRequest::new("agent-1", "https://org.example", site_url),
            &BootstrapOptions::default(),
        )
    }

    #[test]
    fn test_parse_appends_trailing_slash() {
        // Arrange / Act
        let origin = SiteOrigin::parse("https://example.com").unwrap();

        // Assert
        assert_eq!(origin.as_str(), "https://example.com/");
    }

    #[test]
    fn test_parse_keeps_existing_trailing_slash() {
        let origin = SiteOrigin::parse("https://example.com/chat/").unwrap();
        assert_eq!(origin.as_str(), "https://example.com/chat/");
    }

    #[test]
    fn test_parse_rejects_empty_and_blank() {
        assert_eq!(SiteOrigin::parse(""), Err(OriginError::Empty));
        assert_eq!(SiteOrigin::parse("  "), Err(OriginError::Empty));
    }

    #[test]
    fn test_parse_rejects_wildcard() {
        assert_eq!(SiteOrigin::parse("*"), Err(OriginError::Wildcard));
    }

    #[test]
    fn test_frame_url_selects_mode() {
        let origin = SiteOrigin::parse("https://example.com").unwrap();
        assert_eq!(origin.frame_url(false), "https://example.com/?lwc.mode=prod");
        assert_eq!(origin.frame_url(true), "https://example.com/?lwc.mode=dev");
    }

    #[test]
    fn test_resolve_without_settings_is_not_configured() {
        assert_eq!(resolve_origin(None), Err(OriginError::NotConfigured));
    }

    #[test]
    fn test_resolve_uses_site_url_from_settings() {
        let settings = settings_with_site("https://site.example/esw");
        let origin = resolve_origin(Some(&settings)).unwrap();
        assert_eq!(origin.as_str(), "https://site.example/esw/");
    }

    #[test]
    fn test_resolve_reports_empty_site_url() {
        let settings = settings_with_site("");
        assert_eq!(resolve_origin(Some(&settings)), Err(OriginError::Empty));
    }
}
