//! Resource loader: attaches the companion stylesheet.
//!
//! Styling is best-effort.  The loader runs beside the frame mount, and the
//! controller only logs its outcome; nothing here can fail initialization.

use thiserror::Error;
use tracing::debug;

use embed_core::domain::frame::BOOTSTRAP_SCRIPT_ID;
use embed_core::domain::stylesheet::STYLESHEET_LINK_ID;
use embed_core::domain::{stylesheet_href, StylesheetError};

use crate::application::host::{HostError, HostPage, LoadError, LoadSignal};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// The bootstrap `<script>` element is not on the page, so there is no
    /// location to derive the stylesheet from.
    #[error("failed to locate the bootstrap script element `#{0}` on the page")]
    ScriptNotFound(&'static str),

    #[error(transparent)]
    Location(#[from] StylesheetError),

    #[error("document has no <head> to attach the stylesheet to")]
    HeadMissing,

    #[error("could not attach the stylesheet: {0}")]
    Host(#[from] HostError),

    #[error("stylesheet did not load: {0}")]
    Load(#[from] LoadError),
}

/// Appends the `<link rel="stylesheet">` and returns its load signal and href.
///
/// # Errors
///
/// Fails fast with [`ResourceError::ScriptNotFound`] or
/// [`ResourceError::Location`] before creating anything.
pub fn attach_stylesheet<P: HostPage>(page: &P) -> Result<(String, LoadSignal), ResourceError> {
    let script = page
        .element_by_id(BOOTSTRAP_SCRIPT_ID)
        .ok_or(ResourceError::ScriptNotFound(BOOTSTRAP_SCRIPT_ID))?;
    let script_src = page.attribute(&script, "src").unwrap_or_default();
    let href = stylesheet_href(&script_src)?;

    let head = page.head().ok_or(ResourceError::HeadMissing)?;

    let link = page.create_element("link")?;
    page.set_attribute(&link, "id", STYLESHEET_LINK_ID)?;
    page.set_attribute(&link, "class", STYLESHEET_LINK_ID)?;
    page.set_attribute(&link, "rel", "stylesheet")?;
    page.set_attribute(&link, "type", "text/css")?;
    page.set_attribute(&link, "href", &href)?;

    let loaded = page.watch_load(&link)?;
    page.append_child(&head, &link)?;

    debug!("requested stylesheet {href}");
    Ok((href, loaded))
}

/// Attaches the stylesheet and waits for it to load.
///
/// Returns the stylesheet URL on success.
///
/// # Errors
///
/// See [`ResourceError`].
pub async fn load_stylesheet<P: HostPage>(page: &P) -> Result<String, ResourceError> {
    let (href, loaded) = attach_stylesheet(page)?;
    loaded.wait().await?;
    Ok(href)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::dom::mock::MockPage;

    #[test]
    fn test_link_is_appended_to_head_with_sibling_href() {
        // Arrange
        let page = MockPage::new().with_bootstrap_script("https://cdn.example/esw/init.js");

        // Act
        let (href, _loaded) = attach_stylesheet(&page).expect("attach should succeed");

        // Assert
        assert_eq!(href, "https://cdn.example/esw/init.css");
        let link = page.element_by_id(STYLESHEET_LINK_ID).expect("link attached");
        assert_eq!(page.parent_of(&link), page.head());
        assert_eq!(page.attribute(&link, "rel").as_deref(), Some("stylesheet"));
        assert_eq!(page.attribute(&link, "type").as_deref(), Some("text/css"));
        assert_eq!(page.attribute(&link, "href").as_deref(), Some(href.as_str()));
    }

    #[test]
    fn test_missing_script_fails_fast_without_creating_a_link() {
        let page = MockPage::new();

        let result = attach_stylesheet(&page);

        assert!(matches!(result, Err(ResourceError::ScriptNotFound(BOOTSTRAP_SCRIPT_ID))));
        assert!(page.element_by_id(STYLESHEET_LINK_ID).is_none());
    }

    #[test]
    fn test_unrecognized_script_source_is_descriptive() {
        let page = MockPage::new().with_bootstrap_script("https://cdn.example/bundle.min.js");
        let err = attach_stylesheet(&page).unwrap_err();
        assert!(err.to_string().contains("does not reference init.js"));
    }

    #[tokio::test]
    async fn test_load_resolves_with_href_once_link_loads() {
        let page = MockPage::new().with_bootstrap_script("/static/init.js");
        let mut load = tokio_test::task::spawn(load_stylesheet(&page));

        tokio_test::assert_pending!(load.poll());
        assert!(page.fire_load(STYLESHEET_LINK_ID));

        assert_eq!(tokio_test::assert_ready_ok!(load.poll()), "/static/init.css");
    }

    #[tokio::test]
    async fn test_link_error_event_is_reported() {
        let page = MockPage::new().with_bootstrap_script("/static/init.js");
        let mut load = tokio_test::task::spawn(load_stylesheet(&page));

        tokio_test::assert_pending!(load.poll());
        page.fire_error(STYLESHEET_LINK_ID, "404");

        assert_eq!(
            tokio_test::assert_ready_err!(load.poll()),
            ResourceError::Load(LoadError::Failed("404".to_string()))
        );
    }
}
