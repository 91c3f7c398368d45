//! Location of the companion stylesheet.
//!
//! The stylesheet is deployed next to the bootstrap script, so its URL is the
//! script URL with `/init.js` replaced by `/init.css`.

use thiserror::Error;

/// File name of the bootstrap script.
pub const BOOTSTRAP_SCRIPT_FILE: &str = "/init.js";

/// File name of the stylesheet deployed next to it.
pub const STYLESHEET_FILE: &str = "/init.css";

/// Id given to the `<link>` element.
pub const STYLESHEET_LINK_ID: &str = "css";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StylesheetError {
    /// The script element has no usable `src`.
    #[error("bootstrap script element has no src attribute")]
    MissingSource,

    /// The script `src` does not point at `init.js`, so no sibling path can
    /// be derived from it.
    #[error("bootstrap script source `{0}` does not reference init.js")]
    UnrecognizedScriptSource(String),
}

/// Derives the stylesheet URL from the bootstrap script URL.
///
/// # Errors
///
/// See [`StylesheetError`].
///
/// # Examples
///
/// ```rust
/// use embed_core::domain::stylesheet_href;
///
/// let href = stylesheet_href("https://cdn.example/esw/init.js?v=3").unwrap();
/// assert_eq!(href, "https://cdn.example/esw/init.css");
/// ```
pub fn stylesheet_href(script_src: &str) -> Result<String, StylesheetError> {
    let script_src = script_src.trim();
    if script_src.is_empty() {
        return Err(StylesheetError::MissingSource);
    }

    let base_len = script_src
        .find(BOOTSTRAP_SCRIPT_FILE)
        .ok_or_else(|| StylesheetError::UnrecognizedScriptSource(script_src.to_string()))?;

    Ok(format!("{}{STYLESHEET_FILE}", &script_src[..base_len]))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_path_is_derived() {
        assert_eq!(
            stylesheet_href("https://cdn.example/assets/init.js").unwrap(),
            "https://cdn.example/assets/init.css"
        );
    }

    #[test]
    fn test_query_string_is_dropped() {
        assert_eq!(
            stylesheet_href("https://cdn.example/init.js?cache=1").unwrap(),
            "https://cdn.example/init.css"
        );
    }

    #[test]
    fn test_relative_source_stays_relative() {
        assert_eq!(stylesheet_href("/static/init.js").unwrap(), "/static/init.css");
    }

    #[test]
    fn test_empty_source_fails_fast() {
        assert_eq!(stylesheet_href(" "), Err(StylesheetError::MissingSource));
    }

    #[test]
    fn test_foreign_script_name_is_rejected() {
        // Arrange: the element exists but points at some other bundle
        let result = stylesheet_href("https://cdn.example/bundle.js");

        // Assert: no malformed "/init.css" path is produced
        assert_eq!(
            result,
            Err(StylesheetError::UnrecognizedScriptSource(
                "https://cdn.example/bundle.js".to_string()
            ))
        );
    }
}
