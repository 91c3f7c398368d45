//! Page-scoped settings captured by `init`.
//!
//! [`Settings`] is written exactly once per bootstrap context and read by the
//! frame mount, the message bridge, and the origin resolver afterwards.
//!
//! # Configuration sent to the frame
//!
//! The first message posted to the embedded app carries the merged
//! configuration built by [`Settings::outbound_config`]:
//!
//! ```text
//! base settings (camelCase, including the snippetConfig object itself)
//!     ⊕ snippet config entries          (shallow merge, snippet wins)
//!     − "targetElement"                 (page reference, never serialized)
//! ```

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::config::{BootstrapOptions, MountTarget};

/// Setting key that decides whether chat links reuse the host tab.
pub const SAME_TAB_SETTING: &str = "shouldOpenLinksInSameTab";

/// Key stripped from the outbound configuration.
const TARGET_ELEMENT_KEY: &str = "targetElement";

/// The arguments of the externally invoked `init` operation.
#[derive(Debug, Clone, PartialEq)]
pub struct InitRequest {
    pub agent_id: String,
    pub domain_url: String,
    pub site_url: String,
    /// Caller-supplied overrides, merged over the base settings.
    pub snippet_config: Map<String, Value>,
}

impl InitRequest {
    /// Creates a request with an empty snippet config.
    pub fn new(
        agent_id: impl Into<String>,
        domain_url: impl Into<String>,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            domain_url: domain_url.into(),
            site_url: site_url.into(),
            snippet_config: Map::new(),
        }
    }

    /// Replaces the snippet config.
    pub fn with_snippet_config(mut self, snippet_config: Map<String, Value>) -> Self {
        self.snippet_config = snippet_config;
        self
    }
}

/// Settings for one page lifetime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub dev_mode: bool,
    pub agent_id: String,
    pub domain_url: String,
    /// The site URL exactly as passed to `init`.  Normalization happens in
    /// [`crate::SiteOrigin::parse`].
    pub site_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_open_links_in_same_tab: Option<bool>,
    pub snippet_config: Map<String, Value>,
    /// Mount point for the widget; a page reference, so never serialized.
    #[serde(skip)]
    pub target_element: MountTarget,
}

impl Settings {
    /// Combines the `init` arguments with the host options.
    pub fn new(request: InitRequest, options: &BootstrapOptions) -> Self {
        Self {
            dev_mode: options.dev_mode,
            agent_id: request.agent_id,
            domain_url: request.domain_url,
            site_url: request.site_url,
            should_open_links_in_same_tab: options.should_open_links_in_same_tab,
            snippet_config: request.snippet_config,
            target_element: options.mount_target(),
        }
    }

    /// Builds the configuration object sent to the embedded app.
    pub fn outbound_config(&self) -> Map<String, Value> {
        let mut merged = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // A struct of strings, bools and a JSON map always serializes to
            // an object; an empty base still lets the snippet through.
            _ => Map::new(),
        };

        for (key, value) in &self.snippet_config {
            if merged.contains_key(key) {
                debug!("snippet config overrides base setting `{key}`");
            }
            merged.insert(key.clone(), value.clone());
        }

        merged.remove(TARGET_ELEMENT_KEY);
        merged
    }

    /// Whether links clicked in the chat should open in the host tab.
    ///
    /// The snippet value wins over the host option.  Either is evaluated with
    /// JavaScript truthiness, so `"yes"` and `1` count as true while `""`,
    /// `0` and `null` do not.
    pub fn opens_links_in_same_tab(&self) -> bool {
        match self.snippet_config.get(SAME_TAB_SETTING) {
            Some(value) => is_truthy(value),
            None => self.should_open_links_in_same_tab.unwrap_or(false),
        }
    }
}

/// JavaScript `Boolean(value)` for a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
