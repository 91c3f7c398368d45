//! Bootstrap configuration types.
//!
//! [`BootstrapOptions`] holds the settings the host application chooses when
//! it creates the bootstrap context, before `init` is ever called.  It can be
//! built in Rust or deserialized from the options object a host page passes to
//! the JavaScript constructor.
//!
//! Keeping configuration as a plain struct (no global slot on `window`, no
//! reads from the page inside the domain) lets the same context type run
//! against the real browser page and the in-memory test page.

use std::fmt;

use serde::Deserialize;

/// Where the widget container is inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MountTarget {
    /// The document `<body>` (the default).
    #[default]
    Body,
    /// An existing element looked up by its `id` attribute.
    ElementId(String),
}

impl fmt::Display for MountTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body => f.write_str("<body>"),
            Self::ElementId(id) => write!(f, "#{id}"),
        }
    }
}

/// Host-chosen options for one bootstrap context.
///
/// # Example
///
/// ```rust
/// use embed_core::{BootstrapOptions, MountTarget};
///
/// let options = BootstrapOptions::default();
/// assert!(!options.dev_mode);
/// assert_eq!(options.mount_target(), MountTarget::Body);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BootstrapOptions {
    /// Loads the embedded site in `lwc.mode=dev` instead of `prod`.
    pub dev_mode: bool,

    /// Id of the element the widget is mounted into.  `None` mounts into
    /// `<body>`.
    pub target_element_id: Option<String>,

    /// Base value of the `shouldOpenLinksInSameTab` setting.
    ///
    /// A snippet config key of the same name overrides it.  When neither is
    /// set, links clicked inside the chat open in a new tab.
    pub should_open_links_in_same_tab: Option<bool>,

    /// `tracing-subscriber` filter directive used for console logging,
    /// e.g. `"info"` or `"embed_bootstrap=debug"`.
    pub log_filter: String,
}

impl Default for BootstrapOptions {
    /// | Field                          | Default  |
    /// |--------------------------------|----------|
    /// | dev_mode                       | `false`  |
    /// | target_element_id              | `None`   |
    /// | should_open_links_in_same_tab  | `None`   |
    /// | log_filter                     | `"info"` |
    fn default() -> Self {
        Self {
            dev_mode: false,
            target_element_id: None,
            should_open_links_in_same_tab: None,
            log_filter: "info".to_string(),
        }
    }
}

impl BootstrapOptions {
    /// Returns the element the widget container will be appended to.
    ///
    /// A blank id is treated as "not set".
    pub fn mount_target(&self) -> MountTarget {
        match self.target_element_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => MountTarget::ElementId(id.to_string()),
            _ => MountTarget::Body,
        }
    }
}

/// User agent token set by the mobile host application's web views.
pub const MOBILE_HOST_UA_MARKER: &str = "SalesforceMobileSDK";

/// Whether `user_agent` belongs to the mobile host application.
pub fn is_mobile_host_user_agent(user_agent: &str) -> bool {
    user_agent.contains(MOBILE_HOST_UA_MARKER)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
