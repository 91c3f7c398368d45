//! The host page port.
//!
//! The application layer decides *what* happens to the page (which elements
//! exist, which classes they carry, where messages go); a [`HostPage`]
//! implementation decides *how*.  The browser implementation lives in
//! `infrastructure::dom::web`; tests use `infrastructure::dom::mock::MockPage`.

use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;

/// Failure of a single page operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// A DOM call threw or returned an unusable value.
    #[error("DOM operation `{operation}` failed: {reason}")]
    Dom {
        operation: &'static str,
        reason: String,
    },

    /// The iframe has no browsing context to post to (detached or unloaded).
    #[error("embedded frame window is not available")]
    WindowUnavailable,

    /// A message could not be converted into a structured-clone value.
    #[error("message could not be converted for posting: {0}")]
    Conversion(String),
}

impl HostError {
    pub fn dom(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Dom {
            operation,
            reason: reason.into(),
        }
    }
}

/// Why an element never reported `load`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The element fired `error`.
    #[error("element fired an error event: {0}")]
    Failed(String),

    /// The listeners were dropped before either event fired.
    #[error("load listener was dropped before the element finished loading")]
    Abandoned,
}

/// Sending half of a load signal, held by the page's event listeners.
#[derive(Debug)]
pub struct LoadNotifier {
    tx: oneshot::Sender<Result<(), LoadError>>,
}

impl LoadNotifier {
    /// Reports the element's `load` event.
    pub fn loaded(self) {
        // The receiver is gone only if startup was dropped; nothing to tell.
        let _ = self.tx.send(Ok(()));
    }

    /// Reports the element's `error` event.
    pub fn failed(self, reason: impl Into<String>) {
        let _ = self.tx.send(Err(LoadError::Failed(reason.into())));
    }
}

/// Receiving half of a load signal, awaited by the application layer.
#[derive(Debug)]
pub struct LoadSignal {
    rx: oneshot::Receiver<Result<(), LoadError>>,
}

impl LoadSignal {
    /// Creates a connected notifier/signal pair.
    pub fn channel() -> (LoadNotifier, LoadSignal) {
        let (tx, rx) = oneshot::channel();
        (LoadNotifier { tx }, LoadSignal { rx })
    }

    /// Waits for the element's `load` or `error` event.
    ///
    /// # Errors
    ///
    /// [`LoadError::Failed`] on `error`, [`LoadError::Abandoned`] if the
    /// notifier was dropped unused.
    pub async fn wait(self) -> Result<(), LoadError> {
        self.rx.await.unwrap_or(Err(LoadError::Abandoned))
    }
}

/// Callback invoked with the `data` of every `message` event on the page.
pub type MessageHandler = Box<dyn Fn(Value)>;

/// The operations the bootstrap needs from the page it runs in.
///
/// Everything is single-threaded: implementations run on the browser event
/// loop and need not be `Send`.
pub trait HostPage: 'static {
    /// Handle to a page element.  Cheap to clone.
    type Element: Clone + 'static;

    /// The document `<body>`.
    fn body(&self) -> Option<Self::Element>;

    /// The document `<head>`.
    fn head(&self) -> Option<Self::Element>;

    /// Looks up an element attached to the document by id.
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// Creates a detached element.
    fn create_element(&self, tag: &str) -> Result<Self::Element, HostError>;

    fn set_attribute(
        &self,
        element: &Self::Element,
        name: &str,
        value: &str,
    ) -> Result<(), HostError>;

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    /// Sets one inline style property, e.g. `("width", "300px")`.
    fn set_style(
        &self,
        element: &Self::Element,
        property: &str,
        value: &str,
    ) -> Result<(), HostError>;

    fn add_class(&self, element: &Self::Element, class: &str) -> Result<(), HostError>;

    fn remove_class(&self, element: &Self::Element, class: &str) -> Result<(), HostError>;

    fn append_child(&self, parent: &Self::Element, child: &Self::Element)
        -> Result<(), HostError>;

    /// Attaches `load` / `error` listeners to `element`.
    ///
    /// Must be called before the element is inserted so an early `load`
    /// cannot be missed.
    fn watch_load(&self, element: &Self::Element) -> Result<LoadSignal, HostError>;

    /// Programmatically activates an element (used for anchors).
    fn click(&self, element: &Self::Element) -> Result<(), HostError>;

    /// Posts `message` to the content window of `frame`, restricted to
    /// `target_origin`.
    fn post_message(
        &self,
        frame: &Self::Element,
        message: &Value,
        target_origin: &str,
    ) -> Result<(), HostError>;

    /// Registers a page-level `message` event listener for the page lifetime.
    fn add_message_listener(&self, handler: MessageHandler) -> Result<(), HostError>;

    /// Whether the page runs inside the mobile host application, where the
    /// app controls link navigation itself.
    fn is_mobile_host_app(&self) -> bool;
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_signal_resolves_on_loaded() {
        // Arrange
        let (notifier, signal) = LoadSignal::channel();

        // Act
        notifier.loaded();

        // Assert
        assert_eq!(signal.wait().await, Ok(()));
    }

    #[tokio::test]
    async fn test_signal_reports_error_event() {
        let (notifier, signal) = LoadSignal::channel();
        notifier.failed("net::ERR_NAME_NOT_RESOLVED");
        assert_eq!(
            signal.wait().await,
            Err(LoadError::Failed("net::ERR_NAME_NOT_RESOLVED".to_string()))
        );
    }

    #[tokio::test]
    async fn test_dropped_notifier_abandons_signal() {
        let (notifier, signal) = LoadSignal::channel();
        drop(notifier);
        assert_eq!(signal.wait().await, Err(LoadError::Abandoned));
    }

    #[test]
    fn test_notifying_after_receiver_dropped_does_not_panic() {
        let (notifier, signal) = LoadSignal::channel();
        drop(signal);
        notifier.loaded();
    }
}
