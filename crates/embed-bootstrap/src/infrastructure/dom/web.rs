//! `web-sys` implementation of [`HostPage`].
//!
//! Event listeners registered here (`load`, `error`, `message`) are leaked
//! with [`Closure::forget`]: they live for the page lifetime and there are
//! at most three of them per bootstrap.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, HtmlElement, HtmlIFrameElement, MessageEvent, Window};

use embed_core::domain::config::is_mobile_host_user_agent;

use crate::application::host::{HostError, HostPage, LoadSignal, MessageHandler};

/// Best-effort text for a thrown JS value.
fn js_reason(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn as_html<'a>(element: &'a Element, operation: &'static str) -> Result<&'a HtmlElement, HostError> {
    element
        .dyn_ref::<HtmlElement>()
        .ok_or_else(|| HostError::dom(operation, format!("<{}> is not an HTML element", element.tag_name())))
}

/// The page the bootstrap script runs in.
pub struct WebPage {
    window: Window,
    document: Document,
}

impl WebPage {
    /// Binds to the global `window` and its `document`.
    ///
    /// # Errors
    ///
    /// [`HostError::Dom`] when there is no window (e.g. inside a worker).
    pub fn from_window() -> Result<Self, HostError> {
        let window = web_sys::window().ok_or_else(|| HostError::dom("window", "no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| HostError::dom("document", "window has no document"))?;
        Ok(Self { window, document })
    }
}

impl HostPage for WebPage {
    type Element = Element;

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn head(&self) -> Option<Element> {
        self.document.head().map(Element::from)
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn create_element(&self, tag: &str) -> Result<Element, HostError> {
        self.document
            .create_element(tag)
            .map_err(|e| HostError::dom("createElement", js_reason(&e)))
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) -> Result<(), HostError> {
        element
            .set_attribute(name, value)
            .map_err(|e| HostError::dom("setAttribute", js_reason(&e)))
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_style(&self, element: &Element, property: &str, value: &str) -> Result<(), HostError> {
        as_html(element, "style.setProperty")?
            .style()
            .set_property(property, value)
            .map_err(|e| HostError::dom("style.setProperty", js_reason(&e)))
    }

    fn add_class(&self, element: &Element, class: &str) -> Result<(), HostError> {
        element
            .class_list()
            .add_1(class)
            .map_err(|e| HostError::dom("classList.add", js_reason(&e)))
    }

    fn remove_class(&self, element: &Element, class: &str) -> Result<(), HostError> {
        element
            .class_list()
            .remove_1(class)
            .map_err(|e| HostError::dom("classList.remove", js_reason(&e)))
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<(), HostError> {
        parent
            .append_child(child)
            .map(|_| ())
            .map_err(|e| HostError::dom("appendChild", js_reason(&e)))
    }

    fn watch_load(&self, element: &Element) -> Result<LoadSignal, HostError> {
        let (notifier, signal) = LoadSignal::channel();
        // Whichever event fires first takes the notifier.
        let notifier = Rc::new(RefCell::new(Some(notifier)));

        let on_load = {
            let notifier = Rc::clone(&notifier);
            Closure::wrap(Box::new(move |_event: Event| {
                if let Some(notifier) = notifier.borrow_mut().take() {
                    notifier.loaded();
                }
            }) as Box<dyn FnMut(Event)>)
        };

        let tag = element.tag_name().to_lowercase();
        let on_error = Closure::wrap(Box::new(move |event: Event| {
            if let Some(notifier) = notifier.borrow_mut().take() {
                notifier.failed(format!("{} event on <{tag}>", event.type_()));
            }
        }) as Box<dyn FnMut(Event)>);

        element
            .add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())
            .map_err(|e| HostError::dom("addEventListener(load)", js_reason(&e)))?;
        element
            .add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())
            .map_err(|e| HostError::dom("addEventListener(error)", js_reason(&e)))?;

        on_load.forget();
        on_error.forget();
        Ok(signal)
    }

    fn click(&self, element: &Element) -> Result<(), HostError> {
        as_html(element, "click")?.click();
        Ok(())
    }

    fn post_message(&self, frame: &Element, message: &Value, target_origin: &str) -> Result<(), HostError> {
        let frame = frame
            .dyn_ref::<HtmlIFrameElement>()
            .ok_or_else(|| HostError::dom("postMessage", "target is not an iframe"))?;
        let window = frame.content_window().ok_or(HostError::WindowUnavailable)?;

        let payload = message
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| HostError::Conversion(e.to_string()))?;

        window
            .post_message(&payload, target_origin)
            .map_err(|e| HostError::dom("postMessage", js_reason(&e)))
    }

    fn add_message_listener(&self, handler: MessageHandler) -> Result<(), HostError> {
        let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
            match serde_wasm_bindgen::from_value::<Value>(event.data()) {
                Ok(data) => handler(data),
                Err(e) => warn!("unrecognized postMessage payload that is not JSON-compatible: {e}"),
            }
        }) as Box<dyn FnMut(MessageEvent)>);

        self.window
            .add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref())
            .map_err(|e| HostError::dom("addEventListener(message)", js_reason(&e)))?;

        on_message.forget();
        Ok(())
    }

    fn is_mobile_host_app(&self) -> bool {
        self.window
            .navigator()
            .user_agent()
            .map(|ua| is_mobile_host_user_agent(&ua))
            .unwrap_or(false)
    }
}
