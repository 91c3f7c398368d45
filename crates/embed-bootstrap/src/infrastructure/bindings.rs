//! JavaScript entry point.
//!
//! ```js
//! import init, { EmbeddedMessaging } from "./embed_bootstrap.js";
//!
//! await init();
//! const esw = new EmbeddedMessaging({ targetElementId: "chat-slot" });
//! esw.init("0Xx000000000001", "https://org.example", "https://site.example/esw", {
//!   language: "en_US",
//! });
//! ```

use serde_json::{Map, Value};
use tracing::{error, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use embed_core::{BootstrapOptions, InitRequest};

use crate::application::{Bootstrap, SendOutcome};
use crate::infrastructure::dom::web::WebPage;
use crate::infrastructure::logging::{init_logging, LoggingError, WebConsoleSink};

fn is_absent(value: &JsValue) -> bool {
    value.is_undefined() || value.is_null()
}

/// The bootstrap object exposed to the host page.
#[wasm_bindgen]
pub struct EmbeddedMessaging {
    bootstrap: Bootstrap<WebPage>,
}

#[wasm_bindgen]
impl EmbeddedMessaging {
    /// `new EmbeddedMessaging(options?)`
    ///
    /// Throws if `options` is not an object of the expected shape or the
    /// script is not running in a window.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<EmbeddedMessaging, JsError> {
        console_error_panic_hook::set_once();

        let options: BootstrapOptions = if is_absent(&options) {
            BootstrapOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)
                .map_err(|e| JsError::new(&format!("invalid embedded messaging options: {e}")))?
        };

        match init_logging(&options.log_filter, WebConsoleSink) {
            Ok(()) | Err(LoggingError::AlreadyInstalled) => {}
            Err(e) => web_sys::console::warn_1(&JsValue::from_str(&e.to_string())),
        }

        let page = WebPage::from_window().map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Self {
            bootstrap: Bootstrap::new(page, options),
        })
    }

    /// Starts the bootstrap.  Returns `false` if it was already started.
    ///
    /// Startup continues in the background; its outcome is logged and
    /// visible through [`phase`](Self::phase).
    pub fn init(
        &self,
        agent_id: String,
        domain_url: String,
        site_url: String,
        snippet_config: JsValue,
    ) -> bool {
        let snippet = if is_absent(&snippet_config) {
            Map::new()
        } else {
            match serde_wasm_bindgen::from_value::<Value>(snippet_config) {
                Ok(Value::Object(map)) => map,
                Ok(other) => {
                    warn!("snippet config must be an object, ignoring {other}");
                    Map::new()
                }
                Err(e) => {
                    warn!("snippet config could not be read, ignoring it: {e}");
                    Map::new()
                }
            }
        };

        let request = InitRequest::new(agent_id, domain_url, site_url).with_snippet_config(snippet);
        match self.bootstrap.init(request) {
            Ok(startup) => {
                spawn_local(async move {
                    // Failures are logged and recorded in the phase.
                    let _ = startup.await;
                });
                true
            }
            Err(_) => false,
        }
    }

    /// Posts `{ method, data? }` to the frame.  Returns `false` if the frame
    /// is not available yet.
    ///
    /// Throws on an invalid method or a missing site origin.
    pub fn send(&self, method: String, data: JsValue) -> Result<bool, JsError> {
        let data = if is_absent(&data) {
            None
        } else {
            Some(
                serde_wasm_bindgen::from_value::<Value>(data)
                    .map_err(|e| JsError::new(&format!("message data is not JSON-compatible: {e}")))?,
            )
        };

        match self.bootstrap.bridge().send(&method, data) {
            Ok(SendOutcome::Delivered) => Ok(true),
            Ok(SendOutcome::FrameUnavailable) => Ok(false),
            Err(e) => {
                error!("send `{method}` failed: {e}");
                Err(JsError::new(&e.to_string()))
            }
        }
    }

    /// `"uninitialized"`, `"initializing"`, `"ready"` or `"failed"`.
    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> String {
        self.bootstrap.phase().to_string()
    }
}
