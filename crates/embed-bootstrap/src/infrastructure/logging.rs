//! Logging setup: `tracing-subscriber` formatting into a console.
//!
//! A browser has no stdout.  The formatted output of the `fmt` subscriber is
//! instead handed line by line to a [`ConsoleSink`], together with the level
//! of the event that produced it, so errors land in `console.error` and
//! warnings in `console.warn`.
//!
//! ```text
//! tracing::warn!(…) ─▶ fmt layer ─▶ ConsoleMakeWriter::make_writer_for(meta)
//!                                        │
//!                                        ▼
//!                                 ConsoleLineWriter (buffers one event)
//!                                        │ drop
//!                                        ▼
//!                                 ConsoleSink::write_line(Level::WARN, "…")
//! ```

use std::io::{self, Write};
use std::sync::Arc;

use thiserror::Error;
use tracing::{Level, Metadata, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Errors from installing the log subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter `{filter}`: {reason}")]
    InvalidFilter { filter: String, reason: String },

    /// Another subscriber is already the global default (for example a
    /// second bootstrap instance on the same page).
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
}

/// Destination for formatted log lines.
pub trait ConsoleSink: Send + Sync + 'static {
    fn write_line(&self, level: Level, line: &str);
}

/// [`MakeWriter`] that routes every event to a [`ConsoleSink`] by level.
pub struct ConsoleMakeWriter<S> {
    sink: Arc<S>,
}

impl<S: ConsoleSink> ConsoleMakeWriter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    fn writer(&self, level: Level) -> ConsoleLineWriter<S> {
        ConsoleLineWriter {
            sink: Arc::clone(&self.sink),
            level,
            buffer: Vec::new(),
        }
    }
}

impl<'a, S: ConsoleSink> MakeWriter<'a> for ConsoleMakeWriter<S> {
    type Writer = ConsoleLineWriter<S>;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        self.writer(*meta.level())
    }
}

/// Buffers the output for one event and emits it when dropped.
pub struct ConsoleLineWriter<S: ConsoleSink> {
    sink: Arc<S>,
    level: Level,
    buffer: Vec<u8>,
}

impl<S: ConsoleSink> Write for ConsoleLineWriter<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: ConsoleSink> Drop for ConsoleLineWriter<S> {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buffer);
        let line = text.trim_end();
        if !line.is_empty() {
            self.sink.write_line(self.level, line);
        }
    }
}

/// Builds the subscriber without installing it.
///
/// # Errors
///
/// [`LoggingError::InvalidFilter`] if `filter` is not a valid `EnvFilter`
/// directive string.
pub fn console_subscriber<S: ConsoleSink>(
    filter: &str,
    sink: S,
) -> Result<impl Subscriber + Send + Sync + 'static, LoggingError> {
    let env_filter = EnvFilter::try_new(filter).map_err(|e| LoggingError::InvalidFilter {
        filter: filter.to_string(),
        reason: e.to_string(),
    })?;

    Ok(tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .with_ansi(false)
        .with_writer(ConsoleMakeWriter::new(sink))
        .finish())
}

/// Installs the console subscriber as the global default.
///
/// # Errors
///
/// See [`LoggingError`].
pub fn init_logging<S: ConsoleSink>(filter: &str, sink: S) -> Result<(), LoggingError> {
    let subscriber = console_subscriber(filter, sink)?;
    tracing::subscriber::set_global_default(subscriber).map_err(|_| LoggingError::AlreadyInstalled)
}

/// The browser developer console.
#[cfg(target_arch = "wasm32")]
pub struct WebConsoleSink;

#[cfg(target_arch = "wasm32")]
impl ConsoleSink for WebConsoleSink {
    fn write_line(&self, level: Level, line: &str) {
        use wasm_bindgen::JsValue;
        use web_sys::console;

        let line = JsValue::from_str(line);
        if level == Level::ERROR {
            console::error_1(&line);
        } else if level == Level::WARN {
            console::warn_1(&line);
        } else if level == Level::INFO {
            console::info_1(&line);
        } else {
            console::debug_1(&line);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
