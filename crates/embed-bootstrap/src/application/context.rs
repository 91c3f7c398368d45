//! The page-scoped state shared by the controller and the bridge.
//!
//! One context exists per bootstrap instance, created by the host application
//! and shared through an `Rc`.  Settings and the frame handle are write-once
//! cells: they are filled during startup and only read afterwards, so no
//! locking is needed on the single-threaded event loop.

use std::cell::{Cell, OnceCell};

use embed_core::{BootstrapOptions, Settings};

use crate::application::controller::Phase;
use crate::application::frame_mount::FrameHandle;
use crate::application::host::HostPage;

pub(crate) struct EmbedContext<P: HostPage> {
    pub(crate) page: P,
    pub(crate) options: BootstrapOptions,
    pub(crate) settings: OnceCell<Settings>,
    pub(crate) frame: OnceCell<FrameHandle<P::Element>>,
    pub(crate) phase: Cell<Phase>,
    pub(crate) listener_registered: Cell<bool>,
}

impl<P: HostPage> EmbedContext<P> {
    pub(crate) fn new(page: P, options: BootstrapOptions) -> Self {
        Self {
            page,
            options,
            settings: OnceCell::new(),
            frame: OnceCell::new(),
            phase: Cell::new(Phase::Uninitialized),
            listener_registered: Cell::new(false),
        }
    }
}
