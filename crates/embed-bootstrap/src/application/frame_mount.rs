//! Frame mount: inserts the widget container and the sandboxed iframe.
//!
//! This is the only component that structurally changes the host page.  The
//! elements are created detached, the load listeners are attached, and only
//! then is the container appended to the mount target, so the iframe's
//! `load` event cannot fire before someone is listening for it.
//!
//! ```text
//! <target>
//!   └── div#embedded-messaging.embedded-messaging
//!         └── iframe#embedded-messaging-frame  (sandbox, src = origin?lwc.mode=…)
//! ```

use thiserror::Error;
use tracing::debug;

use embed_core::domain::frame::{CONTAINER_ID, FRAME_ID};
use embed_core::{FrameBlueprint, MountTarget, OriginError, Settings};

use crate::application::host::{HostError, HostPage, LoadError, LoadSignal};

/// Errors that stop the frame from being mounted.
///
/// Every variant is terminal for the page load: the controller moves to
/// `FailedInit` and does not retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    /// The configured mount target is not on the page.
    #[error("mount target {0} is not present on the page")]
    TargetMissing(MountTarget),

    /// A container or frame with the widget's id already exists.
    #[error("an element with id `{0}` is already on the page; refusing to mount a second frame")]
    AlreadyMounted(&'static str),

    /// The site URL cannot serve as the frame location.
    #[error("cannot build the frame location: {0}")]
    Origin(#[from] OriginError),

    /// Creating, configuring or inserting an element failed.
    #[error("could not construct the frame elements: {0}")]
    Host(#[from] HostError),

    /// The iframe fired `error`, or its listeners went away.
    #[error("frame did not load: {0}")]
    Load(#[from] LoadError),
}

/// The single embedded browsing context of the page.
#[derive(Debug, Clone)]
pub struct FrameHandle<E> {
    element: E,
}

impl<E> FrameHandle<E> {
    /// The iframe element.
    pub fn element(&self) -> &E {
        &self.element
    }
}

/// Creates and inserts the container and iframe without waiting for `load`.
///
/// # Errors
///
/// See [`MountError`].  Nothing is inserted when an error is returned before
/// the final append.
pub fn insert_frame<P: HostPage>(
    page: &P,
    settings: &Settings,
) -> Result<(FrameHandle<P::Element>, LoadSignal), MountError> {
    let blueprint = FrameBlueprint::for_settings(settings)?;

    for id in [CONTAINER_ID, FRAME_ID] {
        if page.element_by_id(id).is_some() {
            return Err(MountError::AlreadyMounted(id));
        }
    }

    let target = match &settings.target_element {
        MountTarget::Body => page.body(),
        MountTarget::ElementId(id) => page.element_by_id(id),
    }
    .ok_or_else(|| MountError::TargetMissing(settings.target_element.clone()))?;

    let container = page.create_element("div")?;
    page.set_attribute(&container, "id", CONTAINER_ID)?;
    page.set_attribute(&container, "class", CONTAINER_ID)?;

    let frame = page.create_element("iframe")?;
    page.set_attribute(&frame, "id", FRAME_ID)?;
    page.set_attribute(&frame, "class", FRAME_ID)?;
    page.set_attribute(&frame, "title", blueprint.title)?;
    page.set_style(&frame, "background-color", "transparent")?;
    page.set_attribute(&frame, "allowtransparency", "true")?;
    page.set_attribute(&frame, "allow", blueprint.allow)?;
    page.set_attribute(&frame, "sandbox", &blueprint.sandbox)?;
    page.set_attribute(&frame, "src", &blueprint.src)?;

    let loaded = page.watch_load(&frame)?;

    page.append_child(&container, &frame)?;
    page.append_child(&target, &container)?;

    debug!(
        "inserted frame into {} with src {}",
        settings.target_element, blueprint.src
    );

    Ok((FrameHandle { element: frame }, loaded))
}

/// Inserts the frame and resolves when its document has loaded.
///
/// # Errors
///
/// See [`MountError`].
pub async fn mount_frame<P: HostPage>(
    page: &P,
    settings: &Settings,
) -> Result<FrameHandle<P::Element>, MountError> {
    let (handle, loaded) = insert_frame(page, settings)?;
    loaded.wait().await?;
    Ok(handle)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
