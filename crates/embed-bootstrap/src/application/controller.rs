//! Bootstrap controller: the page-wide startup sequence.
//!
//! # Phases
//!
//! ```text
//! Uninitialized ──init()──▶ Initializing ──frame loaded──▶ Ready
//!                                 │
//!                                 └──mount failed──▶ FailedInit
//! ```
//!
//! `init` is accepted exactly once per page load.  A second call, in any
//! phase, is rejected with [`InitError::AlreadyInitialized`] and touches
//! nothing.  A failed start is not retried.
//!
//! # Startup
//!
//! The future returned by [`Bootstrap::init`] runs two branches side by side:
//!
//! 1. the stylesheet load, whose failure is only logged;
//! 2. the frame mount, followed by listener registration and the
//!    configuration push (`ESW_SET_CONFIG_EVENT`).
//!
//! The phase becomes `Ready` as soon as branch 2 completes, even while the
//! stylesheet is still pending.

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use embed_core::protocol::messages::SET_CONFIG_METHOD;
use embed_core::{BootstrapOptions, InitRequest, Settings};

use crate::application::context::EmbedContext;
use crate::application::frame_mount::{mount_frame, MountError};
use crate::application::host::{HostError, HostPage};
use crate::application::message_bridge::{MessageBridge, SendOutcome};
use crate::application::resource_loader::load_stylesheet;

/// Lifecycle phase of the bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initializing,
    Ready,
    FailedInit,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Uninitialized => "uninitialized",
            Phase::Initializing => "initializing",
            Phase::Ready => "ready",
            Phase::FailedInit => "failed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`Bootstrap::init`] and its startup future.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("embedded messaging has already been initialized (phase: {phase})")]
    AlreadyInitialized { phase: Phase },

    #[error("error creating the embedded messaging frame: {0}")]
    Mount(#[from] MountError),

    #[error("could not listen for messages from the embedded frame: {0}")]
    Listener(#[from] HostError),
}

/// The page-scoped bootstrap instance.
///
/// Construct one per page with the host's options, then call
/// [`init`](Self::init) once and drive the returned future on the page's
/// event loop.
pub struct Bootstrap<P: HostPage> {
    ctx: Rc<EmbedContext<P>>,
}

impl<P: HostPage> Bootstrap<P> {
    pub fn new(page: P, options: BootstrapOptions) -> Self {
        debug!(
            dev_mode = options.dev_mode,
            target = %options.mount_target(),
            "bootstrap created"
        );
        Self {
            ctx: Rc::new(EmbedContext::new(page, options)),
        }
    }

    pub fn phase(&self) -> Phase {
        self.ctx.phase.get()
    }

    /// Settings captured by `init`, or `None` before the first call.
    pub fn settings(&self) -> Option<&Settings> {
        self.ctx.settings.get()
    }

    /// A handle for sending to and dispatching from the embedded frame.
    pub fn bridge(&self) -> MessageBridge<P> {
        MessageBridge::new(Rc::clone(&self.ctx))
    }

    /// Captures the settings and returns the startup future.
    ///
    /// The guard runs synchronously, so a second call made before the first
    /// future has even been polled is already rejected.
    ///
    /// # Errors
    ///
    /// [`InitError::AlreadyInitialized`] on every call after the first.  The
    /// returned future resolves to [`InitError::Mount`] or
    /// [`InitError::Listener`] if the frame could not be brought up.
    pub fn init(
        &self,
        request: InitRequest,
    ) -> Result<impl Future<Output = Result<(), InitError>> + 'static, InitError> {
        let phase = self.ctx.phase.get();
        if phase != Phase::Uninitialized {
            let err = InitError::AlreadyInitialized { phase };
            error!("{err}");
            return Err(err);
        }

        self.ctx.phase.set(Phase::Initializing);
        let settings = Settings::new(request, &self.ctx.options);
        info!(
            agent_id = %settings.agent_id,
            site_url = %settings.site_url,
            "initializing embedded messaging"
        );
        // Cannot already be set: the phase guard above admits one caller.
        let _ = self.ctx.settings.set(settings);

        let ctx = Rc::clone(&self.ctx);
        Ok(async move { run_startup(ctx).await })
    }
}

async fn run_startup<P: HostPage>(ctx: Rc<EmbedContext<P>>) -> Result<(), InitError> {
    let stylesheet = async {
        match load_stylesheet(&ctx.page).await {
            Ok(href) => info!("loaded stylesheet {href}"),
            Err(e) => error!("error loading stylesheet: {e}"),
        }
    };

    // The frame branch settles the phase on its own; a stylesheet that never
    // loads must not hold it in `Initializing`.
    let frame = async {
        let mounted = start_frame(&ctx).await;
        if let Err(e) = &mounted {
            ctx.phase.set(Phase::FailedInit);
            error!("{e}");
        }
        mounted
    };

    let ((), mounted) = tokio::join!(stylesheet, frame);
    mounted
}

async fn start_frame<P: HostPage>(ctx: &Rc<EmbedContext<P>>) -> Result<(), InitError> {
    let settings = ctx
        .settings
        .get()
        .ok_or(MountError::Origin(embed_core::OriginError::NotConfigured))?;

    let handle = mount_frame(&ctx.page, settings).await?;
    info!("created embedded messaging frame");
    let _ = ctx.frame.set(handle);

    let bridge = MessageBridge::new(Rc::clone(ctx));
    bridge.register_listener()?;

    match bridge.send(SET_CONFIG_METHOD, Some(Value::Object(settings.outbound_config()))) {
        Ok(SendOutcome::Delivered) => debug!("configuration sent to the embedded frame"),
        Ok(SendOutcome::FrameUnavailable) => warn!("configuration was not delivered"),
        Err(e) => error!("failed to send configuration to the embedded frame: {e}"),
    }

    ctx.phase.set(Phase::Ready);
    info!("embedded messaging ready");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::dom::mock::MockPage;
    use embed_core::domain::frame::{CONTAINER_ID, FRAME_ID};
    use embed_core::domain::stylesheet::STYLESHEET_LINK_ID;
    use embed_core::OriginError;
    use serde_json::json;

    fn request(site_url: &str) -> InitRequest {
        InitRequest::new("agent-1", "https://org.example", site_url)
    }

    #[test]
    fn test_new_bootstrap_is_uninitialized() {
        let bootstrap = Bootstrap::new(MockPage::new(), BootstrapOptions::default());
        assert_eq!(bootstrap.phase(), Phase::Uninitialized);
        assert!(bootstrap.settings().is_none());
    }

    #[test]
    fn test_init_moves_to_initializing_then_ready() {
        // Arrange
        let page = MockPage::new();
        let bootstrap = Bootstrap::new(page.clone(), BootstrapOptions::default());

        // Act
        let mut startup = tokio_test::task::spawn(bootstrap.init(request("https://site.example")).unwrap());
        tokio_test::assert_pending!(startup.poll());
        assert_eq!(bootstrap.phase(), Phase::Initializing);
        page.fire_load(FRAME_ID);

        // Assert
        tokio_test::assert_ready_ok!(startup.poll());
        assert_eq!(bootstrap.phase(), Phase::Ready);
        assert_eq!(page.listener_count(), 1);
    }

    #[test]
    fn test_ready_does_not_wait_for_stylesheet() {
        let page = MockPage::new().with_bootstrap_script("https://cdn.example/init.js");
        let bootstrap = Bootstrap::new(page.clone(), BootstrapOptions::default());

        let mut startup = tokio_test::task::spawn(bootstrap.init(request("https://site.example")).unwrap());
        tokio_test::assert_pending!(startup.poll());
        assert!(page.element_by_id(STYLESHEET_LINK_ID).is_some());
        page.fire_load(FRAME_ID);

        // The frame branch is done; the startup future still waits on the link.
        tokio_test::assert_pending!(startup.poll());
        assert_eq!(bootstrap.phase(), Phase::Ready);

        page.fire_load(STYLESHEET_LINK_ID);
        tokio_test::assert_ready_ok!(startup.poll());
    }

    #[test]
    fn test_config_is_pushed_after_mount() {
        let page = MockPage::new();
        let options = BootstrapOptions {
            dev_mode: true,
            ..BootstrapOptions::default()
        };
        let bootstrap = Bootstrap::new(page.clone(), options);

        let mut startup = tokio_test::task::spawn(bootstrap.init(request("https://site.example")).unwrap());
        tokio_test::assert_pending!(startup.poll());
        assert!(page.posted_messages().is_empty());
        page.fire_load(FRAME_ID);
        tokio_test::assert_ready_ok!(startup.poll());

        let posted = page.posted_messages();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].target_origin, "https://site.example/");
        assert_eq!(posted[0].message["method"], json!("ESW_SET_CONFIG_EVENT"));
        assert_eq!(posted[0].message["data"]["devMode"], json!(true));
        assert_eq!(posted[0].message["data"]["agentId"], json!("agent-1"));
    }

    #[test]
    fn test_second_init_is_rejected_without_side_effects() {
        // Arrange
        let page = MockPage::new();
        let bootstrap = Bootstrap::new(page.clone(), BootstrapOptions::default());
        let _first = bootstrap.init(request("https://site.example")).unwrap();

        // Act
        let second = bootstrap.init(request("https://other.example"));

        // Assert
        assert_eq!(
            second.err(),
            Some(InitError::AlreadyInitialized { phase: Phase::Initializing })
        );
        assert_eq!(
            bootstrap.settings().map(|s| s.site_url.as_str()),
            Some("https://site.example")
        );
    }

    #[test]
    fn test_mount_failure_moves_to_failed_init() {
        let page = MockPage::new();
        let bootstrap = Bootstrap::new(page.clone(), BootstrapOptions::default());

        let mut startup = tokio_test::task::spawn(bootstrap.init(request("")).unwrap());
        let err = tokio_test::assert_ready_err!(startup.poll());

        assert_eq!(err, InitError::Mount(MountError::Origin(OriginError::Empty)));
        assert_eq!(bootstrap.phase(), Phase::FailedInit);
        assert!(page.element_by_id(CONTAINER_ID).is_none());
        assert_eq!(page.listener_count(), 0);
    }

    #[test]
    fn test_init_after_failure_is_still_rejected() {
        let page = MockPage::new();
        let bootstrap = Bootstrap::new(page.clone(), BootstrapOptions::default());
        let mut startup = tokio_test::task::spawn(bootstrap.init(request("")).unwrap());
        let _ = startup.poll();

        let retry = bootstrap.init(request("https://site.example"));

        assert_eq!(
            retry.err(),
            Some(InitError::AlreadyInitialized { phase: Phase::FailedInit })
        );
    }

    #[test]
    fn test_frame_error_event_fails_init() {
        let page = MockPage::new();
        let bootstrap = Bootstrap::new(page.clone(), BootstrapOptions::default());

        let mut startup = tokio_test::task::spawn(bootstrap.init(request("https://site.example")).unwrap());
        tokio_test::assert_pending!(startup.poll());
        page.fire_error(FRAME_ID, "refused to connect");

        assert!(matches!(
            tokio_test::assert_ready_err!(startup.poll()),
            InitError::Mount(MountError::Load(_))
        ));
        assert_eq!(bootstrap.phase(), Phase::FailedInit);
    }

    #[test]
    fn test_frame_error_fails_init_while_stylesheet_is_pending() {
        // Arrange: the stylesheet link is attached and never settles
        let page = MockPage::new().with_bootstrap_script("https://cdn.example/init.js");
        let bootstrap = Bootstrap::new(page.clone(), BootstrapOptions::default());
        let mut startup = tokio_test::task::spawn(bootstrap.init(request("https://site.example")).unwrap());
        tokio_test::assert_pending!(startup.poll());

        // Act
        assert!(page.fire_error(FRAME_ID, "refused"));
        tokio_test::assert_pending!(startup.poll());

        // Assert
        assert_eq!(bootstrap.phase(), Phase::FailedInit);
        assert_eq!(page.listener_count(), 0);

        page.fire_load(STYLESHEET_LINK_ID);
        assert!(matches!(
            tokio_test::assert_ready_err!(startup.poll()),
            InitError::Mount(MountError::Load(_))
        ));
    }

    #[test]
    fn test_listener_failure_moves_to_failed_init() {
        // Arrange
        let page = MockPage::new().failing_listener();
        let bootstrap = Bootstrap::new(page.clone(), BootstrapOptions::default());
        let mut startup = tokio_test::task::spawn(bootstrap.init(request("https://site.example")).unwrap());
        tokio_test::assert_pending!(startup.poll());

        // Act
        page.fire_load(FRAME_ID);

        // Assert
        assert!(matches!(
            tokio_test::assert_ready_err!(startup.poll()),
            InitError::Listener(HostError::Dom { .. })
        ));
        assert_eq!(bootstrap.phase(), Phase::FailedInit);
        assert!(page.posted_messages().is_empty());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::FailedInit.to_string(), "failed");
        assert_eq!(Phase::Ready.to_string(), "ready");
    }
}
