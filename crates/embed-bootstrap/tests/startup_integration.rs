//! Integration tests for the bootstrap startup sequence and message relay.
//!
//! Each test drives a [`Bootstrap`] over an in-memory [`MockPage`] the way a
//! browser would: polling the startup future, firing `load` on the frame and
//! delivering `message` events through the registered listener.

use serde_json::{json, Map, Value};
use tokio_test::{assert_pending, assert_ready_ok, task};

use embed_bootstrap::application::host::HostPage;
use embed_bootstrap::infrastructure::dom::mock::{MockElement, MockPage};
use embed_bootstrap::{Bootstrap, InitError, Phase, SendOutcome};
use embed_core::domain::frame::{CONTAINER_ID, FRAME_ID};
use embed_core::{BootstrapOptions, InitRequest};

const SITE_URL: &str = "https://example.com";

fn request() -> InitRequest {
    InitRequest::new("0Xx000000000001", "https://org.example", SITE_URL)
}

/// Runs `init` to completion and returns the mounted frame element.
fn start(bootstrap: &Bootstrap<MockPage>, page: &MockPage, request: InitRequest) -> MockElement {
    let mut startup = task::spawn(bootstrap.init(request).expect("first init is accepted"));
    assert_pending!(startup.poll());
    assert!(page.fire_load(FRAME_ID), "frame must be waiting for load");
    assert_ready_ok!(startup.poll());
    page.element_by_id(FRAME_ID).expect("frame attached")
}

fn started(options: BootstrapOptions) -> (Bootstrap<MockPage>, MockPage, MockElement) {
    let page = MockPage::new();
    let bootstrap = Bootstrap::new(page.clone(), options);
    let frame = start(&bootstrap, &page, request());
    (bootstrap, page, frame)
}

#[test]
fn test_single_init_reaches_ready_with_one_listener() {
    // Arrange
    let page = MockPage::new();
    let bootstrap = Bootstrap::new(page.clone(), BootstrapOptions::default());
    assert_eq!(bootstrap.phase(), Phase::Uninitialized);

    // Act
    start(&bootstrap, &page, request());

    // Assert
    assert_eq!(bootstrap.phase(), Phase::Ready);
    assert_eq!(page.listener_count(), 1);
    assert_eq!(page.count_by_id(CONTAINER_ID), 1);
    assert_eq!(page.count_by_id(FRAME_ID), 1);
}

#[test]
fn test_second_init_while_initializing_is_rejected() {
    let page = MockPage::new();
    let bootstrap = Bootstrap::new(page.clone(), BootstrapOptions::default());
    let mut startup = task::spawn(bootstrap.init(request()).unwrap());
    assert_pending!(startup.poll());
    let frame = page.element_by_id(FRAME_ID).unwrap();

    let second = bootstrap.init(request());

    assert_eq!(
        second.err(),
        Some(InitError::AlreadyInitialized { phase: Phase::Initializing })
    );
    assert_eq!(page.element_by_id(FRAME_ID), Some(frame));
    assert_eq!(page.count_by_id(FRAME_ID), 1);
}

#[test]
fn test_second_init_when_ready_leaves_frame_untouched() {
    // Arrange
    let (bootstrap, page, frame) = started(BootstrapOptions::default());
    let src_before = page.attribute(&frame, "src");

    // Act
    let second = bootstrap.init(InitRequest::new("other", "https://org.example", "https://elsewhere.example"));

    // Assert
    assert_eq!(second.err(), Some(InitError::AlreadyInitialized { phase: Phase::Ready }));
    assert_eq!(page.attribute(&frame, "src"), src_before);
    assert_eq!(page.count_by_id(FRAME_ID), 1);
    assert_eq!(page.listener_count(), 1);
    assert_eq!(page.posted_messages().len(), 1);
}

#[test]
fn test_frame_src_gets_a_trailing_slash() {
    let (_, page, frame) = started(BootstrapOptions::default());

    let src = page.attribute(&frame, "src").unwrap();

    assert!(src.starts_with("https://example.com/"), "src was {src}");
}

#[test]
fn test_expanded_resize_leaves_only_the_expanded_class() {
    for prior in ["init", "normal", "closed", "expanded"] {
        // Arrange
        let (_, page, frame) = started(BootstrapOptions::default());
        page.add_class(&frame, prior).unwrap();

        // Act
        page.dispatch_message(json!({"type": "resize", "state": "expanded"}));

        // Assert
        assert!(page.has_class(&frame, "expanded"), "prior state {prior}");
        for other in ["init", "normal", "closed"] {
            assert!(!page.has_class(&frame, other), "prior {prior}: {other} still present");
        }
    }
}

#[test]
fn test_width_only_resize_changes_nothing_else() {
    let (_, page, frame) = started(BootstrapOptions::default());
    page.dispatch_message(json!({"type": "resize", "height": "640px", "state": "normal"}));

    page.dispatch_message(json!({"type": "resize", "width": "300px"}));

    assert_eq!(page.style(&frame, "width").as_deref(), Some("300px"));
    assert_eq!(page.style(&frame, "height").as_deref(), Some("640px"));
    assert!(page.has_class(&frame, "normal"));
}

#[test]
fn test_link_click_opens_new_tab_without_opener_or_referrer() {
    let (_, page, _) = started(BootstrapOptions {
        should_open_links_in_same_tab: Some(false),
        ..BootstrapOptions::default()
    });

    page.dispatch_message(json!({
        "type": "text_message_link_click",
        "data": {"link": "https://x.test"}
    }));

    let clicked = page.clicked();
    assert_eq!(clicked.len(), 1);
    assert_eq!(clicked[0].attribute("href"), Some("https://x.test"));
    assert_eq!(clicked[0].attribute("target"), Some("_blank"));
    let rel = clicked[0].attribute("rel").unwrap_or_default();
    assert!(rel.contains("noopener") && rel.contains("noreferrer"));
}

#[test]
fn test_link_click_navigates_same_tab_when_configured() {
    let (_, page, _) = started(BootstrapOptions {
        should_open_links_in_same_tab: Some(true),
        ..BootstrapOptions::default()
    });

    page.dispatch_message(json!({
        "type": "text_message_link_click",
        "data": {"link": "https://x.test"}
    }));

    assert_eq!(page.clicked()[0].attribute("target"), None);
}

#[test]
fn test_snippet_setting_overrides_option_for_links() {
    let page = MockPage::new();
    let bootstrap = Bootstrap::new(page.clone(), BootstrapOptions::default());
    let mut snippet = Map::new();
    snippet.insert("shouldOpenLinksInSameTab".to_string(), json!(true));
    start(&bootstrap, &page, request().with_snippet_config(snippet));

    page.dispatch_message(json!({
        "type": "text_message_link_click",
        "data": {"link": "https://x.test"}
    }));

    assert_eq!(page.clicked()[0].attribute("target"), None);
}

#[test]
fn test_send_before_mount_reports_unavailable() {
    // Arrange: init accepted, frame not loaded yet
    let page = MockPage::new();
    let bootstrap = Bootstrap::new(page.clone(), BootstrapOptions::default());
    let mut startup = task::spawn(bootstrap.init(request()).unwrap());
    assert_pending!(startup.poll());

    // Act
    let outcome = bootstrap.bridge().send("CHAT_OPEN", None);

    // Assert
    assert_eq!(outcome, Ok(SendOutcome::FrameUnavailable));
    assert!(page.posted_messages().is_empty());
}

#[test]
fn test_send_after_ready_is_delivered_to_site_origin() {
    let (bootstrap, page, frame) = started(BootstrapOptions::default());

    let outcome = bootstrap.bridge().send("CHAT_OPEN", Some(json!({"source": "button"})));

    assert_eq!(outcome, Ok(SendOutcome::Delivered));
    let last = page.posted_messages().pop().unwrap();
    assert_eq!(last.frame, frame);
    assert_eq!(last.target_origin, "https://example.com/");
}

#[test]
fn test_snippet_value_wins_in_outbound_config() {
    // Arrange: the option and the snippet disagree on a shared key
    let page = MockPage::new();
    let bootstrap = Bootstrap::new(
        page.clone(),
        BootstrapOptions {
            should_open_links_in_same_tab: Some(false),
            ..BootstrapOptions::default()
        },
    );
    let mut snippet = Map::new();
    snippet.insert("shouldOpenLinksInSameTab".to_string(), json!(true));
    snippet.insert("language".to_string(), json!("fr"));

    // Act
    start(&bootstrap, &page, request().with_snippet_config(snippet));

    // Assert
    let posted = page.posted_messages();
    assert_eq!(posted.len(), 1);
    let config: &Value = &posted[0].message;
    assert_eq!(config["method"], json!("ESW_SET_CONFIG_EVENT"));
    assert_eq!(config["data"]["shouldOpenLinksInSameTab"], json!(true));
    assert_eq!(config["data"]["language"], json!("fr"));
    assert_eq!(config["data"]["siteUrl"], json!(SITE_URL));
    assert!(config["data"].get("targetElement").is_none());
}

#[test]
fn test_failed_mount_leaves_no_listener_and_rejects_retry() {
    let page = MockPage::new().without_body();
    let bootstrap = Bootstrap::new(page.clone(), BootstrapOptions::default());

    let mut startup = task::spawn(bootstrap.init(request()).unwrap());
    let result = tokio_test::assert_ready!(startup.poll());

    assert!(matches!(result, Err(InitError::Mount(_))));
    assert_eq!(bootstrap.phase(), Phase::FailedInit);
    assert_eq!(page.listener_count(), 0);
    assert!(bootstrap.init(request()).is_err());
}
