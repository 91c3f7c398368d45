//! In-memory page for unit and integration testing.
//!
//! [`MockPage`] keeps a small element tree (`<html>` with `<head>` and
//! `<body>`) and records everything the bootstrap does to it: posted
//! messages, clicked elements, registered listeners.  Tests drive the page
//! the way a browser would, with [`MockPage::fire_load`] and
//! [`MockPage::dispatch_message`].
//!
//! Clones share the same tree, so a test can hand one clone to the bootstrap
//! and inspect the other.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::Value;

use embed_core::domain::frame::BOOTSTRAP_SCRIPT_ID;

use crate::application::host::{HostError, HostPage, LoadNotifier, LoadSignal, MessageHandler};

/// Handle to a node of a [`MockPage`].  Only meaningful for the page that
/// created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockElement(usize);

/// A `postMessage` call recorded by the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    pub frame: MockElement,
    pub message: Value,
    pub target_origin: String,
}

/// Snapshot of an element at the moment it was clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickedElement {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
}

impl ClickedElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

#[derive(Default)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    styles: BTreeMap<String, String>,
    parent: Option<usize>,
    children: Vec<usize>,
    load: Option<LoadNotifier>,
}

struct Dom {
    nodes: Vec<Node>,
    head: Option<usize>,
    body: Option<usize>,
    failing_tags: Vec<String>,
    mobile_host: bool,
    frame_windows_closed: bool,
    listeners_blocked: bool,
    listeners: Vec<Rc<dyn Fn(Value)>>,
    posted: Vec<PostedMessage>,
    clicked: Vec<ClickedElement>,
}

const ROOT: usize = 0;

impl Dom {
    fn new() -> Self {
        let mut dom = Self {
            nodes: vec![Node {
                tag: "html".to_string(),
                ..Node::default()
            }],
            head: None,
            body: None,
            failing_tags: Vec::new(),
            mobile_host: false,
            frame_windows_closed: false,
            listeners_blocked: false,
            listeners: Vec::new(),
            posted: Vec::new(),
            clicked: Vec::new(),
        };
        let head = dom.create("head");
        let body = dom.create("body");
        dom.append(ROOT, head);
        dom.append(ROOT, body);
        dom.head = Some(head);
        dom.body = Some(body);
        dom
    }

    fn create(&mut self, tag: &str) -> usize {
        self.nodes.push(Node {
            tag: tag.to_string(),
            ..Node::default()
        });
        self.nodes.len() - 1
    }

    fn append(&mut self, parent: usize, child: usize) {
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    fn detach(&mut self, child: usize) {
        if let Some(old) = self.nodes[child].parent.take() {
            self.nodes[old].children.retain(|&c| c != child);
        }
    }

    fn is_connected(&self, mut index: usize) -> bool {
        loop {
            if index == ROOT {
                return true;
            }
            match self.nodes[index].parent {
                Some(parent) => index = parent,
                None => return false,
            }
        }
    }

    fn connected(&self) -> impl Iterator<Item = (usize, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(index, _)| self.is_connected(*index))
    }

    fn find_by_id(&self, id: &str) -> Option<usize> {
        self.connected()
            .find(|(_, node)| node.attributes.get("id").map(String::as_str) == Some(id))
            .map(|(index, _)| index)
    }
}

/// An in-memory [`HostPage`].
#[derive(Clone)]
pub struct MockPage {
    dom: Rc<RefCell<Dom>>,
}

impl MockPage {
    /// A page with an empty `<head>` and `<body>`.
    pub fn new() -> Self {
        Self {
            dom: Rc::new(RefCell::new(Dom::new())),
        }
    }

    /// Adds `<tag id="id">` to the body.
    pub fn with_element(self, tag: &str, id: &str) -> Self {
        {
            let mut dom = self.dom.borrow_mut();
            let node = dom.create(tag);
            dom.nodes[node]
                .attributes
                .insert("id".to_string(), id.to_string());
            let body = dom.body.expect("with_element requires a body");
            dom.append(body, node);
        }
        self
    }

    /// Adds the bootstrap `<script>` element with the given `src` to the head.
    pub fn with_bootstrap_script(self, src: &str) -> Self {
        {
            let mut dom = self.dom.borrow_mut();
            let node = dom.create("script");
            let attributes = &mut dom.nodes[node].attributes;
            attributes.insert("id".to_string(), BOOTSTRAP_SCRIPT_ID.to_string());
            attributes.insert("src".to_string(), src.to_string());
            let head = dom.head.expect("with_bootstrap_script requires a head");
            dom.append(head, node);
        }
        self
    }

    /// Removes `<body>`, as in a document that is still parsing its head.
    pub fn without_body(self) -> Self {
        {
            let mut dom = self.dom.borrow_mut();
            if let Some(body) = dom.body.take() {
                dom.detach(body);
            }
        }
        self
    }

    /// Makes every `create_element(tag)` call fail.
    pub fn failing_create(self, tag: &str) -> Self {
        self.dom.borrow_mut().failing_tags.push(tag.to_string());
        self
    }

    /// Reports the page as running inside the mobile host application.
    pub fn as_mobile_host_app(self) -> Self {
        self.dom.borrow_mut().mobile_host = true;
        self
    }

    /// Makes `add_message_listener` fail, as under a page that froze
    /// `window.addEventListener`.
    pub fn failing_listener(self) -> Self {
        self.dom.borrow_mut().listeners_blocked = true;
        self
    }

    /// From now on every frame reports no content window.
    pub fn close_frame_windows(&self) {
        self.dom.borrow_mut().frame_windows_closed = true;
    }

    // ── Browser simulation ────────────────────────────────────────────────────

    /// Fires `load` on the attached element with `id`.
    ///
    /// Returns `false` if there is no such element or nobody is watching it.
    pub fn fire_load(&self, id: &str) -> bool {
        match self.take_notifier(id) {
            Some(notifier) => {
                notifier.loaded();
                true
            }
            None => false,
        }
    }

    /// Fires `error` on the attached element with `id`.
    pub fn fire_error(&self, id: &str, reason: &str) -> bool {
        match self.take_notifier(id) {
            Some(notifier) => {
                notifier.failed(reason);
                true
            }
            None => false,
        }
    }

    fn take_notifier(&self, id: &str) -> Option<LoadNotifier> {
        let mut dom = self.dom.borrow_mut();
        let index = dom.find_by_id(id)?;
        dom.nodes[index].load.take()
    }

    /// Delivers a `message` event to every registered listener.
    pub fn dispatch_message(&self, data: Value) {
        // Listeners call back into the page, so the borrow must end first.
        let listeners = self.dom.borrow().listeners.clone();
        for listener in listeners {
            listener(data.clone());
        }
    }

    // ── Inspection ────────────────────────────────────────────────────────────

    pub fn parent_of(&self, element: &MockElement) -> Option<MockElement> {
        self.dom.borrow().nodes[element.0].parent.map(MockElement)
    }

    pub fn style(&self, element: &MockElement, property: &str) -> Option<String> {
        self.dom.borrow().nodes[element.0].styles.get(property).cloned()
    }

    pub fn classes(&self, element: &MockElement) -> Vec<String> {
        self.dom.borrow().nodes[element.0].classes.clone()
    }

    pub fn has_class(&self, element: &MockElement, class: &str) -> bool {
        self.dom.borrow().nodes[element.0]
            .classes
            .iter()
            .any(|c| c == class)
    }

    /// Number of attached elements carrying `id`.
    pub fn count_by_id(&self, id: &str) -> usize {
        self.dom
            .borrow()
            .connected()
            .filter(|(_, node)| node.attributes.get("id").map(String::as_str) == Some(id))
            .count()
    }

    /// Number of attached elements with `tag`.
    pub fn attached_count(&self, tag: &str) -> usize {
        self.dom
            .borrow()
            .connected()
            .filter(|(_, node)| node.tag == tag)
            .count()
    }

    pub fn posted_messages(&self) -> Vec<PostedMessage> {
        self.dom.borrow().posted.clone()
    }

    pub fn clicked(&self) -> Vec<ClickedElement> {
        self.dom.borrow().clicked.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.dom.borrow().listeners.len()
    }
}

impl Default for MockPage {
    fn default() -> Self {
        Self::new()
    }
}

impl HostPage for MockPage {
    type Element = MockElement;

    fn body(&self) -> Option<MockElement> {
        self.dom.borrow().body.map(MockElement)
    }

    fn head(&self) -> Option<MockElement> {
        self.dom.borrow().head.map(MockElement)
    }

    fn element_by_id(&self, id: &str) -> Option<MockElement> {
        self.dom.borrow().find_by_id(id).map(MockElement)
    }

    fn create_element(&self, tag: &str) -> Result<MockElement, HostError> {
        let mut dom = self.dom.borrow_mut();
        if dom.failing_tags.iter().any(|t| t == tag) {
            return Err(HostError::dom("createElement", format!("<{tag}> is not allowed")));
        }
        Ok(MockElement(dom.create(tag)))
    }

    fn set_attribute(&self, element: &MockElement, name: &str, value: &str) -> Result<(), HostError> {
        let mut dom = self.dom.borrow_mut();
        let node = &mut dom.nodes[element.0];
        if name == "class" {
            node.classes = value.split_whitespace().map(str::to_string).collect();
        } else {
            node.attributes.insert(name.to_string(), value.to_string());
        }
        Ok(())
    }

    fn attribute(&self, element: &MockElement, name: &str) -> Option<String> {
        let dom = self.dom.borrow();
        let node = &dom.nodes[element.0];
        if name == "class" {
            return (!node.classes.is_empty()).then(|| node.classes.join(" "));
        }
        node.attributes.get(name).cloned()
    }

    fn set_style(&self, element: &MockElement, property: &str, value: &str) -> Result<(), HostError> {
        self.dom.borrow_mut().nodes[element.0]
            .styles
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    fn add_class(&self, element: &MockElement, class: &str) -> Result<(), HostError> {
        let mut dom = self.dom.borrow_mut();
        let classes = &mut dom.nodes[element.0].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
        Ok(())
    }

    fn remove_class(&self, element: &MockElement, class: &str) -> Result<(), HostError> {
        self.dom.borrow_mut().nodes[element.0]
            .classes
            .retain(|c| c != class);
        Ok(())
    }

    fn append_child(&self, parent: &MockElement, child: &MockElement) -> Result<(), HostError> {
        if parent == child {
            return Err(HostError::dom("appendChild", "cannot append a node to itself"));
        }
        self.dom.borrow_mut().append(parent.0, child.0);
        Ok(())
    }

    fn watch_load(&self, element: &MockElement) -> Result<LoadSignal, HostError> {
        let (notifier, signal) = LoadSignal::channel();
        self.dom.borrow_mut().nodes[element.0].load = Some(notifier);
        Ok(signal)
    }

    fn click(&self, element: &MockElement) -> Result<(), HostError> {
        let mut dom = self.dom.borrow_mut();
        let node = &dom.nodes[element.0];
        let snapshot = ClickedElement {
            tag: node.tag.clone(),
            attributes: node.attributes.clone(),
        };
        dom.clicked.push(snapshot);
        Ok(())
    }

    fn post_message(&self, frame: &MockElement, message: &Value, target_origin: &str) -> Result<(), HostError> {
        let mut dom = self.dom.borrow_mut();
        if dom.nodes[frame.0].tag != "iframe" {
            return Err(HostError::dom("postMessage", "target is not an iframe"));
        }
        if dom.frame_windows_closed || !dom.is_connected(frame.0) {
            return Err(HostError::WindowUnavailable);
        }
        dom.posted.push(PostedMessage {
            frame: *frame,
            message: message.clone(),
            target_origin: target_origin.to_string(),
        });
        Ok(())
    }

    fn add_message_listener(&self, handler: MessageHandler) -> Result<(), HostError> {
        let mut dom = self.dom.borrow_mut();
        if dom.listeners_blocked {
            return Err(HostError::dom("addEventListener(message)", "listener rejected by the page"));
        }
        dom.listeners.push(Rc::from(handler));
        Ok(())
    }

    fn is_mobile_host_app(&self) -> bool {
        self.dom.borrow().mobile_host
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
