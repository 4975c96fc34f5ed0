// ============================================================================
// nug - MemoryHost
// An in-memory host tree for headless rendering and tests
// ============================================================================

use std::cell::RefCell;

use slotmap::SlotMap;

use crate::core::error::HostError;
use crate::dom::host::{EventHandler, HostNode, HostTree, COMMENT_TAG, RAW_TAG, TEXT_TAG};

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
    Element(String),
    Text,
    Raw,
    Comment,
}

impl NodeKind {
    fn from_tag(tag: &str) -> Self {
        match tag {
            TEXT_TAG => NodeKind::Text,
            RAW_TAG => NodeKind::Raw,
            COMMENT_TAG => NodeKind::Comment,
            _ => NodeKind::Element(tag.to_string()),
        }
    }

    fn tag(&self) -> &str {
        match self {
            NodeKind::Element(tag) => tag,
            NodeKind::Text => TEXT_TAG,
            NodeKind::Raw => RAW_TAG,
            NodeKind::Comment => COMMENT_TAG,
        }
    }
}

struct MemoryNode {
    kind: NodeKind,
    parent: Option<HostNode>,
    children: Vec<HostNode>,
    attributes: Vec<(String, String)>,
    listeners: Vec<(String, EventHandler)>,
    content: String,
}

impl MemoryNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: Vec::new(),
            listeners: Vec::new(),
            content: String::new(),
        }
    }

    fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }
}

/// A host tree kept in a slot map.
///
/// Removing a node frees it and its whole subtree, so [`len`](Self::len)
/// counts exactly the nodes that are still live.
///
/// # Example
///
/// ```
/// use nug::dom::{Host, MemoryHost};
/// use nug::{div, text, Node};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let memory = Rc::new(RefCell::new(MemoryHost::new()));
/// let host = Host::new(memory.clone());
/// let root = host.create_node("main");
///
/// let mut greeting = div().attr("class", "hello").child(text("Hi & bye"));
/// greeting.render(&host, root, None).unwrap();
///
/// assert_eq!(
///     memory.borrow().inner_html(root),
///     r#"<div class="hello">Hi &amp; bye</div>"#
/// );
/// ```
#[derive(Default)]
pub struct MemoryHost {
    nodes: SlotMap<HostNode, MemoryNode>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, node: HostNode) -> Result<&MemoryNode, HostError> {
        self.nodes.get(node).ok_or(HostError::UnknownNode(node))
    }

    fn node_mut(&mut self, node: HostNode) -> Result<&mut MemoryNode, HostError> {
        self.nodes.get_mut(node).ok_or(HostError::UnknownNode(node))
    }

    fn element_mut(&mut self, node: HostNode) -> Result<&mut MemoryNode, HostError> {
        let entry = self.node_mut(node)?;
        if entry.is_element() {
            Ok(entry)
        } else {
            Err(HostError::NotAnElement(node))
        }
    }

    fn detach(&mut self, node: HostNode) -> Result<(), HostError> {
        if let Some(parent) = self.node_mut(node)?.parent.take() {
            if let Some(parent) = self.nodes.get_mut(parent) {
                parent.children.retain(|&c| c != node);
            }
        }
        Ok(())
    }

    fn free(&mut self, node: HostNode) {
        if let Some(entry) = self.nodes.remove(node) {
            for child in entry.children {
                self.free(child);
            }
        }
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    /// Number of live nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: HostNode) -> bool {
        self.nodes.contains_key(node)
    }

    /// The node's tag, or one of the reserved tags for non-element nodes.
    pub fn tag(&self, node: HostNode) -> Option<&str> {
        self.nodes.get(node).map(|n| n.kind.tag())
    }

    pub fn parent(&self, node: HostNode) -> Option<HostNode> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: HostNode) -> &[HostNode] {
        match self.nodes.get(node) {
            Some(entry) => &entry.children,
            None => &[],
        }
    }

    pub fn attribute(&self, node: HostNode, name: &str) -> Option<&str> {
        self.nodes.get(node).and_then(|n| {
            n.attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        })
    }

    pub fn listener_count(&self, node: HostNode, event: &str) -> usize {
        self.nodes
            .get(node)
            .map_or(0, |n| n.listeners.iter().filter(|(e, _)| e == event).count())
    }

    /// Concatenated text of all text and raw descendants.
    pub fn text_content(&self, node: HostNode) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: HostNode, out: &mut String) {
        let Some(entry) = self.nodes.get(node) else {
            return;
        };
        match entry.kind {
            NodeKind::Text | NodeKind::Raw => out.push_str(&entry.content),
            NodeKind::Comment => {}
            NodeKind::Element(_) => {
                for &child in &entry.children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// First element with `tag` in depth-first order below `root`.
    pub fn find(&self, root: HostNode, tag: &str) -> Option<HostNode> {
        self.find_all(root, tag).into_iter().next()
    }

    /// Every element with `tag` below `root`, in document order.
    pub fn find_all(&self, root: HostNode, tag: &str) -> Vec<HostNode> {
        let mut found = Vec::new();
        let mut stack: Vec<HostNode> = self.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.tag(node) == Some(tag) {
                found.push(node);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        found
    }

    /// Serialize `node` as markup. Text is escaped, raw markup is written
    /// verbatim and comment markers are left out.
    pub fn html(&self, node: HostNode) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    /// Serialize the children of `node`.
    pub fn inner_html(&self, node: HostNode) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_html(child, &mut out);
        }
        out
    }

    fn write_html(&self, node: HostNode, out: &mut String) {
        let Some(entry) = self.nodes.get(node) else {
            return;
        };
        match &entry.kind {
            NodeKind::Text => out.push_str(&escape(&entry.content, false)),
            NodeKind::Raw => out.push_str(&entry.content),
            NodeKind::Comment => {}
            NodeKind::Element(tag) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in &entry.attributes {
                    out.push_str(&format!(" {name}=\"{}\"", escape(value, true)));
                }
                out.push('>');
                for &child in &entry.children {
                    self.write_html(child, out);
                }
                out.push_str(&format!("</{tag}>"));
            }
        }
    }

    /// Invoke every `event` listener on `node`.
    ///
    /// Takes the `RefCell` rather than `&self` so the borrow is released
    /// before the handlers run; handlers typically set stores, which
    /// re-render into this same host.
    pub fn dispatch(host: &RefCell<MemoryHost>, node: HostNode, event: &str) -> Result<usize, HostError> {
        let handlers: Vec<EventHandler> = {
            let host = host.borrow();
            host.node(node)?
                .listeners
                .iter()
                .filter(|(e, _)| e == event)
                .map(|(_, h)| h.clone())
                .collect()
        };
        tracing::trace!(target: "nug::host", event, handlers = handlers.len(), "dispatching event");
        for handler in &handlers {
            handler();
        }
        Ok(handlers.len())
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// HostTree implementation
// =============================================================================

impl HostTree for MemoryHost {
    fn create_node(&mut self, tag: &str) -> HostNode {
        self.nodes.insert(MemoryNode::new(NodeKind::from_tag(tag)))
    }

    fn set_attribute(&mut self, node: HostNode, name: &str, value: &str) -> Result<(), HostError> {
        let entry = self.element_mut(node)?;
        match entry.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => entry.attributes.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn add_event_listener(
        &mut self,
        node: HostNode,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), HostError> {
        self.element_mut(node)?
            .listeners
            .push((event.to_string(), handler));
        Ok(())
    }

    fn append_child(&mut self, parent: HostNode, child: HostNode) -> Result<(), HostError> {
        self.element_mut(parent)?;
        self.detach(child)?;
        self.element_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: HostNode,
        child: HostNode,
        reference: HostNode,
    ) -> Result<(), HostError> {
        self.node(child)?;
        let not_a_child = HostError::NotAChild { parent, reference };
        if reference == child || !self.element_mut(parent)?.children.contains(&reference) {
            return Err(not_a_child);
        }

        self.detach(child)?;
        let siblings = &mut self.element_mut(parent)?.children;
        let index = siblings
            .iter()
            .position(|&c| c == reference)
            .ok_or(not_a_child)?;
        siblings.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn remove(&mut self, node: HostNode) -> Result<(), HostError> {
        self.detach(node)?;
        self.free(node);
        Ok(())
    }

    fn set_text_content(&mut self, node: HostNode, text: &str) -> Result<(), HostError> {
        if !self.node(node)?.is_element() {
            self.node_mut(node)?.content = text.to_string();
            return Ok(());
        }

        // Elements drop their children for a single text node, as in the DOM.
        let children = std::mem::take(&mut self.node_mut(node)?.children);
        for child in children {
            self.free(child);
        }
        let text_node = self.create_node(TEXT_TAG);
        self.node_mut(text_node)?.content = text.to_string();
        self.append_child(node, text_node)
    }
}

impl std::fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHost")
            .field("nodes", &self.nodes.len())
            .finish()
    }
}
