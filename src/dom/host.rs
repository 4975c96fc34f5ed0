// ============================================================================
// nug - Host Tree
// The minimal visual-tree API the runtime renders into
// ============================================================================
//
// Everything the runtime does to the host goes through these seven
// operations. Node kinds other than elements are requested by reserved tags:
// `#text` (escaped text), `#raw` (verbatim markup) and `#comment` (the
// invisible marker a component renders in front of).
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::new_key_type;

use crate::core::error::HostError;

new_key_type! {
    /// Opaque handle to a node owned by a [`HostTree`].
    pub struct HostNode;
}

/// Tag for text nodes. Content is set with `set_text_content`.
pub const TEXT_TAG: &str = "#text";

/// Tag for raw markup nodes. Content is inserted verbatim.
pub const RAW_TAG: &str = "#raw";

/// Tag for comment nodes, used as component insertion markers.
pub const COMMENT_TAG: &str = "#comment";

/// An event listener attached with [`HostTree::add_event_listener`].
pub type EventHandler = Rc<dyn Fn()>;

// =============================================================================
// HOST TREE TRAIT
// =============================================================================

/// A visual tree the runtime can build and tear down.
///
/// Implement this to integrate a rendering backend (a browser DOM, a native
/// widget tree, a terminal buffer). [`MemoryHost`](crate::dom::MemoryHost) is
/// the in-memory implementation.
pub trait HostTree {
    /// Create a detached node for `tag`.
    fn create_node(&mut self, tag: &str) -> HostNode;

    fn set_attribute(&mut self, node: HostNode, name: &str, value: &str) -> Result<(), HostError>;

    fn add_event_listener(
        &mut self,
        node: HostNode,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), HostError>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: HostNode, child: HostNode) -> Result<(), HostError>;

    /// Insert `child` into `parent` right before `reference`.
    fn insert_before(
        &mut self,
        parent: HostNode,
        child: HostNode,
        reference: HostNode,
    ) -> Result<(), HostError>;

    /// Detach `node` from its parent and release it along with its subtree.
    fn remove(&mut self, node: HostNode) -> Result<(), HostError>;

    fn set_text_content(&mut self, node: HostNode, text: &str) -> Result<(), HostError>;
}

// =============================================================================
// HOST HANDLE
// =============================================================================

/// Shared handle to a host tree.
///
/// Passed explicitly to every render and destroy call, and held by mounted
/// components so they can re-render when a store notifies. Each operation
/// borrows the tree only for its own duration.
#[derive(Clone)]
pub struct Host {
    tree: Rc<RefCell<dyn HostTree>>,
}

impl Host {
    /// Wrap a host tree the caller keeps a typed handle to.
    pub fn new<H: HostTree + 'static>(tree: Rc<RefCell<H>>) -> Self {
        Self { tree }
    }

    pub fn create_node(&self, tag: &str) -> HostNode {
        self.tree.borrow_mut().create_node(tag)
    }

    pub fn set_attribute(&self, node: HostNode, name: &str, value: &str) -> Result<(), HostError> {
        self.tree.borrow_mut().set_attribute(node, name, value)
    }

    pub fn add_event_listener(
        &self,
        node: HostNode,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), HostError> {
        self.tree.borrow_mut().add_event_listener(node, event, handler)
    }

    pub fn append_child(&self, parent: HostNode, child: HostNode) -> Result<(), HostError> {
        self.tree.borrow_mut().append_child(parent, child)
    }

    pub fn insert_before(
        &self,
        parent: HostNode,
        child: HostNode,
        reference: HostNode,
    ) -> Result<(), HostError> {
        self.tree.borrow_mut().insert_before(parent, child, reference)
    }

    /// Append to `parent`, or insert before `before` when given.
    pub fn insert(
        &self,
        parent: HostNode,
        child: HostNode,
        before: Option<HostNode>,
    ) -> Result<(), HostError> {
        match before {
            Some(reference) => self.insert_before(parent, child, reference),
            None => self.append_child(parent, child),
        }
    }

    pub fn remove(&self, node: HostNode) -> Result<(), HostError> {
        self.tree.borrow_mut().remove(node)
    }

    pub fn set_text_content(&self, node: HostNode, text: &str) -> Result<(), HostError> {
        self.tree.borrow_mut().set_text_content(node, text)
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}
