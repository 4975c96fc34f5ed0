// ============================================================================
// nug - Nodes
// Renderable units with a uniform render/destroy contract
// ============================================================================

use std::fmt::Display;
use std::rc::Rc;

use crate::core::error::Result;
use crate::dom::host::{EventHandler, Host, HostNode, RAW_TAG, TEXT_TAG};

// =============================================================================
// NODE TRAIT
// =============================================================================

/// One unit of renderable content.
///
/// A node owns the host nodes it inserts and its child nodes. `destroy`
/// removes everything `render` inserted and destroys every descendant.
pub trait Node {
    /// Insert this node's host nodes into `container`, appended or right
    /// before `before`.
    fn render(&mut self, host: &Host, container: HostNode, before: Option<HostNode>) -> Result<()>;

    /// Remove everything previously inserted and release resources.
    fn destroy(&mut self, host: &Host) -> Result<()>;

    fn boxed(self) -> BoxedNode
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

/// An owned, type-erased node.
pub type BoxedNode = Box<dyn Node>;

impl Node for BoxedNode {
    fn render(&mut self, host: &Host, container: HostNode, before: Option<HostNode>) -> Result<()> {
        (**self).render(host, container, before)
    }

    fn destroy(&mut self, host: &Host) -> Result<()> {
        (**self).destroy(host)
    }

    fn boxed(self) -> BoxedNode {
        self
    }
}

// =============================================================================
// ELEMENT
// =============================================================================

enum Attribute {
    Value(String),
    Listener(EventHandler),
}

/// A tagged element with attributes, listeners and children.
pub struct Element {
    tag: String,
    attributes: Vec<(String, Attribute)>,
    children: Vec<BoxedNode>,
    rendered: Option<HostNode>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            rendered: None,
        }
    }

    /// Set a string attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .push((name.into(), Attribute::Value(value.into())));
        self
    }

    /// Register an event listener.
    pub fn on(mut self, event: impl Into<String>, handler: impl Fn() + 'static) -> Self {
        self.attributes
            .push((event.into(), Attribute::Listener(Rc::new(handler))));
        self
    }

    /// Append a child node.
    pub fn child(mut self, child: impl Node + 'static) -> Self {
        self.children.push(child.boxed());
        self
    }

    /// Append several child nodes.
    pub fn children(mut self, children: impl IntoIterator<Item = BoxedNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The host node created by the last render, if any.
    pub fn host_node(&self) -> Option<HostNode> {
        self.rendered
    }
}

impl Node for Element {
    fn render(&mut self, host: &Host, container: HostNode, before: Option<HostNode>) -> Result<()> {
        let node = host.create_node(&self.tag);
        self.rendered = Some(node);

        for (name, attribute) in &self.attributes {
            match attribute {
                Attribute::Value(value) => host.set_attribute(node, name, value)?,
                Attribute::Listener(handler) => {
                    host.add_event_listener(node, name, handler.clone())?
                }
            }
        }

        for child in &mut self.children {
            child.render(host, node, None)?;
        }

        host.insert(container, node, before)?;
        Ok(())
    }

    fn destroy(&mut self, host: &Host) -> Result<()> {
        for child in &mut self.children {
            child.destroy(host)?;
        }
        if let Some(node) = self.rendered.take() {
            host.remove(node)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag)
            .field("attributes", &self.attributes.len())
            .field("children", &self.children.len())
            .finish()
    }
}

// =============================================================================
// TEXT AND RAW MARKUP
// =============================================================================

/// A text node. The host escapes its content.
#[derive(Debug)]
pub struct Text {
    content: String,
    rendered: Option<HostNode>,
}

/// Raw markup inserted verbatim, without escaping.
#[derive(Debug)]
pub struct Unsafe {
    content: String,
    rendered: Option<HostNode>,
}

fn render_leaf(
    host: &Host,
    tag: &str,
    content: &str,
    container: HostNode,
    before: Option<HostNode>,
) -> Result<HostNode> {
    let node = host.create_node(tag);
    host.set_text_content(node, content)?;
    host.insert(container, node, before)?;
    Ok(node)
}

impl Node for Text {
    fn render(&mut self, host: &Host, container: HostNode, before: Option<HostNode>) -> Result<()> {
        self.rendered = Some(render_leaf(host, TEXT_TAG, &self.content, container, before)?);
        Ok(())
    }

    fn destroy(&mut self, host: &Host) -> Result<()> {
        if let Some(node) = self.rendered.take() {
            host.remove(node)?;
        }
        Ok(())
    }
}

impl Node for Unsafe {
    fn render(&mut self, host: &Host, container: HostNode, before: Option<HostNode>) -> Result<()> {
        self.rendered = Some(render_leaf(host, RAW_TAG, &self.content, container, before)?);
        Ok(())
    }

    fn destroy(&mut self, host: &Host) -> Result<()> {
        if let Some(node) = self.rendered.take() {
            host.remove(node)?;
        }
        Ok(())
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

pub fn element(tag: impl Into<String>) -> Element {
    Element::new(tag)
}

pub fn div() -> Element {
    Element::new("div")
}

pub fn span() -> Element {
    Element::new("span")
}

pub fn button() -> Element {
    Element::new("button")
}

pub fn anchor() -> Element {
    Element::new("a")
}

/// A text node from anything displayable.
pub fn text(content: impl Display) -> Text {
    Text {
        content: content.to_string(),
        rendered: None,
    }
}

/// Raw markup from anything displayable. The content is not escaped.
pub fn unsafe_html(content: impl Display) -> Unsafe {
    Unsafe {
        content: content.to_string(),
        rendered: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryHost;
    use std::cell::{Cell, RefCell};

    fn setup() -> (Rc<RefCell<MemoryHost>>, Host, HostNode) {
        let memory = Rc::new(RefCell::new(MemoryHost::new()));
        let host = Host::new(memory.clone());
        let root = host.create_node("main");
        (memory, host, root)
    }

    #[test]
    fn element_renders_attributes_and_children() {
        let (memory, host, root) = setup();
        let mut node = anchor()
            .attr("href", "/home")
            .child(span().child(text("Home")))
            .child(unsafe_html("&nbsp;"));

        node.render(&host, root, None).unwrap();
        assert_eq!(
            memory.borrow().inner_html(root),
            r#"<a href="/home"><span>Home</span>&nbsp;</a>"#
        );
    }

    #[test]
    fn destroy_removes_every_inserted_node() {
        let (memory, host, root) = setup();
        let mut node = div().child(text("a")).child(div().child(text("b")));
        node.render(&host, root, None).unwrap();
        assert_eq!(memory.borrow().len(), 5);

        node.destroy(&host).unwrap();
        assert_eq!(memory.borrow().len(), 1);
        assert!(memory.borrow().children(root).is_empty());
    }

    #[test]
    fn renders_before_reference() {
        let (memory, host, root) = setup();
        let mut last = text("last");
        last.render(&host, root, None).unwrap();
        let reference = memory.borrow().children(root)[0];

        let mut first = text("first ");
        first.render(&host, root, Some(reference)).unwrap();
        assert_eq!(memory.borrow().text_content(root), "first last");
    }

    #[test]
    fn listeners_fire_on_dispatch() {
        let (memory, host, root) = setup();
        let clicked = Rc::new(Cell::new(false));
        let clicked_clone = clicked.clone();
        let mut node = button().on("click", move || clicked_clone.set(true)).child(text("Go"));
        node.render(&host, root, None).unwrap();

        let target = memory.borrow().find(root, "button").unwrap();
        MemoryHost::dispatch(&memory, target, "click").unwrap();
        assert!(clicked.get());
    }

    #[test]
    fn text_is_escaped_but_raw_is_not() {
        let (memory, host, root) = setup();
        text("<b>").render(&host, root, None).unwrap();
        unsafe_html("<b>x</b>").render(&host, root, None).unwrap();
        assert_eq!(memory.borrow().inner_html(root), "&lt;b&gt;<b>x</b>");
    }
}
