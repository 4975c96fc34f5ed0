// ============================================================================
// nug - Components
// Render functions bound to props, mounted into a host tree
// ============================================================================
//
// Lifecycle: Unmounted -> Mounted -> Destroyed.
//
// Mounting inserts an invisible marker, subscribes (without initial delivery)
// to every observable prop and watched store, then renders. Every render pass
// destroys the previous children completely before evaluating the render
// function again and inserting the new children in front of the marker, so
// the component never touches host nodes outside its own range.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::core::error::{LifecycleState, NugError, Result};
use crate::core::types::{SubscribeOptions, Unsubscriber, Watch};
use crate::dom::host::{Host, HostNode, COMMENT_TAG};
use crate::dom::node::{BoxedNode, Node};
use crate::primitives::props::ComponentProps;

type RenderFn<P> = Rc<dyn Fn(&P) -> Result<Vec<BoxedNode>>>;
type WatchFn<P> = Rc<dyn Fn(&P) -> Vec<Rc<dyn Watch>>>;

// =============================================================================
// COMPONENT DEFINITION
// =============================================================================

/// A reusable component definition: a render function plus optional extra
/// stores to watch. Call [`instantiate`](Self::instantiate) per use.
///
/// # Example
///
/// ```
/// use nug::dom::{Host, MemoryHost};
/// use nug::{text, writable, ComponentDef, Node, Prop};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let counter = ComponentDef::new(|n: &Prop<i32>| vec![text(n.get()).boxed()]);
///
/// let memory = Rc::new(RefCell::new(MemoryHost::new()));
/// let host = Host::new(memory.clone());
/// let root = host.create_node("main");
///
/// let n = writable(1);
/// let instance = counter.instantiate(n.clone().into());
/// instance.mount(&host, root, None).unwrap();
/// assert_eq!(memory.borrow().text_content(root), "1");
///
/// n.set(2);
/// assert_eq!(memory.borrow().text_content(root), "2");
/// ```
pub struct ComponentDef<P> {
    render: RenderFn<P>,
    watch: Option<WatchFn<P>>,
}

impl<P> Clone for ComponentDef<P> {
    fn clone(&self) -> Self {
        Self {
            render: self.render.clone(),
            watch: self.watch.clone(),
        }
    }
}

impl<P: ComponentProps> ComponentDef<P> {
    /// Define a component from an infallible render function.
    pub fn new(render: impl Fn(&P) -> Vec<BoxedNode> + 'static) -> Self {
        Self {
            render: Rc::new(move |props| Ok(render(props))),
            watch: None,
        }
    }

    /// Define a component whose render function can fail. Failures surface
    /// as [`NugError::CombinerFailure`].
    pub fn try_new<E>(render: impl Fn(&P) -> std::result::Result<Vec<BoxedNode>, E> + 'static) -> Self
    where
        E: Into<Box<dyn std::error::Error>>,
    {
        Self {
            render: Rc::new(move |props| render(props).map_err(|e| NugError::CombinerFailure(e.into()))),
            watch: None,
        }
    }

    /// Declare stores to watch in addition to the observable props.
    pub fn watch(mut self, watch: impl Fn(&P) -> Vec<Rc<dyn Watch>> + 'static) -> Self {
        self.watch = Some(Rc::new(watch));
        self
    }

    /// Create an unmounted instance bound to `props`.
    pub fn instantiate(&self, props: P) -> Component<P> {
        Component {
            inner: Rc::new(ComponentInner {
                props,
                render: self.render.clone(),
                watch: self.watch.clone(),
                state: Cell::new(LifecycleState::Unmounted),
                mount: RefCell::new(None),
                children: RefCell::new(Vec::new()),
                subscriptions: RefCell::new(Vec::new()),
                rendering: Cell::new(false),
                pending: Cell::new(false),
                failure: RefCell::new(None),
            }),
        }
    }
}

// =============================================================================
// COMPONENT INNER
// =============================================================================

#[derive(Clone)]
struct MountPoint {
    host: Host,
    container: HostNode,
    marker: HostNode,
}

struct ComponentInner<P> {
    props: P,
    render: RenderFn<P>,
    watch: Option<WatchFn<P>>,

    state: Cell<LifecycleState>,
    mount: RefCell<Option<MountPoint>>,

    /// Nodes produced by the last render pass
    children: RefCell<Vec<BoxedNode>>,

    /// Subscriptions to observable props and watched stores
    subscriptions: RefCell<Vec<Unsubscriber>>,

    /// A render pass is running
    rendering: Cell<bool>,

    /// A notification arrived during the running pass
    pending: Cell<bool>,

    /// Error from the render that moved the instance to `Failed`
    failure: RefCell<Option<NugError>>,
}

impl<P: ComponentProps> ComponentInner<P> {
    fn lifecycle_error(&self, operation: &'static str) -> NugError {
        NugError::InvalidLifecycleState {
            operation,
            state: self.state.get(),
        }
    }

    /// Run render passes until no notification arrived during the last one.
    fn render_pass(&self) -> Result<()> {
        if self.rendering.get() {
            self.pending.set(true);
            return Ok(());
        }

        self.rendering.set(true);
        let result = loop {
            self.pending.set(false);
            if let Err(err) = self.rebuild() {
                break Err(err);
            }
            if !self.pending.get() {
                break Ok(());
            }
        };
        self.rendering.set(false);
        result
    }

    fn rebuild(&self) -> Result<()> {
        let Some(mount) = self.mount.borrow().clone() else {
            return Err(self.lifecycle_error("render"));
        };

        let previous = std::mem::take(&mut *self.children.borrow_mut());
        let mut destroyed = Ok(());
        for mut child in previous {
            destroyed = destroyed.and(child.destroy(&mount.host));
        }
        destroyed?;

        let nodes = (self.render)(&self.props)?;
        let mut rendered = Vec::with_capacity(nodes.len());
        let mut result = Ok(());
        for mut child in nodes {
            result = child.render(&mount.host, mount.container, Some(mount.marker));
            rendered.push(child);
            if result.is_err() {
                break;
            }
        }
        tracing::trace!(target: "nug::component", children = rendered.len(), "rendered");

        if self.state.get() == LifecycleState::Destroyed {
            // Destroyed from inside the render function or a child's render.
            for child in &mut rendered {
                result = result.and(child.destroy(&mount.host));
            }
            return result;
        }

        *self.children.borrow_mut() = rendered;
        result
    }

    fn on_notify(&self) {
        if self.state.get() != LifecycleState::Mounted {
            return;
        }
        if let Err(err) = self.render_pass() {
            tracing::error!(target: "nug::component", error = %err, "render after store notification failed");
            self.state.set(LifecycleState::Failed);
            *self.failure.borrow_mut() = Some(err);
        }
    }

    fn release_subscriptions(&self) {
        let subscriptions: Vec<_> = self.subscriptions.borrow_mut().drain(..).collect();
        for unsubscribe in subscriptions {
            unsubscribe.unsubscribe();
        }
    }

    fn teardown(&self) -> Result<()> {
        let previous = self.state.replace(LifecycleState::Destroyed);
        if previous == LifecycleState::Destroyed {
            return Ok(());
        }

        self.release_subscriptions();

        let Some(mount) = self.mount.borrow_mut().take() else {
            return Ok(());
        };
        let children = std::mem::take(&mut *self.children.borrow_mut());

        let mut result = Ok(());
        for mut child in children {
            result = result.and(child.destroy(&mount.host));
        }
        result = result.and(mount.host.remove(mount.marker).map_err(NugError::from));

        tracing::debug!(target: "nug::component", from = %previous, "component destroyed");
        result
    }
}

impl<P> Drop for ComponentInner<P> {
    fn drop(&mut self) {
        // Without an explicit destroy the rendered output stays in the host;
        // only the store subscriptions are released.
        for unsubscribe in self.subscriptions.get_mut().drain(..) {
            unsubscribe.unsubscribe();
        }
    }
}

// =============================================================================
// COMPONENT - The public handle
// =============================================================================

/// A component instance.
///
/// Handles are cheap to clone. Keep one alive while the component is
/// mounted: store subscriptions only hold weak references, and dropping the
/// last handle releases them.
pub struct Component<P> {
    inner: Rc<ComponentInner<P>>,
}

impl<P> Clone for Component<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<P: ComponentProps> Component<P> {
    /// Mount into `container`, appended or right before `before`.
    ///
    /// Fails with [`NugError::InvalidLifecycleState`] unless unmounted.
    pub fn mount(&self, host: &Host, container: HostNode, before: Option<HostNode>) -> Result<()> {
        let inner = &self.inner;
        if inner.state.get() != LifecycleState::Unmounted {
            return Err(inner.lifecycle_error("mount"));
        }

        let marker = host.create_node(COMMENT_TAG);
        host.insert(container, marker, before)?;
        *inner.mount.borrow_mut() = Some(MountPoint {
            host: host.clone(),
            container,
            marker,
        });
        inner.state.set(LifecycleState::Mounted);

        let weak: Weak<ComponentInner<P>> = Rc::downgrade(inner);
        let run: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.on_notify();
            }
        });

        let options = SubscribeOptions::skip_initial();
        let mut subscriptions = inner.props.watch_props(&run, options);
        if let Some(watch) = &inner.watch {
            for store in watch(&inner.props) {
                subscriptions.push(store.watch(run.clone(), options));
            }
        }
        tracing::debug!(target: "nug::component", subscriptions = subscriptions.len(), "component mounted");
        inner.subscriptions.borrow_mut().extend(subscriptions);

        inner.render_pass().inspect_err(|_| {
            inner.state.set(LifecycleState::Failed);
        })
    }

    /// Re-render now. Fails with [`NugError::InvalidLifecycleState`] unless
    /// mounted.
    pub fn update(&self) -> Result<()> {
        let inner = &self.inner;
        if inner.state.get() != LifecycleState::Mounted {
            return Err(inner.lifecycle_error("update"));
        }
        inner.render_pass().inspect_err(|_| {
            inner.state.set(LifecycleState::Failed);
        })
    }

    /// Destroy children, remove the marker and release every subscription.
    ///
    /// Idempotent, and a no-op on an instance that was never mounted apart
    /// from making it unmountable.
    pub fn destroy(&self) -> Result<()> {
        self.inner.teardown()
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.state.get()
    }

    pub fn props(&self) -> &P {
        &self.inner.props
    }

    /// Number of nodes produced by the last render pass.
    pub fn child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    /// Number of live store subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.borrow().len()
    }

    /// Take the error of a failed notification-triggered render.
    pub fn take_error(&self) -> Option<NugError> {
        self.inner.failure.borrow_mut().take()
    }
}

impl<P: ComponentProps> Node for Component<P> {
    fn render(&mut self, host: &Host, container: HostNode, before: Option<HostNode>) -> Result<()> {
        self.mount(host, container, before)
    }

    fn destroy(&mut self, _host: &Host) -> Result<()> {
        Component::destroy(self)
    }
}

impl<P> std::fmt::Debug for Component<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("state", &self.inner.state.get())
            .field("children", &self.inner.children.borrow().len())
            .field("subscriptions", &self.inner.subscriptions.borrow().len())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
