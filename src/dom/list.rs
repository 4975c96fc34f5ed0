// ============================================================================
// nug - Chunked List Rendering
// One component per chunk, one component per item
// ============================================================================
//
// The list component watches the chunk list and rebuilds only on structural
// change. Each chunk component watches its own chunk store, so an edit inside
// one chunk re-renders that chunk's items and nothing else.
// ============================================================================

use std::rc::Rc;

use crate::collections::{Chunk, Chunks};
use crate::core::types::{SubscribeOptions, Unsubscriber};
use crate::dom::component::{Component, ComponentDef};
use crate::dom::node::Node;
use crate::primitives::props::{ComponentProps, Prop};

/// Props of the list-level component.
pub struct ChunkedListProps<T: 'static> {
    pub chunks: Prop<Vec<Chunk<T>>>,
    pub item: ComponentDef<Prop<T>>,
}

impl<T: 'static> ComponentProps for ChunkedListProps<T> {
    fn watch_props(&self, run: &Rc<dyn Fn()>, options: SubscribeOptions) -> Vec<Unsubscriber> {
        self.chunks.watch_props(run, options)
    }
}

/// Props of one chunk's component.
pub struct ChunkProps<T: 'static> {
    pub chunk: Prop<Vec<T>>,
    pub item: ComponentDef<Prop<T>>,
}

impl<T: 'static> ComponentProps for ChunkProps<T> {
    fn watch_props(&self, run: &Rc<dyn Fn()>, options: SubscribeOptions) -> Vec<Unsubscriber> {
        self.chunk.watch_props(run, options)
    }
}

/// The component rendering one chunk: one `item` instance per element.
pub fn chunk_component<T: Clone + 'static>() -> ComponentDef<ChunkProps<T>> {
    ComponentDef::new(|props: &ChunkProps<T>| {
        props
            .chunk
            .get()
            .into_iter()
            .map(|value| props.item.instantiate(Prop::value(value)).boxed())
            .collect()
    })
}

/// The component rendering a chunk list: one chunk component per chunk.
pub fn chunked_list_component<T: Clone + 'static>() -> ComponentDef<ChunkedListProps<T>> {
    let chunk = chunk_component::<T>();
    ComponentDef::new(move |props: &ChunkedListProps<T>| {
        props
            .chunks
            .get()
            .into_iter()
            .map(|store| {
                chunk
                    .instantiate(ChunkProps {
                        chunk: store.into(),
                        item: props.item.clone(),
                    })
                    .boxed()
            })
            .collect()
    })
}

/// Render `chunks` with one `item` component per element.
///
/// # Example
///
/// ```
/// use nug::dom::{Host, MemoryHost};
/// use nug::{chunked_list, derive_chunks, span, text, writable, ChunkOptions, ComponentDef, Node, Prop};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let items = writable(vec![1, 2, 3, 4, 5]);
/// let chunks = derive_chunks(ChunkOptions::new(items.clone(), |n: &i32| *n, 2)).unwrap();
/// let item = ComponentDef::new(|n: &Prop<i32>| vec![span().child(text(n.get())).boxed()]);
///
/// let memory = Rc::new(RefCell::new(MemoryHost::new()));
/// let host = Host::new(memory.clone());
/// let root = host.create_node("ul");
///
/// let list = chunked_list(chunks, item);
/// list.mount(&host, root, None).unwrap();
/// assert_eq!(memory.borrow().text_content(root), "12345");
///
/// items.set(vec![1, 2, 3, 4, 5, 6]);
/// assert_eq!(memory.borrow().text_content(root), "123456");
/// ```
pub fn chunked_list<T: Clone + 'static>(
    chunks: Chunks<T>,
    item: ComponentDef<Prop<T>>,
) -> Component<ChunkedListProps<T>> {
    chunked_list_component().instantiate(ChunkedListProps {
        chunks: Prop::store(chunks),
        item,
    })
}
