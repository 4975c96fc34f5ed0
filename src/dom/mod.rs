// ============================================================================
// nug - DOM Module
// Host tree abstraction, nodes, components and chunked list rendering
// ============================================================================

pub mod component;
pub mod host;
pub mod list;
pub mod memory;
pub mod node;

// Re-export for convenience
pub use component::{Component, ComponentDef};
pub use host::{EventHandler, Host, HostNode, HostTree, COMMENT_TAG, RAW_TAG, TEXT_TAG};
pub use list::{chunk_component, chunked_list, chunked_list_component, ChunkProps, ChunkedListProps};
pub use memory::MemoryHost;
pub use node::{
    anchor, button, div, element, span, text, unsafe_html, BoxedNode, Element, Node, Text, Unsafe,
};
