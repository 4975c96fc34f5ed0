// ============================================================================
// nug - A minimal reactive UI runtime
// ============================================================================
//
// Stores (readable, writable, derived) with explicit subscriptions,
// components that re-render when observable props change, and chunked list
// rendering that confines re-renders to the chunk that changed.
// ============================================================================

#[macro_use]
mod macros;

pub mod collections;
pub mod core;
pub mod dom;
pub mod primitives;

// Re-export core items at crate root for ergonomic access
pub use crate::core::error::{HostError, LifecycleState, NugError, Result};
pub use crate::core::types::{get, Observable, SubscribeOptions, Subscriber, Unsubscriber, Watch};

// Re-export primitives at crate root
pub use primitives::derived::{derived, Derived, Stores};
pub use primitives::props::{ComponentProps, Prop};
pub use primitives::store::{readable, writable, Readable, Writable};

// Re-export collections
pub use collections::{derive_chunks, Chunk, ChunkOptions, Chunks};

// Re-export rendering
pub use dom::component::{Component, ComponentDef};
pub use dom::list::{chunked_list, ChunkProps, ChunkedListProps};
pub use dom::node::{
    anchor, button, div, element, span, text, unsafe_html, BoxedNode, Element, Node, Text, Unsafe,
};

// =============================================================================
// TESTS
// =============================================================================
