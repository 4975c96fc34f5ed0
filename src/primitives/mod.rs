// ============================================================================
// nug - Primitives Module
// Stores, derived stores and component props
// ============================================================================

pub mod derived;
pub mod props;
pub mod store;

// Re-export for convenience
pub use derived::{derived, Derived, Stores};
pub use props::{ComponentProps, Prop};
pub use store::{readable, writable, Readable, Writable};
