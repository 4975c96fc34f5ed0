// ============================================================================
// nug - Collections
// List stores split into independently invalidated chunks
// ============================================================================

mod chunks;

pub use chunks::{derive_chunks, Chunk, ChunkOptions, Chunks};
