// ============================================================================
// nug - Core Module
// Observable capability, subscriber bookkeeping and errors
// ============================================================================

pub mod error;
pub(crate) mod subscribers;
pub mod types;
