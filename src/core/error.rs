// ============================================================================
// nug - Errors
// Lifecycle, configuration, render and host-tree failures
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::dom::host::HostNode;

/// Lifecycle phase of a component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Created but not yet mounted into a container.
    Unmounted,
    /// Mounted, subscribed and rendered.
    Mounted,
    /// A notification-triggered render failed. The instance must be destroyed.
    Failed,
    /// Torn down. Terminal.
    Destroyed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unmounted => write!(f, "unmounted"),
            Self::Mounted => write!(f, "mounted"),
            Self::Failed => write!(f, "failed"),
            Self::Destroyed => write!(f, "destroyed"),
        }
    }
}

/// Errors raised by stores, the chunk deriver and components.
#[derive(Debug, Error)]
pub enum NugError {
    /// An operation was attempted outside its valid lifecycle phase.
    #[error("cannot {operation} a component that is {state}")]
    InvalidLifecycleState {
        operation: &'static str,
        state: LifecycleState,
    },

    /// Rejected construction parameters, e.g. a zero chunk size.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A fallible render function returned an error.
    #[error("render function failed: {0}")]
    CombinerFailure(#[source] Box<dyn std::error::Error>),

    /// The host tree rejected an operation.
    #[error("host tree error: {0}")]
    Host(#[from] HostError),
}

/// Errors reported by a [`HostTree`](crate::dom::host::HostTree) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The node handle does not refer to a live node.
    #[error("unknown host node {0:?}")]
    UnknownNode(HostNode),

    /// `insert_before` was given a reference node that is not a child of the parent.
    #[error("{reference:?} is not a child of {parent:?}")]
    NotAChild { parent: HostNode, reference: HostNode },

    /// The node kind cannot hold children or attributes (text, raw markup, markers).
    #[error("host node {0:?} is not an element")]
    NotAnElement(HostNode),
}

/// A specialized Result type for nug operations.
pub type Result<T> = std::result::Result<T, NugError>;
