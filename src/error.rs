//! Error types for queue operations

use std::alloc::Layout;
use thiserror::Error;

/// Queue error types
///
/// A failed operation leaves the queue exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Storage for an element, its value, or the ghost node could not be obtained.
    #[error("failed to allocate {} bytes", .0.size())]
    AllocationFailure(Layout),

    /// The operation requires a queue, but none was given.
    #[error("queue is absent")]
    InvalidArgument,

    /// The operation requires at least one element.
    #[error("queue is empty")]
    EmptyQueue,
}

/// Result type for queue operations
pub type Result<T> = std::result::Result<T, QueueError>;
