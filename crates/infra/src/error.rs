//! Infrastructure error model.

use thiserror::Error;

use bodega_core::DomainError;

/// The store itself is unusable.
///
/// Deterministic domain failures never surface here; this is reserved for
/// faults of the storage layer (a lock poisoned by a panicking thread,
/// state that fails its own invariants).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A store lock was poisoned by a panic in another thread.
    #[error("store lock poisoned: {0}")]
    Poisoned(&'static str),

    /// Stored state violated an invariant it should be unable to violate.
    #[error("corrupt store state: {0}")]
    Corrupt(String),
}

/// Failure of a store-level operation: a deterministic domain failure or
/// an infrastructure fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
