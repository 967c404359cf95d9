//! Error types for table creation and insertion.

use std::collections::TryReserveError;
use std::fmt;
use thiserror::Error;

/// Failure to create a table. Nothing is left allocated on failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CreateError {
    /// A table needs at least one bucket.
    #[error("table capacity must be at least one bucket")]
    ZeroCapacity,
    /// The bucket array could not be allocated.
    #[error("failed to allocate {capacity} buckets")]
    AllocationFailed {
        capacity: usize,
        #[source]
        source: TryReserveError,
    },
}

/// Negative outcome of an insert. The table is unchanged in both cases and
/// the rejected value is handed back to the caller.
#[derive(Error)]
pub enum InsertError<V> {
    /// The key is already present and replacement was not requested.
    #[error("key already present")]
    DuplicateKey(V),
    /// Storage for the key copy could not be allocated.
    #[error("failed to allocate storage for the key")]
    AllocationFailed {
        value: V,
        #[source]
        source: TryReserveError,
    },
}

impl<V> InsertError<V> {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, InsertError::DuplicateKey(_))
    }

    /// Recover the value that was not stored.
    pub fn into_value(self) -> V {
        match self {
            InsertError::DuplicateKey(value) | InsertError::AllocationFailed { value, .. } => value,
        }
    }
}

// Values are opaque to the table; keep `Debug` available without `V: Debug`.
impl<V> fmt::Debug for InsertError<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::DuplicateKey(_) => f.write_str("DuplicateKey(..)"),
            InsertError::AllocationFailed { source, .. } => f
                .debug_struct("AllocationFailed")
                .field("source", source)
                .finish_non_exhaustive(),
        }
    }
}
