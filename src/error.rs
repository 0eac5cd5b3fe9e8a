//! Error type shared by every table operation.

/// Failure signalled by a table operation.
///
/// A failed operation never leaves a partial mutation behind; the table
/// stays usable after any error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Malformed or missing input: zero bucket count, bad secret material,
    /// empty key or value.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// Backing storage could not be obtained.
    #[error("allocation of {bytes} bytes failed")]
    AllocationFailure {
        /// Size of the request that failed.
        bytes: usize,
    },
    /// Insert of a key that is already present.
    #[error("duplicate key")]
    DuplicateKey,
    /// Retrieve, update or delete of a key that is not present.
    #[error("key not found")]
    NotFound,
}

impl TableError {
    pub(crate) fn allocation(bytes: usize) -> Self {
        TableError::AllocationFailure { bytes }
    }
}

pub type Result<T> = core::result::Result<T, TableError>;
