//! Error types shared by `DynArray` and `ChainedHashMap`.

/// Recoverable failures of [`DynArray`](crate::DynArray) operations.
///
/// A failed operation never leaves the array partially modified.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayError {
    /// The array was constructed with an initial capacity of zero.
    #[error("initial capacity must be greater than zero")]
    InvalidCapacity,
    /// The array was constructed with an expand rate of zero.
    #[error("expand rate must be greater than zero")]
    InvalidExpandRate,
    /// Slot storage could not be allocated or grown.
    #[error("failed to allocate storage for {requested} slots")]
    AllocationFailure { requested: usize },
    /// `pop` was called on an array with no logically present slots.
    #[error("cannot pop from an empty array")]
    EmptyArray,
    /// The index is not below the array's capacity.
    #[error("index {index} is out of range for capacity {capacity}")]
    IndexOutOfRange { index: usize, capacity: usize },
}

/// Recoverable failures of [`ChainedHashMap`](crate::ChainedHashMap) operations.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    /// The bucket table, a bucket, or a chain could not be grown.
    #[error(transparent)]
    Array(#[from] ArrayError),
    /// `insert` found an equal key already present.
    #[error("an equal key is already present in the map")]
    DuplicateKey,
}
