//! darray-hashmap: a single-threaded, separately-chained hash map over
//! borrowed keys and values, built on an additive-growth dynamic array.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the map a thin layer over one container contract, so the
//!   map's correctness reduces to the array's indexing and growth rules.
//! - Layers:
//!   - DynArray<T>: slot storage where every index below capacity is
//!     addressable. Grows by a fixed step when a push finds it full, and
//!     contracts on pop once it is far emptier than one step.
//!   - ChainedHashMap<'a, K, V, H, C>: a fixed table of
//!     `DEFAULT_BUCKET_COUNT` bucket slots (a DynArray of DynArrays). Each
//!     bucket chains handles to nodes `{ key, value, hash }`.
//!   - Strategies: `KeyHasher` (key to `u32`) and `KeyCompare` (only
//!     `Equal` matters). Closures are strategies; the defaults are
//!     `JenkinsOneAtATime` and `ByteCompare`.
//!
//! Constraints
//! - Single-threaded: the map is `!Send`/`!Sync`; callers serialize access.
//! - The bucket count never changes after construction.
//! - Keys and values are borrowed for `'a`. The map frees its nodes and
//!   buckets, never the payloads.
//! - Lookups match the cached hash first and only then call `KeyCompare`.
//!
//! Duplicate keys
//! - `set` never looks for an existing equal key. A second `set` appends a
//!   node that stays shadowed: `get`/`delete` reach the first node in chain
//!   order, and the later one only after the first is deleted.
//! - `insert` is the checked variant and fails with `DuplicateKey`.
//!
//! Removal
//! - `delete` is a swap-delete: the chain's last node moves into the
//!   vacated index, so chain order is not stable across deletions.
//! - Buckets emptied by deletion stay allocated until the map is dropped.
//!
//! Failure model
//! - Recoverable failures (`ArrayError`, `MapError`) leave the structure as
//!   it was before the call. Lookups that miss return `None`.
//! - Broken internal invariants panic. In debug builds a hash or compare
//!   strategy that re-enters the map it is serving panics as well.
//!
//! Logging
//! - With the `logging` feature, array resizes and map teardown emit
//!   `log::trace!` records and allocation failures emit `log::warn!`.

pub mod dyn_array;
mod error;
mod guard;
pub mod hash_map;
mod hash_map_proptest;
pub mod strategy;

// Public surface
pub use dyn_array::{DynArray, DEFAULT_EXPAND_RATE};
pub use error::{ArrayError, MapError};
pub use hash_map::{ChainedHashMap, Node, BUCKET_INITIAL_CAPACITY, DEFAULT_BUCKET_COUNT};
pub use strategy::{
    BuildHasherStrategy, ByteCompare, JenkinsOneAtATime, KeyCompare, KeyHasher, OrdCompare,
};
