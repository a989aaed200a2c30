//! ChainedHashMap: separately-chained map over borrowed keys and values.
//!
//! Two levels of `DynArray`: a fixed table of `DEFAULT_BUCKET_COUNT` bucket
//! slots, and per bucket a chain of node handles. Buckets are created the
//! first time a key hashes into them and live until the map is dropped.
//! Nodes live in a generational `SlotMap`, so a chain holds small `Copy`
//! handles and releasing a node is a single slot removal.
//!
//! The map borrows every key and value for `'a` and never frees them.

use crate::dyn_array::{self, DynArray};
use crate::error::{ArrayError, MapError};
use crate::guard::StrategyGuard;
use crate::strategy::{ByteCompare, JenkinsOneAtATime, KeyCompare, KeyHasher};
use core::cmp::Ordering;
use core::fmt;
use core::mem::size_of;
use core::ops::ControlFlow;
use slotmap::{DefaultKey, SlotMap};

/// Number of top-level buckets. Fixed for the lifetime of a map.
pub const DEFAULT_BUCKET_COUNT: usize = 100;

/// Slot count of a freshly created bucket.
pub const BUCKET_INITIAL_CAPACITY: usize = DEFAULT_BUCKET_COUNT;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
struct NodeHandle(DefaultKey);

type Bucket = DynArray<NodeHandle>;
type Nodes<'a, K, V> = SlotMap<DefaultKey, Node<'a, K, V>>;

/// One stored association, as seen by [`ChainedHashMap::traverse`].
#[derive(Debug)]
pub struct Node<'a, K: ?Sized, V: ?Sized> {
    key: &'a K,
    value: &'a V,
    hash: u32,
}

impl<'a, K: ?Sized, V: ?Sized> Node<'a, K, V> {
    pub fn key(&self) -> &'a K {
        self.key
    }

    pub fn value(&self) -> &'a V {
        self.value
    }

    /// Hash computed when the node was inserted.
    pub fn hash(&self) -> u32 {
        self.hash
    }
}

#[cold]
#[track_caller]
fn invariant_violation(what: impl fmt::Display) -> ! {
    panic!("hash map invariant violated: {what}")
}

#[inline]
fn bucket_index(hash: u32) -> usize {
    (hash % DEFAULT_BUCKET_COUNT as u32) as usize
}

/// The first level: one slot per bucket, empty until first written.
#[derive(Debug)]
struct BucketTable {
    slots: DynArray<Bucket>,
}

impl BucketTable {
    fn new() -> Result<Self, ArrayError> {
        let mut slots = DynArray::init(size_of::<Bucket>(), DEFAULT_BUCKET_COUNT)?;
        slots.extend_to_capacity();
        Ok(Self { slots })
    }

    fn get(&self, hash: u32) -> Option<&Bucket> {
        self.slots
            .get(bucket_index(hash))
            .unwrap_or_else(|e| invariant_violation(e))
    }

    fn get_mut(&mut self, hash: u32) -> Option<&mut Bucket> {
        self.slots
            .get_mut(bucket_index(hash))
            .unwrap_or_else(|e| invariant_violation(e))
    }

    fn get_or_create(&mut self, hash: u32) -> Result<&mut Bucket, ArrayError> {
        let index = bucket_index(hash);
        if self.get(hash).is_none() {
            let bucket = DynArray::init(size_of::<NodeHandle>(), BUCKET_INITIAL_CAPACITY)?;
            self.slots
                .set(index, bucket)
                .unwrap_or_else(|e| invariant_violation(e));
        }
        match self.get_mut(hash) {
            Some(bucket) => Ok(bucket),
            None => invariant_violation(format_args!("bucket {index} vanished after creation")),
        }
    }

    fn iter(&self) -> dyn_array::Iter<'_, Bucket> {
        self.slots.iter()
    }
}

fn node<'m, 'a, K: ?Sized, V: ?Sized>(
    nodes: &'m Nodes<'a, K, V>,
    handle: NodeHandle,
) -> &'m Node<'a, K, V> {
    nodes
        .get(handle.0)
        .unwrap_or_else(|| invariant_violation("chain refers to a released node"))
}

/// Scans `bucket` in chain order for the first node with a matching cached
/// hash whose key compares equal. Returns its chain index and handle.
fn chain_position<'a, K, V, C>(
    bucket: &Bucket,
    nodes: &Nodes<'a, K, V>,
    compare: &C,
    hash: u32,
    key: &K,
) -> Option<(usize, NodeHandle)>
where
    K: ?Sized,
    V: ?Sized,
    C: KeyCompare<K>,
{
    bucket.iter().enumerate().find_map(|(i, slot)| {
        let handle = *slot.unwrap_or_else(|| invariant_violation("hole in bucket chain"));
        let n = node(nodes, handle);
        (n.hash == hash && compare.compare(n.key, key) == Ordering::Equal).then_some((i, handle))
    })
}

/// Allocates a node and appends it to its bucket. If the chain cannot grow,
/// the node is released again and the bucket is left as it was.
fn append_node<'a, K: ?Sized, V: ?Sized>(
    buckets: &mut BucketTable,
    nodes: &mut Nodes<'a, K, V>,
    node: Node<'a, K, V>,
) -> Result<(), MapError> {
    let bucket = buckets.get_or_create(node.hash)?;
    let handle = NodeHandle(nodes.insert(node));
    if let Err(e) = bucket.push(handle) {
        nodes.remove(handle.0);
        return Err(e.into());
    }
    Ok(())
}

pub struct ChainedHashMap<'a, K: ?Sized, V: ?Sized, H = JenkinsOneAtATime, C = ByteCompare> {
    buckets: BucketTable,
    nodes: Nodes<'a, K, V>,
    hasher: H,
    compare: C,
    guard: StrategyGuard,
}

impl<'a, K, V> ChainedHashMap<'a, K, V>
where
    K: ?Sized + AsRef<[u8]>,
    V: ?Sized,
{
    /// Creates a map hashing with `JenkinsOneAtATime` and comparing with
    /// `ByteCompare`.
    pub fn new() -> Result<Self, MapError> {
        Self::with_strategies(ByteCompare, JenkinsOneAtATime)
    }
}

impl<'a, K, V, H> ChainedHashMap<'a, K, V, H, ByteCompare>
where
    K: ?Sized + AsRef<[u8]>,
    V: ?Sized,
    H: KeyHasher<K>,
{
    pub fn with_hasher(hasher: H) -> Result<Self, MapError> {
        Self::with_strategies(ByteCompare, hasher)
    }
}

impl<'a, K, V, C> ChainedHashMap<'a, K, V, JenkinsOneAtATime, C>
where
    K: ?Sized + AsRef<[u8]>,
    V: ?Sized,
    C: KeyCompare<K>,
{
    pub fn with_compare(compare: C) -> Result<Self, MapError> {
        Self::with_strategies(compare, JenkinsOneAtATime)
    }
}

impl<'a, K, V, H, C> ChainedHashMap<'a, K, V, H, C>
where
    K: ?Sized,
    V: ?Sized,
    H: KeyHasher<K>,
    C: KeyCompare<K>,
{
    /// Creates a map with caller-supplied strategies. The bucket table is
    /// allocated up front with every bucket slot addressable and empty.
    pub fn with_strategies(compare: C, hasher: H) -> Result<Self, MapError> {
        Ok(Self {
            buckets: BucketTable::new()?,
            nodes: SlotMap::with_key(),
            hasher,
            compare,
            guard: StrategyGuard::new(),
        })
    }

    /// Number of stored nodes, shadowed duplicates included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Hashes `key` and resolves its bucket without creating it. The hash is
    /// returned so callers can match it against cached node hashes.
    fn find_bucket(&self, key: &K) -> (Option<&Bucket>, u32) {
        let hash = self.hasher.hash(key);
        (self.buckets.get(hash), hash)
    }

    /// Appends a new node for `key`. An equal key already present is not
    /// replaced: the new node sits behind it in the chain and stays hidden
    /// from `get`/`delete` until the earlier one is deleted.
    pub fn set(&mut self, key: &'a K, value: &'a V) -> Result<(), MapError> {
        let _g = self.guard.enter();
        let hash = self.hasher.hash(key);
        append_node(&mut self.buckets, &mut self.nodes, Node { key, value, hash })
    }

    /// Like `set`, but fails with `DuplicateKey` and leaves the map unchanged
    /// when an equal key is already present.
    pub fn insert(&mut self, key: &'a K, value: &'a V) -> Result<(), MapError> {
        let _g = self.guard.enter();
        let hash = self.hasher.hash(key);
        if let Some(bucket) = self.buckets.get(hash) {
            if chain_position(bucket, &self.nodes, &self.compare, hash, key).is_some() {
                return Err(MapError::DuplicateKey);
            }
        }
        append_node(&mut self.buckets, &mut self.nodes, Node { key, value, hash })
    }

    pub fn get(&self, key: &K) -> Option<&'a V> {
        let _g = self.guard.enter();
        let (bucket, hash) = self.find_bucket(key);
        let (_, handle) = chain_position(bucket?, &self.nodes, &self.compare, hash, key)?;
        Some(node(&self.nodes, handle).value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes the first node matching `key` and returns its value.
    ///
    /// The chain's last node is moved into the vacated position, so chain
    /// order is not preserved.
    pub fn delete(&mut self, key: &K) -> Option<&'a V> {
        let _g = self.guard.enter();
        let hash = self.hasher.hash(key);
        let bucket = self.buckets.get_mut(hash)?;
        let (i, handle) = chain_position(bucket, &self.nodes, &self.compare, hash, key)?;

        let released = self
            .nodes
            .remove(handle.0)
            .unwrap_or_else(|| invariant_violation("matched node already released"));

        match bucket.pop() {
            Ok(Some(ending)) if ending != handle => {
                bucket
                    .set(i, ending)
                    .unwrap_or_else(|e| invariant_violation(e));
            }
            Ok(Some(_)) => {}
            Ok(None) => invariant_violation("hole at the end of a bucket chain"),
            Err(e) => invariant_violation(e),
        }
        Some(released.value)
    }

    /// Visits every node, buckets in index order and each chain in order.
    ///
    /// Returning `ControlFlow::Break(code)` from `visit` stops the walk at
    /// that node and `code` becomes the result.
    pub fn traverse<B, F>(&self, mut visit: F) -> ControlFlow<B>
    where
        F: FnMut(&Node<'a, K, V>) -> ControlFlow<B>,
    {
        for n in self.nodes_in_order() {
            if let ControlFlow::Break(code) = visit(n) {
                return ControlFlow::Break(code);
            }
        }
        ControlFlow::Continue(())
    }

    /// Iterates `(key, value)` pairs in the same order as `traverse`.
    pub fn iter(&self) -> Iter<'_, 'a, K, V> {
        Iter {
            inner: self.nodes_in_order(),
        }
    }

    fn nodes_in_order(&self) -> NodesInOrder<'_, 'a, K, V> {
        NodesInOrder {
            buckets: self.buckets.iter(),
            chain: None,
            nodes: &self.nodes,
        }
    }

    /// Releases every node, every bucket and the table. Keys and values are
    /// borrowed and are left untouched.
    pub fn destroy(self) {
        let Self {
            buckets, mut nodes, ..
        } = self;
        let mut _released = 0usize;
        for bucket in buckets.iter().flatten() {
            for handle in bucket.iter().flatten() {
                if nodes.remove(handle.0).is_some() {
                    _released += 1;
                }
            }
        }
        debug_assert!(nodes.is_empty(), "node not reachable from any bucket");
        #[cfg(feature = "logging")]
        log::trace!("hash map destroyed, released {_released} nodes");
    }
}

impl<K: ?Sized, V: ?Sized, H, C> fmt::Debug for ChainedHashMap<'_, K, V, H, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = NodesInOrder {
            buckets: self.buckets.iter(),
            chain: None,
            nodes: &self.nodes,
        }
        .map(|n| (n.key, n.value));
        f.debug_map().entries(entries).finish()
    }
}

struct NodesInOrder<'m, 'a, K: ?Sized, V: ?Sized> {
    buckets: dyn_array::Iter<'m, Bucket>,
    chain: Option<dyn_array::Iter<'m, NodeHandle>>,
    nodes: &'m Nodes<'a, K, V>,
}

impl<'m, 'a, K: ?Sized, V: ?Sized> Iterator for NodesInOrder<'m, 'a, K, V> {
    type Item = &'m Node<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(chain) = self.chain.as_mut() {
                if let Some(handle) = chain.by_ref().flatten().next() {
                    return Some(node(self.nodes, *handle));
                }
            }
            // Buckets never created leave `chain` empty and are skipped.
            self.chain = self.buckets.next()?.map(Bucket::iter);
        }
    }
}

/// Iterator over `(key, value)` pairs of a `ChainedHashMap`.
pub struct Iter<'m, 'a, K: ?Sized, V: ?Sized> {
    inner: NodesInOrder<'m, 'a, K, V>,
}

impl<'m, 'a, K: ?Sized, V: ?Sized> Iterator for Iter<'m, 'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|n| (n.key, n.value))
    }
}

impl<'m, 'a, K, V, H, C> IntoIterator for &'m ChainedHashMap<'a, K, V, H, C>
where
    K: ?Sized,
    V: ?Sized,
    H: KeyHasher<K>,
    C: KeyCompare<K>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'m, 'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
