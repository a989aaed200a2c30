//! Hash and comparison strategies for `ChainedHashMap`.
//!
//! A map is parameterized by one `KeyHasher` and one `KeyCompare`. Plain
//! closures qualify through the blanket impls, so
//! `|k: &str| k.len() as u32` is a valid hasher.

use core::cmp::Ordering;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Maps a key to the 32-bit hash used for bucket selection and chain matching.
pub trait KeyHasher<K: ?Sized> {
    fn hash(&self, key: &K) -> u32;
}

/// Orders two keys. The map only distinguishes `Equal` from everything else.
pub trait KeyCompare<K: ?Sized> {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

impl<K, F> KeyHasher<K> for F
where
    K: ?Sized,
    F: Fn(&K) -> u32,
{
    #[inline]
    fn hash(&self, key: &K) -> u32 {
        self(key)
    }
}

impl<K, F> KeyCompare<K> for F
where
    K: ?Sized,
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

/// Bob Jenkins' one-at-a-time hash over the key's bytes, with a `<< 6`
/// first finalization shift. Default hasher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JenkinsOneAtATime;

impl JenkinsOneAtATime {
    pub fn hash_bytes(bytes: &[u8]) -> u32 {
        let mut hash: u32 = 0;
        for &b in bytes {
            hash = hash.wrapping_add(u32::from(b));
            hash = hash.wrapping_add(hash << 10);
            hash ^= hash >> 6;
        }
        hash = hash.wrapping_add(hash << 6);
        hash ^= hash >> 11;
        hash.wrapping_add(hash << 15)
    }
}

impl<K> KeyHasher<K> for JenkinsOneAtATime
where
    K: ?Sized + AsRef<[u8]>,
{
    #[inline]
    fn hash(&self, key: &K) -> u32 {
        Self::hash_bytes(key.as_ref())
    }
}

/// Lexicographic byte comparison. Default comparator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteCompare;

impl<K> KeyCompare<K> for ByteCompare
where
    K: ?Sized + AsRef<[u8]>,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.as_ref().cmp(b.as_ref())
    }
}

/// Comparison through the key's own `Ord`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrdCompare;

impl<K> KeyCompare<K> for OrdCompare
where
    K: ?Sized + Ord,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Adapts any `BuildHasher` into a `KeyHasher` by folding its 64-bit output
/// down to 32 bits. Lets keys that only implement `Hash` live in the map.
#[derive(Debug, Clone, Default)]
pub struct BuildHasherStrategy<S = DefaultHashBuilder> {
    build: S,
}

impl<S> BuildHasherStrategy<S> {
    pub fn new(build: S) -> Self {
        Self { build }
    }
}

impl<K, S> KeyHasher<K> for BuildHasherStrategy<S>
where
    K: ?Sized + Hash,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, key: &K) -> u32 {
        let h = self.build.hash_one(key);
        (h ^ (h >> 32)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::BuildHasherDefault;

    #[test]
    fn jenkins_known_values() {
        assert_eq!(JenkinsOneAtATime::hash_bytes(b""), 0);
        assert_eq!(JenkinsOneAtATime::hash_bytes(b"a"), 0x097b_9233);
        assert_eq!(
            JenkinsOneAtATime::hash_bytes(b"The quick brown fox jumps over the lazy dog"),
            0x6279_7246
        );
    }

    #[test]
    fn jenkins_hashes_str_string_and_bytes_alike() {
        let s = "test data 1";
        let owned = s.to_string();
        let h = JenkinsOneAtATime;
        assert_eq!(KeyHasher::<str>::hash(&h, s), KeyHasher::<String>::hash(&h, &owned));
        assert_eq!(
            KeyHasher::<str>::hash(&h, s),
            KeyHasher::<[u8]>::hash(&h, s.as_bytes())
        );
        assert_ne!(
            KeyHasher::<str>::hash(&h, "test data 1"),
            KeyHasher::<str>::hash(&h, "test data 2")
        );
    }

    #[test]
    fn byte_compare_orders_lexicographically() {
        let c = ByteCompare;
        assert_eq!(KeyCompare::<str>::compare(&c, "abc", "abc"), Ordering::Equal);
        assert_eq!(KeyCompare::<str>::compare(&c, "abc", "abd"), Ordering::Less);
        assert_eq!(KeyCompare::<str>::compare(&c, "abcd", "abc"), Ordering::Greater);
    }

    #[test]
    fn closures_are_strategies() {
        let hasher = |k: &str| k.len() as u32;
        let compare = |a: &str, b: &str| a.len().cmp(&b.len());
        assert_eq!(hasher.hash("four"), 4);
        assert_eq!(compare.compare("ab", "cd"), Ordering::Equal);
    }

    #[test]
    fn build_hasher_strategy_is_deterministic_for_fixed_state() {
        let s: BuildHasherStrategy<BuildHasherDefault<DefaultHasher>> =
            BuildHasherStrategy::default();
        assert_eq!(s.hash(&42u64), s.hash(&42u64));
        assert_eq!(s.hash("key"), s.hash(&String::from("key")));
        assert_eq!(OrdCompare.compare(&1, &2), Ordering::Less);
    }
}
