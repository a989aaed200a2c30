//! Debug-only guard against re-entering a map from its own strategies.
//!
//! `get`, `set`, `insert` and `delete` call into user code only through the
//! map's `KeyHasher` and `KeyCompare`. While those calls run, the chain being
//! scanned must not change. In debug builds a strategy that reaches back into
//! the same map panics; release builds compile the guard away.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub(crate) struct StrategyGuard {
    #[cfg(debug_assertions)]
    active: Cell<bool>,
    // The map is single-threaded; this keeps it !Send + !Sync.
    _single_thread: PhantomData<*mut ()>,
}

impl StrategyGuard {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(false),
            _single_thread: PhantomData,
        }
    }

    /// Marks the map busy until the returned scope is dropped.
    #[inline]
    pub(crate) fn enter(&self) -> GuardScope<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.active.replace(true),
                "hash map re-entered from inside a hash or compare strategy"
            );
            return GuardScope { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return GuardScope { _owner: PhantomData };
        }
    }
}

impl Default for StrategyGuard {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct GuardScope<'a> {
    #[cfg(debug_assertions)]
    owner: &'a StrategyGuard,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a ()>,
}

impl Drop for GuardScope<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.active.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::StrategyGuard;

    #[test]
    fn sequential_entries_are_ok() {
        let g = StrategyGuard::new();
        drop(g.enter());
        let _again = g.enter();
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_entry_panics_in_debug() {
        let g = StrategyGuard::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = g.enter();
            let _inner = g.enter();
        }));
        assert!(res.is_err(), "expected nested entry to panic in debug builds");
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn nested_entry_is_noop_in_release() {
        let g = StrategyGuard::new();
        let _outer = g.enter();
        let _inner = g.enter();
    }
}
