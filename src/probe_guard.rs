//! Debug-only guard against reentering a map while it probes.
//!
//! `ChainedHashMap` runs user code (`K: Hash`, `K: Eq`) while it walks a
//! chain. A key whose `eq` or `hash` reaches back into the same map would
//! see a probe half-done. Debug builds panic on such nesting; release builds
//! keep only a `!Sync` marker. The guard stays `Send`, so an owning map can
//! move to another thread or sit behind the caller's lock.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-map probe tracker. Public entry points that call user code open a
/// scope with `let _probe = self.guard.enter();`.
#[derive(Debug)]
pub(crate) struct ProbeGuard {
    #[cfg(debug_assertions)]
    active: Cell<bool>,
    // !Sync in release builds too.
    _not_sync: PhantomData<Cell<()>>,
}

impl ProbeGuard {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(false),
            _not_sync: PhantomData,
        }
    }

    /// Open a probe scope. Panics in debug builds if one is already open.
    #[inline]
    pub(crate) fn enter(&self) -> ProbeScope<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.active.replace(true),
                "reentrant map access from Hash or Eq during a probe"
            );
            ProbeScope { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            ProbeScope { _owner: PhantomData }
        }
    }
}

impl Default for ProbeGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Closes the probe scope on drop.
pub(crate) struct ProbeScope<'a> {
    #[cfg(debug_assertions)]
    owner: &'a ProbeGuard,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a ()>,
}

impl Drop for ProbeScope<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.active.set(false);
    }
}
