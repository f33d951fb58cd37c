//! Caching of aggregated hardware limits
//!
//! Device limit queries may need a device round-trip. When the enabled
//! back-end set is stable, the aggregated limits for a given selection never
//! change, so callers that partition repeatedly keep them here.

use crate::backend::BackendKind;
use crate::error::Result;
use crate::limits::HardwareLimits;
use std::collections::HashMap;
use std::sync::OnceLock;

/// What a cached limit was computed over
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LimitsKey {
    /// The current device of a single back-end
    Adaptive(BackendKind),
    /// Every back-end in the ordered set
    Conservative(Vec<BackendKind>),
}

/// Thread-safe cache of aggregated limits
///
/// Reads take a shared lock. A miss computes the limits outside the lock, so
/// two threads racing on the same key may both query the devices; the first
/// result inserted wins.
///
/// ```
/// use tessel_workdiv::{BackendKind, Extent3, HardwareLimits, LimitsCache, LimitsKey};
///
/// static CACHE: LimitsCache = LimitsCache::new();
///
/// let key = LimitsKey::Adaptive(BackendKind::CpuSerial);
/// let limits = CACHE.get_or_try_insert(&key, || Ok(HardwareLimits::new(Extent3::ones(), 1)))?;
/// assert_eq!(limits.max_block_thread_count, 1);
/// # Ok::<(), tessel_workdiv::WorkDivError>(())
/// ```
#[derive(Debug, Default)]
pub struct LimitsCache {
    entries: OnceLock<parking_lot::RwLock<HashMap<LimitsKey, HardwareLimits>>>,
}

impl LimitsCache {
    pub const fn new() -> Self {
        Self {
            entries: OnceLock::new(),
        }
    }

    fn entries(&self) -> &parking_lot::RwLock<HashMap<LimitsKey, HardwareLimits>> {
        self.entries.get_or_init(|| parking_lot::RwLock::new(HashMap::new()))
    }

    /// Cached limits for `key`, if any
    pub fn get(&self, key: &LimitsKey) -> Option<HardwareLimits> {
        self.entries.get()?.read().get(key).copied()
    }

    /// Cached limits for `key`, computing them with `compute` on a miss
    ///
    /// Errors from `compute` are returned and nothing is cached.
    pub fn get_or_try_insert<F>(&self, key: &LimitsKey, compute: F) -> Result<HardwareLimits>
    where
        F: FnOnce() -> Result<HardwareLimits>,
    {
        if let Some(limits) = self.get(key) {
            tracing::trace!(key = ?key, "limits cache hit");
            return Ok(limits);
        }

        let limits = compute()?;
        tracing::debug!(key = ?key, limits = %limits, "limits cache miss");

        let mut entries = self.entries().write();
        Ok(*entries.entry(key.clone()).or_insert(limits))
    }

    /// Drop every cached entry, e.g. after the current device changed
    pub fn clear(&self) {
        if let Some(entries) = self.entries.get() {
            entries.write().clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.get().map_or(0, |entries| entries.read().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
