//! Hardware limit aggregation
//!
//! A partition computed against the limits of a single device is only safe
//! on that device. A partition computed against the conservative limits of
//! the whole enabled set is safe on every back-end in it: the aggregator
//! starts from `usize::MAX` and folds in the component-wise minimum of every
//! back-end's current device.

use crate::backend::{BackendDescriptor, BackendRegistry};
use crate::error::{Result, WorkDivError};
use crate::extent::Extent3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Block limits a partition must honor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HardwareLimits {
    /// Largest block extent along each axis
    pub max_block_extent: Extent3,
    /// Largest number of threads in one block
    pub max_block_thread_count: usize,
}

impl HardwareLimits {
    pub const fn new(max_block_extent: Extent3, max_block_thread_count: usize) -> Self {
        Self {
            max_block_extent,
            max_block_thread_count,
        }
    }

    /// The identity of [`Self::tighten`]
    pub const fn unbounded() -> Self {
        Self::new(Extent3::unbounded(), usize::MAX)
    }

    /// The tightest bound honored by both `self` and `other`
    pub fn tighten(self, other: Self) -> Self {
        Self {
            max_block_extent: self.max_block_extent.min(other.max_block_extent),
            max_block_thread_count: self.max_block_thread_count.min(other.max_block_thread_count),
        }
    }

    /// Every limit must allow at least one thread
    ///
    /// # Errors
    ///
    /// Returns [`WorkDivError::InvalidLimits`] for a zero axis or a zero thread count.
    pub fn validate(&self) -> Result<()> {
        if let Some(axis) = self.max_block_extent.first_zero_axis() {
            return Err(WorkDivError::InvalidLimits(format!(
                "max block extent {} is zero on axis {axis}",
                self.max_block_extent
            )));
        }
        if self.max_block_thread_count == 0 {
            return Err(WorkDivError::InvalidLimits("max block thread count is zero".to_string()));
        }
        Ok(())
    }

    /// Limits of the current device of one back-end (adaptive selection)
    pub fn for_backend(backend: &BackendDescriptor) -> Result<Self> {
        let device = backend.current_device()?;
        tracing::trace!(
            backend = %backend.kind(),
            device = %device,
            max_block_extent = %device.max_block_extent(),
            max_block_thread_count = device.max_block_thread_count(),
            "queried device limits"
        );
        Ok(device.limits())
    }

    /// Limits honored by every back-end in `registry` (conservative selection)
    ///
    /// An empty registry yields [`Self::unbounded`].
    pub fn conservative(registry: &BackendRegistry) -> Result<Self> {
        registry
            .iter()
            .try_fold(Self::unbounded(), |acc, backend| Ok(acc.tighten(Self::for_backend(backend)?)))
    }
}

impl Default for HardwareLimits {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl fmt::Display for HardwareLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max_block_extent={}, max_block_threads={}",
            self.max_block_extent, self.max_block_thread_count
        )
    }
}

/// Largest block extent per axis supported by every enabled back-end
pub fn max_block_extent(registry: &BackendRegistry) -> Result<Extent3> {
    registry.iter().try_fold(Extent3::unbounded(), |acc, backend| {
        Ok(acc.min(backend.current_device()?.max_block_extent()))
    })
}

/// Largest block thread count supported by every enabled back-end
pub fn max_block_thread_count(registry: &BackendRegistry) -> Result<usize> {
    registry.iter().try_fold(usize::MAX, |acc, backend| {
        Ok(acc.min(backend.current_device()?.max_block_thread_count()))
    })
}
