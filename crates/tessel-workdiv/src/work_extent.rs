//! The result of a partitioning request

use crate::error::{Result, WorkDivError};
use crate::extent::Extent3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid-of-blocks extent paired with the threads-per-block extent
///
/// Produced once per partitioning request and owned by the caller. When it
/// comes out of [`crate::compute_work_extent`], `grid_blocks[d] * block_threads[d]`
/// equals the requested grid extent on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "UncheckedWorkExtent")]
pub struct WorkExtent {
    grid_blocks: Extent3,
    block_threads: Extent3,
}

#[derive(Deserialize)]
struct UncheckedWorkExtent {
    grid_blocks: Extent3,
    block_threads: Extent3,
}

impl TryFrom<UncheckedWorkExtent> for WorkExtent {
    type Error = WorkDivError;

    fn try_from(raw: UncheckedWorkExtent) -> Result<Self> {
        Self::new(raw.grid_blocks, raw.block_threads)
    }
}

impl WorkExtent {
    /// Pair a grid-blocks extent with a block-threads extent
    ///
    /// # Errors
    ///
    /// Returns [`crate::WorkDivError::InvalidExtent`] if either extent has a zero axis,
    /// or [`crate::WorkDivError::CapacityOverflow`] if the total thread count overflows.
    pub fn new(grid_blocks: Extent3, block_threads: Extent3) -> Result<Self> {
        grid_blocks.validate()?;
        block_threads.validate()?;
        grid_blocks.checked_mul(block_threads)?.product()?;
        Ok(Self {
            grid_blocks,
            block_threads,
        })
    }

    /// Number of blocks along each axis of the grid
    pub const fn grid_blocks(&self) -> Extent3 {
        self.grid_blocks
    }

    /// Number of threads along each axis of a block
    pub const fn block_threads(&self) -> Extent3 {
        self.block_threads
    }

    /// Number of threads along each axis of the whole grid
    pub fn grid_threads(&self) -> Extent3 {
        // Checked in the constructor
        self.grid_blocks
            .zip_with(self.block_threads, |blocks, threads| blocks * threads)
    }

    /// Total number of blocks
    pub fn block_count(&self) -> usize {
        self.grid_blocks.iter().product()
    }

    /// Total number of threads in one block
    pub fn threads_per_block(&self) -> usize {
        self.block_threads.iter().product()
    }

    /// Total number of threads in the grid
    pub fn thread_count(&self) -> usize {
        self.grid_threads().iter().product()
    }
}

impl Default for WorkExtent {
    fn default() -> Self {
        Self {
            grid_blocks: Extent3::ones(),
            block_threads: Extent3::ones(),
        }
    }
}

impl fmt::Display for WorkExtent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grid_blocks={}, block_threads={}", self.grid_blocks, self.block_threads)
    }
}
