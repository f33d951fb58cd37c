//! Grid/block partitioning
//!
//! Given a requested grid extent (in work items) and the block limits of the
//! target, choose a block extent that divides the grid exactly on every axis
//! and fits the limits, then derive the grid-of-blocks extent from it.
//!
//! The procedure is:
//!
//! 1. clip the maximum block extent to the grid extent, axis by axis
//! 2. while the clipped block holds more threads than allowed, halve every
//!    axis (never below 1)
//! 3. on each axis, search downwards from the clipped maximum for the largest
//!    divisor of the grid extent
//! 4. `grid_blocks[d] = grid[d] / block[d]`
//!
//! The result is deterministic. Grid extents that are prime (or factor badly
//! against the limit) degrade to a block size of 1 along that axis; this is
//! still an exact tiling.

use crate::error::Result;
use crate::extent::Extent3;
use crate::limits::HardwareLimits;
use crate::work_extent::WorkExtent;
use tessel_tracing::perf_span;

/// Partition `grid` into blocks that fit `limits`
///
/// # Errors
///
/// - [`crate::WorkDivError::InvalidExtent`] if any axis of `grid` is zero
/// - [`crate::WorkDivError::CapacityOverflow`] if the grid's work-item count does not fit into `usize`
/// - [`crate::WorkDivError::InvalidLimits`] if any limit is zero
///
/// # Example
///
/// ```
/// use tessel_workdiv::{compute_work_extent, Extent3, HardwareLimits};
///
/// let limits = HardwareLimits::new(Extent3::splat(32), 1024);
/// let work = compute_work_extent(Extent3::xyz(100, 64, 1), &limits)?;
/// assert_eq!(work.block_threads(), Extent3::xyz(25, 32, 1));
/// assert_eq!(work.grid_blocks(), Extent3::xyz(4, 2, 1));
/// # Ok::<(), tessel_workdiv::WorkDivError>(())
/// ```
pub fn compute_work_extent(grid: Extent3, limits: &HardwareLimits) -> Result<WorkExtent> {
    let _span = perf_span!("compute_work_extent", gx = grid.x(), gy = grid.y(), gz = grid.z());

    grid.validate()?;
    let work_items = grid.product()?;
    limits.validate()?;

    // A block never spans more than the whole grid along an axis
    let clipped = limits.max_block_extent.min(grid);
    let max_block = clip_to_thread_count(clipped, limits.max_block_thread_count);
    tracing::debug!(
        grid = %grid,
        work_items,
        clipped = %clipped,
        max_block = %max_block,
        max_block_threads = limits.max_block_thread_count,
        "clipped block extent"
    );

    let block = grid.zip_with(max_block, largest_divisor_at_most);
    for axis in degenerate_axes(grid, block, limits) {
        tracing::warn!(
            axis,
            grid_extent = grid[axis],
            max_block_extent = max_block[axis],
            device_max_block_extent = limits.max_block_extent[axis],
            "axis degenerated to one work item per block"
        );
    }

    let grid_blocks = grid.zip_with(block, |work, threads| work / threads);
    tracing::debug!(block = %block, grid_blocks = %grid_blocks, "partitioned grid");

    WorkExtent::new(grid_blocks, block)
}

/// Axes where a grid extent above 1 ended up with a block extent of 1 even
/// though the device limit on that axis allows more
///
/// Either halving for the thread count or the divisor search (prime or badly
/// factoring extents) can cause this. Axes whose device limit is itself 1 are
/// not reported.
pub fn degenerate_axes(grid: Extent3, block: Extent3, limits: &HardwareLimits) -> impl Iterator<Item = usize> {
    let device_max = limits.max_block_extent;
    (0..3).filter(move |&axis| grid[axis] > 1 && block[axis] == 1 && device_max[axis] > 1)
}

/// Halve every axis of `extent` until it holds at most `max_threads` threads
///
/// Axes never drop below 1, so the loop ends after at most log2 of the
/// largest axis rounds. A `max_threads` of zero is treated as 1.
pub fn clip_to_thread_count(extent: Extent3, max_threads: usize) -> Extent3 {
    let max_threads = max_threads.max(1);
    let mut extent = extent.map(|value| value.max(1));
    while extent.checked_product().map_or(true, |threads| threads > max_threads) {
        extent = extent.map(|value| (value / 2).max(1));
    }
    extent
}

/// Largest divisor of `value` that is at most `bound`
///
/// Searches downwards from `min(bound, value)`. Returns 1 when nothing larger
/// divides, including for `value == 0` or `bound == 0`.
pub fn largest_divisor_at_most(value: usize, bound: usize) -> usize {
    (2..=bound.min(value))
        .rev()
        .find(|candidate| value % candidate == 0)
        .unwrap_or(1)
}
