//! Property-based tests for grid partitioning.
//!
//! Key invariants:
//! - grid_blocks[d] * block_threads[d] == grid[d] on every axis
//! - block_threads[d] <= min(max_block_extent[d], grid[d])
//! - block_threads.product() <= max_block_thread_count
//! - identical inputs give identical outputs
//! - conservative limits fit every back-end in the set

use proptest::prelude::*;
use tessel_workdiv::{compute_work_extent, largest_divisor_at_most, Extent3, HardwareLimits, WorkDivError};

fn grid() -> impl Strategy<Value = Extent3> {
    (1usize..=4096, 1usize..=512, 1usize..=64).prop_map(|(x, y, z)| Extent3::xyz(x, y, z))
}

fn limits() -> impl Strategy<Value = HardwareLimits> {
    (1usize..=1024, 1usize..=1024, 1usize..=64, 1usize..=2048)
        .prop_map(|(x, y, z, threads)| HardwareLimits::new(Extent3::xyz(x, y, z), threads))
}

proptest! {
    /// The partition tiles the grid exactly.
    #[test]
    fn partition_tiles_grid_exactly(grid in grid(), limits in limits()) {
        let work = compute_work_extent(grid, &limits).unwrap();
        for axis in 0..3 {
            prop_assert_eq!(work.grid_blocks()[axis] * work.block_threads()[axis], grid[axis]);
        }
        prop_assert_eq!(work.grid_threads(), grid);
    }

    /// The block extent respects both the per-axis and the thread-count limit.
    #[test]
    fn partition_respects_limits(grid in grid(), limits in limits()) {
        let work = compute_work_extent(grid, &limits).unwrap();
        let block = work.block_threads();
        for axis in 0..3 {
            prop_assert!(block[axis] >= 1);
            prop_assert!(block[axis] <= limits.max_block_extent[axis].min(grid[axis]));
        }
        prop_assert!(block.product().unwrap() <= limits.max_block_thread_count);
    }

    /// No hidden state: the same request gives the same answer.
    #[test]
    fn partition_is_deterministic(grid in grid(), limits in limits()) {
        let first = compute_work_extent(grid, &limits).unwrap();
        let second = compute_work_extent(grid, &limits).unwrap();
        prop_assert_eq!(first, second);
    }

    /// A unit grid always yields unit blocks.
    #[test]
    fn unit_grid_yields_unit_block(limits in limits()) {
        let work = compute_work_extent(Extent3::ones(), &limits).unwrap();
        prop_assert_eq!(work.block_threads(), Extent3::ones());
        prop_assert_eq!(work.grid_blocks(), Extent3::ones());
    }

    /// A partition against tightened limits is valid for each input limit.
    #[test]
    fn conservative_partition_fits_each_backend(grid in grid(), a in limits(), b in limits()) {
        let work = compute_work_extent(grid, &a.tighten(b)).unwrap();
        let block = work.block_threads();
        for device in [a, b] {
            for axis in 0..3 {
                prop_assert!(block[axis] <= device.max_block_extent[axis]);
            }
            prop_assert!(block.product().unwrap() <= device.max_block_thread_count);
        }
    }

    /// Any zero axis is rejected before partitioning.
    #[test]
    fn zero_axis_is_rejected(grid in grid(), axis in 0usize..3, limits in limits()) {
        let mut components = grid.into_array();
        components[axis] = 0;
        let err = compute_work_extent(Extent3::new(components), &limits).unwrap_err();
        prop_assert_eq!(err, WorkDivError::InvalidExtent { axis, value: 0 });
    }

    /// Negative components never make it into an extent.
    #[test]
    fn negative_axis_is_rejected(x in -1000i64..=0, y in 1i64..100, z in 1i64..100) {
        let err = Extent3::try_from([x, y, z]).unwrap_err();
        prop_assert_eq!(err, WorkDivError::InvalidExtent { axis: 0, value: x });
    }

    /// The divisor search returns the largest divisor within the bound.
    #[test]
    fn largest_divisor_is_maximal(value in 1usize..10_000, bound in 1usize..2_000) {
        let divisor = largest_divisor_at_most(value, bound);
        prop_assert_eq!(value % divisor, 0);
        prop_assert!(divisor <= bound.min(value));
        prop_assert!((divisor + 1..=bound.min(value)).all(|larger| value % larger != 0));
    }
}

/// A prime axis larger than the block limit degrades to one work item per block.
#[test]
fn prime_axis_larger_than_limit() {
    let limits = HardwareLimits::new(Extent3::xyz(256, 256, 64), 256);
    let work = compute_work_extent(Extent3::xyz(257, 4, 1), &limits).unwrap();
    assert_eq!(work.block_threads().x(), 1);
    assert_eq!(work.grid_blocks().x(), 257);
}
