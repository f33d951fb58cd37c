//! The kernel-facing accelerator surface
//!
//! Every back-end hands running kernels an accelerator value implementing
//! [`Acc`]. Kernels are written once against `Acc` and queried through the
//! [`WorkDiv`] and [`Idx`] front ends:
//!
//! ```
//! use tessel_backends::{Acc, Kernel};
//! use tessel_workdiv::{Block, Dim1, Grid, Idx, Threads, WorkDiv};
//!
//! struct Probe;
//!
//! impl Kernel for Probe {
//!     fn run<A: Acc>(&self, acc: &A) {
//!         let [thread] = acc.idx::<Block, Threads, Dim1>().into_array();
//!         let [block_threads] = acc.work_div::<Block, Threads, Dim1>().into_array();
//!         assert!(thread < block_threads);
//!     }
//! }
//! ```
//!
//! The four combinations every back-end publishes are supertraits of `Acc`.
//! Host accelerators additionally answer grid-level thread queries.

use tessel_workdiv::{
    BackendKind, Block, Blocks, Dim3, DynWorkDivQuery, Extent3, GetIdx, GetWorkDiv, Grid, Idx, Threads, WorkDiv,
};

/// Execution context of one (block, thread) pair
pub trait Acc:
    GetWorkDiv<Grid, Blocks> + GetWorkDiv<Block, Threads> + GetIdx<Grid, Blocks> + GetIdx<Block, Threads> + DynWorkDivQuery
{
    /// Back-end running this accelerator
    fn kind(&self) -> BackendKind;

    /// Index of the current thread within the whole grid
    fn global_thread_idx(&self) -> Extent3 {
        let block_idx = self.idx::<Grid, Blocks, Dim3>();
        let thread_idx = self.idx::<Block, Threads, Dim3>();
        let block_threads = self.work_div::<Block, Threads, Dim3>();
        Extent3::new(std::array::from_fn(|axis| {
            block_idx[axis] * block_threads[axis] + thread_idx[axis]
        }))
    }

    /// Number of threads along each axis of the whole grid
    fn grid_thread_extent(&self) -> Extent3 {
        let grid_blocks = self.work_div::<Grid, Blocks, Dim3>();
        let block_threads = self.work_div::<Block, Threads, Dim3>();
        grid_blocks.zip_with(block_threads, |blocks, threads| blocks * threads)
    }

    /// Row-major (x fastest) linear index of the current thread in the grid
    fn linear_global_thread_idx(&self) -> usize {
        crate::backends::common::linearize(self.global_thread_idx(), self.grid_thread_extent())
    }
}

/// Work dispatched once per (block, thread) pair
///
/// Kernels run concurrently on the threaded back-ends, hence `Sync`.
pub trait Kernel: Sync {
    fn run<A: Acc>(&self, acc: &A);
}
