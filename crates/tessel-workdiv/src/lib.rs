//! Grid/block work division for data-parallel kernels
//!
//! This crate decides how a multi-dimensional index space of independent work
//! items is split into blocks of threads and a grid of blocks, and gives
//! running kernels a uniform way to ask where they are in that hierarchy.
//!
//! # Overview
//!
//! ```text
//! launch preparation                       running kernel
//! ------------------                       --------------
//! BackendRegistry --> HardwareLimits       HostWorkDiv / DeviceWorkDiv
//!                        |                 HostIdx / DeviceIdx
//!                        v                        ^
//! grid extent ---> compute_work_extent ---> WorkExtent
//! ```
//!
//! - [`HardwareLimits`] folds the block limits of the enabled back-ends
//!   (conservative) or reads one back-end's current device (adaptive).
//! - [`compute_work_extent`] picks a block extent that divides the grid
//!   exactly and fits the limits.
//! - [`WorkDiv`] and [`Idx`] are the kernel-facing queries, parameterized by
//!   origin ([`Grid`], [`Block`]), unit ([`Blocks`], [`Threads`]) and
//!   dimensionality ([`Dim1`], [`Dim2`], [`Dim3`]).
//! - [`WorkDivPlanner`] ties a registry, a [`WorkDivConfig`] and a
//!   [`LimitsCache`] together for repeated launches.
//!
//! # Example
//!
//! ```
//! use tessel_workdiv::{compute_work_extent, Block, Dim3, Extent3, HardwareLimits, HostWorkDiv, Threads, WorkDiv};
//!
//! let limits = HardwareLimits::new(Extent3::splat(32), 1024);
//! let work = compute_work_extent(Extent3::xyz(100, 64, 1), &limits)?;
//!
//! let ctx = HostWorkDiv::new(work);
//! assert_eq!(ctx.work_div::<Block, Threads, Dim3>(), Extent3::xyz(25, 32, 1));
//! # Ok::<(), tessel_workdiv::WorkDivError>(())
//! ```

pub mod backend;
pub mod cache;
pub mod config;
pub mod context;
pub mod device;
pub mod dim;
pub mod error;
pub mod extent;
pub mod limits;
pub mod partition;
pub mod planner;
pub mod query;
pub mod work_extent;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{BackendDescriptor, BackendKind, BackendRegistry};
pub use cache::{LimitsCache, LimitsKey};
pub use config::{BlockExtentSelection, WorkDivConfig};
pub use context::{CoordinateSource, DeviceIdx, DeviceWorkDiv, HostIdx, HostWorkDiv};
pub use device::{DeviceHandle, DeviceManager, DeviceProperties};
pub use dim::{Dim, Dim1, Dim2, Dim3, DimVec};
pub use error::{Result, WorkDivError};
pub use extent::{Extent, Extent3};
pub use limits::{max_block_extent, max_block_thread_count, HardwareLimits};
pub use partition::{clip_to_thread_count, compute_work_extent, degenerate_axes, largest_divisor_at_most};
pub use planner::WorkDivPlanner;
pub use query::{
    Block, Blocks, DynWorkDivQuery, GetIdx, GetWorkDiv, Grid, Idx, Origin, OriginKind, Threads, Unit, UnitKind,
    WorkDiv,
};
pub use work_extent::WorkExtent;
