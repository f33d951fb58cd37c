//! Query contexts handed to running kernels
//!
//! Host back-ends compute a [`WorkExtent`] once at launch and give every
//! execution unit a [`HostWorkDiv`] over it plus a [`HostIdx`] naming the
//! unit's position. Device-style back-ends instead read the launch shape
//! from native coordinate registers at call time through
//! [`DeviceWorkDiv`] and [`DeviceIdx`]. Both sides are read-only once
//! constructed and need no locking.

use crate::error::{Result, WorkDivError};
use crate::extent::Extent3;
use crate::query::{Block, Blocks, DynWorkDivQuery, GetIdx, GetWorkDiv, Grid, OriginKind, Threads, UnitKind};
use crate::work_extent::WorkExtent;

/// Stored work division of a host back-end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostWorkDiv {
    work: WorkExtent,
}

impl HostWorkDiv {
    /// Context answering queries from the stored `work`
    pub const fn new(work: WorkExtent) -> Self {
        Self { work }
    }

    /// The stored launch shape
    pub const fn work_extent(&self) -> &WorkExtent {
        &self.work
    }
}

impl From<WorkExtent> for HostWorkDiv {
    fn from(work: WorkExtent) -> Self {
        Self::new(work)
    }
}

impl GetWorkDiv<Grid, Blocks> for HostWorkDiv {
    fn get_work_div(&self) -> Extent3 {
        self.work.grid_blocks()
    }
}

impl GetWorkDiv<Block, Threads> for HostWorkDiv {
    fn get_work_div(&self) -> Extent3 {
        self.work.block_threads()
    }
}

impl GetWorkDiv<Grid, Threads> for HostWorkDiv {
    fn get_work_div(&self) -> Extent3 {
        self.work.grid_threads()
    }
}

impl DynWorkDivQuery for HostWorkDiv {
    fn backend_name(&self) -> &str {
        "host"
    }

    fn work_div_extent(&self, origin: OriginKind, unit: UnitKind) -> Option<Extent3> {
        match (origin, unit) {
            (OriginKind::Grid, UnitKind::Blocks) => Some(self.work.grid_blocks()),
            (OriginKind::Block, UnitKind::Threads) => Some(self.work.block_threads()),
            (OriginKind::Grid, UnitKind::Threads) => Some(self.work.grid_threads()),
            (OriginKind::Block, UnitKind::Blocks) => None,
        }
    }
}

/// Position of one host execution unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostIdx {
    block_idx: Extent3,
    thread_idx: Extent3,
    block_threads: Extent3,
}

impl HostIdx {
    /// Position of thread `thread_idx` of block `block_idx` within `work`
    ///
    /// # Errors
    ///
    /// Returns [`WorkDivError::IndexOutOfRange`] if either index lies outside `work`.
    pub fn new(work: &WorkExtent, block_idx: Extent3, thread_idx: Extent3) -> Result<Self> {
        check_within(block_idx, work.grid_blocks())?;
        check_within(thread_idx, work.block_threads())?;
        Ok(Self {
            block_idx,
            thread_idx,
            block_threads: work.block_threads(),
        })
    }

    /// Index of the block within the grid
    pub const fn block_idx(&self) -> Extent3 {
        self.block_idx
    }

    /// Index of the thread within its block
    pub const fn thread_idx(&self) -> Extent3 {
        self.thread_idx
    }

    /// Index of this thread within the whole grid
    pub fn global_thread_idx(&self) -> Extent3 {
        // Bounded by the grid's thread extent, checked by WorkExtent::new
        Extent3::new(std::array::from_fn(|axis| {
            self.block_idx[axis] * self.block_threads[axis] + self.thread_idx[axis]
        }))
    }
}

fn check_within(idx: Extent3, extent: Extent3) -> Result<()> {
    match (0..3).find(|&axis| idx[axis] >= extent[axis]) {
        Some(axis) => Err(WorkDivError::IndexOutOfRange {
            axis,
            index: idx[axis],
            extent: extent[axis],
        }),
        None => Ok(()),
    }
}

impl GetIdx<Grid, Blocks> for HostIdx {
    fn get_idx(&self) -> Extent3 {
        self.block_idx
    }
}

impl GetIdx<Block, Threads> for HostIdx {
    fn get_idx(&self) -> Extent3 {
        self.thread_idx
    }
}

impl GetIdx<Grid, Threads> for HostIdx {
    fn get_idx(&self) -> Extent3 {
        self.global_thread_idx()
    }
}

impl DynWorkDivQuery for HostIdx {
    fn backend_name(&self) -> &str {
        "host"
    }

    fn work_div_extent(&self, _origin: OriginKind, _unit: UnitKind) -> Option<Extent3> {
        None
    }

    fn idx_extent(&self, origin: OriginKind, unit: UnitKind) -> Option<Extent3> {
        match (origin, unit) {
            (OriginKind::Grid, UnitKind::Blocks) => Some(self.block_idx),
            (OriginKind::Block, UnitKind::Threads) => Some(self.thread_idx),
            (OriginKind::Grid, UnitKind::Threads) => Some(self.global_thread_idx()),
            (OriginKind::Block, UnitKind::Blocks) => None,
        }
    }
}

/// Native coordinate registers of one execution unit
///
/// Mirrors the `blockIdx` / `gridDim` / `threadIdx` / `blockDim` quadruple
/// of device hardware. Values belong to the calling unit only.
pub trait CoordinateSource {
    /// Index of the current block within the grid
    fn block_idx(&self) -> Extent3;
    /// Number of blocks in the grid
    fn grid_dim(&self) -> Extent3;
    /// Index of the current thread within its block
    fn thread_idx(&self) -> Extent3;
    /// Number of threads in a block
    fn block_dim(&self) -> Extent3;
}

impl<C: CoordinateSource + ?Sized> CoordinateSource for &C {
    fn block_idx(&self) -> Extent3 {
        (**self).block_idx()
    }

    fn grid_dim(&self) -> Extent3 {
        (**self).grid_dim()
    }

    fn thread_idx(&self) -> Extent3 {
        (**self).thread_idx()
    }

    fn block_dim(&self) -> Extent3 {
        (**self).block_dim()
    }
}

/// Work division read live from a [`CoordinateSource`]
#[derive(Debug, Clone, Copy)]
pub struct DeviceWorkDiv<C> {
    registers: C,
}

impl<C: CoordinateSource> DeviceWorkDiv<C> {
    pub const fn new(registers: C) -> Self {
        Self { registers }
    }

    pub fn registers(&self) -> &C {
        &self.registers
    }
}

impl<C: CoordinateSource> GetWorkDiv<Grid, Blocks> for DeviceWorkDiv<C> {
    fn get_work_div(&self) -> Extent3 {
        self.registers.grid_dim()
    }
}

impl<C: CoordinateSource> GetWorkDiv<Block, Threads> for DeviceWorkDiv<C> {
    fn get_work_div(&self) -> Extent3 {
        self.registers.block_dim()
    }
}

impl<C: CoordinateSource> DynWorkDivQuery for DeviceWorkDiv<C> {
    fn backend_name(&self) -> &str {
        "device"
    }

    fn work_div_extent(&self, origin: OriginKind, unit: UnitKind) -> Option<Extent3> {
        match (origin, unit) {
            (OriginKind::Grid, UnitKind::Blocks) => Some(self.registers.grid_dim()),
            (OriginKind::Block, UnitKind::Threads) => Some(self.registers.block_dim()),
            _ => None,
        }
    }
}

/// Indices read live from a [`CoordinateSource`]
#[derive(Debug, Clone, Copy)]
pub struct DeviceIdx<C> {
    registers: C,
}

impl<C: CoordinateSource> DeviceIdx<C> {
    pub const fn new(registers: C) -> Self {
        Self { registers }
    }
}

impl<C: CoordinateSource> GetIdx<Grid, Blocks> for DeviceIdx<C> {
    fn get_idx(&self) -> Extent3 {
        self.registers.block_idx()
    }
}

impl<C: CoordinateSource> GetIdx<Block, Threads> for DeviceIdx<C> {
    fn get_idx(&self) -> Extent3 {
        self.registers.thread_idx()
    }
}

impl<C: CoordinateSource> DynWorkDivQuery for DeviceIdx<C> {
    fn backend_name(&self) -> &str {
        "device"
    }

    fn work_div_extent(&self, _origin: OriginKind, _unit: UnitKind) -> Option<Extent3> {
        None
    }

    fn idx_extent(&self, origin: OriginKind, unit: UnitKind) -> Option<Extent3> {
        match (origin, unit) {
            (OriginKind::Grid, UnitKind::Blocks) => Some(self.registers.block_idx()),
            (OriginKind::Block, UnitKind::Threads) => Some(self.registers.thread_idx()),
            _ => None,
        }
    }
}
