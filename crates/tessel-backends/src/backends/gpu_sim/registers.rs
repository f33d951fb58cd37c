//! Per-lane special registers of the simulated GPU
//!
//! The launcher preloads four coordinate registers for every lane before the
//! kernel runs, mirroring the native `%ctaid` / `%nctaid` / `%tid` / `%ntid`
//! registers. Kernels only ever read them.
//!
//! | Register         | PTX name  | Meaning                          |
//! |------------------|-----------|----------------------------------|
//! | `BlockIdx`       | `%ctaid`  | block index within the grid      |
//! | `GridDim`        | `%nctaid` | number of blocks in the grid     |
//! | `ThreadIdx`      | `%tid`    | thread index within the block    |
//! | `BlockDim`       | `%ntid`   | number of threads in a block     |

use crate::backends::common::{delinearize, linearize};
use tessel_workdiv::{CoordinateSource, Extent3, WorkExtent};

/// One of the preloaded coordinate registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialRegister {
    BlockIdx,
    GridDim,
    ThreadIdx,
    BlockDim,
}

impl SpecialRegister {
    pub const ALL: [SpecialRegister; 4] = [
        SpecialRegister::BlockIdx,
        SpecialRegister::GridDim,
        SpecialRegister::ThreadIdx,
        SpecialRegister::BlockDim,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            SpecialRegister::BlockIdx => "%ctaid",
            SpecialRegister::GridDim => "%nctaid",
            SpecialRegister::ThreadIdx => "%tid",
            SpecialRegister::BlockDim => "%ntid",
        }
    }
}

/// Coordinate registers of one lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialRegisters {
    block_idx: Extent3,
    grid_dim: Extent3,
    thread_idx: Extent3,
    block_dim: Extent3,
}

impl SpecialRegisters {
    /// Registers of lane `lane` (linear within its block) of block `block`
    /// (linear within the grid)
    pub fn for_lane(work: &WorkExtent, block: usize, lane: usize) -> Self {
        Self {
            block_idx: delinearize(block, work.grid_blocks()),
            grid_dim: work.grid_blocks(),
            thread_idx: delinearize(lane, work.block_threads()),
            block_dim: work.block_threads(),
        }
    }

    pub fn read(&self, register: SpecialRegister) -> Extent3 {
        match register {
            SpecialRegister::BlockIdx => self.block_idx,
            SpecialRegister::GridDim => self.grid_dim,
            SpecialRegister::ThreadIdx => self.thread_idx,
            SpecialRegister::BlockDim => self.block_dim,
        }
    }

    /// Linear lane id across all blocks
    ///
    /// `block_linear * threads_per_block + lane_linear`
    pub fn global_lane_id(&self) -> usize {
        let threads_per_block = self.block_dim.iter().product::<usize>();
        linearize(self.block_idx, self.grid_dim) * threads_per_block + linearize(self.thread_idx, self.block_dim)
    }
}

impl CoordinateSource for SpecialRegisters {
    fn block_idx(&self) -> Extent3 {
        self.read(SpecialRegister::BlockIdx)
    }

    fn grid_dim(&self) -> Extent3 {
        self.read(SpecialRegister::GridDim)
    }

    fn thread_idx(&self) -> Extent3 {
        self.read(SpecialRegister::ThreadIdx)
    }

    fn block_dim(&self) -> Extent3 {
        self.read(SpecialRegister::BlockDim)
    }
}
