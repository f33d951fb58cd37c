//! Simulated GPU back-end
//!
//! Lanes do not get a stored work division. The launcher preloads each
//! lane's [`SpecialRegisters`] and the accelerator answers every query by
//! reading them, the way a native device back-end reads hardware
//! coordinates. Blocks and lanes both run in parallel on the global rayon
//! pool.

pub mod registers;

pub use registers::{SpecialRegister, SpecialRegisters};

use crate::acc::{Acc, Kernel};
use crate::device::StaticDeviceManager;
use crate::error::Result;
use crate::executor::Executor;
use rayon::prelude::*;
use std::sync::Arc;
use tessel_tracing::perf_span;
use tessel_workdiv::{
    BackendKind, Block, Blocks, DeviceIdx, DeviceProperties, DeviceWorkDiv, DynWorkDivQuery, Extent3, GetIdx,
    GetWorkDiv, Grid, OriginKind, Threads, UnitKind, WorkExtent,
};

/// Block limits of the default simulated device
pub const MAX_BLOCK_EXTENT: Extent3 = Extent3::xyz(1024, 1024, 64);
pub const MAX_BLOCK_THREAD_COUNT: usize = 1024;

/// Block limits of the second, smaller simulated device
pub const COMPACT_MAX_BLOCK_EXTENT: Extent3 = Extent3::xyz(256, 256, 64);
pub const COMPACT_MAX_BLOCK_THREAD_COUNT: usize = 256;

/// The default device (index 0)
pub fn device_properties() -> DeviceProperties {
    DeviceProperties::new("gpu-sim", MAX_BLOCK_EXTENT, MAX_BLOCK_THREAD_COUNT)
}

/// A smaller device (index 1), for exercising device switches
pub fn compact_device_properties() -> DeviceProperties {
    DeviceProperties::new("gpu-sim-compact", COMPACT_MAX_BLOCK_EXTENT, COMPACT_MAX_BLOCK_THREAD_COUNT)
}

/// Both simulated devices, the default one current
pub fn device_manager() -> StaticDeviceManager {
    StaticDeviceManager::new(BackendKind::GpuSim, [device_properties(), compact_device_properties()])
}

/// Accelerator of one simulated GPU lane
#[derive(Debug, Clone, Copy)]
pub struct AccGpuSim {
    work_div: DeviceWorkDiv<SpecialRegisters>,
    idx: DeviceIdx<SpecialRegisters>,
}

impl AccGpuSim {
    pub fn new(registers: SpecialRegisters) -> Self {
        Self {
            work_div: DeviceWorkDiv::new(registers),
            idx: DeviceIdx::new(registers),
        }
    }

    pub fn registers(&self) -> &SpecialRegisters {
        self.work_div.registers()
    }
}

impl GetWorkDiv<Grid, Blocks> for AccGpuSim {
    fn get_work_div(&self) -> Extent3 {
        GetWorkDiv::<Grid, Blocks>::get_work_div(&self.work_div)
    }
}

impl GetWorkDiv<Block, Threads> for AccGpuSim {
    fn get_work_div(&self) -> Extent3 {
        GetWorkDiv::<Block, Threads>::get_work_div(&self.work_div)
    }
}

impl GetIdx<Grid, Blocks> for AccGpuSim {
    fn get_idx(&self) -> Extent3 {
        GetIdx::<Grid, Blocks>::get_idx(&self.idx)
    }
}

impl GetIdx<Block, Threads> for AccGpuSim {
    fn get_idx(&self) -> Extent3 {
        GetIdx::<Block, Threads>::get_idx(&self.idx)
    }
}

impl DynWorkDivQuery for AccGpuSim {
    fn backend_name(&self) -> &str {
        BackendKind::GpuSim.name()
    }

    fn work_div_extent(&self, origin: OriginKind, unit: UnitKind) -> Option<Extent3> {
        self.work_div.work_div_extent(origin, unit)
    }

    fn idx_extent(&self, origin: OriginKind, unit: UnitKind) -> Option<Extent3> {
        self.idx.idx_extent(origin, unit)
    }
}

impl Acc for AccGpuSim {
    fn kind(&self) -> BackendKind {
        BackendKind::GpuSim
    }
}

/// Runs every lane of every block in parallel
#[derive(Debug, Clone)]
pub struct GpuSimExecutor {
    devices: Arc<StaticDeviceManager>,
}

impl GpuSimExecutor {
    pub fn new(devices: Arc<StaticDeviceManager>) -> Self {
        Self { devices }
    }
}

impl Default for GpuSimExecutor {
    fn default() -> Self {
        Self::new(Arc::new(device_manager()))
    }
}

impl Executor for GpuSimExecutor {
    fn kind(&self) -> BackendKind {
        BackendKind::GpuSim
    }

    fn devices(&self) -> &StaticDeviceManager {
        &self.devices
    }

    fn execute<K: Kernel>(&self, work: &WorkExtent, kernel: &K) -> Result<()> {
        let _span = perf_span!(
            "gpu_sim_execute",
            blocks = work.block_count(),
            lanes_per_block = work.threads_per_block()
        );
        let device = self.validate(work)?;
        tracing::debug!(device = %device, work = %work, "launching on simulated device");

        let lanes = work.threads_per_block();
        (0..work.block_count()).into_par_iter().for_each(|block| {
            (0..lanes).into_par_iter().for_each(|lane| {
                let acc = AccGpuSim::new(SpecialRegisters::for_lane(work, block, lane));
                kernel.run(&acc);
            });
        });
        Ok(())
    }
}
