//! Back-end implementations
//!
//! `cpu-serial` is always available; `cpu-threads` and `gpu-sim` sit behind
//! cargo features of the same name.

#[macro_use]
pub(crate) mod common;

pub mod cpu_serial;

#[cfg(feature = "cpu-threads")]
pub mod cpu_threads;

#[cfg(feature = "gpu-sim")]
pub mod gpu_sim;

pub use cpu_serial::{AccCpuSerial, CpuSerialExecutor};

#[cfg(feature = "cpu-threads")]
pub use cpu_threads::{AccCpuThreads, CpuThreadsExecutor};

#[cfg(feature = "gpu-sim")]
pub use gpu_sim::{AccGpuSim, GpuSimExecutor, SpecialRegister, SpecialRegisters};

use crate::config::CpuThreadsConfig;
use crate::device::StaticDeviceManager;
use crate::error::{BackendError, Result};
use tessel_workdiv::BackendKind;

/// Whether `kind` was compiled into this build
pub const fn is_available(kind: BackendKind) -> bool {
    match kind {
        BackendKind::CpuSerial => true,
        BackendKind::CpuThreads => cfg!(feature = "cpu-threads"),
        BackendKind::GpuSim => cfg!(feature = "gpu-sim"),
    }
}

/// Device table for `kind`
///
/// # Errors
///
/// Returns [`BackendError::NotCompiled`] if the back-end's feature is disabled.
pub fn device_manager(kind: BackendKind, cpu_threads: &CpuThreadsConfig) -> Result<StaticDeviceManager> {
    if !is_available(kind) {
        return Err(BackendError::NotCompiled(kind.to_string()));
    }
    Ok(match kind {
        BackendKind::CpuSerial => cpu_serial::device_manager(),
        BackendKind::CpuThreads => cpu_threads.device_manager(),
        BackendKind::GpuSim => gpu_sim_device_manager(),
    })
}

#[cfg(feature = "gpu-sim")]
fn gpu_sim_device_manager() -> StaticDeviceManager {
    gpu_sim::device_manager()
}

#[cfg(not(feature = "gpu-sim"))]
fn gpu_sim_device_manager() -> StaticDeviceManager {
    StaticDeviceManager::new(BackendKind::GpuSim, Vec::new())
}
