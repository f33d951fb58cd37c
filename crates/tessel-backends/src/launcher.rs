//! Planning and launching in one place
//!
//! A [`Launcher`] owns one device table per enabled back-end. The same tables
//! feed both the [`WorkDivPlanner`] (through the registry) and the executors,
//! so limits used for partitioning always describe the devices work runs on.

use crate::acc::Kernel;
use crate::backends::{self, CpuSerialExecutor};
use crate::config::CpuThreadsConfig;
use crate::device::StaticDeviceManager;
use crate::error::{BackendError, Result};
use crate::executor::Executor;
use std::sync::Arc;
use tessel_workdiv::{
    BackendDescriptor, BackendKind, BackendRegistry, Extent3, WorkDivConfig, WorkDivError, WorkDivPlanner, WorkExtent,
};

#[cfg(feature = "cpu-threads")]
use crate::backends::CpuThreadsExecutor;
#[cfg(feature = "gpu-sim")]
use crate::backends::GpuSimExecutor;

/// Registry of the back-ends `config` enables
///
/// # Errors
///
/// Returns [`BackendError::NotCompiled`] if `config` names a back-end whose
/// feature is disabled.
pub fn registry_from_config(config: &WorkDivConfig, cpu_threads: &CpuThreadsConfig) -> Result<BackendRegistry> {
    Ok(device_tables(config, cpu_threads)?
        .into_iter()
        .fold(BackendRegistry::new(), |registry, (kind, devices)| {
            registry.with(BackendDescriptor::new(kind, devices))
        }))
}

fn device_tables(
    config: &WorkDivConfig,
    cpu_threads: &CpuThreadsConfig,
) -> Result<Vec<(BackendKind, Arc<StaticDeviceManager>)>> {
    config
        .backends
        .iter()
        .map(|&kind| -> Result<(BackendKind, Arc<StaticDeviceManager>)> {
            Ok((kind, Arc::new(backends::device_manager(kind, cpu_threads)?)))
        })
        .collect()
}

/// Plans grids and runs kernels on the enabled back-ends
#[derive(Debug)]
pub struct Launcher {
    planner: WorkDivPlanner,
    cpu_serial: Option<CpuSerialExecutor>,
    #[cfg(feature = "cpu-threads")]
    cpu_threads: Option<CpuThreadsExecutor>,
    #[cfg(feature = "gpu-sim")]
    gpu_sim: Option<GpuSimExecutor>,
}

impl Launcher {
    pub fn new(config: WorkDivConfig, cpu_threads: &CpuThreadsConfig) -> Result<Self> {
        let tables = device_tables(&config, cpu_threads)?;

        let mut registry = BackendRegistry::new();
        let mut cpu_serial = None;
        #[cfg(feature = "cpu-threads")]
        let mut cpu_threads_executor = None;
        #[cfg(feature = "gpu-sim")]
        let mut gpu_sim = None;

        for (kind, devices) in tables {
            registry.register(BackendDescriptor::new(kind, devices.clone()));
            match kind {
                BackendKind::CpuSerial => cpu_serial = Some(CpuSerialExecutor::new(devices)),
                #[cfg(feature = "cpu-threads")]
                BackendKind::CpuThreads => cpu_threads_executor = Some(CpuThreadsExecutor::new(cpu_threads, devices)?),
                #[cfg(feature = "gpu-sim")]
                BackendKind::GpuSim => gpu_sim = Some(GpuSimExecutor::new(devices)),
                #[allow(unreachable_patterns)]
                other => return Err(BackendError::NotCompiled(other.to_string())),
            }
        }

        tracing::info!(backends = ?registry.kinds(), selection = %config.selection, "launcher ready");
        Ok(Self {
            planner: WorkDivPlanner::new(registry, config),
            cpu_serial,
            #[cfg(feature = "cpu-threads")]
            cpu_threads: cpu_threads_executor,
            #[cfg(feature = "gpu-sim")]
            gpu_sim,
        })
    }

    /// Launcher configured from `TESSEL_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(WorkDivConfig::from_env()?, &CpuThreadsConfig::from_env()?)
    }

    pub fn planner(&self) -> &WorkDivPlanner {
        &self.planner
    }

    /// Partition `grid` for `target` and run `kernel` over it
    ///
    /// Returns the work extent the kernel ran with.
    pub fn launch<K: Kernel>(&self, target: BackendKind, grid: Extent3, kernel: &K) -> Result<WorkExtent> {
        let work = self.planner.plan(target, grid)?;
        self.execute(target, &work, kernel)?;
        Ok(work)
    }

    /// Run `kernel` over an already partitioned `work` on `target`
    pub fn execute<K: Kernel>(&self, target: BackendKind, work: &WorkExtent, kernel: &K) -> Result<()> {
        tracing::debug!(backend = %target, work = %work, "executing kernel");
        match target {
            BackendKind::CpuSerial => self.cpu_serial.as_ref().map(|e| e.execute(work, kernel)),
            #[cfg(feature = "cpu-threads")]
            BackendKind::CpuThreads => self.cpu_threads.as_ref().map(|e| e.execute(work, kernel)),
            #[cfg(feature = "gpu-sim")]
            BackendKind::GpuSim => self.gpu_sim.as_ref().map(|e| e.execute(work, kernel)),
            #[allow(unreachable_patterns)]
            _ => None,
        }
        .unwrap_or_else(|| Err(WorkDivError::BackendNotEnabled(target.to_string()).into()))
    }

    /// Make device `index` of `target` current and drop cached limits
    pub fn select_device(&self, target: BackendKind, index: usize) -> Result<()> {
        let executor_devices = match target {
            BackendKind::CpuSerial => self.cpu_serial.as_ref().map(|e| e.devices()),
            #[cfg(feature = "cpu-threads")]
            BackendKind::CpuThreads => self.cpu_threads.as_ref().map(|e| e.devices()),
            #[cfg(feature = "gpu-sim")]
            BackendKind::GpuSim => self.gpu_sim.as_ref().map(|e| e.devices()),
            #[allow(unreachable_patterns)]
            _ => None,
        };
        let devices = executor_devices.ok_or_else(|| WorkDivError::BackendNotEnabled(target.to_string()))?;
        devices.select(index)?;
        self.planner.invalidate_limits();
        Ok(())
    }
}
