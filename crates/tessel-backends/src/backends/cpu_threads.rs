//! Threaded host back-end
//!
//! Blocks run one after another; the threads of a block run concurrently on
//! a dedicated rayon pool.

use super::common::delinearize;
use crate::acc::Kernel;
use crate::config::CpuThreadsConfig;
use crate::device::StaticDeviceManager;
use crate::error::{BackendError, Result};
use crate::executor::Executor;
use rayon::prelude::*;
use std::sync::Arc;
use tessel_tracing::perf_span;
use tessel_workdiv::{BackendKind, WorkExtent};

host_acc!(
    /// Accelerator of the threaded host back-end
    AccCpuThreads,
    BackendKind::CpuThreads
);

/// Runs the threads of each block in parallel on its own pool
#[derive(Debug, Clone)]
pub struct CpuThreadsExecutor {
    devices: Arc<StaticDeviceManager>,
    pool: Arc<rayon::ThreadPool>,
}

impl CpuThreadsExecutor {
    pub fn new(config: &CpuThreadsConfig, devices: Arc<StaticDeviceManager>) -> Result<Self> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.num_threads)
            .thread_name(|index| format!("tessel-cpu-threads-{index}"))
            .build()
            .map_err(|e| BackendError::thread_pool(e.to_string()))?;
        tracing::debug!(num_threads = config.num_threads, "built cpu-threads pool");
        Ok(Self {
            devices,
            pool: Arc::new(pool),
        })
    }

    /// Executor with its own device table built from `config`
    pub fn from_config(config: &CpuThreadsConfig) -> Result<Self> {
        Self::new(config, Arc::new(config.device_manager()))
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl Executor for CpuThreadsExecutor {
    fn kind(&self) -> BackendKind {
        BackendKind::CpuThreads
    }

    fn devices(&self) -> &StaticDeviceManager {
        &self.devices
    }

    fn execute<K: Kernel>(&self, work: &WorkExtent, kernel: &K) -> Result<()> {
        let _span = perf_span!(
            "cpu_threads_execute",
            blocks = work.block_count(),
            threads_per_block = work.threads_per_block()
        );
        self.validate(work)?;

        for block in 0..work.block_count() {
            let block_idx = delinearize(block, work.grid_blocks());
            self.pool.install(|| {
                (0..work.threads_per_block())
                    .into_par_iter()
                    .try_for_each(|thread| -> Result<()> {
                        let thread_idx = delinearize(thread, work.block_threads());
                        let acc = AccCpuThreads::at(work, block_idx, thread_idx)?;
                        kernel.run(&acc);
                        Ok(())
                    })
            })?;
        }
        Ok(())
    }
}
