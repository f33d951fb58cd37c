//! Back-end configuration

use crate::device::StaticDeviceManager;
use crate::error::{BackendError, Result};
use std::num::NonZeroUsize;
use tessel_workdiv::{BackendKind, DeviceProperties, Extent3};

pub const ENV_CPU_THREADS: &str = "TESSEL_CPU_THREADS";

/// Limits and pool size of the threaded back-end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuThreadsConfig {
    /// Worker threads in the pool
    pub num_threads: usize,
    /// Largest block extent per axis
    pub max_block_extent: Extent3,
    /// Largest number of threads in one block
    pub max_block_thread_count: usize,
}

impl Default for CpuThreadsConfig {
    /// One block thread per available core
    fn default() -> Self {
        let cores = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self::with_threads(cores)
    }
}

impl CpuThreadsConfig {
    /// Pool of `threads` workers, blocks of up to `threads` threads
    pub fn with_threads(threads: usize) -> Self {
        let threads = threads.max(1);
        Self {
            num_threads: threads,
            max_block_extent: Extent3::splat(threads),
            max_block_thread_count: threads,
        }
    }

    /// Defaults, with `TESSEL_CPU_THREADS` overriding the core count
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`] with a custom variable source
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidConfig`] if `TESSEL_CPU_THREADS` is not
    /// a positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let Some(value) = lookup(ENV_CPU_THREADS) else {
            return Ok(Self::default());
        };
        let threads: usize = value
            .trim()
            .parse()
            .map_err(|e| BackendError::invalid_config(format!("{ENV_CPU_THREADS}={value}: {e}")))?;
        if threads == 0 {
            return Err(BackendError::invalid_config(format!(
                "{ENV_CPU_THREADS}=0: the pool needs at least one thread"
            )));
        }
        let config = Self::with_threads(threads);
        config.validate()?;
        tracing::debug!(threads, "cpu-threads pool size from {}", ENV_CPU_THREADS);
        Ok(config)
    }

    /// Check the pool size and the block limits
    pub fn validate(&self) -> Result<()> {
        if self.num_threads == 0 {
            return Err(BackendError::invalid_config("cpu-threads pool needs at least one thread"));
        }
        self.device_properties().limits().validate()?;
        Ok(())
    }

    /// The single device this configuration describes
    pub fn device_properties(&self) -> DeviceProperties {
        DeviceProperties::new(
            format!("cpu-threads ({} workers)", self.num_threads),
            self.max_block_extent,
            self.max_block_thread_count,
        )
    }

    /// Device table holding [`Self::device_properties`]
    pub fn device_manager(&self) -> StaticDeviceManager {
        StaticDeviceManager::single(BackendKind::CpuThreads, self.device_properties())
    }
}
