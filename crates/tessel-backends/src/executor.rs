//! Launching a partitioned grid on a back-end

use crate::acc::Kernel;
use crate::device::StaticDeviceManager;
use crate::error::Result;
use tessel_workdiv::{BackendKind, DeviceHandle, DeviceManager, WorkDivError, WorkExtent};

/// Runs a kernel once for every (block, thread) pair of a [`WorkExtent`]
pub trait Executor {
    /// Back-end this executor launches on
    fn kind(&self) -> BackendKind;

    /// Device table of the back-end
    fn devices(&self) -> &StaticDeviceManager;

    /// Run `kernel` over `work`
    ///
    /// # Errors
    ///
    /// Returns [`WorkDivError::ExceedsLimits`] (wrapped) if a block of `work`
    /// does not fit the current device, before any thread runs.
    fn execute<K: Kernel>(&self, work: &WorkExtent, kernel: &K) -> Result<()>;

    /// Check `work` against the current device
    fn validate(&self, work: &WorkExtent) -> Result<DeviceHandle> {
        let device = self.devices().current_device()?;
        validate_launch(self.kind(), &device, work)?;
        Ok(device)
    }
}

/// Ensure every block of `work` fits `device`
pub fn validate_launch(kind: BackendKind, device: &DeviceHandle, work: &WorkExtent) -> tessel_workdiv::Result<()> {
    let block = work.block_threads();
    let max_extent = device.max_block_extent();
    let exceeds = |reason: String| WorkDivError::ExceedsLimits {
        backend: kind.to_string(),
        extent: work.to_string(),
        reason,
    };

    if let Some(axis) = (0..3).find(|&axis| block[axis] > max_extent[axis]) {
        return Err(exceeds(format!(
            "block extent {} exceeds {} on axis {axis} of device {device}",
            block[axis], max_extent[axis]
        )));
    }

    let threads = work.threads_per_block();
    if threads > device.max_block_thread_count() {
        return Err(exceeds(format!(
            "{threads} threads per block exceed {} on device {device}",
            device.max_block_thread_count()
        )));
    }

    Ok(())
}
