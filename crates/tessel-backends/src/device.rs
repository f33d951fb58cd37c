//! Fixed device tables
//!
//! None of the tessel back-ends discover hardware at runtime; each exposes a
//! table of device descriptions with one of them selected as current.

use crate::error::{BackendError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tessel_workdiv::{BackendKind, DeviceHandle, DeviceManager, DeviceProperties, WorkDivError};

/// A fixed list of devices with a selectable current device
#[derive(Debug)]
pub struct StaticDeviceManager {
    kind: BackendKind,
    devices: Vec<Arc<DeviceProperties>>,
    current: AtomicUsize,
}

impl StaticDeviceManager {
    /// Device table for `kind`; the first device starts out current
    pub fn new(kind: BackendKind, devices: impl IntoIterator<Item = DeviceProperties>) -> Self {
        Self {
            kind,
            devices: devices.into_iter().map(Arc::new).collect(),
            current: AtomicUsize::new(0),
        }
    }

    /// Table holding a single device
    pub fn single(kind: BackendKind, device: DeviceProperties) -> Self {
        Self::new(kind, [device])
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Make device `index` current
    ///
    /// Limits cached from the previous device are stale afterwards.
    pub fn select(&self, index: usize) -> Result<()> {
        if index >= self.devices.len() {
            return Err(BackendError::InvalidDevice {
                index,
                count: self.devices.len(),
            });
        }
        self.current.store(index, Ordering::Release);
        tracing::debug!(backend = %self.kind, index, "selected device");
        Ok(())
    }

    pub fn current_index(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    pub fn devices(&self) -> impl Iterator<Item = &DeviceProperties> {
        self.devices.iter().map(Arc::as_ref)
    }
}

impl DeviceManager for StaticDeviceManager {
    fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn current_device(&self) -> tessel_workdiv::Result<DeviceHandle> {
        let index = self.current_index();
        self.devices
            .get(index)
            .map(|properties| DeviceHandle::new(index, Arc::clone(properties)))
            .ok_or_else(|| WorkDivError::device_unavailable(self.kind, "device table is empty"))
    }
}
