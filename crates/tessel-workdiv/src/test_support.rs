//! Device managers for unit tests

use crate::backend::{BackendDescriptor, BackendKind};
use crate::device::{DeviceHandle, DeviceManager, DeviceProperties};
use crate::error::{Result, WorkDivError};
use crate::extent::Extent3;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// One fixed device that counts how often it was queried
#[derive(Debug)]
pub(crate) struct CountingDevices {
    device: Arc<DeviceProperties>,
    queries: AtomicUsize,
}

impl CountingDevices {
    pub(crate) fn new(max_block_extent: Extent3, max_block_thread_count: usize) -> Self {
        Self {
            device: Arc::new(DeviceProperties::new("test device", max_block_extent, max_block_thread_count)),
            queries: AtomicUsize::new(0),
        }
    }

    pub(crate) fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl DeviceManager for CountingDevices {
    fn device_count(&self) -> usize {
        1
    }

    fn current_device(&self) -> Result<DeviceHandle> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(DeviceHandle::new(0, Arc::clone(&self.device)))
    }
}

/// A back-end whose device can never be selected
#[derive(Debug)]
pub(crate) struct FailingDevices;

impl DeviceManager for FailingDevices {
    fn device_count(&self) -> usize {
        0
    }

    fn current_device(&self) -> Result<DeviceHandle> {
        Err(WorkDivError::device_unavailable("test", "no devices"))
    }
}

pub(crate) fn backend(kind: BackendKind, max_block_extent: Extent3, max_block_thread_count: usize) -> BackendDescriptor {
    BackendDescriptor::new(
        kind,
        Arc::new(CountingDevices::new(max_block_extent, max_block_thread_count)),
    )
}
