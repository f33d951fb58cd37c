//! Device property sources
//!
//! The core never discovers devices itself. Each back-end hands it a
//! [`DeviceManager`] that can name the current device and report its block
//! limits.

use crate::error::Result;
use crate::extent::Extent3;
use crate::limits::HardwareLimits;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Block limits reported by one device
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceProperties {
    /// Human-readable device name
    pub name: String,
    /// Largest block extent supported along each axis
    pub max_block_extent: Extent3,
    /// Largest number of threads in one block
    pub max_block_thread_count: usize,
}

impl DeviceProperties {
    pub fn new(name: impl Into<String>, max_block_extent: Extent3, max_block_thread_count: usize) -> Self {
        Self {
            name: name.into(),
            max_block_extent,
            max_block_thread_count,
        }
    }

    /// The limits of this device alone
    pub fn limits(&self) -> HardwareLimits {
        HardwareLimits::new(self.max_block_extent, self.max_block_thread_count)
    }
}

/// Handle to a device returned by [`DeviceManager::current_device`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    index: usize,
    properties: Arc<DeviceProperties>,
}

impl DeviceHandle {
    pub fn new(index: usize, properties: Arc<DeviceProperties>) -> Self {
        Self { index, properties }
    }

    /// Position of the device in its manager
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.properties.name
    }

    pub fn properties(&self) -> &DeviceProperties {
        &self.properties
    }

    /// Largest block extent supported along each axis
    pub fn max_block_extent(&self) -> Extent3 {
        self.properties.max_block_extent
    }

    /// Largest number of threads in one block
    pub fn max_block_thread_count(&self) -> usize {
        self.properties.max_block_thread_count
    }

    pub fn limits(&self) -> HardwareLimits {
        self.properties.limits()
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.index, self.properties.name)
    }
}

/// Source of device properties for one back-end
///
/// Queries may involve a device round-trip; callers that partition
/// repeatedly should cache the derived limits (see [`crate::LimitsCache`]).
pub trait DeviceManager: Send + Sync + fmt::Debug {
    /// Number of devices this manager knows about
    fn device_count(&self) -> usize;

    /// The device work is currently dispatched to
    ///
    /// # Errors
    ///
    /// Returns [`crate::WorkDivError::DeviceUnavailable`] if no device can be selected.
    fn current_device(&self) -> Result<DeviceHandle>;
}
