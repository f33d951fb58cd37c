//! Back-end identifiers and the ordered set of enabled back-ends

use crate::device::{DeviceHandle, DeviceManager};
use crate::error::{Result, WorkDivError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Concrete execution strategies known to tessel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Host back-end running one thread per block, blocks one after another
    CpuSerial,
    /// Host back-end running the threads of a block on a thread pool
    CpuThreads,
    /// Device-style back-end whose units read their coordinates from registers
    GpuSim,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [BackendKind::CpuSerial, BackendKind::CpuThreads, BackendKind::GpuSim];

    pub const fn name(self) -> &'static str {
        match self {
            BackendKind::CpuSerial => "cpu-serial",
            BackendKind::CpuThreads => "cpu-threads",
            BackendKind::GpuSim => "gpu-sim",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = WorkDivError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| WorkDivError::config(format!("unknown back-end '{s}'")))
    }
}

/// An enabled back-end together with its device property source
#[derive(Debug, Clone)]
pub struct BackendDescriptor {
    kind: BackendKind,
    devices: Arc<dyn DeviceManager>,
}

impl BackendDescriptor {
    pub fn new(kind: BackendKind, devices: Arc<dyn DeviceManager>) -> Self {
        Self { kind, devices }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn devices(&self) -> &Arc<dyn DeviceManager> {
        &self.devices
    }

    /// The device this back-end currently dispatches to
    pub fn current_device(&self) -> Result<DeviceHandle> {
        self.devices.current_device()
    }
}

/// Ordered set of enabled back-ends
///
/// Each kind appears at most once; registering a kind again replaces its
/// descriptor in place.
#[derive(Debug, Clone, Default)]
pub struct BackendRegistry {
    backends: Vec<BackendDescriptor>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::register`]
    pub fn with(mut self, descriptor: BackendDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn register(&mut self, descriptor: BackendDescriptor) {
        match self.backends.iter_mut().find(|existing| existing.kind == descriptor.kind) {
            Some(existing) => *existing = descriptor,
            None => self.backends.push(descriptor),
        }
    }

    pub fn get(&self, kind: BackendKind) -> Option<&BackendDescriptor> {
        self.backends.iter().find(|descriptor| descriptor.kind == kind)
    }

    /// Like [`Self::get`], failing with [`WorkDivError::BackendNotEnabled`]
    pub fn require(&self, kind: BackendKind) -> Result<&BackendDescriptor> {
        self.get(kind)
            .ok_or_else(|| WorkDivError::BackendNotEnabled(kind.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackendDescriptor> {
        self.backends.iter()
    }

    /// Enabled kinds in registration order
    pub fn kinds(&self) -> Vec<BackendKind> {
        self.backends.iter().map(BackendDescriptor::kind).collect()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
