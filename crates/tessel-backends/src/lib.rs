//! Execution back-ends for tessel work division
//!
//! This crate supplies everything the work-division core consumes from the
//! outside: device tables per back-end, a registry built from
//! configuration, and three accelerators that hand running kernels their
//! query context.
//!
//! | Back-end      | Query strategy                    | Block limits           |
//! |---------------|-----------------------------------|------------------------|
//! | `cpu-serial`  | stored work division              | `(1, 1, 1)`, 1 thread  |
//! | `cpu-threads` | stored work division              | configured             |
//! | `gpu-sim`     | live coordinate registers         | `(1024, 1024, 64)`, 1024 threads |
//!
//! # Usage
//!
//! ```rust
//! use tessel_backends::{Acc, CpuThreadsConfig, Kernel, Launcher};
//! use tessel_workdiv::{BackendKind, Extent3, WorkDivConfig};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct Count(AtomicUsize);
//!
//! impl Kernel for Count {
//!     fn run<A: Acc>(&self, _acc: &A) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WorkDivConfig {
//!     backends: vec![BackendKind::CpuSerial],
//!     ..WorkDivConfig::default()
//! };
//! let launcher = Launcher::new(config, &CpuThreadsConfig::default())?;
//!
//! let kernel = Count(AtomicUsize::new(0));
//! let work = launcher.launch(BackendKind::CpuSerial, Extent3::xyz(10, 4, 1), &kernel)?;
//! assert_eq!(kernel.0.load(Ordering::Relaxed), work.thread_count());
//! # Ok(())
//! # }
//! ```

pub mod acc;
pub mod backends;
pub mod config;
pub mod device;
pub mod error;
pub mod executor;
pub mod launcher;

pub use acc::{Acc, Kernel};
pub use backends::{is_available, AccCpuSerial, CpuSerialExecutor};
pub use config::CpuThreadsConfig;
pub use device::StaticDeviceManager;
pub use error::{BackendError, Result};
pub use executor::{validate_launch, Executor};
pub use launcher::{registry_from_config, Launcher};

#[cfg(feature = "cpu-threads")]
pub use backends::{AccCpuThreads, CpuThreadsExecutor};

#[cfg(feature = "gpu-sim")]
pub use backends::{AccGpuSim, GpuSimExecutor, SpecialRegister, SpecialRegisters};
