//! Serial host back-end
//!
//! Every block holds exactly one thread and blocks run one after another on
//! the calling thread. Useful as a reference and for debugging kernels.

use super::common::delinearize;
use crate::acc::Kernel;
use crate::device::StaticDeviceManager;
use crate::error::Result;
use crate::executor::Executor;
use std::sync::Arc;
use tessel_tracing::perf_span;
use tessel_workdiv::{BackendKind, DeviceProperties, Extent3, WorkExtent};

host_acc!(
    /// Accelerator of the serial host back-end
    AccCpuSerial,
    BackendKind::CpuSerial
);

/// The one device of the serial back-end: one thread per block
pub fn device_properties() -> DeviceProperties {
    DeviceProperties::new("cpu-serial", Extent3::ones(), 1)
}

pub fn device_manager() -> StaticDeviceManager {
    StaticDeviceManager::single(BackendKind::CpuSerial, device_properties())
}

/// Runs blocks and their threads in order on the calling thread
#[derive(Debug, Clone)]
pub struct CpuSerialExecutor {
    devices: Arc<StaticDeviceManager>,
}

impl CpuSerialExecutor {
    pub fn new(devices: Arc<StaticDeviceManager>) -> Self {
        Self { devices }
    }
}

impl Default for CpuSerialExecutor {
    fn default() -> Self {
        Self::new(Arc::new(device_manager()))
    }
}

impl Executor for CpuSerialExecutor {
    fn kind(&self) -> BackendKind {
        BackendKind::CpuSerial
    }

    fn devices(&self) -> &StaticDeviceManager {
        &self.devices
    }

    fn execute<K: Kernel>(&self, work: &WorkExtent, kernel: &K) -> Result<()> {
        let _span = perf_span!("cpu_serial_execute", blocks = work.block_count());
        self.validate(work)?;

        for block in 0..work.block_count() {
            let block_idx = delinearize(block, work.grid_blocks());
            for thread in 0..work.threads_per_block() {
                let thread_idx = delinearize(thread, work.block_threads());
                let acc = AccCpuSerial::at(work, block_idx, thread_idx)?;
                kernel.run(&acc);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acc::Acc;
    use parking_lot::Mutex;
    use tessel_workdiv::{Block, Dim3, Threads, WorkDiv};

    struct RecordOrder(Mutex<Vec<Extent3>>);

    impl Kernel for RecordOrder {
        fn run<A: Acc>(&self, acc: &A) {
            assert_eq!(acc.kind(), BackendKind::CpuSerial);
            assert_eq!(acc.work_div::<Block, Threads, Dim3>(), Extent3::ones());
            self.0.lock().push(acc.global_thread_idx());
        }
    }

    #[test]
    fn test_visits_blocks_in_order() {
        let work = WorkExtent::new(Extent3::xyz(2, 2, 1), Extent3::ones()).unwrap();
        let kernel = RecordOrder(Mutex::new(Vec::new()));
        CpuSerialExecutor::default().execute(&work, &kernel).unwrap();
        assert_eq!(
            kernel.0.into_inner(),
            vec![
                Extent3::xyz(0, 0, 0),
                Extent3::xyz(1, 0, 0),
                Extent3::xyz(0, 1, 0),
                Extent3::xyz(1, 1, 0),
            ]
        );
    }

    #[test]
    fn test_rejects_multi_thread_blocks() {
        let work = WorkExtent::new(Extent3::ones(), Extent3::xyz(2, 1, 1)).unwrap();
        let kernel = RecordOrder(Mutex::new(Vec::new()));
        let err = CpuSerialExecutor::default().execute(&work, &kernel).unwrap_err();
        assert!(matches!(
            err.as_work_div(),
            Some(tessel_workdiv::WorkDivError::ExceedsLimits { .. })
        ));
        assert!(kernel.0.into_inner().is_empty());
    }
}
