//! Integration tests for launching kernels across back-ends
//!
//! Key invariants:
//! - every (block, thread) pair of a launch runs exactly once
//! - host and device accelerators answer the shared queries identically
//! - a conservative partition is accepted by every enabled back-end

use std::sync::atomic::{AtomicUsize, Ordering};
use tessel_backends::{Acc, AccCpuSerial, CpuThreadsConfig, Kernel, Launcher};
use tessel_workdiv::{
    BackendKind, Dim3, DynWorkDivQuery, Extent3, Grid, Idx, OriginKind, Threads, UnitKind, WorkDiv, WorkDivConfig,
    WorkExtent,
};

struct Coverage {
    grid: Extent3,
    cells: Vec<AtomicUsize>,
}

impl Coverage {
    fn new(grid: Extent3) -> Self {
        Self {
            grid,
            cells: (0..grid.product().unwrap()).map(|_| AtomicUsize::new(0)).collect(),
        }
    }

    fn counts(&self) -> Vec<usize> {
        self.cells.iter().map(|cell| cell.load(Ordering::Relaxed)).collect()
    }
}

impl Kernel for Coverage {
    fn run<A: Acc>(&self, acc: &A) {
        assert_eq!(acc.grid_thread_extent(), self.grid);
        self.cells[acc.linear_global_thread_idx()].fetch_add(1, Ordering::Relaxed);
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("tessel_backends=debug,tessel_workdiv=debug")
        .with_test_writer()
        .try_init();
}

fn launcher(backends: Vec<BackendKind>, adaptive: bool) -> Launcher {
    let config = WorkDivConfig {
        backends,
        selection: adaptive.into(),
        ..WorkDivConfig::default()
    };
    init_tracing();
    Launcher::new(config, &CpuThreadsConfig::with_threads(4)).unwrap()
}

#[test]
fn test_serial_launch_covers_grid() {
    let launcher = launcher(vec![BackendKind::CpuSerial], false);
    let grid = Extent3::xyz(5, 3, 2);
    let kernel = Coverage::new(grid);
    launcher.launch(BackendKind::CpuSerial, grid, &kernel).unwrap();
    assert!(kernel.counts().into_iter().all(|count| count == 1));
}

#[test]
fn test_serial_acc_answers_grid_threads() {
    let work = WorkExtent::new(Extent3::xyz(5, 3, 2), Extent3::ones()).unwrap();
    let acc = AccCpuSerial::at(&work, Extent3::xyz(4, 2, 1), Extent3::splat(0)).unwrap();
    assert_eq!(acc.work_div::<Grid, Threads, Dim3>(), Extent3::xyz(5, 3, 2));
    assert_eq!(acc.idx::<Grid, Threads, Dim3>(), Extent3::xyz(4, 2, 1));
    assert_eq!(acc.query_idx(OriginKind::Grid, UnitKind::Threads, 2).unwrap(), vec![4, 2]);
    assert_eq!(acc.query_idx(OriginKind::Block, UnitKind::Threads, 3).unwrap(), vec![0, 0, 0]);
    assert!(acc.query_idx(OriginKind::Block, UnitKind::Blocks, 1).is_err());
}

#[cfg(all(feature = "cpu-threads", feature = "gpu-sim"))]
mod all_backends {
    use super::*;
    use proptest::prelude::*;
    use tessel_backends::{AccCpuThreads, AccGpuSim, SpecialRegisters};
    use tessel_workdiv::{Block, Blocks};

    #[test]
    fn test_host_and_device_queries_agree() {
        let work = WorkExtent::new(Extent3::xyz(3, 2, 2), Extent3::xyz(4, 2, 3)).unwrap();
        let lanes = work.threads_per_block();
        for block in 0..work.block_count() {
            for lane in 0..lanes {
                let device = AccGpuSim::new(SpecialRegisters::for_lane(&work, block, lane));
                let block_idx = device.idx::<Grid, Blocks, Dim3>();
                let thread_idx = device.idx::<Block, Threads, Dim3>();
                let host = AccCpuThreads::at(&work, block_idx, thread_idx).unwrap();

                assert_eq!(host.work_div::<Grid, Blocks, Dim3>(), device.work_div::<Grid, Blocks, Dim3>());
                assert_eq!(host.work_div::<Block, Threads, Dim3>(), device.work_div::<Block, Threads, Dim3>());
                assert_eq!(host.global_thread_idx(), device.global_thread_idx());
                assert_eq!(host.linear_global_thread_idx(), device.linear_global_thread_idx());
            }
        }
    }

    #[test]
    fn test_device_launch_matches_plan() {
        let launcher = launcher(vec![BackendKind::GpuSim], true);
        let grid = Extent3::xyz(100, 64, 1);
        let work = launcher.planner().plan(BackendKind::GpuSim, grid).unwrap();
        assert_eq!(work.block_threads(), Extent3::xyz(25, 16, 1));

        struct BlockShape(WorkExtent);
        impl Kernel for BlockShape {
            fn run<A: Acc>(&self, acc: &A) {
                assert_eq!(acc.work_div::<Block, Threads, Dim3>(), self.0.block_threads());
                assert_eq!(acc.work_div::<Grid, Blocks, Dim3>(), self.0.grid_blocks());
            }
        }
        launcher.execute(BackendKind::GpuSim, &work, &BlockShape(work)).unwrap();
    }

    #[test]
    fn test_adaptive_partition_is_rejected_elsewhere() {
        let launcher = launcher(vec![BackendKind::CpuThreads, BackendKind::GpuSim], true);
        let grid = Extent3::xyz(64, 1, 1);
        let work = launcher.planner().plan(BackendKind::GpuSim, grid).unwrap();
        assert_eq!(work.block_threads(), Extent3::xyz(64, 1, 1));
        let err = launcher
            .execute(BackendKind::CpuThreads, &work, &Coverage::new(grid))
            .unwrap_err();
        assert!(err.to_string().contains("exceeds the limits of cpu-threads"), "{err}");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn conservative_launch_covers_grid_on_every_backend(
            x in 1usize..40,
            y in 1usize..12,
            z in 1usize..4,
        ) {
            let launcher = launcher(BackendKind::ALL.to_vec(), false);
            let grid = Extent3::xyz(x, y, z);
            for target in BackendKind::ALL {
                let kernel = Coverage::new(grid);
                launcher.launch(target, grid, &kernel).unwrap();
                prop_assert!(kernel.counts().into_iter().all(|count| count == 1), "{} missed a cell", target);
            }
        }
    }
}
