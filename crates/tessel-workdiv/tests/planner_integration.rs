//! Integration tests for planning a launch and querying it back
//!
//! Mirrors how a launcher uses the crate: build a registry, plan a grid,
//! hand the result to per-unit query contexts.

use std::sync::Arc;
use tessel_workdiv::{
    Block, BackendDescriptor, BackendKind, BackendRegistry, Blocks, DeviceHandle, DeviceManager, DeviceProperties,
    Dim1, Dim2, Dim3, DynWorkDivQuery, Extent, Extent3, Grid, HostIdx, HostWorkDiv, Idx, OriginKind, Result,
    Threads, UnitKind, WorkDiv, WorkDivConfig, WorkDivError, WorkDivPlanner,
};

#[derive(Debug)]
struct OneDevice(Arc<DeviceProperties>);

impl OneDevice {
    fn new(name: &str, max_block_extent: Extent3, max_block_thread_count: usize) -> Arc<Self> {
        Arc::new(Self(Arc::new(DeviceProperties::new(name, max_block_extent, max_block_thread_count))))
    }
}

impl DeviceManager for OneDevice {
    fn device_count(&self) -> usize {
        1
    }

    fn current_device(&self) -> Result<DeviceHandle> {
        Ok(DeviceHandle::new(0, Arc::clone(&self.0)))
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("tessel_workdiv=debug")
        .with_test_writer()
        .try_init();
}

fn registry() -> BackendRegistry {
    BackendRegistry::new()
        .with(BackendDescriptor::new(
            BackendKind::CpuThreads,
            OneDevice::new("host", Extent3::splat(32), 1024),
        ))
        .with(BackendDescriptor::new(
            BackendKind::GpuSim,
            OneDevice::new("sim", Extent3::xyz(1024, 1024, 64), 1024),
        ))
}

#[test]
fn test_worked_example_through_planner() {
    init_tracing();
    let planner = WorkDivPlanner::new(registry(), WorkDivConfig::default());
    let work = planner.plan(BackendKind::CpuThreads, Extent3::xyz(100, 64, 1)).unwrap();
    assert_eq!(work.block_threads(), Extent3::xyz(25, 32, 1));
    assert_eq!(work.grid_blocks(), Extent3::xyz(4, 2, 1));
}

#[test]
fn test_stored_work_div_round_trip() {
    let planner = WorkDivPlanner::new(registry(), WorkDivConfig::default());
    let work = planner.plan(BackendKind::CpuThreads, Extent3::xyz(100, 64, 1)).unwrap();
    let ctx = HostWorkDiv::new(work);

    assert_eq!(ctx.work_div::<Block, Threads, Dim3>(), work.block_threads());
    assert_eq!(ctx.work_div::<Grid, Blocks, Dim3>(), work.grid_blocks());
    assert_eq!(ctx.work_div::<Grid, Threads, Dim2>(), Extent::new([100, 64]));
}

#[test]
fn test_every_thread_has_a_unique_global_index() {
    let planner = WorkDivPlanner::new(registry(), WorkDivConfig::default());
    let work = planner.plan(BackendKind::CpuThreads, Extent3::xyz(96, 40, 1)).unwrap();
    assert_eq!(work.block_threads(), Extent3::xyz(32, 20, 1));

    let mut seen = vec![false; 96 * 40];
    for bx in 0..work.grid_blocks().x() {
        for by in 0..work.grid_blocks().y() {
            for tx in 0..work.block_threads().x() {
                for ty in 0..work.block_threads().y() {
                    let idx = HostIdx::new(&work, Extent3::xyz(bx, by, 0), Extent3::xyz(tx, ty, 0)).unwrap();
                    let [gx, gy] = idx.idx::<Grid, Threads, Dim2>().into_array();
                    let slot = gy * 96 + gx;
                    assert!(!seen[slot], "index ({gx}, {gy}) visited twice");
                    seen[slot] = true;
                }
            }
        }
    }
    assert!(seen.into_iter().all(|visited| visited));
}

#[test]
fn test_dynamic_queries() {
    let work = tessel_workdiv::WorkExtent::new(Extent3::xyz(4, 2, 1), Extent3::xyz(25, 32, 1)).unwrap();
    let ctx: &dyn DynWorkDivQuery = &HostWorkDiv::new(work);

    assert_eq!(ctx.query_work_div(OriginKind::Grid, UnitKind::Blocks, 1).unwrap(), vec![4]);
    assert!(matches!(
        ctx.query_work_div(OriginKind::Block, UnitKind::Blocks, 3),
        Err(WorkDivError::UnsupportedQuery { dim: 3, .. })
    ));
}

#[test]
fn test_adaptive_and_conservative_differ() {
    init_tracing();
    let planner = WorkDivPlanner::new(registry(), WorkDivConfig::default());
    let grid = Extent3::xyz(4096, 1, 1);

    let conservative = planner.plan_with(BackendKind::GpuSim, grid, false).unwrap();
    let adaptive = planner.plan_with(BackendKind::GpuSim, grid, true).unwrap();

    assert_eq!(conservative.block_threads(), Extent3::xyz(32, 1, 1));
    assert_eq!(adaptive.block_threads(), Extent3::xyz(1024, 1, 1));
}

#[test]
fn test_config_from_json_drives_planner() {
    let config = WorkDivConfig::from_json_str(
        r#"{"selection":"adaptive","limit_override":{"max_block_extent":[64,64,1],"max_block_thread_count":128}}"#,
    )
    .unwrap();
    let planner = WorkDivPlanner::new(registry(), config);
    let work = planner.plan(BackendKind::GpuSim, Extent3::xyz(256, 256, 1)).unwrap();
    assert!(work.threads_per_block() <= 128);
    assert_eq!(work.grid_threads(), Extent3::xyz(256, 256, 1));
    insta::assert_snapshot!(work.to_string(), @"grid_blocks=(32, 32, 1), block_threads=(8, 8, 1)");
}

#[test]
fn test_one_dimensional_projection() {
    let work = tessel_workdiv::WorkExtent::new(Extent3::xyz(8, 1, 1), Extent3::xyz(128, 1, 1)).unwrap();
    let ctx = HostWorkDiv::new(work);
    assert_eq!(ctx.work_div::<Grid, Threads, Dim1>(), Extent::new([1024]));
}
