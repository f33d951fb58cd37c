//! Launch-time entry point combining limit aggregation and partitioning

use crate::backend::{BackendKind, BackendRegistry};
use crate::cache::{LimitsCache, LimitsKey};
use crate::config::{BlockExtentSelection, WorkDivConfig};
use crate::error::{Result, WorkDivError};
use crate::extent::Extent3;
use crate::limits::HardwareLimits;
use crate::partition::compute_work_extent;
use crate::work_extent::WorkExtent;

/// Partitions grids for the back-ends of one registry
///
/// Aggregated limits are cached per selection, so repeated launches only
/// query devices once. Call [`Self::invalidate_limits`] if a back-end's
/// current device changes.
#[derive(Debug)]
pub struct WorkDivPlanner {
    registry: BackendRegistry,
    config: WorkDivConfig,
    cache: LimitsCache,
}

impl WorkDivPlanner {
    pub fn new(registry: BackendRegistry, config: WorkDivConfig) -> Self {
        Self {
            registry,
            config,
            cache: LimitsCache::new(),
        }
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    pub fn config(&self) -> &WorkDivConfig {
        &self.config
    }

    /// Limits a partition for `target` must honor under `selection`
    ///
    /// Adaptive selection reads only `target`'s current device; conservative
    /// selection folds every enabled back-end. The configured override is
    /// applied on top of either.
    ///
    /// # Errors
    ///
    /// - [`WorkDivError::NoBackends`] if the registry is empty
    /// - [`WorkDivError::BackendNotEnabled`] if `target` is not registered
    /// - any device query error
    pub fn limits(&self, target: BackendKind, selection: BlockExtentSelection) -> Result<HardwareLimits> {
        if self.registry.is_empty() {
            return Err(WorkDivError::NoBackends);
        }
        let backend = self.registry.require(target)?;

        let limits = match selection {
            BlockExtentSelection::Adaptive => self
                .cache
                .get_or_try_insert(&LimitsKey::Adaptive(target), || HardwareLimits::for_backend(backend))?,
            BlockExtentSelection::Conservative => self
                .cache
                .get_or_try_insert(&LimitsKey::Conservative(self.registry.kinds()), || {
                    HardwareLimits::conservative(&self.registry)
                })?,
        };
        Ok(self.config.apply_override(limits))
    }

    /// Partition `grid` for `target` using the configured selection
    pub fn plan(&self, target: BackendKind, grid: Extent3) -> Result<WorkExtent> {
        self.plan_with(target, grid, self.config.selection)
    }

    /// Partition `grid` for `target`
    ///
    /// `selection` also accepts a `bool`, `true` meaning adaptive.
    pub fn plan_with(
        &self,
        target: BackendKind,
        grid: Extent3,
        selection: impl Into<BlockExtentSelection>,
    ) -> Result<WorkExtent> {
        let selection = selection.into();
        let limits = self.limits(target, selection)?;
        let work = compute_work_extent(grid, &limits)?;
        tessel_tracing::perf_event!(
            "work_div_planned",
            backend = target.name(),
            adaptive = selection.is_adaptive(),
            blocks = work.block_count(),
            threads_per_block = work.threads_per_block()
        );
        Ok(work)
    }

    /// Forget cached limits
    pub fn invalidate_limits(&self) {
        self.cache.clear();
    }
}
