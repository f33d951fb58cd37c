//! Host accelerators: stored work division plus a per-unit index

/// Define a host accelerator type backed by [`tessel_workdiv::HostWorkDiv`]
/// and [`tessel_workdiv::HostIdx`]
macro_rules! host_acc {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name {
            work_div: tessel_workdiv::HostWorkDiv,
            idx: tessel_workdiv::HostIdx,
        }

        impl $name {
            pub fn new(work_div: tessel_workdiv::HostWorkDiv, idx: tessel_workdiv::HostIdx) -> Self {
                Self { work_div, idx }
            }

            /// Accelerator for thread `thread_idx` of block `block_idx`
            pub fn at(
                work: &tessel_workdiv::WorkExtent,
                block_idx: tessel_workdiv::Extent3,
                thread_idx: tessel_workdiv::Extent3,
            ) -> tessel_workdiv::Result<Self> {
                Ok(Self::new(
                    tessel_workdiv::HostWorkDiv::new(*work),
                    tessel_workdiv::HostIdx::new(work, block_idx, thread_idx)?,
                ))
            }
        }

        impl tessel_workdiv::GetWorkDiv<tessel_workdiv::Grid, tessel_workdiv::Blocks> for $name {
            fn get_work_div(&self) -> tessel_workdiv::Extent3 {
                tessel_workdiv::GetWorkDiv::<tessel_workdiv::Grid, tessel_workdiv::Blocks>::get_work_div(&self.work_div)
            }
        }

        impl tessel_workdiv::GetWorkDiv<tessel_workdiv::Block, tessel_workdiv::Threads> for $name {
            fn get_work_div(&self) -> tessel_workdiv::Extent3 {
                tessel_workdiv::GetWorkDiv::<tessel_workdiv::Block, tessel_workdiv::Threads>::get_work_div(&self.work_div)
            }
        }

        impl tessel_workdiv::GetWorkDiv<tessel_workdiv::Grid, tessel_workdiv::Threads> for $name {
            fn get_work_div(&self) -> tessel_workdiv::Extent3 {
                tessel_workdiv::GetWorkDiv::<tessel_workdiv::Grid, tessel_workdiv::Threads>::get_work_div(&self.work_div)
            }
        }

        impl tessel_workdiv::GetIdx<tessel_workdiv::Grid, tessel_workdiv::Blocks> for $name {
            fn get_idx(&self) -> tessel_workdiv::Extent3 {
                self.idx.block_idx()
            }
        }

        impl tessel_workdiv::GetIdx<tessel_workdiv::Block, tessel_workdiv::Threads> for $name {
            fn get_idx(&self) -> tessel_workdiv::Extent3 {
                self.idx.thread_idx()
            }
        }

        impl tessel_workdiv::GetIdx<tessel_workdiv::Grid, tessel_workdiv::Threads> for $name {
            fn get_idx(&self) -> tessel_workdiv::Extent3 {
                self.idx.global_thread_idx()
            }
        }

        impl tessel_workdiv::DynWorkDivQuery for $name {
            fn backend_name(&self) -> &str {
                $kind.name()
            }

            fn work_div_extent(
                &self,
                origin: tessel_workdiv::OriginKind,
                unit: tessel_workdiv::UnitKind,
            ) -> Option<tessel_workdiv::Extent3> {
                tessel_workdiv::DynWorkDivQuery::work_div_extent(&self.work_div, origin, unit)
            }

            fn idx_extent(
                &self,
                origin: tessel_workdiv::OriginKind,
                unit: tessel_workdiv::UnitKind,
            ) -> Option<tessel_workdiv::Extent3> {
                tessel_workdiv::DynWorkDivQuery::idx_extent(&self.idx, origin, unit)
            }
        }

        impl $crate::acc::Acc for $name {
            fn kind(&self) -> tessel_workdiv::BackendKind {
                $kind
            }
        }
    };
}
