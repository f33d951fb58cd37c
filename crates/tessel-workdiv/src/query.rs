//! Work-division and index query capability
//!
//! Kernel code asks its execution context for an extent or an index at a
//! given *origin* (grid or block level), counted in a given *unit* (blocks or
//! threads), for a dimensionality `D`:
//!
//! ```
//! use tessel_workdiv::{Block, Dim2, Extent, Extent3, HostWorkDiv, Threads, WorkDiv, WorkExtent};
//!
//! let work = WorkExtent::new(Extent3::xyz(4, 2, 1), Extent3::xyz(25, 32, 1))?;
//! let ctx = HostWorkDiv::new(work);
//! assert_eq!(ctx.work_div::<Block, Threads, Dim2>(), Extent::new([25, 32]));
//! # Ok::<(), tessel_workdiv::WorkDivError>(())
//! ```
//!
//! A context only implements [`GetWorkDiv`] / [`GetIdx`] for the
//! combinations it can answer, so asking for anything else fails to compile.
//! When the context is picked at runtime, [`DynWorkDivQuery`] answers the
//! same questions and reports [`WorkDivError::UnsupportedQuery`] instead.

use crate::dim::{project_dynamic, Dim, DimVec};
use crate::error::{Result, WorkDivError};
use crate::extent::Extent3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod sealed {
    pub trait Sealed {}
}

/// Hierarchy level a query refers to
pub trait Origin: sealed::Sealed + 'static {
    const KIND: OriginKind;
}

/// Granularity a query is counted in
pub trait Unit: sealed::Sealed + 'static {
    const KIND: UnitKind;
}

/// Grid-level origin
#[derive(Debug, Clone, Copy)]
pub enum Grid {}

/// Block-level origin
#[derive(Debug, Clone, Copy)]
pub enum Block {}

/// Counted in blocks
#[derive(Debug, Clone, Copy)]
pub enum Blocks {}

/// Counted in threads
#[derive(Debug, Clone, Copy)]
pub enum Threads {}

impl sealed::Sealed for Grid {}
impl sealed::Sealed for Block {}
impl sealed::Sealed for Blocks {}
impl sealed::Sealed for Threads {}

impl Origin for Grid {
    const KIND: OriginKind = OriginKind::Grid;
}

impl Origin for Block {
    const KIND: OriginKind = OriginKind::Block;
}

impl Unit for Blocks {
    const KIND: UnitKind = UnitKind::Blocks;
}

impl Unit for Threads {
    const KIND: UnitKind = UnitKind::Threads;
}

/// Extent of origin `O` counted in unit `U`, as three components
pub trait GetWorkDiv<O: Origin, U: Unit> {
    fn get_work_div(&self) -> Extent3;
}

/// Current index within origin `O` counted in unit `U`, as three components
pub trait GetIdx<O: Origin, U: Unit> {
    fn get_idx(&self) -> Extent3;
}

/// Dimension-aware front end for [`GetWorkDiv`]
pub trait WorkDiv {
    /// The `O`/`U` extent projected to `D`
    fn work_div<O: Origin, U: Unit, D: Dim>(&self) -> DimVec<D>
    where
        Self: GetWorkDiv<O, U>,
    {
        D::project(GetWorkDiv::<O, U>::get_work_div(self))
    }
}

impl<T: ?Sized> WorkDiv for T {}

/// Dimension-aware front end for [`GetIdx`]
pub trait Idx {
    /// The `O`/`U` index projected to `D`
    fn idx<O: Origin, U: Unit, D: Dim>(&self) -> DimVec<D>
    where
        Self: GetIdx<O, U>,
    {
        D::project(GetIdx::<O, U>::get_idx(self))
    }
}

impl<T: ?Sized> Idx for T {}

/// Runtime counterpart of [`Origin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginKind {
    Grid,
    Block,
}

/// Runtime counterpart of [`Unit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Blocks,
    Threads,
}

impl fmt::Display for OriginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OriginKind::Grid => "grid",
            OriginKind::Block => "block",
        })
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnitKind::Blocks => "blocks",
            UnitKind::Threads => "threads",
        })
    }
}

impl FromStr for OriginKind {
    type Err = WorkDivError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(OriginKind::Grid),
            "block" => Ok(OriginKind::Block),
            other => Err(WorkDivError::config(format!("unknown origin '{other}'"))),
        }
    }
}

impl FromStr for UnitKind {
    type Err = WorkDivError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blocks" => Ok(UnitKind::Blocks),
            "threads" => Ok(UnitKind::Threads),
            other => Err(WorkDivError::config(format!("unknown unit '{other}'"))),
        }
    }
}

/// Work-division queries resolved at runtime
///
/// Implementors report which combinations they publish through
/// [`Self::work_div_extent`] and [`Self::idx_extent`]; the provided query
/// methods handle projection and error reporting.
pub trait DynWorkDivQuery {
    /// Name used in [`WorkDivError::UnsupportedQuery`]
    fn backend_name(&self) -> &str;

    /// Three-component extent for `origin`/`unit`, or `None` if not published
    fn work_div_extent(&self, origin: OriginKind, unit: UnitKind) -> Option<Extent3>;

    /// Three-component index for `origin`/`unit`, or `None` if not published
    fn idx_extent(&self, _origin: OriginKind, _unit: UnitKind) -> Option<Extent3> {
        None
    }

    /// Extent for `origin`/`unit` projected to `dim` components
    ///
    /// # Errors
    ///
    /// Returns [`WorkDivError::UnsupportedQuery`] if the combination is not
    /// published or `dim` is not 1, 2 or 3.
    fn query_work_div(&self, origin: OriginKind, unit: UnitKind, dim: usize) -> Result<Vec<usize>> {
        self.work_div_extent(origin, unit)
            .and_then(|extent| project_dynamic(extent, dim))
            .ok_or_else(|| unsupported(self.backend_name(), origin, unit, dim))
    }

    /// Index for `origin`/`unit` projected to `dim` components
    ///
    /// # Errors
    ///
    /// Same as [`Self::query_work_div`].
    fn query_idx(&self, origin: OriginKind, unit: UnitKind, dim: usize) -> Result<Vec<usize>> {
        self.idx_extent(origin, unit)
            .and_then(|extent| project_dynamic(extent, dim))
            .ok_or_else(|| unsupported(self.backend_name(), origin, unit, dim))
    }
}

fn unsupported(backend: &str, origin: OriginKind, unit: UnitKind, dim: usize) -> WorkDivError {
    WorkDivError::UnsupportedQuery {
        backend: backend.to_string(),
        origin: origin.to_string(),
        unit: unit.to_string(),
        dim,
    }
}
