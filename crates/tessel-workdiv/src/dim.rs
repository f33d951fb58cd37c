//! Dimensionality tags
//!
//! `Dim1`, `Dim2` and `Dim3` are type-level selectors and are never
//! instantiated. A query made for `D` keeps the leading `D::COUNT`
//! components (x, then y, then z) of the three-component answer.

use crate::extent::{Extent, Extent3};

mod sealed {
    pub trait Sealed {}
}

/// A dimensionality of 1, 2 or 3
pub trait Dim: sealed::Sealed + 'static {
    /// Number of meaningful components
    const COUNT: usize;

    /// Vector type answered for this dimensionality
    type Vec: Copy + std::fmt::Debug + PartialEq + Into<Vec<usize>>;

    /// Keep the leading `COUNT` components of `extent`
    fn project(extent: Extent3) -> Self::Vec;
}

/// One dimension
#[derive(Debug, Clone, Copy)]
pub enum Dim1 {}

/// Two dimensions
#[derive(Debug, Clone, Copy)]
pub enum Dim2 {}

/// Three dimensions
#[derive(Debug, Clone, Copy)]
pub enum Dim3 {}

/// The vector type a query returns for dimensionality `D`
pub type DimVec<D> = <D as Dim>::Vec;

macro_rules! impl_dim {
    ($dim:ty, $count:literal) => {
        impl sealed::Sealed for $dim {}

        impl Dim for $dim {
            const COUNT: usize = $count;
            type Vec = Extent<$count>;

            fn project(extent: Extent3) -> Self::Vec {
                Extent::new(std::array::from_fn(|axis| extent[axis]))
            }
        }
    };
}

impl_dim!(Dim1, 1);
impl_dim!(Dim2, 2);
impl_dim!(Dim3, 3);

/// Project `extent` to a runtime dimensionality, used by the dynamic query path
pub(crate) fn project_dynamic(extent: Extent3, dim: usize) -> Option<Vec<usize>> {
    match dim {
        1 => Some(Dim1::project(extent).into()),
        2 => Some(Dim2::project(extent).into()),
        3 => Some(Dim3::project(extent).into()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        assert_eq!(Dim1::COUNT, 1);
        assert_eq!(Dim2::COUNT, 2);
        assert_eq!(Dim3::COUNT, 3);
    }

    #[test]
    fn test_projection_keeps_leading_axes() {
        let extent = Extent3::xyz(4, 5, 6);
        assert_eq!(Dim1::project(extent), Extent::new([4]));
        assert_eq!(Dim2::project(extent), Extent::new([4, 5]));
        assert_eq!(Dim3::project(extent), extent);
    }

    #[test]
    fn test_dynamic_projection() {
        let extent = Extent3::xyz(4, 5, 6);
        assert_eq!(project_dynamic(extent, 2), Some(vec![4, 5]));
        assert_eq!(project_dynamic(extent, 0), None);
        assert_eq!(project_dynamic(extent, 4), None);
    }
}
