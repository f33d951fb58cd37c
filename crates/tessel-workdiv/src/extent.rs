//! Fixed-length extent vectors
//!
//! An [`Extent`] is an immutable vector of `N` unsigned components. What a
//! component counts (work items, blocks, threads) depends on where the vector
//! is used. All combining operations return new vectors.

use crate::error::{Result, WorkDivError};
use serde::de::{Deserialize, Deserializer, Error as _};
use serde::ser::{Serialize, SerializeTuple, Serializer};
use std::fmt;
use std::ops::Index;

/// Vector of `N` unsigned extent components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extent<const N: usize>([usize; N]);

/// The three-component extent used for grids, blocks and hardware limits
pub type Extent3 = Extent<3>;

impl<const N: usize> Extent<N> {
    /// Create an extent from its components
    pub const fn new(components: [usize; N]) -> Self {
        Self(components)
    }

    /// Extent with every component set to `value`
    pub const fn splat(value: usize) -> Self {
        Self([value; N])
    }

    /// Extent with every component set to 1
    pub const fn ones() -> Self {
        Self::splat(1)
    }

    /// Extent with every component set to `usize::MAX`
    pub const fn unbounded() -> Self {
        Self::splat(usize::MAX)
    }

    /// Number of components
    pub const fn len(&self) -> usize {
        N
    }

    /// Always false for the 1/2/3-component extents in use
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Components as an array, x first
    pub const fn as_array(&self) -> &[usize; N] {
        &self.0
    }

    /// Consume into the component array
    pub const fn into_array(self) -> [usize; N] {
        self.0
    }

    /// Component on `axis`, `None` past the last axis
    pub fn get(&self, axis: usize) -> Option<usize> {
        self.0.get(axis).copied()
    }

    /// Components in axis order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Combine two extents component by component
    pub fn zip_with(self, other: Self, mut f: impl FnMut(usize, usize) -> usize) -> Self {
        Self(std::array::from_fn(|axis| f(self.0[axis], other.0[axis])))
    }

    /// Apply `f` to every component
    pub fn map(self, mut f: impl FnMut(usize) -> usize) -> Self {
        Self(std::array::from_fn(|axis| f(self.0[axis])))
    }

    /// Component-wise minimum
    pub fn min(self, other: Self) -> Self {
        self.zip_with(other, usize::min)
    }

    /// Component-wise maximum
    pub fn max(self, other: Self) -> Self {
        self.zip_with(other, usize::max)
    }

    /// Product of all components, `None` on overflow
    pub fn checked_product(&self) -> Option<usize> {
        self.0.iter().try_fold(1usize, |acc, &value| acc.checked_mul(value))
    }

    /// Product of all components
    ///
    /// # Errors
    ///
    /// Returns [`WorkDivError::CapacityOverflow`] when the product does not fit into `usize`.
    pub fn product(&self) -> Result<usize> {
        self.checked_product()
            .ok_or_else(|| WorkDivError::overflow(format!("product of extent {self}")))
    }

    /// Component-wise multiplication
    ///
    /// # Errors
    ///
    /// Returns [`WorkDivError::CapacityOverflow`] when any component overflows.
    pub fn checked_mul(self, other: Self) -> Result<Self> {
        let mut out = [0usize; N];
        for (axis, slot) in out.iter_mut().enumerate() {
            *slot = self.0[axis]
                .checked_mul(other.0[axis])
                .ok_or_else(|| WorkDivError::overflow(format!("axis {axis} of {self} * {other}")))?;
        }
        Ok(Self(out))
    }

    /// First axis with a zero component
    pub fn first_zero_axis(&self) -> Option<usize> {
        self.0.iter().position(|&value| value == 0)
    }

    /// Ensure every component is at least 1
    ///
    /// # Errors
    ///
    /// Returns [`WorkDivError::InvalidExtent`] naming the first zero axis.
    pub fn validate(&self) -> Result<()> {
        match self.first_zero_axis() {
            Some(axis) => Err(WorkDivError::InvalidExtent { axis, value: 0 }),
            None => Ok(()),
        }
    }
}

impl Extent<3> {
    /// Create a three-component extent
    pub const fn xyz(x: usize, y: usize, z: usize) -> Self {
        Self([x, y, z])
    }

    /// First (fastest varying) component
    pub const fn x(&self) -> usize {
        self.0[0]
    }

    /// Second component
    pub const fn y(&self) -> usize {
        self.0[1]
    }

    /// Third component
    pub const fn z(&self) -> usize {
        self.0[2]
    }
}

impl<const N: usize> Default for Extent<N> {
    fn default() -> Self {
        Self::ones()
    }
}

impl<const N: usize> Index<usize> for Extent<N> {
    type Output = usize;

    fn index(&self, axis: usize) -> &usize {
        &self.0[axis]
    }
}

impl<const N: usize> From<[usize; N]> for Extent<N> {
    fn from(components: [usize; N]) -> Self {
        Self(components)
    }
}

impl<const N: usize> From<Extent<N>> for [usize; N] {
    fn from(extent: Extent<N>) -> Self {
        extent.0
    }
}

impl<const N: usize> From<Extent<N>> for Vec<usize> {
    fn from(extent: Extent<N>) -> Self {
        extent.as_array().to_vec()
    }
}

impl From<(usize, usize, usize)> for Extent3 {
    fn from((x, y, z): (usize, usize, usize)) -> Self {
        Self::xyz(x, y, z)
    }
}

/// Signed input, e.g. from a foreign caller; negative and zero axes are rejected
impl TryFrom<[i64; 3]> for Extent3 {
    type Error = WorkDivError;

    fn try_from(components: [i64; 3]) -> Result<Self> {
        let mut out = [0usize; 3];
        for (axis, &value) in components.iter().enumerate() {
            if value <= 0 {
                return Err(WorkDivError::InvalidExtent { axis, value });
            }
            out[axis] = usize::try_from(value).map_err(|_| WorkDivError::overflow(format!("axis {axis} = {value}")))?;
        }
        Ok(Self(out))
    }
}

impl<const N: usize> fmt::Display for Extent<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (axis, value) in self.0.iter().enumerate() {
            if axis > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str(")")
    }
}

impl<const N: usize> Serialize for Extent<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(N)?;
        for value in &self.0 {
            tuple.serialize_element(value)?;
        }
        tuple.end()
    }
}

impl<'de, const N: usize> Deserialize<'de> for Extent<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let components = Vec::<usize>::deserialize(deserializer)?;
        let len = components.len();
        <[usize; N]>::try_from(components)
            .map(Self)
            .map_err(|_| D::Error::invalid_length(len, &format!("an array of {N} extents").as_str()))
    }
}
