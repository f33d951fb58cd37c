//! Pieces shared by the back-end implementations

#[macro_use]
mod host;

use tessel_workdiv::Extent3;

/// Coordinates of the `linear`-th element of `extent`, x fastest
pub fn delinearize(linear: usize, extent: Extent3) -> Extent3 {
    let plane = extent.x() * extent.y();
    Extent3::xyz(linear % extent.x(), (linear / extent.x()) % extent.y(), linear / plane)
}

/// Inverse of [`delinearize`]
pub fn linearize(idx: Extent3, extent: Extent3) -> usize {
    idx.x() + extent.x() * (idx.y() + extent.y() * idx.z())
}
