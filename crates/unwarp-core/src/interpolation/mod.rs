//! Interpolation of voxel frames at continuous positions.
//!
//! Bounds follow the voxel-centre convention: a position is inside when every
//! coordinate lies in `[-0.5, n - 0.5]`. Neighbour indices past the edge are
//! clamped to the nearest voxel.

pub mod cubic;
pub mod linear;
pub mod trait_;

pub use cubic::CubicInterpolator;
pub use linear::LinearInterpolator;
pub use trait_::{ScalarGradientSampler, ScalarSampler};

use crate::spatial::Point3;

/// True when `position` lies within the sampled extent. Non-finite
/// coordinates are outside, and nothing is inside an empty grid.
#[inline]
pub fn is_inside(dims: [usize; 3], position: &Point3) -> bool {
    (0..3).all(|axis| {
        dims[axis] > 0 && position[axis] >= -0.5 && position[axis] <= dims[axis] as f64 - 0.5
    })
}

#[inline]
pub(crate) fn clamp_index(index: i64, len: usize) -> usize {
    index.clamp(0, len as i64 - 1) as usize
}
