//! Sampler traits for reading voxel data at continuous positions.
//!
//! Positions are continuous voxel indices `(x, y, z)` of the sampled frame.
//! Both traits take the frame by reference so one sampler value can be
//! shared by every worker thread.

use crate::image::VoxelView;
use crate::spatial::{Point3, Vector3};

/// Scalar sampling at a continuous voxel position.
pub trait ScalarSampler: Send + Sync {
    /// Interpolated value at `position`, or the background value outside
    /// the frame.
    fn sample(&self, data: &VoxelView<'_>, position: &Point3) -> f64;
}

/// Scalar sampling with the spatial gradient.
pub trait ScalarGradientSampler: Send + Sync {
    /// Interpolated value and gradient with respect to voxel coordinates at
    /// `position`. Outside the frame: the background value and zero gradient.
    fn sample_with_gradient(&self, data: &VoxelView<'_>, position: &Point3) -> (f64, Vector3);
}
