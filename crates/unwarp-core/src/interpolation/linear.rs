//! Trilinear interpolation with analytic gradient.

use super::trait_::{ScalarGradientSampler, ScalarSampler};
use super::{clamp_index, is_inside};
use crate::image::VoxelView;
use crate::spatial::{Point3, Vector3};

/// Linear Interpolator.
///
/// Trilinear interpolation over the eight surrounding voxels. The gradient is
/// the exact derivative of the interpolant, so it is piecewise constant along
/// each axis and zero across a clamped edge.
#[derive(Debug, Clone, Copy)]
pub struct LinearInterpolator {
    background: f64,
}

impl LinearInterpolator {
    /// Create a new linear interpolator with background 0.
    pub fn new() -> Self {
        Self { background: 0.0 }
    }

    /// Set the value returned outside the image.
    pub fn with_background(mut self, value: f64) -> Self {
        self.background = value;
        self
    }

    /// Value returned outside the image.
    pub fn background(&self) -> f64 {
        self.background
    }
}

impl Default for LinearInterpolator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScalarGradientSampler for LinearInterpolator {
    fn sample_with_gradient(&self, data: &VoxelView<'_>, position: &Point3) -> (f64, Vector3) {
        let dims = data.dims();
        if !is_inside(dims, position) {
            return (self.background, Vector3::zeros());
        }

        let mut lo = [0usize; 3];
        let mut hi = [0usize; 3];
        let mut w = [0.0f64; 3];
        for axis in 0..3 {
            let base = position[axis].floor();
            w[axis] = position[axis] - base;
            lo[axis] = clamp_index(base as i64, dims[axis]);
            hi[axis] = clamp_index(base as i64 + 1, dims[axis]);
        }

        let v = |x: usize, y: usize, z: usize| f64::from(data.get(x, y, z));
        let c000 = v(lo[0], lo[1], lo[2]);
        let c100 = v(hi[0], lo[1], lo[2]);
        let c010 = v(lo[0], hi[1], lo[2]);
        let c110 = v(hi[0], hi[1], lo[2]);
        let c001 = v(lo[0], lo[1], hi[2]);
        let c101 = v(hi[0], lo[1], hi[2]);
        let c011 = v(lo[0], hi[1], hi[2]);
        let c111 = v(hi[0], hi[1], hi[2]);

        let [wx, wy, wz] = w;
        let (ux, uy, uz) = (1.0 - wx, 1.0 - wy, 1.0 - wz);

        // Interpolate along X
        let c00 = c000 * ux + c100 * wx;
        let c10 = c010 * ux + c110 * wx;
        let c01 = c001 * ux + c101 * wx;
        let c11 = c011 * ux + c111 * wx;

        // Along Y
        let c0 = c00 * uy + c10 * wy;
        let c1 = c01 * uy + c11 * wy;

        let value = c0 * uz + c1 * wz;

        let dx = uy * uz * (c100 - c000) + wy * uz * (c110 - c010) + uy * wz * (c101 - c001) + wy * wz * (c111 - c011);
        let dy = uz * (c10 - c00) + wz * (c11 - c01);
        let dz = c1 - c0;

        (value, Vector3::new(dx, dy, dz))
    }
}

impl ScalarSampler for LinearInterpolator {
    fn sample(&self, data: &VoxelView<'_>, position: &Point3) -> f64 {
        self.sample_with_gradient(data, position).0
    }
}
