//! Cubic (Catmull-Rom) interpolation.

use super::trait_::ScalarSampler;
use super::{clamp_index, is_inside};
use crate::image::VoxelView;
use crate::spatial::Point3;

/// Cubic Hermite interpolator with Catmull-Rom tangents (tension 0).
///
/// Interpolating: reproduces voxel values exactly at voxel centres. Uses the
/// 4×4×4 neighbourhood with indices clamped at the edges.
#[derive(Debug, Clone, Copy)]
pub struct CubicInterpolator {
    background: f64,
}

/// Weights of the four neighbours `floor(p) - 1 ..= floor(p) + 2` for the
/// fractional offset `t`.
#[inline]
pub fn hermite_weights(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        0.5 * (2.0 * t2 - t3 - t),
        1.0 + 1.5 * t3 - 2.5 * t2,
        2.0 * t2 - 1.5 * t3 + 0.5 * t,
        0.5 * (t3 - t2),
    ]
}

impl CubicInterpolator {
    /// Create a new cubic interpolator with background 0.
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

impl Default for CubicInterpolator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScalarSampler for CubicInterpolator {
    fn sample(&self, data: &VoxelView<'_>, position: &Point3) -> f64 {
        let dims = data.dims();
        if !is_inside(dims, position) {
            return self.background;
        }

        let mut index = [[0usize; 4]; 3];
        let mut weight = [[0.0f64; 4]; 3];
        for axis in 0..3 {
            let base = position[axis].floor();
            weight[axis] = hermite_weights(position[axis] - base);
            for (k, slot) in index[axis].iter_mut().enumerate() {
                *slot = clamp_index(base as i64 - 1 + k as i64, dims[axis]);
            }
        }

        let mut value = 0.0;
        for (kz, &z) in index[2].iter().enumerate() {
            let mut plane = 0.0;
            for (ky, &y) in index[1].iter().enumerate() {
                let mut row = 0.0;
                for (kx, &x) in index[0].iter().enumerate() {
                    row += weight[0][kx] * f64::from(data.get(x, y, z));
                }
                plane += weight[1][ky] * row;
            }
            value += weight[2][kz] * plane;
        }
        value
    }
}
