//! Rigid transform from a 6-parameter tangent vector.
//!
//! Motion is stored as an element of the Lie algebra se(3): the first three
//! parameters are the rotation tangent (axis scaled by angle, radians), the
//! last three the translation tangent (scanner units). The matrix transform
//! is recovered through the exponential map.

use nalgebra::{Rotation3, SVector};

use super::affine::AffineTransform;
use crate::spatial::{Matrix3d, Vector3};

/// Six-parameter rigid motion tangent `[ωx, ωy, ωz, ux, uy, uz]`.
pub type TangentVector = SVector<f64, 6>;

// Below this angle the closed-form coefficients lose precision.
const SMALL_ANGLE: f64 = 1e-6;

/// Exponential map se(3) → SE(3).
///
/// R = exp([ω]×) (Rodrigues), t = V u with
/// V = I + (1 - cos θ)/θ² [ω]× + (θ - sin θ)/θ³ [ω]×².
pub fn se3_exp(p: &TangentVector) -> AffineTransform {
    let omega = Vector3::new(p[0], p[1], p[2]);
    let u = Vector3::new(p[3], p[4], p[5]);

    let theta = omega.norm();
    let w = omega.cross_matrix();
    let w2 = w * w;

    let (a, b) = if theta < SMALL_ANGLE {
        let t2 = theta * theta;
        (0.5 - t2 / 24.0, 1.0 / 6.0 - t2 / 120.0)
    } else {
        let t2 = theta * theta;
        ((1.0 - theta.cos()) / t2, (theta - theta.sin()) / (t2 * theta))
    };

    let rotation = Rotation3::new(omega).into_inner();
    let v = Matrix3d::identity() + w * a + w2 * b;

    AffineTransform::from_parts(rotation, v * u)
}

/// Rigid motion described by its tangent parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    parameters: TangentVector,
}

impl RigidTransform {
    /// Create from tangent parameters.
    pub fn new(parameters: TangentVector) -> Self {
        Self { parameters }
    }

    /// Zero motion.
    pub fn identity() -> Self {
        Self::new(TangentVector::zeros())
    }

    /// Tangent parameters.
    pub fn parameters(&self) -> &TangentVector {
        &self.parameters
    }

    /// Homogeneous matrix of this motion.
    pub fn to_affine(&self) -> AffineTransform {
        se3_exp(&self.parameters)
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}
