//! Homogeneous affine transform.
//!
//! Every frame change in the unwarping pipeline (data voxel to scanner,
//! scanner to field voxel, rigid motion) is an `AffineTransform`, so chains
//! compose by plain matrix products.

use std::ops::Mul;

use crate::error::{CoreError, Result};
use crate::spatial::{polar_rotation, Matrix3d, Matrix4d, Point3, Vector3};

/// Affine transform stored as a 4×4 homogeneous matrix.
///
/// T(x) = A x + t
///
/// Composition follows matrix order: `(a * b).transform_point(p)` applies
/// `b` first, then `a`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    matrix: Matrix4d,
}

impl AffineTransform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4d::identity(),
        }
    }

    /// Wrap a homogeneous matrix. The bottom row is reset to `[0, 0, 0, 1]`.
    pub fn from_matrix(matrix: Matrix4d) -> Self {
        let mut matrix = matrix;
        matrix[(3, 0)] = 0.0;
        matrix[(3, 1)] = 0.0;
        matrix[(3, 2)] = 0.0;
        matrix[(3, 3)] = 1.0;
        Self { matrix }
    }

    /// Build from a linear part and a translation.
    pub fn from_parts(linear: Matrix3d, translation: Vector3) -> Self {
        let mut matrix = Matrix4d::identity();
        matrix.fixed_view_mut::<3, 3>(0, 0).copy_from(&linear);
        matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(&translation);
        Self { matrix }
    }

    /// Pure translation.
    pub fn translation_only(translation: Vector3) -> Self {
        Self::from_parts(Matrix3d::identity(), translation)
    }

    /// Homogeneous matrix.
    pub fn matrix(&self) -> &Matrix4d {
        &self.matrix
    }

    /// Linear (upper-left 3×3) part.
    pub fn linear(&self) -> Matrix3d {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Translation column.
    pub fn translation(&self) -> Vector3 {
        self.matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// Rotation factor of the polar decomposition of the linear part.
    pub fn rotation(&self) -> Matrix3d {
        polar_rotation(&self.linear())
    }

    /// True when every matrix entry is finite.
    pub fn is_finite(&self) -> bool {
        self.matrix.iter().all(|v| v.is_finite())
    }

    /// Inverse, if the linear part is invertible.
    pub fn try_inverse(&self) -> Option<Self> {
        let linear = self.linear().try_inverse()?;
        let translation = -(linear * self.translation());
        let inverse = Self::from_parts(linear, translation);
        inverse.is_finite().then_some(inverse)
    }

    /// Inverse, reporting a singular transform as an error.
    pub fn inverse(&self) -> Result<Self> {
        self.try_inverse()
            .ok_or_else(|| CoreError::transform(format!("transform is not invertible: {}", self.matrix)))
    }

    /// Map a point (translation applied).
    #[inline]
    pub fn transform_point(&self, point: &Point3) -> Point3 {
        let m = &self.matrix;
        Point3::new(
            m[(0, 0)] * point.x + m[(0, 1)] * point.y + m[(0, 2)] * point.z + m[(0, 3)],
            m[(1, 0)] * point.x + m[(1, 1)] * point.y + m[(1, 2)] * point.z + m[(1, 3)],
            m[(2, 0)] * point.x + m[(2, 1)] * point.y + m[(2, 2)] * point.z + m[(2, 3)],
        )
    }

    /// Largest absolute entry-wise difference to `other`.
    pub fn max_difference(&self, other: &Self) -> f64 {
        (self.matrix - other.matrix).abs().max()
    }

    /// Entry-wise comparison within `tol`.
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        self.max_difference(other) <= tol
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for AffineTransform {
    type Output = AffineTransform;

    fn mul(self, rhs: AffineTransform) -> AffineTransform {
        AffineTransform {
            matrix: self.matrix * rhs.matrix,
        }
    }
}

impl Mul<&AffineTransform> for &AffineTransform {
    type Output = AffineTransform;

    fn mul(self, rhs: &AffineTransform) -> AffineTransform {
        AffineTransform {
            matrix: self.matrix * rhs.matrix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Rotation3;

    #[test]
    fn test_identity_maps_point_to_itself() {
        let p = Point3::new(1.5, -2.0, 3.25);
        assert_eq!(AffineTransform::identity().transform_point(&p), p);
    }

    #[test]
    fn test_from_parts() {
        let linear = Matrix3d::from_diagonal(&Vector3::new(2.0, 3.0, 4.0));
        let t = AffineTransform::from_parts(linear, Vector3::new(1.0, 1.0, 1.0));
        let p = t.transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert_eq!(p, Point3::new(3.0, 4.0, 5.0));
        assert_eq!(t.linear(), linear);
        assert_eq!(t.translation(), Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_composition_order() {
        // Scale first, then translate.
        let scale = AffineTransform::from_parts(Matrix3d::identity() * 2.0, Vector3::zeros());
        let shift = AffineTransform::translation_only(Vector3::new(1.0, 0.0, 0.0));
        let p = (shift * scale).transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert_eq!(p, Point3::new(3.0, 2.0, 2.0));
    }

    #[test]
    fn test_inverse_roundtrip() {
        let r = Rotation3::from_euler_angles(0.2, 0.1, -0.3).into_inner();
        let t = AffineTransform::from_parts(r * 1.7, Vector3::new(4.0, -2.0, 0.5));
        let inv = t.inverse().unwrap();
        assert!((t * inv).approx_eq(&AffineTransform::identity(), 1e-12));

        let p = Point3::new(3.0, 2.0, 1.0);
        let back = inv.transform_point(&t.transform_point(&p));
        assert!((back - p).norm() < 1e-12);
    }

    #[test]
    fn test_singular_inverse_is_error() {
        let t = AffineTransform::from_parts(Matrix3d::zeros(), Vector3::zeros());
        assert!(t.try_inverse().is_none());
        assert!(matches!(t.inverse(), Err(CoreError::TransformError(_))));
    }

    #[test]
    fn test_rotation_of_scaled_rotation() {
        let r = Rotation3::from_axis_angle(&Vector3::x_axis(), 0.25).into_inner();
        let t = AffineTransform::from_parts(r * Matrix3d::from_diagonal(&Vector3::new(2.0, 2.0, 3.0)), Vector3::zeros());
        assert!((t.rotation() - r).abs().max() < 1e-10);
    }
}
