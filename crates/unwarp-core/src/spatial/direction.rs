//! Direction matrix helpers.

use super::Matrix3d;

/// Rotation factor of the polar decomposition `M = R * S`.
///
/// For a linear map with reflection (`det(U V^T) < 0`) the singular vector
/// belonging to the largest singular value is flipped, so the result is
/// always a proper rotation. A degenerate decomposition yields identity.
pub fn polar_rotation(m: &Matrix3d) -> Matrix3d {
    let svd = (*m).svd(true, true);
    let (Some(mut u), Some(v_t)) = (svd.u, svd.v_t) else {
        return Matrix3d::identity();
    };

    if (u * v_t).determinant() < 0.0 {
        let k = svd.singular_values.imax();
        let mut col = u.column_mut(k);
        col *= -1.0;
    }
    u * v_t
}

/// Check whether a direction matrix is orthonormal within `tol`.
pub fn is_orthonormal(m: &Matrix3d, tol: f64) -> bool {
    let product = m * m.transpose();
    (product - Matrix3d::identity()).abs().max() < tol
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Rotation3, Vector3};

    #[test]
    fn test_polar_rotation_of_rotation_is_itself() {
        let r = Rotation3::from_axis_angle(&Vector3::z_axis(), 0.3).into_inner();
        let p = polar_rotation(&r);
        assert!((p - r).abs().max() < 1e-12);
    }

    #[test]
    fn test_polar_rotation_strips_scaling() {
        let r = Rotation3::from_euler_angles(0.1, -0.2, 0.4).into_inner();
        let m = r * Matrix3d::from_diagonal(&Vector3::new(2.0, 0.5, 3.0));
        let p = polar_rotation(&m);
        assert!((p - r).abs().max() < 1e-10);
    }

    #[test]
    fn test_polar_rotation_of_reflection_is_proper() {
        let m = Matrix3d::from_diagonal(&Vector3::new(-2.0, 1.0, 1.0));
        let p = polar_rotation(&m);
        assert!((p.determinant() - 1.0).abs() < 1e-10);
        assert!(is_orthonormal(&p, 1e-10));
        // Largest singular value (axis 0) absorbs the reflection.
        assert!((p - Matrix3d::identity()).abs().max() < 1e-10);
    }

    #[test]
    fn test_is_orthonormal() {
        assert!(is_orthonormal(&Matrix3d::identity(), 1e-9));
        assert!(!is_orthonormal(&(Matrix3d::identity() * 2.0), 1e-9));
    }
}
