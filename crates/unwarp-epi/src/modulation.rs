//! Jacobian intensity modulation.

use unwarp_core::spatial::Vector3;

/// Intensity correction applied to each resampled value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modulation {
    /// Scale by the Jacobian determinant of the displacement.
    #[default]
    Jacobian,
    /// Leave samples unscaled.
    None,
}

impl Modulation {
    /// Scale factor for phase-encoding vector `pe` and a field gradient
    /// already rotated into the data voxel frame.
    ///
    /// The factor is not clamped; values near zero or negative indicate a
    /// folding field.
    pub fn factor(&self, pe: &Vector3, rotated_gradient: &Vector3) -> f64 {
        match self {
            Self::Jacobian => 1.0 + 2.0 * pe.dot(rotated_gradient),
            Self::None => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jacobian_factor() {
        let pe = Vector3::new(0.0, 0.05, 0.0);
        let gradient = Vector3::new(3.0, 2.0, -1.0);
        assert!((Modulation::Jacobian.factor(&pe, &gradient) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_orthogonal_gradient_leaves_intensity() {
        let pe = Vector3::new(0.1, 0.0, 0.0);
        let gradient = Vector3::new(0.0, 5.0, 7.0);
        assert_eq!(Modulation::Jacobian.factor(&pe, &gradient), 1.0);
    }

    #[test]
    fn test_disabled_is_unity() {
        let pe = Vector3::new(0.1, 0.0, 0.0);
        let gradient = Vector3::new(100.0, 0.0, 0.0);
        assert_eq!(Modulation::None.factor(&pe, &gradient), 1.0);
    }

    #[test]
    fn test_factor_is_not_clamped() {
        let pe = Vector3::new(1.0, 0.0, 0.0);
        let gradient = Vector3::new(-2.0, 0.0, 0.0);
        assert_eq!(Modulation::Jacobian.factor(&pe, &gradient), -3.0);
    }
}
