//! Image metadata types.
//!
//! Metadata describes how continuous voxel indices `(x, y, z)` map to
//! scanner coordinates: `point = origin + Direction * (index ⊙ spacing)`.

use crate::error::{CoreError, Result};
use crate::spatial::{Direction3, Matrix3d, Matrix4d, Point3, Spacing3, Vector3};
use crate::transform::AffineTransform;

// Columns shorter than this are treated as degenerate axes.
const MIN_AXIS_NORM: f64 = 1e-9;

/// Spatial metadata of an image: origin, spacing and direction cosines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageMetadata {
    /// Scanner coordinate of voxel (0, 0, 0).
    origin: Point3,
    /// Distance between voxel centres along each axis.
    spacing: Spacing3,
    /// Column i is the scanner direction of voxel axis i.
    direction: Direction3,
}

impl ImageMetadata {
    /// Create new image metadata.
    pub fn new(origin: Point3, spacing: Spacing3, direction: Direction3) -> Self {
        Self {
            origin,
            spacing,
            direction,
        }
    }

    /// Decompose a voxel-to-scanner affine into origin, spacing and direction.
    ///
    /// Spacing is the norm of each linear column; a degenerate column falls
    /// back to the matching unit axis with spacing 1.
    pub fn from_affine(affine: &Matrix4d) -> Self {
        let origin = Point3::new(affine[(0, 3)], affine[(1, 3)], affine[(2, 3)]);
        let mut spacing = Spacing3::zeros();
        let mut direction = Direction3::identity();

        for axis in 0..3 {
            let column = Vector3::new(affine[(0, axis)], affine[(1, axis)], affine[(2, axis)]);
            let norm = column.norm();
            if norm > MIN_AXIS_NORM {
                spacing[axis] = norm;
                direction.set_column(axis, &(column / norm));
            } else {
                spacing[axis] = 1.0;
            }
        }

        Self::new(origin, spacing, direction)
    }

    /// Get the origin.
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Get the spacing.
    pub fn spacing(&self) -> &Spacing3 {
        &self.spacing
    }

    /// Get the direction.
    pub fn direction(&self) -> &Direction3 {
        &self.direction
    }

    /// Set the origin.
    pub fn set_origin(&mut self, origin: Point3) {
        self.origin = origin;
    }

    /// Voxel index → scanner coordinate.
    pub fn voxel_to_scanner(&self) -> AffineTransform {
        let linear = self.direction * Matrix3d::from_diagonal(&self.spacing);
        AffineTransform::from_parts(linear, self.origin.coords)
    }

    /// Scanner coordinate → voxel index.
    pub fn scanner_to_voxel(&self) -> Result<AffineTransform> {
        self.validate()?;
        self.voxel_to_scanner().inverse()
    }

    /// Reject non-finite or non-positive spacing and singular directions.
    pub fn validate(&self) -> Result<()> {
        if self.spacing.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(CoreError::invalid_geometry(format!(
                "spacing must be finite and positive, got {:?}",
                self.spacing.as_slice()
            )));
        }
        if !self.origin.iter().all(|v| v.is_finite()) {
            return Err(CoreError::invalid_geometry("origin is not finite"));
        }
        if self.direction.determinant().abs() < MIN_AXIS_NORM {
            return Err(CoreError::invalid_geometry("direction matrix is singular"));
        }
        Ok(())
    }
}

impl Default for ImageMetadata {
    fn default() -> Self {
        Self {
            origin: Point3::origin(),
            spacing: Spacing3::repeat(1.0),
            direction: Direction3::identity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Rotation3;

    #[test]
    fn test_metadata_default() {
        let metadata = ImageMetadata::default();
        assert_eq!(metadata.origin(), &Point3::origin());
        assert_eq!(metadata.spacing(), &Spacing3::repeat(1.0));
        assert_eq!(metadata.direction(), &Direction3::identity());
        assert!(metadata.voxel_to_scanner().approx_eq(&AffineTransform::identity(), 0.0));
    }

    #[test]
    fn test_metadata_setters() {
        let mut metadata = ImageMetadata::default();
        let new_origin = Point3::new(1.0, 2.0, 3.0);
        metadata.set_origin(new_origin);
        assert_eq!(metadata.origin(), &new_origin);
    }

    #[test]
    fn test_voxel_to_scanner_applies_spacing_then_direction() {
        let r = Rotation3::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2).into_inner();
        let metadata = ImageMetadata::new(Point3::new(10.0, 0.0, 0.0), Spacing3::new(2.0, 1.0, 1.0), r);
        let p = metadata.voxel_to_scanner().transform_point(&Point3::new(1.0, 0.0, 0.0));
        // index x=1 → 2 mm along voxel x, which points along scanner +y
        assert!((p - Point3::new(10.0, 2.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_from_affine_roundtrip() {
        let r = Rotation3::from_euler_angles(0.1, 0.2, 0.3).into_inner();
        let metadata = ImageMetadata::new(Point3::new(-90.0, 126.0, -72.0), Spacing3::new(2.0, 2.0, 2.5), r);
        let decomposed = ImageMetadata::from_affine(metadata.voxel_to_scanner().matrix());
        assert!((decomposed.spacing() - metadata.spacing()).norm() < 1e-12);
        assert!((decomposed.direction() - metadata.direction()).abs().max() < 1e-12);
        assert!((decomposed.origin() - metadata.origin()).norm() < 1e-12);
    }

    #[test]
    fn test_validate_rejects_zero_spacing() {
        let metadata = ImageMetadata::new(Point3::origin(), Spacing3::new(1.0, 0.0, 1.0), Direction3::identity());
        assert!(matches!(metadata.validate(), Err(CoreError::InvalidGeometry(_))));
        assert!(metadata.scanner_to_voxel().is_err());
    }
}
