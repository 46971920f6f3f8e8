//! Data-voxel to field-voxel transform composition.
//!
//! Three frames are involved: data voxels, scanner space and field voxels.
//! Motion is expressed in scanner space, so it is conjugated into data voxel
//! coordinates before being chained with the static data-to-field mapping.

use unwarp_core::spatial::{Matrix3d, Point3, Vector3};
use unwarp_core::{AffineTransform, ImageMetadata};

use crate::error::{Result, UnwarpError};
use crate::motion::MotionTable;

/// Transform state for one (volume, slice) unit.
///
/// Computed once per unit and shared by all voxels of the slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceTransform {
    total: AffineTransform,
    rotation_t: Matrix3d,
}

impl SliceTransform {
    /// Wrap a data-voxel to field-voxel affine.
    pub fn new(total: AffineTransform) -> Self {
        Self {
            rotation_t: total.rotation().transpose(),
            total,
        }
    }

    /// The composed data-voxel to field-voxel affine.
    pub fn total(&self) -> &AffineTransform {
        &self.total
    }

    /// Transposed rotation factor of the linear part.
    pub fn rotation_transpose(&self) -> &Matrix3d {
        &self.rotation_t
    }

    /// Field voxel position of data voxel `vox`.
    pub fn field_position(&self, vox: &Point3) -> Point3 {
        self.total.transform_point(vox)
    }

    /// Bring a field-voxel gradient back into the data voxel frame.
    pub fn rotate_gradient(&self, gradient: &Vector3) -> Vector3 {
        self.rotation_t * gradient
    }
}

/// Composes per-slice data-voxel to field-voxel transforms.
#[derive(Debug, Clone)]
pub struct TransformComposer {
    data_v2s: AffineTransform,
    data_s2v: AffineTransform,
    /// Field scanner-to-voxel after data voxel-to-scanner, with the optional
    /// alignment correction folded in.
    static_transform: AffineTransform,
    motion: MotionTable,
}

impl TransformComposer {
    /// Build a composer for a data series and a field map.
    ///
    /// With `alignment = Some(f)` the field is taken to be aligned with volume
    /// `f`, and the mean motion of that volume is removed from every slice.
    pub fn new(
        data: &ImageMetadata,
        field: &ImageMetadata,
        motion: MotionTable,
        alignment: Option<usize>,
    ) -> Result<Self> {
        let data_v2s = data.voxel_to_scanner();
        let data_s2v = data.scanner_to_voxel()?;
        let field_s2v = field.scanner_to_voxel()?;

        let mut static_transform = field_s2v * data_v2s;
        if let Some(f) = alignment {
            if f >= motion.volumes() {
                return Err(UnwarpError::invalid_configuration(format!(
                    "alignment volume {} out of range for {} volumes",
                    f,
                    motion.volumes()
                )));
            }
            let mean = data_s2v * motion.mean_transform(f) * data_v2s;
            static_transform = static_transform * mean.inverse()?;
        }

        if !static_transform.is_finite() {
            return Err(UnwarpError::transform(
                "data-to-field transform is not finite",
            ));
        }

        Ok(Self {
            data_v2s,
            data_s2v,
            static_transform,
            motion,
        })
    }

    /// Data-voxel to field-voxel transform without slice motion.
    pub fn static_transform(&self) -> &AffineTransform {
        &self.static_transform
    }

    pub fn motion(&self) -> &MotionTable {
        &self.motion
    }

    /// Motion of slice `z` in volume `v`, in data voxel coordinates.
    pub fn motion_in_voxels(&self, v: usize, z: usize) -> AffineTransform {
        self.data_s2v * self.motion.transform(v, z) * self.data_v2s
    }

    /// Full data-voxel to field-voxel transform of slice `z` in volume `v`.
    pub fn slice_transform(&self, v: usize, z: usize) -> Result<SliceTransform> {
        let total = self.static_transform * self.motion_in_voxels(v, z);
        if !total.is_finite() {
            return Err(UnwarpError::transform(format!(
                "transform of volume {} slice {} is not finite",
                v, z
            )));
        }
        Ok(SliceTransform::new(total))
    }
}
