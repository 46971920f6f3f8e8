//! Rigid motion per volume and slice group.
//!
//! A motion matrix holds one 6-parameter row per acquisition unit. With `nv`
//! volumes and `rows = nv * ne` the table describes `ne` slice groups per
//! volume; slice `z` belongs to group `z % ne`. With `ne = 1` motion is
//! per volume.

use nalgebra::DMatrix;
use unwarp_core::{AffineTransform, RigidTransform, TangentVector};

use crate::error::{Result, UnwarpError};

const MOTION_PARAMETERS: usize = 6;

/// Motion parameters indexed by volume and slice group.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionTable {
    /// Row-major over `(volume, group)`.
    motions: Vec<RigidTransform>,
    volumes: usize,
    groups: usize,
}

impl MotionTable {
    /// Build from a motion matrix for an image with `volumes` volumes.
    ///
    /// Columns past the sixth are ignored. The row count must be a positive
    /// multiple of `volumes`.
    pub fn new(matrix: &DMatrix<f64>, volumes: usize) -> Result<Self> {
        if volumes == 0 {
            return Err(UnwarpError::invalid_configuration("image has no volumes"));
        }
        if matrix.ncols() < MOTION_PARAMETERS {
            return Err(UnwarpError::invalid_configuration(format!(
                "motion table needs {} columns, found {}",
                MOTION_PARAMETERS,
                matrix.ncols()
            )));
        }
        let rows = matrix.nrows();
        if rows == 0 || rows % volumes != 0 {
            return Err(UnwarpError::invalid_configuration(format!(
                "motion table has {} rows, which is not a multiple of {} volumes",
                rows, volumes
            )));
        }

        let motions = matrix
            .row_iter()
            .map(|row| RigidTransform::new(TangentVector::from_fn(|i, _| row[i])))
            .collect();
        Ok(Self {
            motions,
            volumes,
            groups: rows / volumes,
        })
    }

    /// Identity motion for every volume.
    pub fn zeros(volumes: usize) -> Self {
        Self {
            motions: vec![RigidTransform::identity(); volumes],
            volumes,
            groups: 1,
        }
    }

    pub fn volumes(&self) -> usize {
        self.volumes
    }

    /// Number of slice groups per volume (`ne`).
    pub fn groups(&self) -> usize {
        self.groups
    }

    /// Slice group of slice `z`.
    pub fn slice_group(&self, z: usize) -> usize {
        z % self.groups
    }

    /// Motion of the unit acquiring slice `z` of volume `v`.
    ///
    /// # Panics
    /// If `v` is not below [`volumes`](Self::volumes).
    pub fn motion(&self, v: usize, z: usize) -> &RigidTransform {
        assert!(v < self.volumes, "volume {} out of range", v);
        &self.motions[v * self.groups + self.slice_group(z)]
    }

    /// Parameters of the unit acquiring slice `z` of volume `v`.
    pub fn parameters(&self, v: usize, z: usize) -> &TangentVector {
        self.motion(v, z).parameters()
    }

    /// Scanner-space motion of slice `z` in volume `v`.
    pub fn transform(&self, v: usize, z: usize) -> AffineTransform {
        self.motion(v, z).to_affine()
    }

    /// Mean parameters over the slice groups of volume `v`.
    pub fn mean_parameters(&self, v: usize) -> TangentVector {
        assert!(v < self.volumes, "volume {} out of range", v);
        let start = v * self.groups;
        let sum = self.motions[start..start + self.groups]
            .iter()
            .fold(TangentVector::zeros(), |acc, m| acc + m.parameters());
        sum / self.groups as f64
    }

    /// Motion of the mean parameters of volume `v`.
    pub fn mean_transform(&self, v: usize) -> AffineTransform {
        RigidTransform::new(self.mean_parameters(v)).to_affine()
    }
}
