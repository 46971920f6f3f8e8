//! Per-volume phase-encoding directions.

use nalgebra::DMatrix;
use unwarp_core::spatial::Vector3;

use crate::error::{Result, UnwarpError};

/// Phase-encoding direction of each volume, scaled by its readout factor.
///
/// Each entry is the displacement in data voxels per unit of field value, so
/// a field sample `b` moves a voxel by `b * direction(v)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseEncodingTable {
    directions: Vec<Vector3>,
}

impl PhaseEncodingTable {
    /// Build from an `N × 4` table `x y z readout` whose axes already follow
    /// image voxel conventions.
    pub fn from_matrix(table: &DMatrix<f64>) -> Result<Self> {
        if table.ncols() < 4 {
            return Err(UnwarpError::invalid_configuration(format!(
                "phase-encoding table needs 4 columns, found {}",
                table.ncols()
            )));
        }
        if table.nrows() == 0 {
            return Err(UnwarpError::invalid_configuration("phase-encoding table is empty"));
        }

        let directions = table
            .row_iter()
            .map(|row| Vector3::new(row[0], row[1], row[2]) * row[3])
            .collect::<Vec<_>>();
        if directions.iter().any(|d| !d.iter().all(|c| c.is_finite())) {
            return Err(UnwarpError::invalid_configuration(
                "phase-encoding table contains non-finite values",
            ));
        }
        Ok(Self { directions })
    }

    /// Build from a table as written by eddy-style tools.
    ///
    /// The first axis is negated before scaling.
    pub fn import(table: &DMatrix<f64>) -> Result<Self> {
        Self::from_matrix(&apply_eddy_axis_convention(table.clone()))
    }

    /// Build directly from scaled directions.
    pub fn from_directions(directions: Vec<Vector3>) -> Self {
        Self { directions }
    }

    /// Number of volumes described.
    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    /// Scaled direction of volume `v`.
    ///
    /// # Panics
    /// If `v` is not below [`len`](Self::len).
    pub fn direction(&self, v: usize) -> &Vector3 {
        &self.directions[v]
    }

    /// Fail unless the table has one row per volume.
    pub fn check_volumes(&self, volumes: usize) -> Result<()> {
        if self.len() != volumes {
            return Err(UnwarpError::dimension_mismatch(format!(
                "phase-encoding table has {} rows but the image has {} volumes",
                self.len(),
                volumes
            )));
        }
        Ok(())
    }
}

/// Negate the first column of an imported phase-encoding table.
pub fn apply_eddy_axis_convention(mut table: DMatrix<f64>) -> DMatrix<f64> {
    if table.ncols() > 0 {
        table.column_mut(0).iter_mut().for_each(|x| *x = -*x);
    }
    table
}
