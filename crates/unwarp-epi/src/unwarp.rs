//! Per-voxel unwarping.
//!
//! For each nominal data voxel the field is sampled at its field-voxel
//! position, the data frame is resampled at the voxel displaced along the
//! volume's phase-encoding direction, and the sample is scaled by the
//! Jacobian of the displacement.

use unwarp_core::interpolation::{CubicInterpolator, LinearInterpolator};
use unwarp_core::spatial::Point3;
use unwarp_core::{ScalarGradientSampler, ScalarSampler, VoxelGrid, VoxelView};

use crate::composer::SliceTransform;
use crate::error::{Result, UnwarpError};
use crate::modulation::Modulation;
use crate::phase_encoding::PhaseEncodingTable;

/// Unwarping functor over a data series and a field map.
///
/// Holds read-only borrows only, so one instance is shared by all workers.
#[derive(Debug, Clone)]
pub struct FieldUnwarp<'a, F = LinearInterpolator, S = CubicInterpolator> {
    data: &'a VoxelGrid,
    field: VoxelView<'a>,
    pe: &'a PhaseEncodingTable,
    field_sampler: F,
    data_sampler: S,
    modulation: Modulation,
}

impl<'a> FieldUnwarp<'a> {
    /// Trilinear field sampling and cubic data resampling, both with
    /// background 0.
    pub fn new(
        data: &'a VoxelGrid,
        field: VoxelView<'a>,
        pe: &'a PhaseEncodingTable,
        modulation: Modulation,
    ) -> Result<Self> {
        Self::with_samplers(
            data,
            field,
            pe,
            LinearInterpolator::new(),
            CubicInterpolator::new(),
            modulation,
        )
    }
}

impl<'a, F: ScalarGradientSampler, S: ScalarSampler> FieldUnwarp<'a, F, S> {
    /// Build with explicit samplers.
    pub fn with_samplers(
        data: &'a VoxelGrid,
        field: VoxelView<'a>,
        pe: &'a PhaseEncodingTable,
        field_sampler: F,
        data_sampler: S,
        modulation: Modulation,
    ) -> Result<Self> {
        pe.check_volumes(data.frames())?;
        Ok(Self {
            data,
            field,
            pe,
            field_sampler,
            data_sampler,
            modulation,
        })
    }

    pub fn modulation(&self) -> Modulation {
        self.modulation
    }

    /// Unwarped value of data voxel `vox` in volume `v`.
    pub fn unwarp_voxel(&self, v: usize, slice: &SliceTransform, vox: &Point3) -> f64 {
        let field_pos = slice.field_position(vox);
        let (b0, gradient) = self.field_sampler.sample_with_gradient(&self.field, &field_pos);

        let pe = self.pe.direction(v);
        let pos = vox + pe * b0;
        let value = self.data_sampler.sample(&self.data.frame(v), &pos);

        let jac = self.modulation.factor(pe, &slice.rotate_gradient(&gradient));
        jac * value
    }

    /// Fill `out` (one `nx * ny` slice, x fastest) with slice `z` of volume `v`.
    pub fn unwarp_slice(&self, v: usize, z: usize, slice: &SliceTransform, out: &mut [f32]) -> Result<()> {
        let [nx, ny, _] = self.data.dims();
        if out.len() != nx * ny {
            return Err(UnwarpError::ShapeMismatch {
                expected: vec![ny, nx],
                actual: vec![out.len()],
            });
        }

        for (y, row) in out.chunks_exact_mut(nx).enumerate() {
            for (x, value) in row.iter_mut().enumerate() {
                let vox = Point3::new(x as f64, y as f64, z as f64);
                *value = self.unwarp_voxel(v, slice, &vox) as f32;
            }
        }
        Ok(())
    }
}
