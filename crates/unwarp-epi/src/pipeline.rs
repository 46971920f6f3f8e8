//! End-to-end unwarping of a volume series.

use std::time::Instant;

use burn::tensor::backend::Backend;
use tracing::info;
use unwarp_core::{CubicInterpolator, Image, LinearInterpolator, VoxelGrid};

use crate::composer::TransformComposer;
use crate::config::UnwarpConfig;
use crate::error::{Result, UnwarpError};
use crate::motion::MotionTable;
use crate::phase_encoding::PhaseEncodingTable;
use crate::progress::ProgressTracker;
use crate::scheduler::SliceVolumeScheduler;
use crate::unwarp::FieldUnwarp;

/// Unwarp every slice of `data` using the field map `field`.
///
/// Without `motion` every volume is taken to be static. All configuration
/// checks run before any voxel is resampled. The output has the shape and
/// geometry of `data`.
pub fn unwarp_series<B: Backend>(
    data: &Image<B, 4>,
    field: &Image<B, 3>,
    pe: &PhaseEncodingTable,
    motion: Option<&MotionTable>,
    config: &UnwarpConfig,
    progress: &ProgressTracker,
) -> Result<Image<B, 4>> {
    let volumes = data.volumes();
    pe.check_volumes(volumes)?;

    let motion = motion.cloned().unwrap_or_else(|| MotionTable::zeros(volumes));
    if motion.volumes() != volumes {
        return Err(UnwarpError::dimension_mismatch(format!(
            "motion table describes {} volumes but the image has {}",
            motion.volumes(),
            volumes
        )));
    }

    info!(
        volumes,
        slice_groups = motion.groups(),
        modulation = ?config.modulation,
        alignment = ?config.alignment,
        "unwarping series"
    );
    let composer = TransformComposer::new(data.metadata(), field.metadata(), motion, config.alignment)?;

    let started = Instant::now();
    let data_grid = data.to_voxel_grid()?;
    let field_grid = field.to_voxel_grid()?;
    let unwarp = FieldUnwarp::with_samplers(
        &data_grid,
        field_grid.frame(0),
        pe,
        LinearInterpolator::new(),
        CubicInterpolator::new().with_background(config.background),
        config.modulation,
    )?;

    let dims = data_grid.dims();
    let mut output = VoxelGrid::zeros(dims, volumes);
    let scheduler = SliceVolumeScheduler::new(dims, volumes);
    scheduler.run(output.as_mut_slice(), progress, |v, z, slice| {
        let transform = composer.slice_transform(v, z)?;
        unwarp.unwarp_slice(v, z, &transform, slice)
    })?;
    info!(elapsed = ?started.elapsed(), "unwarping finished");

    let device = data.data().device();
    Ok(Image::from_voxel_grid(&output, *data.metadata(), &device)?)
}
