//! NIfTI-1 reading and writing for single volumes and volume series.
//!
//! Voxels are read by explicit `(x, y, z, v)` position so the on-disk
//! memory order never leaks into the tensor layout.

use std::fmt;
use std::path::Path;

use anyhow::{bail, Context, Result};
use burn::tensor::backend::Backend;
use nalgebra::Matrix4;
use ndarray::{ArrayD, IxDyn, ShapeBuilder};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use tracing::{debug, warn};
use unwarp_core::{Image, ImageMetadata, VoxelGrid};

/// Sample type used when writing an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputDataType {
    #[default]
    Float32,
    Float64,
}

impl OutputDataType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }
}

impl fmt::Display for OutputDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read a NIfTI file as a single volume.
///
/// A 4D file yields its first volume and logs a warning.
pub fn read_nifti<B: Backend, P: AsRef<Path>>(path: P, device: &B::Device) -> Result<Image<B, 3>> {
    let path = path.as_ref();
    let (grid, metadata, _) = load_voxels(path)?;
    if grid.frames() > 1 {
        warn!(
            path = %path.display(),
            volumes = grid.frames(),
            "expected a single volume, using the first"
        );
        let first = VoxelGrid::new(grid.dims(), 1, grid.frame(0).as_slice().to_vec())?;
        return Ok(Image::from_voxel_grid(&first, metadata, device)?);
    }
    Ok(Image::from_voxel_grid(&grid, metadata, device)?)
}

/// Read a NIfTI file as a volume series `[V, Z, Y, X]`.
///
/// A 3D file becomes a series of one volume.
pub fn read_nifti_series<B: Backend, P: AsRef<Path>>(path: P, device: &B::Device) -> Result<Image<B, 4>> {
    read_nifti_series_with_rank(path, device).map(|(image, _)| image)
}

/// Like [`read_nifti_series`], also returning the number of dimensions
/// stored in the file, so a 4D file with one volume can be told apart from
/// a 3D file.
pub fn read_nifti_series_with_rank<B: Backend, P: AsRef<Path>>(
    path: P,
    device: &B::Device,
) -> Result<(Image<B, 4>, usize)> {
    let (grid, metadata, rank) = load_voxels(path.as_ref())?;
    Ok((Image::from_voxel_grid(&grid, metadata, device)?, rank))
}

/// Write an image (single volume or series) with sform geometry.
pub fn write_nifti<B: Backend, P: AsRef<Path>, const D: usize>(
    path: P,
    image: &Image<B, D>,
    datatype: OutputDataType,
) -> Result<()> {
    let path = path.as_ref();
    let grid = image.to_voxel_grid().context("Failed to fetch image data")?;
    let [nx, ny, nz] = grid.dims();
    let frames = grid.frames();

    let shape: Vec<usize> = if D == 3 { vec![nx, ny, nz] } else { vec![nx, ny, nz, frames] };
    // Host voxels are x-fastest, which is Fortran order over (x, y, z, v).
    let array = ArrayD::from_shape_vec(IxDyn(&shape).f(), grid.into_vec())
        .context("Failed to arrange voxels for writing")?;
    let header = geometry_header(image.metadata());

    let writer = WriterOptions::new(path).reference_header(&header);
    let written = match datatype {
        OutputDataType::Float32 => writer.write_nifti(&array),
        OutputDataType::Float64 => writer.write_nifti(&array.mapv(f64::from)),
    };
    written.with_context(|| format!("Failed to write NIfTI file {}", path.display()))?;

    debug!(path = %path.display(), ?shape, %datatype, "wrote image");
    Ok(())
}

fn load_voxels(path: &Path) -> Result<(VoxelGrid, ImageMetadata, usize)> {
    let obj = ReaderOptions::new()
        .read_file(path)
        .with_context(|| format!("Failed to read NIfTI file {}", path.display()))?;
    let metadata = ImageMetadata::from_affine(&header_affine(obj.header()));

    let volume = obj
        .into_volume()
        .into_ndarray::<f32>()
        .context("Failed to convert volume to ndarray")?;
    let shape = volume.shape().to_vec();
    if shape.len() < 3 {
        bail!("Expected at least 3 dimensions in {}, found {}", path.display(), shape.len());
    }
    let dims = [shape[0], shape[1], shape[2]];
    let frames: usize = shape[3..].iter().product();

    // Reversing the axes makes logical iteration x-fastest whatever the memory order.
    let data: Vec<f32> = volume.t().iter().copied().collect();
    let grid = VoxelGrid::new(dims, frames, data)?;

    debug!(path = %path.display(), ?dims, frames, "read image");
    Ok((grid, metadata, shape.len()))
}

/// Voxel-to-scanner matrix from sform, qform or pixdim, in that order.
fn header_affine(header: &NiftiHeader) -> Matrix4<f64> {
    let rows: [[f32; 4]; 3] = if header.sform_code > 0 {
        [header.srow_x, header.srow_y, header.srow_z]
    } else if header.qform_code > 0 {
        let b = header.quatern_b;
        let c = header.quatern_c;
        let d = header.quatern_d;
        let a = (1.0 - (b * b + c * c + d * d).min(1.0)).sqrt();

        let qfac = if header.pixdim[0] < 0.0 { -1.0 } else { 1.0 };
        let dx = header.pixdim[1];
        let dy = header.pixdim[2];
        let dz = header.pixdim[3] * qfac;

        [
            [
                (a * a + b * b - c * c - d * d) * dx,
                (2.0 * b * c - 2.0 * a * d) * dy,
                (2.0 * b * d + 2.0 * a * c) * dz,
                header.quatern_x,
            ],
            [
                (2.0 * b * c + 2.0 * a * d) * dx,
                (a * a + c * c - b * b - d * d) * dy,
                (2.0 * c * d - 2.0 * a * b) * dz,
                header.quatern_y,
            ],
            [
                (2.0 * b * d - 2.0 * a * c) * dx,
                (2.0 * c * d + 2.0 * a * b) * dy,
                (a * a + d * d - c * c - b * b) * dz,
                header.quatern_z,
            ],
        ]
    } else {
        [
            [header.pixdim[1], 0.0, 0.0, 0.0],
            [0.0, header.pixdim[2], 0.0, 0.0],
            [0.0, 0.0, header.pixdim[3], 0.0],
        ]
    };

    let mut affine = Matrix4::identity();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            affine[(r, c)] = f64::from(*value);
        }
    }
    affine
}

fn geometry_header(metadata: &ImageMetadata) -> NiftiHeader {
    let affine = metadata.voxel_to_scanner();
    let m = affine.matrix();
    let row = |r: usize| [m[(r, 0)] as f32, m[(r, 1)] as f32, m[(r, 2)] as f32, m[(r, 3)] as f32];
    let spacing = metadata.spacing();

    NiftiHeader {
        pixdim: [
            1.0,
            spacing[0] as f32,
            spacing[1] as f32,
            spacing[2] as f32,
            1.0,
            1.0,
            1.0,
            1.0,
        ],
        sform_code: 1,
        qform_code: 0,
        srow_x: row(0),
        srow_y: row(1),
        srow_z: row(2),
        ..NiftiHeader::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;
    use ndarray::Array3;
    use tempfile::tempdir;
    use unwarp_core::spatial::{Direction3, Point3, Spacing3};

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_read_nifti_indexes_by_position() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("test.nii");

        let array = Array3::from_shape_fn((3, 4, 5), |(x, y, z)| (x + 10 * y + 100 * z) as f32);
        WriterOptions::new(&file_path).write_nifti(&array)?;

        let device = Default::default();
        let image = read_nifti::<TestBackend, _>(&file_path, &device)?;
        assert_eq!(image.shape(), [5, 4, 3]);

        let grid = image.to_voxel_grid()?;
        let view = grid.frame(0);
        assert_eq!(view.get(0, 0, 0), 0.0);
        assert_eq!(view.get(2, 1, 0), 12.0);
        assert_eq!(view.get(1, 3, 4), 431.0);
        Ok(())
    }

    #[test]
    fn test_series_roundtrip_keeps_geometry() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("series.nii");
        let device = Default::default();

        let data: Vec<f32> = (0..2 * 3 * 4 * 2).map(|i| i as f32 * 0.5).collect();
        let grid = VoxelGrid::new([2, 3, 4], 2, data.clone())?;
        let metadata = ImageMetadata::new(
            Point3::new(-10.0, 5.0, 2.5),
            Spacing3::new(1.5, 2.0, 3.0),
            Direction3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0),
        );
        let image = Image::<TestBackend, 4>::from_voxel_grid(&grid, metadata, &device)?;
        write_nifti(&file_path, &image, OutputDataType::Float64)?;

        let back = read_nifti_series::<TestBackend, _>(&file_path, &device)?;
        assert_eq!(back.shape(), [2, 4, 3, 2]);
        assert!(back
            .voxel_to_scanner()
            .approx_eq(&image.voxel_to_scanner(), 1e-5));
        assert_eq!(back.to_voxel_grid()?.as_slice(), data.as_slice());
        Ok(())
    }

    #[test]
    fn test_read_nifti_takes_first_volume() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("field.nii");
        let device = Default::default();

        let mut data = vec![1.0f32; 8];
        data.extend(vec![7.0f32; 8]);
        let grid = VoxelGrid::new([2, 2, 2], 2, data)?;
        let image = Image::<TestBackend, 4>::from_voxel_grid(&grid, ImageMetadata::default(), &device)?;
        write_nifti(&file_path, &image, OutputDataType::Float32)?;

        let volume = read_nifti::<TestBackend, _>(&file_path, &device)?;
        assert_eq!(volume.shape(), [2, 2, 2]);
        assert!(volume.to_voxel_grid()?.as_slice().iter().all(|&v| v == 1.0));
        Ok(())
    }

    #[test]
    fn test_read_missing_file_reports_path() {
        let device = Default::default();
        let err = read_nifti::<TestBackend, _>("/nonexistent/input.nii", &device).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/input.nii"));
    }

    #[test]
    fn test_series_rank_follows_file() -> Result<()> {
        let dir = tempdir()?;
        let device = Default::default();
        let grid = VoxelGrid::new([2, 2, 2], 1, vec![1.0; 8])?;
        let series = Image::<TestBackend, 4>::from_voxel_grid(&grid, ImageMetadata::default(), &device)?;

        let as_4d = dir.path().join("one_volume.nii");
        write_nifti(&as_4d, &series, OutputDataType::Float32)?;
        let (image, rank) = read_nifti_series_with_rank::<TestBackend, _>(&as_4d, &device)?;
        assert_eq!(rank, 4);
        assert_eq!(image.volumes(), 1);

        let as_3d = dir.path().join("volume.nii");
        write_nifti(&as_3d, &series.first_volume(), OutputDataType::Float32)?;
        let (image, rank) = read_nifti_series_with_rank::<TestBackend, _>(&as_3d, &device)?;
        assert_eq!(rank, 3);
        assert_eq!(image.shape(), [1, 2, 2, 2]);
        Ok(())
    }
}
