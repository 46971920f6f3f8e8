//! Image type with scanner geometry.
//!
//! An `Image` pairs backend tensor data with the spatial metadata that maps
//! voxel indices to scanner coordinates. Rank-3 images are stored `[Z, Y, X]`
//! and rank-4 series `[V, Z, Y, X]`; geometry is always 3D.

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};

use super::metadata::ImageMetadata;
use super::voxels::VoxelGrid;
use crate::error::{CoreError, Result};
use crate::spatial::{Direction3, Point3, Spacing3};
use crate::transform::AffineTransform;

/// Medical image with scanner geometry.
///
/// # Type Parameters
/// * `B` - The backend holding the voxel data
/// * `D` - Tensor rank, 3 for a single volume or 4 for a volume series
///
/// # Coordinate Systems
/// * **Voxel space**: continuous indices `(x, y, z)`
/// * **Scanner space**: physical coordinates in mm
///
/// # Examples
/// ```rust
/// use unwarp_core::Image;
/// use unwarp_core::spatial::{Point3, Spacing3, Direction3};
/// use burn::tensor::Tensor;
/// use burn_ndarray::NdArray;
///
/// type Backend = NdArray<f32>;
///
/// let device = Default::default();
/// let data = Tensor::<Backend, 4>::zeros([6, 10, 12, 14], &device);
/// let image = Image::new(data, Point3::origin(), Spacing3::repeat(2.0), Direction3::identity());
/// assert_eq!(image.spatial_shape(), [14, 12, 10]);
/// assert_eq!(image.volumes(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct Image<B: Backend, const D: usize> {
    /// Voxel data, `[.., Z, Y, X]`.
    data: Tensor<B, D>,
    /// Voxel ↔ scanner geometry.
    metadata: ImageMetadata,
}

impl<B: Backend, const D: usize> Image<B, D> {
    /// Create a new image with the given data and geometry.
    pub fn new(data: Tensor<B, D>, origin: Point3, spacing: Spacing3, direction: Direction3) -> Self {
        Self::from_metadata(data, ImageMetadata::new(origin, spacing, direction))
    }

    /// Create a new image from data and a metadata bundle.
    ///
    /// # Panics
    /// If `D < 3`.
    pub fn from_metadata(data: Tensor<B, D>, metadata: ImageMetadata) -> Self {
        assert!(D >= 3, "images need at least three spatial axes");
        Self { data, metadata }
    }

    /// Rebuild an image from host voxels on `device`.
    ///
    /// A rank-3 image requires a single-frame grid; ranks above 4 are rejected.
    pub fn from_voxel_grid(grid: &VoxelGrid, metadata: ImageMetadata, device: &B::Device) -> Result<Self> {
        let [nx, ny, nz] = grid.dims();
        let mut shape = [1usize; D];
        shape[D - 1] = nx;
        shape[D - 2] = ny;
        shape[D - 3] = nz;
        match D {
            3 if grid.frames() == 1 => {}
            4 => shape[0] = grid.frames(),
            _ => {
                return Err(CoreError::ShapeMismatch {
                    expected: vec![1],
                    actual: vec![grid.frames()],
                })
            }
        }

        let data = TensorData::new(grid.as_slice().to_vec(), shape);
        Ok(Self::from_metadata(Tensor::<B, D>::from_data(data, device), metadata))
    }

    /// Get the image data tensor.
    pub fn data(&self) -> &Tensor<B, D> {
        &self.data
    }

    /// Get the geometry.
    pub fn metadata(&self) -> &ImageMetadata {
        &self.metadata
    }

    /// Get the origin (scanner coordinate of voxel 0).
    pub fn origin(&self) -> &Point3 {
        self.metadata.origin()
    }

    /// Get the spacing.
    pub fn spacing(&self) -> &Spacing3 {
        self.metadata.spacing()
    }

    /// Get the direction cosines.
    pub fn direction(&self) -> &Direction3 {
        self.metadata.direction()
    }

    /// Tensor shape.
    pub fn shape(&self) -> [usize; D] {
        self.data.dims()
    }

    /// Spatial dimensions `(nx, ny, nz)`.
    pub fn spatial_shape(&self) -> [usize; 3] {
        let shape = self.shape();
        [shape[D - 1], shape[D - 2], shape[D - 3]]
    }

    /// Number of 3D volumes (product of the leading axes).
    pub fn volumes(&self) -> usize {
        self.shape()[..D - 3].iter().product()
    }

    /// Voxel index → scanner coordinate.
    pub fn voxel_to_scanner(&self) -> AffineTransform {
        self.metadata.voxel_to_scanner()
    }

    /// Scanner coordinate → voxel index.
    pub fn scanner_to_voxel(&self) -> Result<AffineTransform> {
        self.metadata.scanner_to_voxel()
    }

    /// Convert a scanner point to a continuous voxel index.
    ///
    /// `index = (Direction^-1 * (point - origin)) / spacing`
    pub fn transform_physical_point_to_continuous_index(&self, point: &Point3) -> Result<Point3> {
        Ok(self.scanner_to_voxel()?.transform_point(point))
    }

    /// Convert a continuous voxel index to a scanner point.
    ///
    /// `point = origin + Direction * (index * spacing)`
    pub fn transform_continuous_index_to_physical_point(&self, index: &Point3) -> Point3 {
        self.voxel_to_scanner().transform_point(index)
    }

    /// Copy the voxels to the host, one frame per volume.
    pub fn to_voxel_grid(&self) -> Result<VoxelGrid> {
        let values = self
            .data
            .to_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| CoreError::tensor_data(format!("{:?}", e)))?;
        VoxelGrid::new(self.spatial_shape(), self.volumes(), values)
    }

    /// First volume as a rank-3 image with the same geometry.
    pub fn first_volume(&self) -> Image<B, 3> {
        let [nx, ny, nz] = self.spatial_shape();
        let data = if self.volumes() == 1 {
            self.data.clone().reshape([nz, ny, nx])
        } else {
            let frames = self.data.clone().reshape([self.volumes(), nz, ny, nx]);
            frames.slice([0..1]).reshape([nz, ny, nx])
        };
        Image::from_metadata(data, self.metadata)
    }
}
