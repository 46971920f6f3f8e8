//! Image types and host voxel buffers.

pub mod image;
pub mod metadata;
pub mod voxels;

pub use image::Image;
pub use metadata::ImageMetadata;
pub use voxels::{VoxelGrid, VoxelView};
