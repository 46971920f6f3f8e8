//! Core geometry and sampling for EPI susceptibility unwarping.
//!
//! # Modules
//! - `image`: tensor-backed images with scanner geometry, host voxel grids
//! - `spatial`: nalgebra aliases and direction helpers
//! - `transform`: homogeneous affine transforms and the SE(3) exponential map
//! - `interpolation`: trilinear value+gradient and cubic samplers

pub mod error;
pub mod image;
pub mod interpolation;
pub mod spatial;
pub mod transform;

pub use error::{CoreError, Result};
pub use image::{Image, ImageMetadata, VoxelGrid, VoxelView};
pub use interpolation::{CubicInterpolator, LinearInterpolator, ScalarGradientSampler, ScalarSampler};
pub use spatial::{Direction3, Point3, Spacing3, Vector3};
pub use transform::{se3_exp, AffineTransform, RigidTransform, TangentVector};
