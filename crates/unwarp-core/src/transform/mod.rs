//! Transform types.
//!
//! Host-side homogeneous transforms used to chain voxel and scanner frames,
//! and the rigid-motion exponential map.

pub mod affine;
pub mod rigid;

pub use affine::AffineTransform;
pub use rigid::{se3_exp, RigidTransform, TangentVector};
