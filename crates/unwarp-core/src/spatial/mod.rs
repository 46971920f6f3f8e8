//! Spatial types for points, vectors, spacing and direction matrices.
//!
//! All types are plain nalgebra aliases in `f64`. Continuous voxel indices
//! and scanner coordinates share the same point type; which frame a value
//! lives in is carried by the name of the variable holding it.

pub mod direction;

use nalgebra::{Matrix3, Matrix4, Point3 as NaPoint3, Vector3 as NaVector3};

pub type Point3 = NaPoint3<f64>;
pub type Vector3 = NaVector3<f64>;
pub type Spacing3 = NaVector3<f64>;
pub type Direction3 = Matrix3<f64>;
pub type Matrix3d = Matrix3<f64>;
pub type Matrix4d = Matrix4<f64>;

pub use direction::polar_rotation;
