//! Host-side voxel buffers.
//!
//! Samplers run in tight per-voxel loops across worker threads, so they read
//! from plain `f32` slices rather than backend tensors. Layout is `x` fastest,
//! then `y`, `z` and frame, matching the `[V, Z, Y, X]` tensor layout.

use crate::error::{CoreError, Result};

/// Owned voxel data with one or more 3D frames.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    dims: [usize; 3],
    frames: usize,
    data: Vec<f32>,
}

impl VoxelGrid {
    /// Wrap `data` laid out as `frames` consecutive `dims` volumes.
    pub fn new(dims: [usize; 3], frames: usize, data: Vec<f32>) -> Result<Self> {
        let expected = dims.iter().product::<usize>() * frames;
        if data.len() != expected {
            return Err(CoreError::ShapeMismatch {
                expected: vec![dims[0], dims[1], dims[2], frames],
                actual: vec![data.len()],
            });
        }
        Ok(Self { dims, frames, data })
    }

    /// All-zero grid.
    pub fn zeros(dims: [usize; 3], frames: usize) -> Self {
        Self {
            dims,
            frames,
            data: vec![0.0; dims.iter().product::<usize>() * frames],
        }
    }

    /// Spatial dimensions `(nx, ny, nz)`.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Number of 3D frames.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Voxels per frame.
    pub fn frame_len(&self) -> usize {
        self.dims.iter().product()
    }

    /// Voxels per `z` slice.
    pub fn slice_len(&self) -> usize {
        self.dims[0] * self.dims[1]
    }

    /// Borrow frame `v`.
    ///
    /// # Panics
    /// If `v >= self.frames()`.
    pub fn frame(&self, v: usize) -> VoxelView<'_> {
        let len = self.frame_len();
        VoxelView {
            dims: self.dims,
            data: &self.data[v * len..(v + 1) * len],
        }
    }

    /// Raw data.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable raw data.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume into the raw data.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

/// Borrowed single 3D frame.
#[derive(Debug, Clone, Copy)]
pub struct VoxelView<'a> {
    dims: [usize; 3],
    data: &'a [f32],
}

impl<'a> VoxelView<'a> {
    /// Borrow `data` as a `dims` volume.
    pub fn new(dims: [usize; 3], data: &'a [f32]) -> Result<Self> {
        let expected = dims.iter().product::<usize>();
        if data.len() != expected {
            return Err(CoreError::ShapeMismatch {
                expected: dims.to_vec(),
                actual: vec![data.len()],
            });
        }
        Ok(Self { dims, data })
    }

    /// Spatial dimensions `(nx, ny, nz)`.
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Linear offset of voxel `(x, y, z)`.
    #[inline]
    pub fn offset(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.dims[0] * (y + self.dims[1] * z)
    }

    /// Value at an in-range voxel.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> f32 {
        self.data[self.offset(x, y, z)]
    }

    /// Raw data.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }
}
