//! Susceptibility-field unwarping of EPI volume series.
//!
//! Each output voxel is resampled from the distorted data at the position
//! displaced by the field along the phase-encoding direction of its volume,
//! with optional slice-wise rigid motion and Jacobian intensity modulation.
//!
//! # Modules
//! - `motion`: per-volume / per-slice-group rigid motion
//! - `phase_encoding`: scaled phase-encoding directions
//! - `composer`: data-voxel to field-voxel transform per slice
//! - `unwarp`: per-voxel resampling and modulation
//! - `scheduler`: parallel (volume, slice) driver
//! - `pipeline`: the full run

pub mod composer;
pub mod config;
pub mod error;
pub mod modulation;
pub mod motion;
pub mod phase_encoding;
pub mod pipeline;
pub mod progress;
pub mod scheduler;
pub mod unwarp;

pub use composer::{SliceTransform, TransformComposer};
pub use config::UnwarpConfig;
pub use error::{Result, UnwarpError};
pub use modulation::Modulation;
pub use motion::MotionTable;
pub use phase_encoding::{apply_eddy_axis_convention, PhaseEncodingTable};
pub use pipeline::unwarp_series;
pub use progress::{HistoryCallback, LogProgress, ProgressCallback, ProgressInfo, ProgressTracker};
pub use scheduler::SliceVolumeScheduler;
pub use unwarp::FieldUnwarp;
