//! Phase-encoding table import.
//!
//! Both loaders return the raw `N × 4` table (`x y z readout_time`) exactly
//! as stored on disk; axis conventions are applied by the consumer.

use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use nalgebra::DMatrix;
use tracing::debug;

use crate::matrix::{load_indices, load_matrix};

const PE_COLUMNS: usize = 4;

/// Load a per-volume phase-encoding table.
pub fn load_pe_table<P: AsRef<Path>>(path: P) -> Result<DMatrix<f64>> {
    let path = path.as_ref();
    let table = load_matrix(path)?;
    ensure!(
        table.ncols() == PE_COLUMNS,
        "phase-encoding table {} must have {} columns, found {}",
        path.display(),
        PE_COLUMNS,
        table.ncols()
    );
    debug!(path = %path.display(), rows = table.nrows(), "loaded phase-encoding table");
    Ok(table)
}

/// Load an eddy-style configuration and index pair, expanded to one row per
/// volume.
///
/// Indices are 1-based rows of the configuration file.
pub fn load_pe_eddy<P: AsRef<Path>, Q: AsRef<Path>>(config: P, indices: Q) -> Result<DMatrix<f64>> {
    let config_path = config.as_ref();
    let config = load_pe_table(config_path)?;
    let indices = load_indices(indices.as_ref())?;
    expand_eddy(&config, &indices)
        .with_context(|| format!("Invalid eddy index for configuration {}", config_path.display()))
}

fn expand_eddy(config: &DMatrix<f64>, indices: &[usize]) -> Result<DMatrix<f64>> {
    let mut table = DMatrix::zeros(indices.len(), config.ncols());
    for (volume, &index) in indices.iter().enumerate() {
        if index == 0 || index > config.nrows() {
            bail!(
                "volume {} refers to configuration row {}, valid range is 1..={}",
                volume,
                index,
                config.nrows()
            );
        }
        table.set_row(volume, &config.row(index - 1));
    }
    Ok(table)
}
