//! Plain-text numeric matrices.
//!
//! One row per line, values separated by whitespace or commas. Everything
//! after `#` on a line is ignored, as are blank lines.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use nalgebra::DMatrix;

/// Load a numeric matrix from a text file.
pub fn load_matrix<P: AsRef<Path>>(path: P) -> Result<DMatrix<f64>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read matrix file {}", path.display()))?;
    parse_matrix(&text).with_context(|| format!("Invalid matrix file {}", path.display()))
}

/// Parse a numeric matrix. All rows must have the same number of columns.
pub fn parse_matrix(text: &str) -> Result<DMatrix<f64>> {
    let mut values = Vec::new();
    let mut rows = 0usize;
    let mut cols = 0usize;

    for (lineno, fields) in data_lines(text) {
        let row = fields
            .iter()
            .map(|token| {
                token
                    .parse::<f64>()
                    .with_context(|| format!("line {}: invalid number '{}'", lineno, token))
            })
            .collect::<Result<Vec<_>>>()?;

        if rows == 0 {
            cols = row.len();
        } else if row.len() != cols {
            bail!("line {}: expected {} columns, found {}", lineno, cols, row.len());
        }
        values.extend(row);
        rows += 1;
    }

    if rows == 0 {
        bail!("no numeric rows found");
    }
    Ok(DMatrix::from_row_slice(rows, cols, &values))
}

/// Load a list of non-negative integers, e.g. an eddy index file.
pub fn load_indices<P: AsRef<Path>>(path: P) -> Result<Vec<usize>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read index file {}", path.display()))?;
    parse_indices(&text).with_context(|| format!("Invalid index file {}", path.display()))
}

/// Parse integers in reading order regardless of line layout.
pub fn parse_indices(text: &str) -> Result<Vec<usize>> {
    let mut indices = Vec::new();
    for (lineno, fields) in data_lines(text) {
        for token in fields {
            let index = token
                .parse::<usize>()
                .with_context(|| format!("line {}: invalid index '{}'", lineno, token))?;
            indices.push(index);
        }
    }
    if indices.is_empty() {
        bail!("no indices found");
    }
    Ok(indices)
}

fn data_lines(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines().enumerate().filter_map(|(i, line)| {
        let content = line.split('#').next().unwrap_or("");
        let fields: Vec<&str> = content
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .collect();
        (!fields.is_empty()).then_some((i + 1, fields))
    })
}
