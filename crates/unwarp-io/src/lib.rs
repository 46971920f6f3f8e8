pub mod matrix;
pub mod nifti_io;
pub mod phase_encoding;

pub use matrix::{load_indices, load_matrix, parse_indices, parse_matrix};
pub use nifti_io::{read_nifti, read_nifti_series, read_nifti_series_with_rank, write_nifti, OutputDataType};
pub use phase_encoding::{load_pe_eddy, load_pe_table};
