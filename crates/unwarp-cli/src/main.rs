use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use burn_ndarray::NdArray;
use clap::{ArgGroup, Parser, ValueEnum};
use tracing::info;
use unwarp_epi::{
    unwarp_series, LogProgress, MotionTable, PhaseEncodingTable, ProgressTracker, UnwarpConfig,
};
use unwarp_io::{
    load_matrix, load_pe_eddy, load_pe_table, read_nifti, read_nifti_series_with_rank, write_nifti, OutputDataType,
};

mod progress;

use progress::BarProgress;

type Backend = NdArray<f32>;

#[derive(Parser)]
#[command(name = "fieldunwarp")]
#[command(about = "Unwarp an EPI series using a susceptibility field map and optional slice-wise motion")]
#[command(group(ArgGroup::new("pe").required(true).args(["import_pe_table", "import_pe_eddy"])))]
struct Cli {
    /// Distorted input image (3D or 4D NIfTI)
    input: PathBuf,

    /// Susceptibility field map; the first volume of a 4D file is used
    field: PathBuf,

    /// Output image
    output: PathBuf,

    /// Rigid motion parameters, one row per volume or per slice group
    #[arg(long, value_name = "FILE")]
    motion: Option<PathBuf>,

    /// Volume the field map is aligned to (negative for none)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    fidx: i64,

    /// Do not scale intensities by the Jacobian of the displacement
    #[arg(long)]
    nomodulation: bool,

    /// Phase-encoding table with one `x y z readout` row per volume
    #[arg(long, value_name = "FILE")]
    import_pe_table: Option<PathBuf>,

    /// eddy-style acquisition parameters and per-volume index file
    #[arg(long, num_args = 2, value_names = ["CONFIG", "INDICES"])]
    import_pe_eddy: Option<Vec<PathBuf>>,

    /// Output sample type
    #[arg(long, value_enum, default_value_t = DataType::Float32)]
    datatype: DataType,

    /// Worker threads (0 uses all cores)
    #[arg(long, default_value_t = 0)]
    nthreads: usize,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DataType {
    Float32,
    Float64,
}

impl From<DataType> for OutputDataType {
    fn from(value: DataType) -> Self {
        match value {
            DataType::Float32 => OutputDataType::Float32,
            DataType::Float64 => OutputDataType::Float64,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.nthreads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.nthreads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let device = Default::default();
    let (data, rank) = read_nifti_series_with_rank::<Backend, _>(&cli.input, &device)?;
    let field = read_nifti::<Backend, _>(&cli.field, &device)?;
    let volumes = data.volumes();
    info!(
        input = %cli.input.display(),
        shape = ?data.shape(),
        field = %cli.field.display(),
        "loaded images"
    );

    let pe = load_phase_encoding(cli)?;
    let motion = cli
        .motion
        .as_deref()
        .map(|path| load_motion(path, volumes))
        .transpose()?;

    let mut config = UnwarpConfig::new().with_field_index(cli.fidx);
    if cli.nomodulation {
        config = config.without_modulation();
    }

    let mut tracker = ProgressTracker::new();
    if cli.quiet {
        tracker.add_callback(Arc::new(LogProgress::default()));
    } else {
        tracker.add_callback(Arc::new(BarProgress::new()?));
    }

    let output = unwarp_series(&data, &field, &pe, motion.as_ref(), &config, &tracker)
        .context("Unwarping failed")?;

    // The output keeps the rank of the input file.
    if rank == 3 {
        write_nifti(&cli.output, &output.first_volume(), cli.datatype.into())?;
    } else {
        write_nifti(&cli.output, &output, cli.datatype.into())?;
    }
    info!(output = %cli.output.display(), "wrote unwarped image");
    Ok(())
}

fn load_phase_encoding(cli: &Cli) -> Result<PhaseEncodingTable> {
    let table = match (&cli.import_pe_table, &cli.import_pe_eddy) {
        (Some(path), _) => load_pe_table(path)?,
        (None, Some(pair)) if pair.len() == 2 => load_pe_eddy(&pair[0], &pair[1])?,
        _ => anyhow::bail!("a phase-encoding table is required (--import-pe-table or --import-pe-eddy)"),
    };
    PhaseEncodingTable::import(&table).context("Invalid phase-encoding table")
}

fn load_motion(path: &Path, volumes: usize) -> Result<MotionTable> {
    let matrix = load_matrix(path)?;
    let table = MotionTable::new(&matrix, volumes)
        .with_context(|| format!("Invalid motion table {}", path.display()))?;
    info!(
        path = %path.display(),
        slice_groups = table.groups(),
        "loaded motion parameters"
    );
    Ok(table)
}
