/// wrangle: split a raw Dataviewer sample report by participant, downsample
/// each participant file, and concatenate the results into one table.
///
/// Output layout:
///   <pids-dir>/<ParticipantID>.csv            full-rate, classified
///   <out-dir>/<N>HZ_PIDS/<ParticipantID>.csv  downsampled
///   <out-dir>/Gaze_<N>hz.csv                  CONCAT_COLUMNS of all participants
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use gazeprep::{
    wrangle::{concat_dir, downsample_dir, split_by_participant, CONCAT_COLUMNS},
    PipelineConfig,
};

#[derive(Parser, Debug)]
#[command(name = "wrangle", about = "Split, downsample and concatenate a gaze sample report")]
struct Args {
    /// Tab-separated sample report covering all participants.
    #[arg(long)]
    input: PathBuf,

    /// Folder for full-rate per-participant files.
    #[arg(long)]
    pids_dir: PathBuf,

    /// Folder for downsampled files and the concatenated table.
    #[arg(long)]
    out_dir: PathBuf,

    /// JSON pipeline configuration (missing keys use defaults).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the downsampling target rate (Hz).
    #[arg(long)]
    downsample_hz: Option<f64>,

    /// Skip the split stage and reuse an existing --pids-dir.
    #[arg(long)]
    skip_split: bool,

    /// Debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut cfg = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(hz) = args.downsample_hz {
        cfg.downsample_hz = hz;
    }
    let hz = cfg.downsample_hz;

    // ── 1. Split ───────────────────────────────────────────────────────────
    if !args.skip_split {
        let n = split_by_participant(&args.input, &args.pids_dir, &cfg)?;
        tracing::info!(rows = n, dir = %args.pids_dir.display(), "participant files written");
    }

    // ── 2. Downsample ──────────────────────────────────────────────────────
    let ds_dir = args.out_dir.join(format!("{hz}HZ_PIDS"));
    downsample_dir(&args.pids_dir, &ds_dir, cfg.stride())?;

    // ── 3. Concatenate ─────────────────────────────────────────────────────
    let out_file = args.out_dir.join(format!("Gaze_{hz}hz.csv"));
    let n_files = concat_dir(&ds_dir, &out_file, CONCAT_COLUMNS)?;
    if n_files > 0 {
        tracing::info!(file = %out_file.display(), n_files, "concatenated table written");
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}
