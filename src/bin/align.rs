/// align: load one subject's gaze tables and events, tag every fixation,
/// saccade, blink and sample with the page event that covers it, and write the
/// tagged tables.
///
/// Output files (in --output-dir):
///   <subject>_fixation_tagged.csv
///   <subject>_saccade_tagged.csv
///   <subject>_blink_tagged.csv
///   <subject>_sample_tagged.csv
use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use gazeprep::{
    events::{load_events, load_sham, to_align_events},
    gaze::load_gaze_files,
    io::write_gaze_rows,
    tag_gaze_tables, PipelineConfig, TrialType,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Pages {
    Reading,
    Sham,
}

#[derive(Parser, Debug)]
#[command(name = "align", about = "Tag gaze tables with experiment page events")]
struct Args {
    /// Folder with *_Fixation.csv, *_Saccade.csv, *_Blink.csv, *_Sample.csv
    /// and <subject>_events.csv.
    #[arg(long)]
    data_dir: PathBuf,

    /// Subject identifier (events file prefix).
    #[arg(long)]
    subject: String,

    /// Folder for the tagged tables.
    #[arg(long)]
    output_dir: PathBuf,

    /// Which pages to align.
    #[arg(long, value_enum, default_value_t = Pages::Reading)]
    trial_type: Pages,

    /// JSON pipeline configuration (missing keys use defaults).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let cfg = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    // ── 1. Events ──────────────────────────────────────────────────────────
    let rows = match args.trial_type {
        Pages::Reading => load_events(&args.data_dir, &args.subject, TrialType::Reading)?,
        Pages::Sham => load_sham(&args.data_dir, &args.subject)?,
    };
    let events = to_align_events(&rows);
    if events.is_empty() {
        bail!("no alignable events for subject {}", args.subject);
    }

    // ── 2. Gaze tables ─────────────────────────────────────────────────────
    let tables = load_gaze_files(&args.data_dir, &cfg).into_tables()?;

    // ── 3. Align ───────────────────────────────────────────────────────────
    let tagged = tag_gaze_tables(tables, &events);

    // ── 4. Write ───────────────────────────────────────────────────────────
    std::fs::create_dir_all(&args.output_dir)?;
    let out = |family: &str| args.output_dir.join(format!("{}_{family}_tagged.csv", args.subject));
    write_gaze_rows(&out("fixation"), &tagged.fixations)?;
    write_gaze_rows(&out("saccade"), &tagged.saccades)?;
    write_gaze_rows(&out("blink"), &tagged.blinks)?;
    write_gaze_rows(&out("sample"), &tagged.samples)?;

    tracing::info!(
        subject = args.subject.as_str(),
        fixations = tagged.fixations.len(),
        saccades = tagged.saccades.len(),
        blinks = tagged.blinks.len(),
        samples = tagged.samples.len(),
        "tagged tables written"
    );
    Ok(())
}
