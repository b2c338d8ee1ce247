//! Raw sample-report wrangling.
//!
//! ```text
//! SampleReport.txt (TSV, all participants, 1000 Hz)
//!   │
//!   ├─ split_by_participant()   chunked read → classify → <pid>.csv (append)
//!   ├─ downsample_dir()         every `stride`-th row per (participant, identifier)
//!   └─ concat_dir()             CONCAT_COLUMNS of every file → one table
//! ```
//!
//! All three stages stream or hold one file at a time; only the split stage
//! touches the full report, and it does so `chunk_rows` records at a time.
use anyhow::{Context, Result};
use csv::StringRecord;
use std::collections::BTreeMap;
use std::path::Path;

use crate::classify::{classify_records, column_index};
use crate::config::PipelineConfig;
use crate::io::{append_records, files_with_suffix, stream_reader, Table};

/// Columns kept in the concatenated analysis table.
pub const CONCAT_COLUMNS: &[&str] = &[
    "RECORDING_SESSION_LABEL",
    "identifier",
    "ParticipantID",
    "Text",
    "PageNum",
    "TrialType",
    "TRIAL_INDEX",
    "AVERAGE_GAZE_X",
    "AVERAGE_GAZE_Y",
    "TIMESTAMP",
    "TRIAL_START_TIME",
    "AVERAGE_VELOCITY_X",
    "AVERAGE_VELOCITY_Y",
    "AVERAGE_ACCELERATION_X",
    "AVERAGE_ACCELERATION_Y",
];

// ── Split ─────────────────────────────────────────────────────────────────────

/// Split a tab-separated report into `<out_dir>/<ParticipantID>.csv`.
///
/// Each chunk of `cfg.chunk_rows` records is classified (derived columns
/// appended) and appended to the participant files.  A participant file that
/// already exists is appended to without a new header.  Returns the number of
/// records written.
pub fn split_by_participant(input: &Path, out_dir: &Path, cfg: &PipelineConfig) -> Result<usize> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let mut rdr = stream_reader(input, b'\t')?;
    let headers = rdr.headers()?.clone();
    let mut records = rdr.records();
    let chunk_rows = cfg.chunk_rows.max(1);

    let mut total = 0;
    let mut n_chunks = 0;
    loop {
        let mut chunk = Vec::with_capacity(chunk_rows.min(1 << 16));
        for rec in records.by_ref().take(chunk_rows) {
            chunk.push(rec.with_context(|| format!("reading {}", input.display()))?);
        }
        if chunk.is_empty() {
            break;
        }
        total += write_chunk(&headers, chunk, out_dir, &cfg.sham_sentinel)?;
        n_chunks += 1;
        tracing::debug!(chunk = n_chunks, rows_so_far = total, "split: chunk written");
    }

    tracing::info!(input = %input.display(), n_chunks, n_rows = total, "split: done");
    Ok(total)
}

fn write_chunk(
    headers: &StringRecord,
    mut chunk: Vec<StringRecord>,
    out_dir: &Path,
    sentinel: &str,
) -> Result<usize> {
    let out_headers = classify_records(headers, &mut chunk, sentinel)?;
    let pid_col = column_index(&out_headers, "ParticipantID")?;

    let mut groups: BTreeMap<String, Vec<StringRecord>> = BTreeMap::new();
    let n = chunk.len();
    for rec in chunk {
        let pid = rec.get(pid_col).unwrap_or("").to_string();
        groups.entry(pid).or_default().push(rec);
    }
    for (pid, rows) in &groups {
        append_records(&out_dir.join(format!("{pid}.csv")), &out_headers, rows)?;
    }
    Ok(n)
}

// ── Downsample ────────────────────────────────────────────────────────────────

/// Keep rows `0, stride, 2·stride, …`.  A stride of 0 is treated as 1.
pub fn downsample<T: Clone>(rows: &[T], stride: usize) -> Vec<T> {
    rows.iter().step_by(stride.max(1)).cloned().collect()
}

/// Downsample each `(ParticipantID, identifier)` group independently.
///
/// Groups are emitted in sorted key order; rows keep their order within a
/// group.
pub fn downsample_table(table: &Table, stride: usize) -> Result<Table> {
    let pid_col = column_index(&table.headers, "ParticipantID")?;
    let ident_col = column_index(&table.headers, "identifier")?;

    let mut groups: BTreeMap<(&str, &str), Vec<&StringRecord>> = BTreeMap::new();
    for rec in &table.records {
        let key = (rec.get(pid_col).unwrap_or(""), rec.get(ident_col).unwrap_or(""));
        groups.entry(key).or_default().push(rec);
    }

    let records = groups
        .values()
        .flat_map(|rows| downsample(rows, stride))
        .cloned()
        .collect();
    Ok(Table { headers: table.headers.clone(), records })
}

/// Downsample every `*.csv` in `in_dir` into the same file name under
/// `out_dir`.  Returns the number of files written.
pub fn downsample_dir(in_dir: &Path, out_dir: &Path, stride: usize) -> Result<usize> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let files = files_with_suffix(in_dir, ".csv")?;
    for path in &files {
        let table = Table::read(path, b',')?;
        let out = downsample_table(&table, stride)
            .with_context(|| format!("downsampling {}", path.display()))?;
        tracing::debug!(
            file = %path.display(),
            n_in = table.records.len(),
            n_out = out.records.len(),
            "downsample: file"
        );
        // files_with_suffix only returns paths with a file name.
        let name = path.file_name().context("file without name")?;
        out.write(&out_dir.join(name))?;
    }
    tracing::info!(n_files = files.len(), stride, "downsample: done");
    Ok(files.len())
}

// ── Concatenate ───────────────────────────────────────────────────────────────

/// Concatenate `columns` of every `*.csv` in `in_dir` into `out_file`.
///
/// A file that cannot be read or lacks one of `columns` is logged and
/// skipped.  When nothing is left to concatenate no output is written and
/// `0` is returned; otherwise the number of files concatenated.
pub fn concat_dir(in_dir: &Path, out_file: &Path, columns: &[&str]) -> Result<usize> {
    let mut parts = Vec::new();
    for path in files_with_suffix(in_dir, ".csv")? {
        match Table::read(&path, b',').and_then(|t| t.select(columns)) {
            Ok(t) => parts.push(t),
            Err(e) => tracing::warn!(file = %path.display(), error = format!("{e:#}"), "concat: skipped"),
        }
    }
    if parts.is_empty() {
        tracing::info!(dir = %in_dir.display(), "concat: no files to concatenate");
        return Ok(0);
    }

    let n_files = parts.len();
    let mut out = Table { headers: columns.iter().copied().collect(), records: Vec::new() };
    for part in parts {
        out.records.extend(part.records);
    }
    if let Some(parent) = out_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    out.write(out_file)?;
    tracing::info!(out = %out_file.display(), n_files, n_rows = out.records.len(), "concat: written");
    Ok(n_files)
}
