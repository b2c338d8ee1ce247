//! Multi-file loading and merging of gaze tables.
//!
//! For each family:
//!   1. discover `<dir>/*_<Family>.csv` (sorted by name)
//!   2. read each file; if it has an `eye` column keep only the configured eye
//!   3. concatenate, drop exact duplicate rows (first occurrence kept)
//!   4. stable sort by the family's time column
//!
//! Families load independently: a corrupt fixation file does not stop the
//! saccades from loading.
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

use super::clean::{fill_pupil_size, filter_fixations, filter_saccades};
use super::records::{Blink, Fixation, GazeRecord, Saccade, Sample};
use crate::config::PipelineConfig;
use crate::io::{files_with_suffix, read_gaze_rows};

/// Read, eye-filter and merge every file of family `T` in `dir`.
///
/// No matching file yields an empty table.  Any unreadable file fails the
/// family.
pub fn load_family<T: GazeRecord>(dir: &Path, eye: &str) -> Result<Vec<T>> {
    let kind = T::KIND;
    let files = files_with_suffix(dir, &kind.file_suffix())?;
    let mut all = Vec::new();
    for path in &files {
        let (headers, mut rows) = read_gaze_rows::<T>(path)
            .with_context(|| format!("loading {} file", kind.as_str()))?;
        if headers.iter().any(|h| h == "eye") {
            rows.retain(|r| r.eye() == Some(eye));
        }
        tracing::debug!(file = %path.display(), n_rows = rows.len(), "gaze: read file");
        all.extend(rows);
    }
    let merged = merge_rows(all)?;
    tracing::info!(
        kind = kind.as_str(),
        n_files = files.len(),
        n_rows = merged.len(),
        "gaze: family merged"
    );
    Ok(merged)
}

/// Drop exact duplicates, then stable-sort by [`GazeRecord::time_key`].
/// Idempotent; the sorted table has no adjacent duplicates either.
pub fn merge_rows<T: GazeRecord>(rows: Vec<T>) -> Result<Vec<T>> {
    let mut rows = drop_duplicates(rows)?;
    rows.sort_by(|a, b| a.time_key().total_cmp(&b.time_key()));
    Ok(rows)
}

/// Order-preserving removal of rows equal to an earlier row.
///
/// Rows compare by every cell as written out, unmodeled columns included, and
/// two empty (`NaN`) cells count as equal.
pub fn drop_duplicates<T: GazeRecord>(rows: Vec<T>) -> Result<Vec<T>> {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut kept: Vec<T> = Vec::with_capacity(rows.len());
    for row in rows {
        if seen.insert(row_key(&row)?) {
            kept.push(row);
        }
    }
    Ok(kept)
}

fn row_key<T: GazeRecord>(row: &T) -> Result<String> {
    serde_json::to_string(&(row, row.extra())).context("encoding row for duplicate check")
}

/// The four cleaned gaze tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GazeTables {
    pub fixations: Vec<Fixation>,
    pub saccades: Vec<Saccade>,
    pub blinks: Vec<Blink>,
    pub samples: Vec<Sample>,
}

/// Per-family load outcome of [`load_gaze_files`].
#[derive(Debug)]
pub struct GazeLoad {
    pub fixations: Result<Vec<Fixation>>,
    pub saccades: Result<Vec<Saccade>>,
    pub blinks: Result<Vec<Blink>>,
    pub samples: Result<Vec<Sample>>,
}

impl GazeLoad {
    /// All four tables, or the first family error (fixation, saccade, blink,
    /// sample order).
    pub fn into_tables(self) -> Result<GazeTables> {
        Ok(GazeTables {
            fixations: self.fixations?,
            saccades: self.saccades?,
            blinks: self.blinks?,
            samples: self.samples?,
        })
    }
}

/// Load and clean every gaze family under `dir`.
///
/// Fixations and saccades get the outlier filters from `cfg`; samples get
/// `pupil_size` derived and gap-filled.  Failures are logged and kept in the
/// corresponding field.
pub fn load_gaze_files(dir: &Path, cfg: &PipelineConfig) -> GazeLoad {
    let load = GazeLoad {
        fixations: load_family::<Fixation>(dir, &cfg.eye)
            .map(|rows| filter_fixations(rows, &cfg.fixation)),
        saccades: load_family::<Saccade>(dir, &cfg.eye)
            .map(|rows| filter_saccades(rows, &cfg.saccade)),
        blinks: load_family::<Blink>(dir, &cfg.eye),
        samples: load_family::<Sample>(dir, &cfg.eye).map(|mut rows| {
            fill_pupil_size(&mut rows);
            rows
        }),
    };

    for (kind, err) in [
        ("Fixation", load.fixations.as_ref().err()),
        ("Saccade", load.saccades.as_ref().err()),
        ("Blink", load.blinks.as_ref().err()),
        ("Sample", load.samples.as_ref().err()),
    ] {
        if let Some(e) = err {
            tracing::warn!(kind, error = format!("{e:#}"), "gaze: family failed to load");
        }
    }
    load
}
