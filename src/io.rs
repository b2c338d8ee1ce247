//! Delimited-text I/O for the pipeline.
//!
//! Two flavours:
//! - typed rows via serde derive on the record structs: `read_rows` for event
//!   tables, `read_gaze_rows` / `write_gaze_rows` for gaze tables, which also
//!   carry the columns the row type does not model;
//! - untyped [`Table`]s of `csv::StringRecord` for the raw sample report, whose
//!   column set varies between exports and must be carried through verbatim.
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::gaze::GazeRecord;

// ── Typed rows ────────────────────────────────────────────────────────────────

/// Read every row of a comma-separated file into `T`, returning the header row
/// alongside.  Any unparsable row fails the whole file.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<(StringRecord, Vec<T>)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(false)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers = rdr
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .clone();
    let rows = rdr
        .deserialize()
        .enumerate()
        .map(|(i, r)| r.with_context(|| format!("{}: row {}", path.display(), i + 1)))
        .collect::<Result<Vec<T>>>()?;
    Ok((headers, rows))
}

// ── Gaze rows ─────────────────────────────────────────────────────────────────

/// Read a gaze file into `T`.  Header columns outside [`GazeRecord::COLUMNS`]
/// land in each row's `extra` map.
pub fn read_gaze_rows<T: GazeRecord>(path: &Path) -> Result<(StringRecord, Vec<T>)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(false)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers = rdr
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .clone();
    let extra_cols: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !T::COLUMNS.iter().any(|c| c == h))
        .collect();

    let mut rows = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("{}: row {}", path.display(), i + 1))?;
        let mut row: T = rec
            .deserialize(Some(&headers))
            .with_context(|| format!("{}: row {}", path.display(), i + 1))?;
        *row.extra_mut() = extra_cols
            .iter()
            .map(|&(j, name)| (name.to_string(), rec.get(j).unwrap_or("").to_string()))
            .collect();
        rows.push(row);
    }
    Ok((headers, rows))
}

/// Write gaze rows: the modeled columns, then every extra column seen in any
/// row (sorted by name, empty where a row lacks it).
///
/// The header is written even for an empty table.
pub fn write_gaze_rows<T: GazeRecord>(path: &Path, rows: &[T]) -> Result<()> {
    let extra: BTreeSet<&str> = rows
        .iter()
        .flat_map(|r| r.extra().keys().map(String::as_str))
        .collect();
    let mut w = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    w.write_record(T::COLUMNS.iter().copied().chain(extra.iter().copied()))?;
    for row in rows {
        let cells: Vec<&str> = extra
            .iter()
            .map(|&k| row.extra().get(k).map_or("", String::as_str))
            .collect();
        w.serialize((row, cells))?;
    }
    w.flush()?;
    Ok(())
}

// ── Untyped tables ────────────────────────────────────────────────────────────

/// A header row plus string records, column order preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
}

impl Table {
    /// Read a whole delimited file.
    pub fn read(path: &Path, delimiter: u8) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let headers = rdr.headers()?.clone();
        let records = rdr
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(Self { headers, records })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let mut w = WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;
        w.write_record(&self.headers)?;
        for rec in &self.records {
            w.write_record(rec)?;
        }
        w.flush()?;
        Ok(())
    }

    /// Project onto `columns` (in that order).  Fails if any column is absent.
    pub fn select(&self, columns: &[&str]) -> Result<Self> {
        let idx = columns
            .iter()
            .map(|c| crate::classify::column_index(&self.headers, c))
            .collect::<Result<Vec<_>>>()?;
        let records = self
            .records
            .iter()
            .map(|r| idx.iter().map(|&i| r.get(i).unwrap_or("")).collect())
            .collect();
        Ok(Self { headers: columns.iter().copied().collect(), records })
    }
}

/// Append `records` to `path`; the header is written only if the file is
/// created by this call.
pub fn append_records(path: &Path, headers: &StringRecord, records: &[StringRecord]) -> Result<()> {
    let is_new = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {} for append", path.display()))?;
    let mut w = WriterBuilder::new().flexible(true).from_writer(file);
    if is_new {
        w.write_record(headers)?;
    }
    for rec in records {
        w.write_record(rec)?;
    }
    w.flush()?;
    Ok(())
}

/// Open a delimited file as a streaming reader (used for reports too large
/// to hold in memory).
pub fn stream_reader(path: &Path, delimiter: u8) -> Result<csv::Reader<File>> {
    ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))
}

/// Files in `dir` whose name ends with `suffix`, sorted by name.
///
/// A missing directory is an error; a directory with no match is not.
pub fn files_with_suffix(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(suffix));
        if matches && path.is_file() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}
