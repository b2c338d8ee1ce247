//! Per-participant event tables.
//!
//! `<dir>/<subject>_events.csv` lists the experimental markers recorded by
//! the presentation software.  Loading:
//!
//! ```text
//! Text      ← back-filled from the next non-empty row
//! TrialType ← VAL  (7 → reading, 20 → sham, else none)
//! keep rows with TrialType == requested
//! drop rows without eye_sample (only if the column exists)
//! ```
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::align::Event;
use crate::classify::TrialType;
use crate::io::read_rows;

/// One row of an events file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "Text", default)]
    pub text: Option<String>,
    /// Marker code.  Parsed as a float because exports with gaps write `7.0`.
    #[serde(rename = "VAL", default)]
    pub val: Option<f64>,
    #[serde(rename = "PageNum", default)]
    pub page_num: Option<f64>,
    #[serde(default)]
    pub eye_sample: Option<f64>,
    #[serde(default)]
    pub duration_sec: Option<f64>,
    #[serde(rename = "EVENT", default)]
    pub event: Option<String>,
}

impl EventRecord {
    /// Trial type encoded by the `VAL` marker code.
    pub fn trial_type(&self) -> Option<TrialType> {
        let v = self.val.filter(|v| v.fract() == 0.0)?;
        trial_type_for_code(v as i64)
    }
}

/// `VAL` marker code → trial type.
pub fn trial_type_for_code(code: i64) -> Option<TrialType> {
    match code {
        7 => Some(TrialType::Reading),
        20 => Some(TrialType::Sham),
        _ => None,
    }
}

/// Fill every missing `Text` with the next non-missing value below it.
/// Trailing missing rows stay missing.
pub fn backfill_text(rows: &mut [EventRecord]) {
    let mut next: Option<String> = None;
    for row in rows.iter_mut().rev() {
        match &row.text {
            Some(t) if !t.is_empty() => next = Some(t.clone()),
            _ => row.text = next.clone(),
        }
    }
}

/// Load `<dir>/<subject>_events.csv` filtered to `trial_type`.
pub fn load_events(dir: &Path, subject: &str, trial_type: TrialType) -> Result<Vec<EventRecord>> {
    let path = dir.join(format!("{subject}_events.csv"));
    let (headers, mut rows) = read_rows::<EventRecord>(&path)
        .with_context(|| format!("loading events for {subject}"))?;
    let n_in = rows.len();

    backfill_text(&mut rows);
    rows.retain(|r| r.trial_type() == Some(trial_type));
    if headers.iter().any(|h| h == "eye_sample") {
        rows.retain(|r| r.eye_sample.is_some());
    }

    tracing::info!(
        subject,
        trial_type = trial_type.as_str(),
        n_in,
        n_kept = rows.len(),
        "events: loaded"
    );
    Ok(rows)
}

/// Sham events, re-selected page by page.
///
/// Every distinct `(PageNum, Text)` pair, in first-seen order, contributes
/// the sham rows carrying that pair.
pub fn load_sham(dir: &Path, subject: &str) -> Result<Vec<EventRecord>> {
    let events = load_events(dir, subject, TrialType::Sham)?;
    Ok(select_pages(&events))
}

/// Sham rows regrouped by distinct `(PageNum, Text)` pair, first-seen order.
pub fn select_pages(events: &[EventRecord]) -> Vec<EventRecord> {
    let mut pages: Vec<(Option<f64>, Option<&str>)> = Vec::new();
    for e in events {
        let key = (e.page_num, e.text.as_deref());
        if !pages.contains(&key) {
            pages.push(key);
        }
    }
    pages
        .iter()
        .flat_map(|&(page, text)| {
            events
                .iter()
                .filter(move |e| e.page_num == page && e.text.as_deref() == text)
                .cloned()
        })
        .collect()
}

/// Convert loaded rows to aligner events.
///
/// Rows missing `eye_sample` cannot be placed on the timeline and are
/// skipped; a missing `duration_sec` counts as zero and a missing `EVENT`
/// label as empty.
pub fn to_align_events(rows: &[EventRecord]) -> Vec<Event> {
    rows.iter()
        .filter_map(|r| {
            let Some(onset) = r.eye_sample else {
                tracing::debug!(event = ?r.event, "events: no eye_sample, skipped");
                return None;
            };
            Some(Event::new(
                r.event.clone().unwrap_or_default(),
                onset,
                r.duration_sec.unwrap_or(0.0),
            ))
        })
        .collect()
}
