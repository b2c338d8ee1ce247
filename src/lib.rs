//! # gazeprep — eye-tracking recording preprocessing
//!
//! `gazeprep` turns raw Dataviewer / EyeLink exports from a reading study into
//! analysis-ready tables: it splits the full sample report by participant,
//! downsamples it, labels every row with its trial context, and aligns the
//! experiment's page events onto fixation / saccade / blink / sample tables.
//!
//! ## Pipeline overview
//!
//! ```text
//! SampleReport.txt                         <dir>/*_{Fixation,Saccade,Blink,Sample}.csv
//!   │                                        │
//!   ├─ wrangle::split_by_participant()       ├─ gaze::load_gaze_files()
//!   │    └─ classify::classify_records()     │    eye filter · dedup · sort
//!   ├─ wrangle::downsample_dir()             │    outlier filters · pupil gaps
//!   └─ wrangle::concat_dir()                 │
//!                                            ├─ events::load_events()   <subject>_events.csv
//!                                            └─ tag_gaze_tables()       align::tag_events per family
//!                                                 │
//!                                                 └─→ GazeTables with `event` set on every row
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use gazeprep::{PipelineConfig, tag_gaze_tables};
//! use gazeprep::classify::TrialType;
//! use gazeprep::events::{load_events, to_align_events};
//! use gazeprep::gaze::load_gaze_files;
//! use std::path::Path;
//!
//! let cfg  = PipelineConfig::default();
//! let dir  = Path::new("data/EML1_042");
//! let gaze = load_gaze_files(dir, &cfg).into_tables().unwrap();
//! let rows = load_events(dir, "EML1_042", TrialType::Reading).unwrap();
//!
//! let tagged = tag_gaze_tables(gaze, &to_align_events(&rows));
//! println!("{} fixations on reading pages", tagged.fixations.len());
//! ```
//!
//! ## Classifying identifiers
//!
//! ```
//! use gazeprep::classify::{classify, TrialType};
//!
//! let c = classify("Validity_Page2", "EML1_042", "EML1_001");
//! assert_eq!(c.trial_type, TrialType::Reading);
//! assert_eq!(c.page_num, Some(3));
//! ```

pub mod align;
pub mod classify;
pub mod config;
pub mod events;
pub mod gaze;
pub mod interpolate;
pub mod io;
pub mod nearest;
pub mod wrangle;

// ── Crate-root re-exports ─────────────────────────────────────────────────

// config
pub use config::{FixationLimits, PipelineConfig, SaccadeLimits};

// classify
pub use classify::{classify, Classification, SessionLabel, Stage, Text, TrialType};

// align
pub use align::{assign_events, tag_events, Event, SampleWindow};

// nearest
pub use nearest::find_nearest;

// events
pub use events::{load_events, load_sham, to_align_events, EventRecord};

// gaze
pub use gaze::{
    load_gaze_files, Blink, Fixation, GazeKind, GazeLoad, GazeRecord, GazeTables, Saccade, Sample,
};

// io
pub use io::Table;

/// Align `events` onto every gaze family.
///
/// Each table is tagged independently with [`align::tag_events`]; rows not
/// covered by an event are dropped.  Events are applied in slice order, so a
/// later event wins where two overlap.
///
/// # Examples
///
/// ```
/// use gazeprep::{tag_gaze_tables, Event, GazeTables, Sample};
///
/// let samples = (0..100)
///     .map(|t| Sample { t_sample: t as f64, ..Default::default() })
///     .collect();
/// let tables = GazeTables { samples, ..Default::default() };
///
/// // Onset 20 ms, 10 ms long → samples 21..=30.
/// let out = tag_gaze_tables(tables, &[Event::new("page1", 20.0, 0.010)]);
/// assert_eq!(out.samples.len(), 10);
/// assert!(out.fixations.is_empty());
/// ```
pub fn tag_gaze_tables(tables: GazeTables, events: &[Event]) -> GazeTables {
    GazeTables {
        fixations: tag_events(events, tables.fixations),
        saccades: tag_events(events, tables.saccades),
        blinks: tag_events(events, tables.blinks),
        samples: tag_events(events, tables.samples),
    }
}
