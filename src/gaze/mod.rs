//! Gaze tables: fixations, saccades, blinks and raw samples.
//!
//! - [`records`]: row types and the [`GazeRecord`] trait.
//! - [`loader`]: per-family discovery, eye filtering, dedup and sort.
//! - [`clean`]: saccade / fixation outlier filters and pupil-size gap filling.

pub mod clean;
pub mod loader;
pub mod records;

pub use clean::{fill_pupil_size, filter_fixations, filter_saccades};
pub use loader::{drop_duplicates, load_family, load_gaze_files, merge_rows, GazeLoad, GazeTables};
pub use records::{Blink, Fixation, GazeKind, GazeRecord, Saccade, Sample};
