//! Row types of the four gaze table families.
//!
//! Column names follow the parsed EyeLink export (`tStart`, `ampDeg`,
//! `RPupil` …).  Optional columns default to `None` when absent from a file.
//! Every family carries an `event` column filled by the aligner.
//!
//! An empty cell in a required numeric column reads as `NaN` (and is written
//! back empty), so such a row fails every outlier bound instead of failing the
//! file.  Columns a row type does not model are kept verbatim in `extra`.
use crate::align::SampleWindow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unmodeled columns of one row, by header name.
pub type ExtraColumns = BTreeMap<String, String>;

/// `f64` cell where an empty field means `NaN`.
mod nan_cell {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
    }

    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        if v.is_nan() {
            s.serialize_none()
        } else {
            s.serialize_f64(*v)
        }
    }
}

/// The four per-type file families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GazeKind {
    Fixation,
    Saccade,
    Blink,
    Sample,
}

impl GazeKind {
    pub const ALL: [GazeKind; 4] =
        [GazeKind::Fixation, GazeKind::Saccade, GazeKind::Blink, GazeKind::Sample];

    pub fn as_str(&self) -> &'static str {
        match self {
            GazeKind::Fixation => "Fixation",
            GazeKind::Saccade => "Saccade",
            GazeKind::Blink => "Blink",
            GazeKind::Sample => "Sample",
        }
    }

    /// File-name suffix, e.g. `"_Fixation.csv"`.
    pub fn file_suffix(&self) -> String {
        format!("_{}.csv", self.as_str())
    }

    /// Column the merged table is ordered by.
    pub fn time_column(&self) -> &'static str {
        match self {
            GazeKind::Sample => "tSample",
            _ => "tStart",
        }
    }
}

/// Behaviour shared by all gaze rows.
pub trait GazeRecord: SampleWindow + Clone + PartialEq + Serialize + for<'de> Deserialize<'de> {
    const KIND: GazeKind;

    /// Value of [`GazeKind::time_column`].
    fn time_key(&self) -> f64;

    /// Modeled columns, in serialization order.
    const COLUMNS: &'static [&'static str];

    /// Recorded eye (`"L"` / `"R"`), if the file has an `eye` column.
    fn eye(&self) -> Option<&str>;

    fn extra(&self) -> &ExtraColumns;

    fn extra_mut(&mut self) -> &mut ExtraColumns;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixation {
    #[serde(default)]
    pub eye: Option<String>,
    #[serde(with = "nan_cell")]
    pub t_start: f64,
    #[serde(with = "nan_cell")]
    pub t_end: f64,
    #[serde(with = "nan_cell")]
    pub duration: f64,
    #[serde(default)]
    pub x_avg: Option<f64>,
    #[serde(default)]
    pub y_avg: Option<f64>,
    #[serde(default)]
    pub pupil_avg: Option<f64>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(skip)]
    pub extra: ExtraColumns,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Saccade {
    #[serde(default)]
    pub eye: Option<String>,
    #[serde(with = "nan_cell")]
    pub t_start: f64,
    #[serde(with = "nan_cell")]
    pub t_end: f64,
    #[serde(with = "nan_cell")]
    pub duration: f64,
    #[serde(default)]
    pub x_start: Option<f64>,
    #[serde(default)]
    pub y_start: Option<f64>,
    #[serde(default)]
    pub x_end: Option<f64>,
    #[serde(default)]
    pub y_end: Option<f64>,
    /// Amplitude in degrees of visual angle.
    #[serde(with = "nan_cell")]
    pub amp_deg: f64,
    /// Peak velocity (deg/s).
    #[serde(with = "nan_cell")]
    pub v_peak: f64,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(skip)]
    pub extra: ExtraColumns,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blink {
    #[serde(default)]
    pub eye: Option<String>,
    #[serde(with = "nan_cell")]
    pub t_start: f64,
    #[serde(with = "nan_cell")]
    pub t_end: f64,
    #[serde(with = "nan_cell")]
    pub duration: f64,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(skip)]
    pub extra: ExtraColumns,
}

/// One raw eye sample.  A zero-width window at `tSample` for alignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(default)]
    pub eye: Option<String>,
    #[serde(rename = "tSample", with = "nan_cell")]
    pub t_sample: f64,
    #[serde(rename = "LX", default)]
    pub lx: Option<f64>,
    #[serde(rename = "LY", default)]
    pub ly: Option<f64>,
    #[serde(rename = "LPupil", default)]
    pub l_pupil: Option<f64>,
    #[serde(rename = "RX", default)]
    pub rx: Option<f64>,
    #[serde(rename = "RY", default)]
    pub ry: Option<f64>,
    #[serde(rename = "RPupil", default)]
    pub r_pupil: Option<f64>,
    /// Smaller of the two pupil channels, gap-filled.  See
    /// [`fill_pupil_size`](crate::gaze::fill_pupil_size).
    #[serde(default)]
    pub pupil_size: Option<f64>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(skip)]
    pub extra: ExtraColumns,
}

macro_rules! windowed {
    ($t:ty, $kind:expr, start = $s:ident, end = $e:ident, columns = $cols:expr) => {
        impl SampleWindow for $t {
            fn t_start(&self) -> f64 { self.$s }
            fn t_end(&self) -> f64 { self.$e }
            fn event(&self) -> Option<&str> { self.event.as_deref() }
            fn set_event(&mut self, label: &str) { self.event = Some(label.to_string()); }
        }

        impl GazeRecord for $t {
            const KIND: GazeKind = $kind;
            const COLUMNS: &'static [&'static str] = $cols;
            fn time_key(&self) -> f64 { self.$s }
            fn eye(&self) -> Option<&str> { self.eye.as_deref() }
            fn extra(&self) -> &ExtraColumns { &self.extra }
            fn extra_mut(&mut self) -> &mut ExtraColumns { &mut self.extra }
        }
    };
}

windowed!(Fixation, GazeKind::Fixation, start = t_start, end = t_end, columns = &[
    "eye", "tStart", "tEnd", "duration", "xAvg", "yAvg", "pupilAvg", "event",
]);
windowed!(Saccade, GazeKind::Saccade, start = t_start, end = t_end, columns = &[
    "eye", "tStart", "tEnd", "duration", "xStart", "yStart", "xEnd", "yEnd", "ampDeg", "vPeak",
    "event",
]);
windowed!(Blink, GazeKind::Blink, start = t_start, end = t_end, columns = &[
    "eye", "tStart", "tEnd", "duration", "event",
]);
windowed!(Sample, GazeKind::Sample, start = t_sample, end = t_sample, columns = &[
    "eye", "tSample", "LX", "LY", "LPupil", "RX", "RY", "RPupil", "pupil_size", "event",
]);
