//! Pipeline configuration.
//!
//! [`PipelineConfig`] holds every tunable parameter for the wrangling and
//! alignment stages.  All fields have defaults that match the values used for
//! the reading-comprehension eye-tracking study.
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration for the full gaze preprocessing pipeline.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use gazeprep::PipelineConfig;
///
/// let cfg = PipelineConfig {
///     downsample_hz: 50.0,   // keep every 20th row instead of every 10th
///     ..PipelineConfig::default()
/// };
/// assert_eq!(cfg.stride(), 20);
/// ```
///
/// Or load a (possibly partial) JSON file with [`PipelineConfig::from_json_file`];
/// missing keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sampling rate of the raw sample report in Hz.
    ///
    /// Default: `1000.0` Hz.
    pub source_hz: f64,

    /// Target rate after stride downsampling in Hz.
    ///
    /// The stride is `round(source_hz / downsample_hz)`, so the default keeps
    /// every 10th row.
    ///
    /// Default: `100.0` Hz.
    pub downsample_hz: f64,

    /// Number of rows read per chunk when splitting the raw report by
    /// participant.
    ///
    /// Default: `1_000_000`.
    pub chunk_rows: usize,

    /// Participant-ID fragment that turns lowercase `"sham"` identifiers into
    /// `TrialType::Na` (one pilot participant used a different naming scheme).
    ///
    /// Default: `"EML1_001"`.
    pub sham_sentinel: String,

    /// Value of the `eye` column that is kept when a gaze file records both
    /// eyes.
    ///
    /// Default: `"R"`.
    pub eye: String,

    /// Saccade outlier thresholds.
    pub saccade: SaccadeLimits,

    /// Fixation outlier thresholds.
    pub fixation: FixationLimits,
}

/// Saccades are kept only when every bound holds strictly:
/// `min_amp_deg < ampDeg < max_amp_deg`, `min_v_peak < vPeak < max_v_peak`,
/// `duration < max_duration`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SaccadeLimits {
    pub min_amp_deg: f64,
    pub max_amp_deg: f64,
    pub min_v_peak: f64,
    pub max_v_peak: f64,
    /// Milliseconds.
    pub max_duration: f64,
}

/// Fixations are kept when `min_duration < duration < max_duration` (ms).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FixationLimits {
    pub min_duration: f64,
    pub max_duration: f64,
}

impl Default for PipelineConfig {
    /// 1000 Hz → 100 Hz · 10⁶-row chunks · right eye · study outlier limits.
    fn default() -> Self {
        Self {
            source_hz: 1000.0,
            downsample_hz: 100.0,
            chunk_rows: 1_000_000,
            sham_sentinel: "EML1_001".to_string(),
            eye: "R".to_string(),
            saccade: SaccadeLimits::default(),
            fixation: FixationLimits::default(),
        }
    }
}

impl Default for SaccadeLimits {
    fn default() -> Self {
        Self {
            min_amp_deg: 0.0,
            max_amp_deg: 20.0,
            min_v_peak: 5.0,
            max_v_peak: 1000.0,
            max_duration: 600.0,
        }
    }
}

impl Default for FixationLimits {
    fn default() -> Self {
        Self { min_duration: 40.0, max_duration: 1000.0 }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file.
    ///
    /// Keys that are absent keep their [`Default`] value, so
    /// `{"downsample_hz": 250}` is a valid file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing config {}", path.display()))
    }

    /// Row stride used by the downsampler.
    ///
    /// Computed as `round(source_hz / downsample_hz)`, never less than 1.
    /// At the defaults this returns **10** (= 1000 Hz / 100 Hz).
    ///
    /// # Examples
    ///
    /// ```
    /// use gazeprep::PipelineConfig;
    /// let cfg = PipelineConfig::default();
    /// assert_eq!(cfg.stride(), 10);
    /// ```
    pub fn stride(&self) -> usize {
        if !(self.downsample_hz > 0.0) {
            return 1;
        }
        ((self.source_hz / self.downsample_hz).round() as usize).max(1)
    }
}
