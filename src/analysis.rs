//! Normalized analysis results
//!
//! These are the typed, display-ready structures built from a backend
//! response by [`crate::normalize`]. They are immutable once built.

use serde::Serialize;
use std::fmt;

/// The anomaly rule. Equal scores are not an anomaly signal.
pub fn is_anomaly(real_score: f64, fake_score: f64) -> bool {
    fake_score > real_score
}

/// Scores for one sampled video frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameScore {
    pub index: u64,
    pub real_score: f64,
    pub fake_score: f64,
    /// Backend-hosted still of the frame; empty when the backend sent none
    pub preview_url: String,
    pub is_anomaly: bool,
}

impl FrameScore {
    pub fn new(index: u64, real_score: f64, fake_score: f64, preview_url: String) -> Self {
        Self {
            index,
            real_score,
            fake_score,
            preview_url,
            is_anomaly: is_anomaly(real_score, fake_score),
        }
    }
}

/// Aggregate counts as computed by the backend, at full precision
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub total_frames: u64,
    pub real_count: u64,
    pub fake_count: u64,
    pub real_pct: f64,
    pub fake_pct: f64,
}

/// Which percentage a warning refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentField {
    Real,
    Fake,
}

impl fmt::Display for PercentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentField::Real => f.write_str("real_percentage"),
            PercentField::Fake => f.write_str("fake_percentage"),
        }
    }
}

/// Non-fatal inconsistencies found while normalizing.
///
/// The backend stays the source of truth for aggregate math; these are
/// surfaced to the user but never block rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    PercentageOutOfRange { field: PercentField, value: f64 },
    PercentagesDoNotSum { sum: f64 },
    CountsDoNotSum { real_count: u64, fake_count: u64, total_frames: u64 },
    ScoreOutOfRange { index: u64, real_score: f64, fake_score: f64 },
    /// Listed by the backend as an anomaly, but fake_score <= real_score
    AnomalyNotConfirmed { index: u64 },
    /// Anomaly entry and sampled series disagree for the same frame
    SeriesDisagrees { index: u64 },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::PercentageOutOfRange { field, value } => {
                write!(f, "{} is {} (outside 0-100)", field, value)
            }
            ValidationWarning::PercentagesDoNotSum { sum } => {
                write!(f, "real and fake percentages sum to {:.2}, not 100", sum)
            }
            ValidationWarning::CountsDoNotSum {
                real_count,
                fake_count,
                total_frames,
            } => write!(
                f,
                "real_count {} + fake_count {} != total_frames {}",
                real_count, fake_count, total_frames
            ),
            ValidationWarning::ScoreOutOfRange {
                index,
                real_score,
                fake_score,
            } => write!(
                f,
                "frame {} has scores outside 0-1 (real {}, fake {})",
                index, real_score, fake_score
            ),
            ValidationWarning::AnomalyNotConfirmed { index } => {
                write!(f, "frame {} listed as anomaly but fake score does not exceed real", index)
            }
            ValidationWarning::SeriesDisagrees { index } => {
                write!(f, "frame {} scores differ between anomaly list and series", index)
            }
        }
    }
}

/// Normalized result of one successful submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// Entries from the backend's anomaly list, ascending by index
    pub frames: Vec<FrameScore>,
    /// The full sampled series, ascending by index; empty if not sent
    pub sampled: Vec<FrameScore>,
    pub summary: Summary,
    pub output_video_url: Option<String>,
    pub warnings: Vec<ValidationWarning>,
}

impl AnalysisResult {
    /// Frames satisfying the anomaly rule
    pub fn anomalies(&self) -> impl Iterator<Item = &FrameScore> {
        self.frames.iter().filter(|f| f.is_anomaly)
    }

    pub fn anomaly_count(&self) -> usize {
        self.anomalies().count()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
