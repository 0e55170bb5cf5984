//! Chart-ready score series
//!
//! Maps normalized frames onto the label + two-dataset shape a grouped bar
//! chart consumes. Position `n` of every sequence describes the same frame.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::analysis::{AnalysisResult, FrameScore};

/// Labels and per-frame values for a real-vs-fake bar chart
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub real_series: Vec<f64>,
    pub fake_series: Vec<f64>,
}

impl ChartSeries {
    fn from_frames(frames: &[FrameScore]) -> Self {
        let mut series = ChartSeries {
            labels: Vec::with_capacity(frames.len()),
            real_series: Vec::with_capacity(frames.len()),
            fake_series: Vec::with_capacity(frames.len()),
        };
        for frame in frames {
            series.labels.push(frame_label(frame.index));
            series.real_series.push(frame.real_score);
            series.fake_series.push(frame.fake_score);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `(label, real, fake)` triples in chart order
    pub fn points(&self) -> impl Iterator<Item = (&str, f64, f64)> {
        self.labels
            .iter()
            .zip(&self.real_series)
            .zip(&self.fake_series)
            .map(|((label, &real), &fake)| (label.as_str(), real, fake))
    }
}

pub fn frame_label(index: u64) -> String {
    format!("Frame {}", index)
}

/// Chart the frames of `result` in order, unfiltered
pub fn to_chart_series(result: &AnalysisResult) -> ChartSeries {
    ChartSeries::from_frames(&result.frames)
}

/// Which frame list to chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartSource {
    /// The backend's anomaly list (`AnalysisResult::frames`)
    Anomalies,
    /// Every frame the backend scored (`AnalysisResult::sampled`)
    #[default]
    Sampled,
}

impl ChartSource {
    pub fn toggle(self) -> Self {
        match self {
            ChartSource::Anomalies => ChartSource::Sampled,
            ChartSource::Sampled => ChartSource::Anomalies,
        }
    }

    /// The source actually charted for `result`.
    ///
    /// The parallel score arrays are optional; without them `Sampled` falls
    /// back to the anomaly list.
    pub fn resolve(self, result: &AnalysisResult) -> Self {
        self.resolve_len(result.frames.len(), result.sampled.len()).0
    }

    /// Same rule on bare list lengths; returns the source and its length
    pub fn resolve_len(self, frames: usize, sampled: usize) -> (Self, usize) {
        match self {
            ChartSource::Sampled if sampled > 0 => (ChartSource::Sampled, sampled),
            _ => (ChartSource::Anomalies, frames),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartSource::Anomalies => "Anomaly frames",
            ChartSource::Sampled => "All sampled frames",
        }
    }
}

impl fmt::Display for ChartSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartSource::Anomalies => f.write_str("anomalies"),
            ChartSource::Sampled => f.write_str("sampled"),
        }
    }
}

impl FromStr for ChartSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anomalies" | "anomaly" => Ok(ChartSource::Anomalies),
            "sampled" | "all" => Ok(ChartSource::Sampled),
            other => Err(format!(
                "unknown chart source '{}' (expected 'anomalies' or 'sampled')",
                other
            )),
        }
    }
}

/// Chart the list selected by `source`
pub fn series_for(result: &AnalysisResult, source: ChartSource) -> ChartSeries {
    match source.resolve(result) {
        ChartSource::Anomalies => to_chart_series(result),
        ChartSource::Sampled => ChartSeries::from_frames(&result.sampled),
    }
}
