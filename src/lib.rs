//! fakescope - client core for a deepfake video analysis backend
//!
//! Pick a video, upload it once, and turn the backend's per-frame verdicts
//! into something a person can read.
//!
//! # Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`selection`] | The one video the user picked, plus its preview handle |
//! | [`submission`] | `Idle → Uploading → Succeeded / Failed` state machine |
//! | [`normalize`] | Raw backend JSON into a validated [`AnalysisResult`] |
//! | [`chart`] | Parallel label/real/fake series for a grouped bar chart |
//! | [`transport`] | Multipart upload over HTTP |
//! | [`report`] | Terminal and JSON rendering for the CLI |
//! | [`tui`] | Interactive client |
//!
//! # Quick Start
//!
//! ```no_run
//! use fakescope::{normalize_json, series_for, ChartSource};
//!
//! let body = std::fs::read_to_string("response.json").unwrap();
//! let result = normalize_json(&body).unwrap();
//!
//! println!("{} anomalous frame(s)", result.anomaly_count());
//! let chart = series_for(&result, ChartSource::Anomalies);
//! for (label, real, fake) in chart.points() {
//!     println!("{label}: real {real:.3} fake {fake:.3}");
//! }
//! ```

pub mod analysis;
pub mod chart;
pub mod config;
pub mod logging;
pub mod normalize;
pub mod report;
pub mod selection;
pub mod submission;
pub mod transport;
pub mod tui;

pub use analysis::{is_anomaly, AnalysisResult, FrameScore, Summary, ValidationWarning};
pub use chart::{series_for, to_chart_series, ChartSeries, ChartSource};
pub use config::Config;
pub use normalize::{normalize, normalize_json, MalformedPayload, RawAnalysisPayload};
pub use selection::{BlobRegistry, PreviewUri, SelectionState, VideoFile};
pub use submission::{
    ErrorInfo, FailureKind, SubmissionController, SubmissionError, SubmissionState, SubmitOutcome,
};
pub use transport::{HttpTransport, TransportError, UploadTransport};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Core types are reachable from the crate root
        let _ = ChartSource::default();
        assert!(is_anomaly(0.2, 0.8));
        assert_eq!(SubmissionState::default(), SubmissionState::Idle);
    }
}
