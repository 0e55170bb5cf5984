//! Application state for the TUI
//!
//! The imperative shell: owns the selection, the submission controller and
//! the picker listing, and executes the commands produced by `update`.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use futures::future::LocalBoxFuture;
use futures::FutureExt;

use super::msg::Msg;
use super::update::{update, Cmd, Model};
use crate::analysis::FrameScore;
use crate::chart::{series_for, ChartSeries, ChartSource};
use crate::config::{Config, PickerConfig};
use crate::selection::{BlobRegistry, SelectionState, VideoFile};
use crate::submission::{SubmissionController, SubmissionError, SubmissionState, SubmitOutcome};
use crate::transport::{HttpTransport, TransportError};

/// A submission suspended at the network boundary
pub type PendingSubmit = LocalBoxFuture<'static, Result<SubmitOutcome, SubmissionError>>;

/// Seconds a status message stays visible
const STATUS_TTL_SECS: u64 = 5;

/// What the event loop should do after a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    StartSubmit,
    Quit,
}

/// Videos available in the working directory
#[derive(Debug, Clone, Default)]
pub struct FilePicker {
    pub files: Vec<PathBuf>,
}

impl FilePicker {
    /// List matching videos in `dir`, sorted by name
    pub fn scan(dir: &Path, picker: &PickerConfig) -> std::io::Result<Self> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && picker.accepts(path))
            .collect();
        files.sort();
        Ok(Self { files })
    }

    pub fn display_names(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
            .collect()
    }
}

/// Main application state
pub struct App {
    pub model: Model,
    pub config: Config,
    dir: PathBuf,

    pub selection: SelectionState,
    controller: Rc<SubmissionController<HttpTransport>>,
    /// Last observed controller state, refreshed on every transition
    pub submission: SubmissionState,

    pub picker: FilePicker,
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(config: Config, dir: PathBuf) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&config.server)?;
        Ok(Self {
            model: Model::default(),
            config,
            dir,
            selection: SelectionState::new(BlobRegistry::new()),
            controller: Rc::new(SubmissionController::new(transport)),
            submission: SubmissionState::Idle,
            picker: FilePicker::default(),
            status_message: None,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn endpoint(&self) -> &str {
        self.controller.transport().endpoint()
    }

    pub fn controller(&self) -> &SubmissionController<HttpTransport> {
        &self.controller
    }

    /// Chart source in effect for the current result
    pub fn chart_source(&self) -> ChartSource {
        match self.submission.result() {
            Some(r) => self.model.chart_source.resolve(r),
            None => self.model.chart_source,
        }
    }

    /// Rows shown in the results list; the same frames the chart shows
    pub fn result_rows(&self) -> &[FrameScore] {
        match self.submission.result() {
            Some(r) => match self.model.chart_source.resolve(r) {
                ChartSource::Anomalies => &r.frames,
                ChartSource::Sampled => &r.sampled,
            },
            None => &[],
        }
    }

    /// Series for the chart panel under the current chart source
    pub fn chart_series(&self) -> ChartSeries {
        self.submission
            .result()
            .map(|r| series_for(r, self.model.chart_source))
            .unwrap_or_default()
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Periodic tick: expire the status line
    pub fn tick(&mut self) {
        if let Some((_, shown_at)) = &self.status_message {
            if shown_at.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
            }
        }
    }

    /// Run one message through `update` and execute the resulting command
    pub fn dispatch(&mut self, msg: Msg) -> Action {
        let (model, cmd) = update(msg, std::mem::take(&mut self.model));
        self.model = model;
        self.execute(cmd)
    }

    fn execute(&mut self, cmd: Cmd) -> Action {
        match cmd {
            Cmd::None => Action::Continue,
            Cmd::Quit => Action::Quit,
            Cmd::Batch(cmds) => {
                let mut action = Action::Continue;
                for cmd in cmds {
                    match self.execute(cmd) {
                        Action::Quit => return Action::Quit,
                        Action::StartSubmit => action = Action::StartSubmit,
                        Action::Continue => {}
                    }
                }
                action
            }
            Cmd::ScanVideos => {
                match FilePicker::scan(&self.dir, &self.config.picker) {
                    Ok(picker) => self.picker = picker,
                    Err(e) => {
                        self.picker = FilePicker::default();
                        self.set_status(format!("Cannot list {}: {}", self.dir.display(), e));
                    }
                }
                self.model.picker_len = self.picker.files.len();
                Action::Continue
            }
            Cmd::SelectFile(pos) => {
                if let Some(path) = self.picker.files.get(pos).cloned() {
                    self.select_path(path);
                }
                Action::Continue
            }
            Cmd::ClearSelection => {
                self.selection.clear();
                self.set_status("Selection cleared");
                Action::Continue
            }
            Cmd::Submit => Action::StartSubmit,
            Cmd::Reset => {
                match self.controller.reset() {
                    Ok(()) => self.refresh_submission(),
                    Err(e) => self.set_status(e.to_string()),
                }
                Action::Continue
            }
            Cmd::SetStatus(msg) => {
                self.set_status(msg);
                Action::Continue
            }
        }
    }

    /// Select a video by path (also used for the command-line argument)
    pub fn select_path(&mut self, path: PathBuf) {
        let file = VideoFile::from_path(path);
        self.set_status(format!("Selected {}", file.file_name));
        self.selection.select_file(file);
    }

    /// Hand the selection to the controller.
    ///
    /// The future is polled once here. Calls the controller answers without
    /// suspending (no file, reset required, already uploading) are reported
    /// immediately; otherwise the upload is in flight and the returned future
    /// must be driven to completion by the event loop.
    pub fn start_submit(&mut self) -> Option<PendingSubmit> {
        let video = self.selection.file().cloned();
        let controller = Rc::clone(&self.controller);
        let mut pending: PendingSubmit =
            async move { controller.submit(video.as_ref()).await }.boxed_local();

        match pending.as_mut().now_or_never() {
            Some(outcome) => {
                self.on_settled(outcome);
                None
            }
            None => {
                self.refresh_submission();
                self.set_status(format!("Uploading to {}", self.endpoint()));
                Some(pending)
            }
        }
    }

    /// Report how a submit call ended and refresh the view
    pub fn on_settled(&mut self, outcome: Result<SubmitOutcome, SubmissionError>) {
        match outcome {
            Ok(SubmitOutcome::AlreadyUploading) => {
                self.set_status("Upload already in progress");
                return;
            }
            Ok(SubmitOutcome::Succeeded) => {
                self.refresh_submission();
                let (anomalies, warnings) = self
                    .submission
                    .result()
                    .map(|r| (r.anomaly_count(), r.warnings.len()))
                    .unwrap_or((0, 0));
                let mut status = format!("Analysis complete: {} anomalous frame(s)", anomalies);
                if warnings > 0 {
                    status.push_str(&format!(", {} warning(s)", warnings));
                }
                self.set_status(status);
            }
            Ok(SubmitOutcome::Failed) => {
                self.refresh_submission();
                self.set_status("Upload failed. Press R to retry");
            }
            Err(e) => {
                self.set_status(e.to_string());
                return;
            }
        }
        let (frames, sampled) = self
            .submission
            .result()
            .map(|r| (r.frames.len(), r.sampled.len()))
            .unwrap_or((0, 0));
        self.dispatch(Msg::SubmissionSettled { frames, sampled });
    }

    fn refresh_submission(&mut self) {
        self.submission = self.controller.state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_in(dir: &Path) -> App {
        App::new(Config::default(), dir.to_path_buf()).unwrap()
    }

    #[test]
    fn test_scan_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mp4", "a.mov", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.mp4")).unwrap();

        let picker = FilePicker::scan(dir.path(), &PickerConfig::default()).unwrap();
        assert_eq!(picker.display_names(), vec!["a.mov", "b.mp4"]);
    }

    #[test]
    fn test_open_picker_and_select() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.mp4"), b"x").unwrap();
        let mut app = app_in(dir.path());

        assert_eq!(app.dispatch(Msg::OpenPicker), Action::Continue);
        assert_eq!(app.model.picker_len, 1);
        app.dispatch(Msg::PickerConfirm);

        let file = app.selection.file().unwrap();
        assert_eq!(file.file_name, "clip.mp4");
        assert!(app.selection.preview_uri().is_some());
    }

    #[test]
    fn test_submit_without_file_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());

        assert_eq!(app.dispatch(Msg::Submit), Action::StartSubmit);
        assert!(app.start_submit().is_none());

        let (status, _) = app.status_message.clone().unwrap();
        assert_eq!(status, "no video selected");
        assert_eq!(app.submission, SubmissionState::Idle);
        assert_eq!(app.controller().requests_issued(), 0);
    }

    #[test]
    fn test_retry_signals_submit() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        assert_eq!(app.dispatch(Msg::Retry), Action::StartSubmit);
        assert_eq!(app.submission, SubmissionState::Idle);
    }

    fn result_with(frames: usize, sampled: usize) -> crate::analysis::AnalysisResult {
        let frame = |i: usize| FrameScore::new(i as u64 * 10, 0.2, 0.8, String::new());
        crate::analysis::AnalysisResult {
            frames: (0..frames).map(frame).collect(),
            sampled: (0..sampled).map(frame).collect(),
            summary: crate::analysis::Summary {
                total_frames: sampled as u64,
                real_count: 0,
                fake_count: sampled as u64,
                real_pct: 0.0,
                fake_pct: 100.0,
            },
            output_video_url: None,
            warnings: vec![],
        }
    }

    #[test]
    fn test_rows_follow_chart_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        app.submission = SubmissionState::Succeeded(result_with(2, 30));

        assert_eq!(app.chart_source(), ChartSource::Sampled);
        assert_eq!(app.result_rows().len(), 30);
        assert_eq!(app.chart_series().len(), 30);

        app.dispatch(Msg::ToggleChartSource);
        assert_eq!(app.chart_source(), ChartSource::Anomalies);
        assert_eq!(app.result_rows().len(), 2);
        assert_eq!(app.chart_series().len(), 2);
    }

    #[test]
    fn test_rows_fall_back_without_series() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        app.submission = SubmissionState::Succeeded(result_with(3, 0));

        assert_eq!(app.chart_source(), ChartSource::Anomalies);
        assert_eq!(app.result_rows().len(), 3);
    }

    #[test]
    fn test_quit() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        assert_eq!(app.dispatch(Msg::Quit), Action::Quit);
    }
}
