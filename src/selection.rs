//! Video selection and preview handles
//!
//! `SelectionState` owns the file the user picked and the preview URI issued
//! for it. Preview URIs live in a [`BlobRegistry`], the local equivalent of a
//! browser's object-URL table: every URI keeps its blob reachable until it is
//! revoked, so the selection revokes on replace, on clear and on drop.

use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use uuid::Uuid;

/// Video container formats the client knows a mime type for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    Mp4,
    QuickTime,
    Avi,
    Matroska,
    WebM,
    M4v,
    Unknown,
}

impl VideoFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("mp4") => VideoFormat::Mp4,
            Some("mov") | Some("qt") => VideoFormat::QuickTime,
            Some("avi") => VideoFormat::Avi,
            Some("mkv") => VideoFormat::Matroska,
            Some("webm") => VideoFormat::WebM,
            Some("m4v") => VideoFormat::M4v,
            _ => VideoFormat::Unknown,
        }
    }

    /// Returns the MIME type string for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "video/mp4",
            VideoFormat::QuickTime => "video/quicktime",
            VideoFormat::Avi => "video/x-msvideo",
            VideoFormat::Matroska => "video/x-matroska",
            VideoFormat::WebM => "video/webm",
            VideoFormat::M4v => "video/x-m4v",
            VideoFormat::Unknown => "application/octet-stream",
        }
    }
}

/// Handle to a video on disk. The bytes are read only when submitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoFile {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: &'static str,
    /// `None` when metadata could not be read
    pub size: Option<u64>,
}

impl VideoFile {
    /// Build a handle for `path`. Never fails: an unreadable file is only
    /// reported once someone tries to upload it.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());
        let mime_type = VideoFormat::from_path(&path).mime_type();
        let size = std::fs::metadata(&path).ok().map(|m| m.len());
        Self {
            path,
            file_name,
            mime_type,
            size,
        }
    }
}

/// A locally valid, revocable reference to a selected blob
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PreviewUri(String);

impl PreviewUri {
    fn generate() -> Self {
        PreviewUri(format!("blob:fakescope/{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Table of live preview URIs
#[derive(Debug, Default)]
pub struct BlobRegistry {
    entries: RefCell<HashMap<PreviewUri, VideoFile>>,
}

impl BlobRegistry {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Issue a fresh URI for `file`
    pub fn create(&self, file: &VideoFile) -> PreviewUri {
        let uri = PreviewUri::generate();
        self.entries.borrow_mut().insert(uri.clone(), file.clone());
        uri
    }

    /// Look up a URI; `None` once revoked
    pub fn resolve(&self, uri: &PreviewUri) -> Option<VideoFile> {
        self.entries.borrow().get(uri).cloned()
    }

    /// Invalidate a URI. Returns false if it was already gone.
    pub fn revoke(&self, uri: &PreviewUri) -> bool {
        self.entries.borrow_mut().remove(uri).is_some()
    }

    pub fn live_count(&self) -> usize {
        self.entries.borrow().len()
    }
}

/// A file together with its preview URI
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedVideo {
    pub file: VideoFile,
    pub preview_uri: PreviewUri,
}

/// Holder of the current selection. Sole owner of its preview URI.
#[derive(Debug)]
pub struct SelectionState {
    registry: Rc<BlobRegistry>,
    current: Option<SelectedVideo>,
}

impl SelectionState {
    pub fn new(registry: Rc<BlobRegistry>) -> Self {
        Self {
            registry,
            current: None,
        }
    }

    /// Replace the selection, revoking the previous preview first
    pub fn select_file(&mut self, file: VideoFile) {
        self.release();
        let preview_uri = self.registry.create(&file);
        tracing::debug!(file = %file.path.display(), uri = %preview_uri, "selected video");
        self.current = Some(SelectedVideo { file, preview_uri });
    }

    /// Revoke the preview and forget the file
    pub fn clear(&mut self) {
        self.release();
    }

    pub fn selected(&self) -> Option<&SelectedVideo> {
        self.current.as_ref()
    }

    pub fn file(&self) -> Option<&VideoFile> {
        self.current.as_ref().map(|s| &s.file)
    }

    pub fn preview_uri(&self) -> Option<&PreviewUri> {
        self.current.as_ref().map(|s| &s.preview_uri)
    }

    fn release(&mut self) {
        if let Some(old) = self.current.take() {
            self.registry.revoke(&old.preview_uri);
        }
    }
}

impl Drop for SelectionState {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_format_mime_types() {
        assert_eq!(VideoFormat::from_path(Path::new("a.MP4")).mime_type(), "video/mp4");
        assert_eq!(VideoFormat::from_path(Path::new("a.mov")).mime_type(), "video/quicktime");
        assert_eq!(
            VideoFormat::from_path(Path::new("a.bin")).mime_type(),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_from_path_missing_file_is_selectable() {
        let file = VideoFile::from_path("/definitely/not/here/clip.mp4");
        assert_eq!(file.file_name, "clip.mp4");
        assert_eq!(file.mime_type, "video/mp4");
        assert_eq!(file.size, None);
    }

    #[test]
    fn test_from_path_reads_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.webm");
        std::fs::write(&path, b"0123456789").unwrap();
        let file = VideoFile::from_path(&path);
        assert_eq!(file.size, Some(10));
    }

    #[test]
    fn test_select_issues_preview() {
        let registry = BlobRegistry::new();
        let mut selection = SelectionState::new(registry.clone());
        assert!(selection.file().is_none());

        selection.select_file(VideoFile::from_path("a.mp4"));
        let uri = selection.preview_uri().cloned().unwrap();
        assert!(uri.as_str().starts_with("blob:fakescope/"));
        assert_eq!(registry.resolve(&uri).unwrap().file_name, "a.mp4");
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_reselect_revokes_previous_preview() {
        let registry = BlobRegistry::new();
        let mut selection = SelectionState::new(registry.clone());

        selection.select_file(VideoFile::from_path("a.mp4"));
        let first = selection.preview_uri().cloned().unwrap();
        selection.select_file(VideoFile::from_path("b.mp4"));
        let second = selection.preview_uri().cloned().unwrap();

        assert_ne!(first, second);
        assert!(registry.resolve(&first).is_none());
        assert!(registry.resolve(&second).is_some());
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_clear_revokes() {
        let registry = BlobRegistry::new();
        let mut selection = SelectionState::new(registry.clone());
        selection.select_file(VideoFile::from_path("a.mp4"));
        selection.clear();
        assert!(selection.selected().is_none());
        assert_eq!(registry.live_count(), 0);

        // Clearing an empty selection is harmless
        selection.clear();
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_drop_revokes() {
        let registry = BlobRegistry::new();
        {
            let mut selection = SelectionState::new(registry.clone());
            selection.select_file(VideoFile::from_path("a.mp4"));
            assert_eq!(registry.live_count(), 1);
        }
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_revoke_twice() {
        let registry = BlobRegistry::new();
        let uri = registry.create(&VideoFile::from_path("a.mp4"));
        assert!(registry.revoke(&uri));
        assert!(!registry.revoke(&uri));
    }
}
