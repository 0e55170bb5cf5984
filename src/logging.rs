//! Log subscriber setup
//!
//! `FAKESCOPE_LOG` takes precedence over the configured level. CLI commands
//! log to stderr, and also to the configured file when one is set. The TUI
//! owns the terminal, so in that mode events only go to the file.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::{
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

use crate::config::LoggingConfig;

pub const LOG_ENV: &str = "FAKESCOPE_LOG";

/// Where log lines should be written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Terminal is in use; file only, or nothing
    FileOnly,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot install log subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// The writers a subscriber would get for a given config and target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sinks<'a> {
    pub file: Option<&'a Path>,
    pub stderr: bool,
}

impl Sinks<'_> {
    pub fn is_empty(&self) -> bool {
        self.file.is_none() && !self.stderr
    }
}

pub fn sinks(config: &LoggingConfig, target: LogTarget) -> Sinks<'_> {
    Sinks {
        file: config.file.as_deref(),
        stderr: target == LogTarget::Stderr,
    }
}

fn filter(config: &LoggingConfig, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("fakescope=debug")
        } else {
            EnvFilter::new(&config.level)
        }
    })
}

fn open_log_file(path: &Path) -> Result<std::fs::File, LoggingError> {
    let open = || -> std::io::Result<std::fs::File> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        OpenOptions::new().create(true).append(true).open(path)
    };
    open().map_err(|source| LoggingError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Install the global subscriber. A second call in the same process fails
/// with [`LoggingError::Install`].
pub fn init(config: &LoggingConfig, target: LogTarget, verbose: bool) -> Result<(), LoggingError> {
    let sinks = sinks(config, target);
    if sinks.is_empty() {
        return Ok(());
    }

    let file_layer = match sinks.file {
        Some(path) => Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };
    let stderr_layer = sinks
        .stderr
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter(config, verbose))
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn with_file(path: &Path) -> LoggingConfig {
        LoggingConfig {
            file: Some(path.to_path_buf()),
            ..LoggingConfig::default()
        }
    }

    #[test]
    fn test_cli_logs_to_stderr_and_file() {
        let config = with_file(Path::new("/tmp/fakescope.log"));
        let sinks = sinks(&config, LogTarget::Stderr);
        assert_eq!(sinks.file, Some(Path::new("/tmp/fakescope.log")));
        assert!(sinks.stderr);
    }

    #[test]
    fn test_tui_logs_only_to_file() {
        let config = with_file(Path::new("/tmp/fakescope.log"));
        let sinks = sinks(&config, LogTarget::FileOnly);
        assert!(sinks.file.is_some());
        assert!(!sinks.stderr);

        let bare = LoggingConfig::default();
        assert!(super::sinks(&bare, LogTarget::FileOnly).is_empty());
        assert!(!super::sinks(&bare, LogTarget::Stderr).is_empty());
    }

    #[test]
    fn test_open_log_file_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/logs/fakescope.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_log_file_reports_path() {
        let dir = TempDir::new().unwrap();
        // A regular file cannot be a parent directory
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let path = blocker.join("fakescope.log");

        let err = open_log_file(&path).unwrap_err();
        assert!(matches!(err, LoggingError::Open { .. }));
        assert!(err.to_string().contains("fakescope.log"));
    }

    #[test]
    fn test_second_init_reports_install_error() {
        let config = LoggingConfig::default();
        // Only this test installs a global subscriber in the unit test binary
        let _ = init(&config, LogTarget::Stderr, false);
        let err = init(&config, LogTarget::Stderr, false).unwrap_err();
        assert!(matches!(err, LoggingError::Install(_)));
    }

    #[test]
    fn test_nothing_to_install_is_ok() {
        let config = LoggingConfig::default();
        assert!(init(&config, LogTarget::FileOnly, false).is_ok());
    }
}
