//! Configuration file support for fakescope
//!
//! Reads from .fakescope/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `server.base_url`
pub const SERVER_URL_ENV: &str = "FAKESCOPE_SERVER_URL";

/// Errors raised while loading an explicitly requested config file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Inference backend settings
    #[serde(default)]
    pub server: ServerConfig,

    /// File picker settings
    #[serde(default)]
    pub picker: PickerConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where and how to reach the inference backend
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// Base URL of the backend, without trailing slash
    /// Default: "http://127.0.0.1:5000"
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the multipart upload endpoint
    /// Default: "/upload"
    #[serde(default = "default_upload_path")]
    pub upload_path: String,

    /// Whole-request timeout. Inference runs before the response is sent,
    /// so this has to cover the model pass over the entire video.
    /// Default: 300
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Which files the TUI picker offers
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PickerConfig {
    /// Lowercase extensions, without the dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Default filter directive when FAKESCOPE_LOG is unset
    #[serde(default = "default_level")]
    pub level: String,

    /// Log file, written alongside stderr. The TUI only logs when this is set.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_upload_path() -> String {
    "/upload".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_extensions() -> Vec<String> {
    ["mp4", "mov", "avi", "mkv", "webm", "m4v"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            upload_path: default_upload_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

impl ServerConfig {
    /// Full URL of the upload endpoint
    pub fn upload_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.upload_path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PickerConfig {
    /// Check whether a path has one of the configured video extensions
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            })
            .unwrap_or(false)
    }
}

impl Config {
    /// Load config from .fakescope/config.toml
    /// Returns default config if file doesn't exist or can't be parsed,
    /// then applies the environment override.
    pub fn load() -> Self {
        let mut config = Self::find_config_path()
            .and_then(|path| match Self::from_file(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("ignoring config: {}", e);
                    None
                }
            })
            .unwrap_or_default();
        config.apply_env();
        config
    }

    /// Parse a specific config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Find config.toml by walking up directory tree
    fn find_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut dir = current_dir.as_path();

        loop {
            let config_path = dir.join(".fakescope").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }

            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
        None
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                self.server.base_url = url.trim().to_string();
            }
        }
    }

    /// Override the backend URL (from the --server flag)
    pub fn with_server_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.server.base_url = url;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.upload_url(), "http://127.0.0.1:5000/upload");
        assert_eq!(config.server.timeout(), Duration::from_secs(300));
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[server]
base_url = "http://inference.local:8080/"
timeout_secs = 30

[picker]
extensions = ["mp4"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.upload_url(), "http://inference.local:8080/upload");
        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.picker.extensions, vec!["mp4".to_string()]);
        // Untouched sections keep their defaults
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_picker_accepts_case_insensitive() {
        let picker = PickerConfig::default();
        assert!(picker.accepts(Path::new("clip.MP4")));
        assert!(picker.accepts(Path::new("/tmp/a/b.webm")));
        assert!(!picker.accepts(Path::new("notes.txt")));
        assert!(!picker.accepts(Path::new("no_extension")));
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nbase_url = 1").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_with_server_url_override() {
        let config = Config::default().with_server_url(Some("http://10.0.0.2:5000".into()));
        assert_eq!(config.server.upload_url(), "http://10.0.0.2:5000/upload");
        let config = config.with_server_url(None);
        assert_eq!(config.server.base_url, "http://10.0.0.2:5000");
    }
}
