//! `[logging]` section
//!
//! `level` filters this crate's events wherever they go (the TUI log strip or
//! stderr). JSON log files are opt-in and land in the per-user data directory
//! unless `file_dir` says otherwise.

use serde::Deserialize;
use std::path::PathBuf;

/// Log file name stem; the appender adds the date
pub const LOG_FILE_PREFIX: &str = "insight-card";

/// When the JSON log file rolls over
///
/// Unknown values are a config parse error rather than a silent default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

impl LogRotation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level for `insight_card` targets (dependencies stay at warn)
    pub level: String,
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: default_log_dir(),
            file_rotation: LogRotation::Daily,
        }
    }
}

/// `~/.local/share/insight-card/logs` or the platform equivalent
fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("insight-card").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// `[logging]` as written in the file
#[derive(Debug, Deserialize, Default)]
pub struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<PathBuf>,
    pub file_rotation: Option<LogRotation>,
}

impl LoggingConfig {
    pub fn from_file(file: Option<FileLogging>) -> Self {
        let Some(file) = file else {
            return Self::default();
        };
        let defaults = Self::default();

        Self {
            // A blank level would produce `insight_card=`, which EnvFilter rejects
            level: file
                .level
                .map(|level| level.trim().to_lowercase())
                .filter(|level| !level.is_empty())
                .unwrap_or(defaults.level),
            file_enabled: file.file_enabled.unwrap_or(defaults.file_enabled),
            file_dir: file.file_dir.unwrap_or(defaults.file_dir),
            file_rotation: file.file_rotation.unwrap_or(defaults.file_rotation),
        }
    }
}
