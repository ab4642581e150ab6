//! Export and render configuration: output location, raster scale, platform
//! selection, font sources

use serde::Deserialize;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Platform Mode
// ─────────────────────────────────────────────────────────────────────────────

/// How the export path is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlatformMode {
    /// Sniff the user-agent signature (default)
    #[default]
    Auto,
    /// Always use the viewer-document path
    Touch,
    /// Always use the clipboard path
    Desktop,
}

impl PlatformMode {
    /// Parse mode string from config
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "touch" | "mobile" => Self::Touch,
            "desktop" => Self::Desktop,
            _ => Self::Auto, // Default to sniffing for unknown values
        }
    }

    /// Convert to string for TOML serialization
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Touch => "touch",
            Self::Desktop => "desktop",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Export Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Export settings
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Directory for fallback PNG downloads
    pub output_dir: PathBuf,
    /// Raster scale relative to logical card units
    pub scale: f32,
    /// Platform selection
    pub platform: PlatformMode,
    /// User-agent signature override for platform sniffing
    pub user_agent: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            scale: 2.0,
            platform: PlatformMode::Auto,
            user_agent: None,
        }
    }
}

/// Export settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileExport {
    pub output_dir: Option<String>,
    pub scale: Option<f32>,
    pub platform: Option<String>,
    pub user_agent: Option<String>,
}

impl ExportConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileExport>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            output_dir: file
                .output_dir
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            scale: file
                .scale
                .filter(|s| s.is_finite() && *s > 0.0)
                .unwrap_or(defaults.scale),
            platform: file
                .platform
                .map(|s| PlatformMode::from_str(&s))
                .unwrap_or(defaults.platform),
            user_agent: file.user_agent.filter(|ua| !ua.trim().is_empty()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Render Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Render settings
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Extra font directories loaded on top of system fonts
    pub font_dirs: Vec<PathBuf>,
}

/// Render settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileRender {
    pub font_dirs: Option<Vec<String>>,
}

impl RenderConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileRender>) -> Self {
        let file = file.unwrap_or_default();

        Self {
            font_dirs: file
                .font_dirs
                .unwrap_or_default()
                .into_iter()
                .map(PathBuf::from)
                .collect(),
        }
    }
}
