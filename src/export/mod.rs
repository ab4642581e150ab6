//! Card exporter: layout -> image delivered to the user
//!
//! One export is: rasterize, then branch on the platform class.
//!
//! - Touch: PNG as a base64 data URI inside a save page, handed to the
//!   [`ImageViewer`]. The clipboard is never touched.
//! - Desktop: bitmap to the [`ClipboardSink`]. If that fails the PNG is
//!   written to the output directory instead and the clipboard error is only
//!   logged.
//!
//! A rasterize failure aborts before anything is delivered.

pub mod delivery;
pub mod platform;
pub mod raster;

pub use delivery::{ArboardClipboard, BrowserViewer, ClipboardSink, ImageViewer};
pub use platform::{probe_for, FixedProbe, PlatformClass, PlatformProbe};
pub use raster::{Bitmap, RasterError, Rasterizer, ResvgRasterizer};

use crate::config::Config;
use crate::render::CardLayout;
use askama::Template;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Shown when an export can't produce an image
pub const EXPORT_FAILED_MESSAGE: &str = "生成图片失败，请重试";

/// Shown after a successful clipboard copy
pub const COPIED_MESSAGE: &str = "卡片已复制到剪贴板！";

/// What an export ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Image is on the clipboard
    Copied,
    /// Clipboard unavailable; PNG written here
    Downloaded { path: PathBuf },
    /// Save page written here and opened
    OpenedViewer { path: PathBuf },
}

impl ExportOutcome {
    /// One-line confirmation for the user
    pub fn message(&self) -> String {
        match self {
            Self::Copied => COPIED_MESSAGE.to_string(),
            Self::Downloaded { path } => format!("已保存图片: {}", path.display()),
            Self::OpenedViewer { .. } => "已打开保存页面，请长按图片保存".to_string(),
        }
    }
}

/// Errors that abort an export
#[derive(Debug)]
pub enum ExportError {
    /// Layout couldn't be turned into pixels
    Rasterize(RasterError),
    /// Save page couldn't be built or opened
    Viewer(String),
    /// Fallback PNG couldn't be written
    Save(String),
}

impl ExportError {
    /// Message for the user; the cause goes to the log
    pub fn user_message(&self) -> &'static str {
        EXPORT_FAILED_MESSAGE
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rasterize(e) => write!(f, "{}", e),
            Self::Viewer(msg) => write!(f, "viewer failed: {}", msg),
            Self::Save(msg) => write!(f, "save failed: {}", msg),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<RasterError> for ExportError {
    fn from(err: RasterError) -> Self {
        Self::Rasterize(err)
    }
}

/// Rasterizes layouts and delivers the result
pub struct Exporter {
    rasterizer: Arc<dyn Rasterizer>,
    clipboard: Arc<dyn ClipboardSink>,
    viewer: Arc<dyn ImageViewer>,
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(
        rasterizer: Arc<dyn Rasterizer>,
        clipboard: Arc<dyn ClipboardSink>,
        viewer: Arc<dyn ImageViewer>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            rasterizer,
            clipboard,
            viewer,
            output_dir,
        }
    }

    /// Production collaborators: resvg, system clipboard, default browser
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(ResvgRasterizer::new(&config.render, config.export.scale)),
            Arc::new(ArboardClipboard),
            Arc::new(BrowserViewer),
            config.export.output_dir.clone(),
        )
    }

    pub fn rasterize(&self, layout: &CardLayout) -> Result<Bitmap, ExportError> {
        Ok(self.rasterizer.rasterize(layout)?)
    }

    /// Export one card for the given platform class
    pub fn export(
        &self,
        layout: &CardLayout,
        platform: PlatformClass,
    ) -> Result<ExportOutcome, ExportError> {
        let bitmap = self.rasterize(layout).map_err(|e| {
            tracing::error!(error = %e, "Rasterization failed");
            e
        })?;
        tracing::debug!(
            width = bitmap.width(),
            height = bitmap.height(),
            platform = %platform,
            "Card rasterized"
        );

        match platform {
            PlatformClass::Touch => self.open_save_page(&bitmap),
            PlatformClass::Desktop => self.copy_or_download(&bitmap),
        }
    }

    fn open_save_page(&self, bitmap: &Bitmap) -> Result<ExportOutcome, ExportError> {
        let image_src = bitmap.data_uri()?;
        let html = delivery::SavePage {
            image_src: &image_src,
        }
        .render()
        .map_err(|e| ExportError::Viewer(e.to_string()))?;

        let path = self
            .viewer
            .open(&html)
            .map_err(|e| ExportError::Viewer(format!("{:#}", e)))?;
        tracing::info!(path = %path.display(), "Save page opened");
        Ok(ExportOutcome::OpenedViewer { path })
    }

    fn copy_or_download(&self, bitmap: &Bitmap) -> Result<ExportOutcome, ExportError> {
        match self.clipboard.copy_image(bitmap) {
            Ok(()) => {
                tracing::info!("Card copied to clipboard");
                Ok(ExportOutcome::Copied)
            }
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "Clipboard copy failed, saving PNG instead");
                let png = bitmap.encode_png()?;
                let path = delivery::save_png(&self.output_dir, &png)
                    .map_err(|e| ExportError::Save(format!("{:#}", e)))?;
                tracing::info!(path = %path.display(), "Card saved");
                Ok(ExportOutcome::Downloaded { path })
            }
        }
    }
}
