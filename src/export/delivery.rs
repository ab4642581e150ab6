//! Where a finished bitmap goes: clipboard, PNG file, or a save page
//!
//! Clipboard and viewer are collaborators behind traits so the exporter's
//! branching can be tested without a display server or a browser.

use super::raster::Bitmap;
use anyhow::{Context, Result};
use arboard::{Clipboard, ImageData};
use askama::Template;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Clipboard
// ─────────────────────────────────────────────────────────────────────────────

/// Accepts an image for the system clipboard
pub trait ClipboardSink: Send + Sync {
    fn copy_image(&self, bitmap: &Bitmap) -> Result<()>;
}

/// System clipboard via `arboard`
///
/// The clipboard is opened fresh for each copy to avoid holding resources.
/// On X11/Wayland the image is served by this process, so it may disappear
/// once the process exits.
#[derive(Debug, Default)]
pub struct ArboardClipboard;

impl ClipboardSink for ArboardClipboard {
    fn copy_image(&self, bitmap: &Bitmap) -> Result<()> {
        let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;
        clipboard
            .set_image(ImageData {
                width: bitmap.width() as usize,
                height: bitmap.height() as usize,
                bytes: Cow::Owned(bitmap.rgba()),
            })
            .context("Failed to set clipboard image")?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Save page (touch platforms)
// ─────────────────────────────────────────────────────────────────────────────

/// Standalone page asking the user to long-press and save the image
#[derive(Template)]
#[template(path = "save_page.html")]
pub struct SavePage<'a> {
    pub image_src: &'a str,
}

/// Opens a save page for the user
pub trait ImageViewer: Send + Sync {
    /// Present `html`; returns where the document was written
    fn open(&self, html: &str) -> Result<PathBuf>;
}

/// Writes the page to a temp file and opens it in the default browser
#[derive(Debug, Default)]
pub struct BrowserViewer;

impl ImageViewer for BrowserViewer {
    fn open(&self, html: &str) -> Result<PathBuf> {
        let file = tempfile::Builder::new()
            .prefix("insight-card-")
            .suffix(".html")
            .tempfile()
            .context("Failed to create save page")?;
        std::fs::write(file.path(), html).context("Failed to write save page")?;

        // The browser reads the file after we return, so it must outlive us
        let (_, path) = file.keep().context("Failed to keep save page")?;

        webbrowser::open(&path.to_string_lossy())
            .with_context(|| format!("Failed to open {} in a browser", path.display()))?;
        Ok(path)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PNG download
// ─────────────────────────────────────────────────────────────────────────────

/// `insight-card-<unix-epoch-ms>.png`
pub fn download_name(epoch_ms: i64) -> String {
    format!("insight-card-{}.png", epoch_ms)
}

/// Epoch milliseconds from a name made by [`download_name`]
#[cfg(test)]
pub fn download_epoch_ms(name: &str) -> Option<i64> {
    let digits = name.strip_prefix("insight-card-")?.strip_suffix(".png")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Write `png` into `dir` under a fresh download name
pub fn save_png(dir: &Path, png: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(download_name(chrono::Utc::now().timestamp_millis()));
    std::fs::write(&path, png).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_name() {
        assert_eq!(download_name(1760745600123), "insight-card-1760745600123.png");
        assert_eq!(download_epoch_ms("insight-card-1760745600123.png"), Some(1760745600123));
        assert_eq!(download_epoch_ms("insight-card-.png"), None);
        assert_eq!(download_epoch_ms("insight-card--5.png"), None);
        assert_eq!(download_epoch_ms("insight-card-12ab.png"), None);
    }

    #[test]
    fn test_save_png_writes_into_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("cards");
        let path = save_png(&nested, b"png-bytes").unwrap();

        assert_eq!(path.parent(), Some(nested.as_path()));
        let name = path.file_name().unwrap().to_string_lossy();
        let epoch_ms = download_epoch_ms(&name).expect("epoch-ms download name");
        assert!((chrono::Utc::now().timestamp_millis() - epoch_ms).abs() < 60_000);
        assert_eq!(std::fs::read(&path).unwrap(), b"png-bytes");
    }

    #[test]
    fn test_save_page_embeds_image() {
        let html = SavePage {
            image_src: "data:image/png;base64,AAAA",
        }
        .render()
        .unwrap();

        assert!(html.contains("<title>长按保存图片</title>"));
        assert!(html.contains("请长按下方图片"));
        assert!(html.contains(r#"src="data:image/png;base64,AAAA""#));
        assert!(html.contains(r#"alt="生成的文章概念卡片""#));
    }
}
