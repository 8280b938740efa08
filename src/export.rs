//! Copy-link and download-QR actions

use crate::error::{Error, Result};
use crate::link::PaymentLink;
use crate::qr::RenderedQr;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// File name used for downloaded QR images
pub const DEFAULT_FILE_NAME: &str = "payment-qr.png";

/// Where downloaded images are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Target directory; the current directory when unset
    pub directory: Option<PathBuf>,
    /// File name of the PNG
    pub file_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            directory: None,
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

impl ExportOptions {
    /// Full path the PNG is written to, with `dir` taking precedence over `directory`
    pub fn target_path(&self, dir: Option<&Path>) -> PathBuf {
        let base = dir
            .map(Path::to_path_buf)
            .or_else(|| self.directory.clone())
            .unwrap_or_else(|| PathBuf::from("."));
        base.join(&self.file_name)
    }
}

/// Destination for copied link text
#[async_trait]
pub trait ClipboardWriter: Send + Sync {
    /// Replace the clipboard contents with `text`
    async fn write_text(&self, text: &str) -> Result<()>;
}

/// The desktop clipboard, accessed through arboard on a blocking task
///
/// On Linux the selection is served by the writing process and disappears when
/// it exits. A short-lived process that wants the text to survive must call
/// [`SystemClipboard::hold_until_replaced`] before exiting.
#[cfg(feature = "clipboard")]
#[cfg_attr(docsrs, doc(cfg(feature = "clipboard")))]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

#[cfg(feature = "clipboard")]
impl SystemClipboard {
    /// Whether copied text is lost when the writing process exits
    pub const fn loses_text_on_exit() -> bool {
        cfg!(target_os = "linux")
    }

    /// Serve `text` as the clipboard selection until another program takes it over.
    ///
    /// Blocks (on a blocking task) for as long as this process owns the selection.
    /// Returns immediately on platforms whose clipboard outlives the writer.
    pub async fn hold_until_replaced(&self, text: &str) -> Result<()> {
        if !Self::loses_text_on_exit() {
            return Ok(());
        }
        let text = text.to_string();
        tokio::task::spawn_blocking(move || hold_selection(text))
            .await
            .map_err(|e| Error::Clipboard(format!("Clipboard task failed: {e}")))?
    }
}

#[cfg(all(feature = "clipboard", target_os = "linux"))]
fn hold_selection(text: String) -> Result<()> {
    use arboard::SetExtLinux;

    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| Error::Clipboard(format!("Failed to access clipboard: {e}")))?;
    clipboard
        .set()
        .wait()
        .text(text)
        .map_err(|e| Error::Clipboard(e.to_string()))
}

#[cfg(all(feature = "clipboard", not(target_os = "linux")))]
fn hold_selection(_text: String) -> Result<()> {
    Ok(())
}

#[cfg(feature = "clipboard")]
#[async_trait]
impl ClipboardWriter for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        let text = text.to_string();
        tokio::task::spawn_blocking(move || {
            let mut clipboard = arboard::Clipboard::new()
                .map_err(|e| Error::Clipboard(format!("Failed to access clipboard: {e}")))?;
            clipboard
                .set_text(text)
                .map_err(|e| Error::Clipboard(e.to_string()))
        })
        .await
        .map_err(|e| Error::Clipboard(format!("Clipboard task failed: {e}")))?
    }
}

/// In-process clipboard for headless use and tests
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
    reject: Option<String>,
}

impl MemoryClipboard {
    /// Empty clipboard that accepts writes
    pub fn new() -> Self {
        Self::default()
    }

    /// Clipboard that rejects every write with `reason`
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(None),
            reject: Some(reason.into()),
        }
    }

    /// Current contents
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ClipboardWriter for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        if let Some(reason) = &self.reject {
            return Err(Error::Clipboard(reason.clone()));
        }
        let mut guard = self.contents.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(text.to_string());
        Ok(())
    }
}

/// Copy the exact link text to `clipboard`.
pub async fn copy_to_clipboard(clipboard: &dyn ClipboardWriter, link: &PaymentLink) -> Result<()> {
    match clipboard.write_text(link.as_str()).await {
        Ok(()) => {
            tracing::info!(length = link.as_str().len(), "Copied payment link");
            Ok(())
        }
        Err(err) => {
            tracing::warn!(error = %err, "Clipboard rejected payment link");
            Err(err)
        }
    }
}

/// Serialize a rendered code to PNG bytes.
pub fn export_image(rendered: &RenderedQr) -> Result<Vec<u8>> {
    rendered.to_png()
}

/// Write a rendered code to `path` as PNG, creating parent directories.
pub fn save_image(rendered: &RenderedQr, path: &Path) -> Result<PathBuf> {
    let png = export_image(rendered)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create directory {}: {e}", parent.display()),
            ))
        })?;
    }

    fs::write(path, &png).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to write {}: {e}", path.display()),
        ))
    })?;

    tracing::info!(path = %path.display(), bytes = png.len(), "Saved QR image");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{PaymentRequest, build};
    use crate::qr::{QrDecoder, QrEncoder};

    #[test]
    fn test_target_path() {
        let options = ExportOptions::default();
        assert_eq!(
            options.target_path(None),
            PathBuf::from(".").join("payment-qr.png")
        );
        assert_eq!(
            options.target_path(Some(Path::new("/tmp/out"))),
            PathBuf::from("/tmp/out/payment-qr.png")
        );
    }

    #[tokio::test]
    async fn test_copy_exact_link() {
        let link = build(&PaymentRequest::new("a@b").with_name("Jane")).unwrap();
        let clipboard = MemoryClipboard::new();
        copy_to_clipboard(&clipboard, &link).await.unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some(link.as_str()));
    }

    #[tokio::test]
    async fn test_copy_failure_surfaces() {
        let link = build(&PaymentRequest::new("a@b")).unwrap();
        let clipboard = MemoryClipboard::rejecting("permission denied");
        let err = copy_to_clipboard(&clipboard, &link).await.unwrap_err();
        assert!(matches!(err, Error::Clipboard(ref reason) if reason == "permission denied"));
        assert!(clipboard.contents().is_none());
    }

    #[test]
    fn test_contents_survive_poisoned_lock() {
        let clipboard = MemoryClipboard::new();
        *clipboard.contents.lock().unwrap() = Some("upi://pay?pa=a@b".to_string());

        let result = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = clipboard.contents.lock().unwrap();
                    panic!("writer crashed while holding the clipboard");
                })
                .join()
        });
        assert!(result.is_err());
        assert!(clipboard.contents.is_poisoned());

        assert_eq!(clipboard.contents().as_deref(), Some("upi://pay?pa=a@b"));
    }

    #[cfg(feature = "clipboard")]
    #[test]
    fn test_linux_copies_need_holding() {
        assert_eq!(
            SystemClipboard::loses_text_on_exit(),
            cfg!(target_os = "linux")
        );
    }

    #[cfg(all(feature = "clipboard", not(target_os = "linux")))]
    #[tokio::test]
    async fn test_hold_is_noop_off_linux() {
        SystemClipboard.hold_until_replaced("upi://pay?pa=a@b").await.unwrap();
    }

    #[test]
    fn test_save_image_decodes_to_link() {
        let dir = tempfile::tempdir().unwrap();
        let link = build(&PaymentRequest::new("shop@upi").with_amount("25")).unwrap();
        let rendered = QrEncoder::new().render(&link).unwrap();

        let path = save_image(&rendered, &dir.path().join("nested").join(DEFAULT_FILE_NAME)).unwrap();
        let decoded = QrDecoder::new().decode_file(&path).unwrap();
        assert_eq!(decoded, link.as_str());
    }
}
