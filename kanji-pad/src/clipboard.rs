//! Clipboard sinks for the headless host.

use std::io::Write;
use std::path::PathBuf;

use kanji_core::{ClipboardSink, InkError, InkResult};

/// Writes exported text to a file, replacing its previous content.
#[derive(Debug, Clone)]
pub struct FileClipboard {
    path: PathBuf,
}

impl FileClipboard {
    /// Create a sink writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ClipboardSink for FileClipboard {
    fn set_text(&mut self, label: &str, text: &str) -> InkResult<()> {
        std::fs::write(&self.path, text).map_err(|e| {
            InkError::Clipboard(format!("failed to write {}: {e}", self.path.display()))
        })?;
        tracing::info!(label, path = %self.path.display(), "Copied {} bytes", text.len());
        Ok(())
    }
}

/// Prints exported text on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutClipboard;

impl ClipboardSink for StdoutClipboard {
    fn set_text(&mut self, label: &str, text: &str) -> InkResult<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "[clipboard] {text}")
            .map_err(|e| InkError::Clipboard(format!("stdout: {e}")))?;
        tracing::debug!(label, "Copied to stdout");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_clipboard_overwrites() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("clip.txt");
        let mut sink = FileClipboard::new(&path);

        sink.set_text("label", "一二").expect("first");
        sink.set_text("label", "三").expect("second");

        assert_eq!(std::fs::read_to_string(&path).expect("read"), "三");
    }

    #[test]
    fn test_file_clipboard_reports_errors() {
        let mut sink = FileClipboard::new("/nonexistent/dir/clip.txt");
        assert!(matches!(
            sink.set_text("label", "x"),
            Err(InkError::Clipboard(_))
        ));
    }
}
