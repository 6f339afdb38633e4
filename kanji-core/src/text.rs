//! Committed text and the clipboard export.

use crate::error::InkResult;

/// Clip description attached to exported text.
pub const CLIP_LABEL: &str = "text copied from handwriting input";

/// Destination for plain-text exports. One-directional: nothing is read back.
pub trait ClipboardSink {
    /// Replace the clipboard content with `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the text.
    fn set_text(&mut self, label: &str, text: &str) -> InkResult<()>;
}

/// Characters the user has committed. Append-only except for [`clear`](Self::clear).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `label` at the end.
    pub fn append(&mut self, label: &str) {
        self.text.push_str(label);
    }

    /// Remove all text. Idempotent.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// The committed text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether nothing has been committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Export the buffer to `sink`. An empty buffer is not exported.
    ///
    /// Returns whether anything was copied.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the text.
    pub fn copy_to(&self, sink: &mut dyn ClipboardSink) -> InkResult<bool> {
        if self.text.is_empty() {
            return Ok(false);
        }
        sink.set_text(CLIP_LABEL, &self.text)?;
        Ok(true)
    }
}

impl std::fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        clips: Vec<(String, String)>,
    }

    impl ClipboardSink for Recorder {
        fn set_text(&mut self, label: &str, text: &str) -> InkResult<()> {
            self.clips.push((label.to_string(), text.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_append_counts_characters() {
        let mut buffer = TextBuffer::new();
        buffer.append("日本");
        buffer.append("語");
        assert_eq!(buffer.as_str(), "日本語");
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut buffer = TextBuffer::new();
        buffer.clear();
        assert!(buffer.is_empty());
        buffer.append("字");
        buffer.clear();
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_copy_skips_empty_buffer() {
        let buffer = TextBuffer::new();
        let mut sink = Recorder::default();
        assert!(!buffer.copy_to(&mut sink).expect("copy"));
        assert!(sink.clips.is_empty());
    }

    #[test]
    fn test_copy_exports_text() {
        let mut buffer = TextBuffer::new();
        buffer.append("漢字");
        let mut sink = Recorder::default();
        assert!(buffer.copy_to(&mut sink).expect("copy"));
        assert_eq!(sink.clips, vec![(CLIP_LABEL.to_string(), "漢字".to_string())]);
    }
}
