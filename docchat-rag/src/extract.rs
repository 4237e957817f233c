//! Text extraction seam.
//!
//! Format-specific parsing is an external collaborator concern; the
//! pipeline only needs raw bytes turned into text. [`PlainTextExtractor`]
//! covers UTF-8 text formats in-tree, and richer formats (PDF and friends)
//! plug in through the same trait.

use crate::error::{RagError, Result};

/// Turns uploaded bytes into extractable document text.
pub trait TextExtractor: Send + Sync {
    /// Extract text from the raw bytes of an uploaded file.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Extraction`] for unsupported or corrupt input.
    fn extract(&self, bytes: &[u8], file_name: &str) -> Result<String>;
}

/// Extractor for UTF-8 text files (`.txt`, `.md`, or no extension).
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

fn extension(file_name: &str) -> Option<&str> {
    let name = file_name.rsplit('/').next().unwrap_or(file_name);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => Some(ext),
        _ => None,
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8], file_name: &str) -> Result<String> {
        match extension(file_name) {
            None | Some("txt") | Some("md") | Some("markdown") | Some("text") => {}
            Some(other) => {
                return Err(RagError::Extraction(format!(
                    "unsupported document format '.{other}'"
                )));
            }
        }

        let text = std::str::from_utf8(bytes)
            .map_err(|e| RagError::Extraction(format!("file is not valid UTF-8 text: {e}")))?;
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_text() {
        let text = PlainTextExtractor.extract(b"hello world", "notes.txt").unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn rejects_unknown_formats() {
        let err = PlainTextExtractor.extract(b"%PDF-1.4", "paper.pdf").unwrap_err();
        assert!(matches!(err, RagError::Extraction(_)));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = PlainTextExtractor.extract(&[0xff, 0xfe, 0x00], "notes.txt").unwrap_err();
        assert!(matches!(err, RagError::Extraction(_)));
    }

    #[test]
    fn dotfiles_count_as_extensionless() {
        assert!(PlainTextExtractor.extract(b"config", ".env").is_ok());
    }
}
