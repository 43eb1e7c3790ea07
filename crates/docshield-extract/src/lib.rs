//! DocShield Text Extraction
//!
//! The analysis engine consumes extraction as a single opaque
//! `extract(path) -> text` call behind the [`TextExtractor`] trait.
//! This crate ships the plain-text implementation; rich formats
//! (PDF, DOCX, HWP) plug in through the same trait from the outside.

use docshield_core::{Error, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Default maximum file size accepted by extractors (10 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Collaborator seam for file-format text extraction
pub trait TextExtractor: Send + Sync {
    /// Extract the full text of a document.
    ///
    /// # Errors
    /// `Error::Extraction` on a missing, oversized, unsupported, or
    /// unreadable file. Extraction failure is fatal to the one file only;
    /// batch callers record it and continue.
    fn extract(&self, path: &Path) -> Result<String>;

    /// Whether this extractor recognizes the file's format
    fn supports(&self, path: &Path) -> bool;
}

/// Plain-text extractor for .txt/.md/.csv/.log files
#[derive(Debug, Clone)]
pub struct PlainTextExtractor {
    max_bytes: u64,
}

impl PlainTextExtractor {
    const EXTENSIONS: [&'static str; 4] = ["txt", "md", "csv", "log"];

    pub fn new() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(Error::Extraction(format!(
                "file not found: {}",
                path.display()
            )));
        }

        if !self.supports(path) {
            return Err(Error::Extraction(format!(
                "unsupported file format: {}",
                path.display()
            )));
        }

        let size = std::fs::metadata(path)?.len();
        if size > self.max_bytes {
            return Err(Error::Extraction(format!(
                "file too large: {} bytes (max {})",
                size, self.max_bytes
            )));
        }

        let bytes = std::fs::read(path)?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                // Legacy CP949/EUC-KR exports land here; decode what we can
                warn!(path = %path.display(), "file is not valid UTF-8, decoding lossily");
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };

        if text.trim().is_empty() {
            return Err(Error::Extraction(format!(
                "no text content in {}",
                path.display()
            )));
        }

        debug!(path = %path.display(), chars = text.chars().count(), "extracted text");
        Ok(text)
    }

    fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                Self::EXTENSIONS.iter().any(|e| *e == ext)
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_extract_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "doc.txt", "주민등록번호: 900101-1234567".as_bytes());

        let extractor = PlainTextExtractor::new();
        let text = extractor.extract(&path).unwrap();
        assert!(text.contains("900101-1234567"));
    }

    #[test]
    fn test_missing_file() {
        let extractor = PlainTextExtractor::new();
        let err = extractor.extract(Path::new("/nonexistent/doc.txt")).unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "doc.hwp", b"binary");

        let extractor = PlainTextExtractor::new();
        let err = extractor.extract(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported"));
    }

    #[test]
    fn test_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "doc.txt", &vec![b'a'; 64]);

        let extractor = PlainTextExtractor::new().with_max_bytes(16);
        let err = extractor.extract(&path).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_empty_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "doc.txt", b"   \n  ");

        let extractor = PlainTextExtractor::new();
        assert!(extractor.extract(&path).is_err());
    }

    #[test]
    fn test_lossy_fallback_on_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "doc.txt", &[b'a', 0xff, b'b']);

        let extractor = PlainTextExtractor::new();
        let text = extractor.extract(&path).unwrap();
        assert!(text.starts_with('a') && text.ends_with('b'));
    }
}
