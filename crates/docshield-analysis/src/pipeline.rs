//! File and batch analysis pipeline
//!
//! Couples a text extractor with the analyzer behind cooperative
//! cancellation. The cancel flag is shared with the analyzer and checked
//! between stages; a stage that already started runs to completion. Batch processing
//! isolates per-file failures: one bad file becomes an error-shaped
//! report and the loop continues.

use crate::analyzer::{Analyzer, DocumentAnalysis};
use docshield_core::{CancelFlag, Error, Result, StatusSink, null_status_sink};
use docshield_extract::TextExtractor;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of analyzing one file. Exactly one of `analysis` and `error`
/// is set.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    /// The extracted text, kept for masking and history
    pub text: Option<String>,
    pub analysis: Option<DocumentAnalysis>,
    pub error: Option<String>,
}

impl FileReport {
    fn ok(path: &Path, text: String, analysis: DocumentAnalysis) -> Self {
        Self {
            path: path.to_path_buf(),
            text: Some(text),
            analysis: Some(analysis),
            error: None,
        }
    }

    fn failed(path: &Path, error: &Error) -> Self {
        Self {
            path: path.to_path_buf(),
            text: None,
            analysis: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.analysis.is_some()
    }
}

pub struct Pipeline {
    extractor: Box<dyn TextExtractor>,
    analyzer: Analyzer,
    cancel: CancelFlag,
    status: StatusSink,
}

impl Pipeline {
    pub fn new(extractor: Box<dyn TextExtractor>, analyzer: Analyzer) -> Self {
        Self {
            extractor,
            analyzer,
            cancel: CancelFlag::new(),
            status: null_status_sink(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.analyzer = self.analyzer.with_cancel(cancel.clone());
        self.cancel = cancel;
        self
    }

    pub fn with_status(mut self, status: StatusSink) -> Self {
        self.status = status;
        self
    }

    /// Extract and analyze one file.
    ///
    /// # Errors
    /// `Error::Cancelled` when the flag is raised between stages;
    /// `Error::Extraction` when the file cannot be read.
    pub async fn analyze_file(&self, path: &Path) -> Result<FileReport> {
        self.checkpoint()?;
        self.emit(&format!("파일 분석 시작: {}", path.display()));

        self.emit("텍스트 추출 중...");
        let text = self.extractor.extract(path)?;
        self.checkpoint()?;

        let analysis = self.analyzer.analyze(&text).await?;
        self.checkpoint()?;

        info!(
            path = %path.display(),
            findings = analysis.findings.len(),
            risk_score = analysis.result.risk_score,
            "file analyzed"
        );
        Ok(FileReport::ok(path, text, analysis))
    }

    /// Analyze many files, continuing past per-file failures.
    ///
    /// # Errors
    /// Only `Error::Cancelled`; any other per-file error is captured in its
    /// report.
    pub async fn analyze_batch(&self, paths: &[PathBuf]) -> Result<Vec<FileReport>> {
        let mut reports = Vec::with_capacity(paths.len());
        for (index, path) in paths.iter().enumerate() {
            self.emit(&format!("일괄 분석 {}/{}", index + 1, paths.len()));
            match self.analyze_file(path).await {
                Ok(report) => reports.push(report),
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "file failed, continuing batch");
                    reports.push(FileReport::failed(path, &err));
                }
            }
        }
        Ok(reports)
    }

    fn checkpoint(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    fn emit(&self, message: &str) {
        (self.status)(message);
    }
}
