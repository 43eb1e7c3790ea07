//! DocShield Analysis History
//!
//! JSON-file record of past analyses, newest first, capped at 100
//! entries. The store is a plain file so users can inspect or wipe it
//! themselves; every operation reads and rewrites the whole file.

use chrono::{DateTime, Utc};
use docshield_core::{AnalysisResult, Finding, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Oldest entries are dropped beyond this many
pub const MAX_RECORDS: usize = 100;

/// One completed analysis, stored in full so past results can be
/// re-examined without the original file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: DateTime<Utc>,
    pub file_name: String,
    /// The complete risk assessment
    pub result: AnalysisResult,
    /// Every finding, spans and context included
    pub findings: Vec<Finding>,
    /// The analyzed text itself
    pub document_text: String,
    /// "rule-based" or the remote model name
    pub model: String,
}

impl HistoryRecord {
    pub fn new(
        file_name: impl Into<String>,
        result: AnalysisResult,
        findings: Vec<Finding>,
        document_text: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            file_name: file_name.into(),
            result,
            findings,
            document_text: document_text.into(),
            model: model.into(),
        }
    }
}

/// Aggregate view over the stored records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryStatistics {
    pub total: usize,
    pub average_score: f64,
    /// Records with score >= 75
    pub high_risk_count: usize,
}

/// File-backed history store
pub struct AnalysisHistory {
    path: PathBuf,
}

impl AnalysisHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Prepend a record, dropping the oldest beyond the cap
    pub fn append(&self, record: HistoryRecord) -> Result<()> {
        let mut records = self.load()?;
        records.insert(0, record);
        records.truncate(MAX_RECORDS);
        self.save(&records)
    }

    /// All records, newest first
    pub fn all(&self) -> Result<Vec<HistoryRecord>> {
        self.load()
    }

    /// The newest `limit` records
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>> {
        let mut records = self.load()?;
        records.truncate(limit);
        Ok(records)
    }

    /// Remove every record
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            debug!(path = %self.path.display(), "history cleared");
        }
        Ok(())
    }

    pub fn statistics(&self) -> Result<HistoryStatistics> {
        let records = self.load()?;
        let total = records.len();
        let average_score = if total == 0 {
            0.0
        } else {
            records.iter().map(|r| r.result.risk_score as f64).sum::<f64>() / total as f64
        };
        let high_risk_count = records
            .iter()
            .filter(|r| r.result.risk_score >= 75)
            .count();
        Ok(HistoryStatistics {
            total,
            average_score,
            high_risk_count,
        })
    }

    fn load(&self) -> Result<Vec<HistoryRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, records: &[HistoryRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshield_core::{Confidence, InfoType, Method, RiskLevel};
    use std::collections::BTreeMap;

    fn store(dir: &tempfile::TempDir) -> AnalysisHistory {
        AnalysisHistory::new(dir.path().join("history.json"))
    }

    fn result(score: u32) -> AnalysisResult {
        AnalysisResult {
            risk_level: RiskLevel::from_score(score),
            risk_score: score,
            reasoning: "테스트 분석".to_string(),
            legal_violations: Vec::new(),
            category_summary: BTreeMap::new(),
            recommendations: vec!["점검 바랍니다".to_string()],
        }
    }

    fn finding() -> Finding {
        Finding::new(
            InfoType::Mobile,
            "010-1234-5678",
            11,
            24,
            "연락처: 010-1234-5678",
            Method::PatternMatch,
            Confidence::High,
            true,
        )
    }

    fn record(name: &str, score: u32) -> HistoryRecord {
        HistoryRecord::new(
            name,
            result(score),
            vec![finding()],
            "연락처: 010-1234-5678",
            "rule-based",
        )
    }

    #[test]
    fn test_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let history = store(&dir);
        assert!(history.all().unwrap().is_empty());
        let stats = history.statistics().unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_score, 0.0);
    }

    #[test]
    fn test_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let history = store(&dir);
        history.append(record("first.txt", 10)).unwrap();
        history.append(record("second.txt", 20)).unwrap();

        let records = history.all().unwrap();
        assert_eq!(records[0].file_name, "second.txt");
        assert_eq!(records[1].file_name, "first.txt");
    }

    #[test]
    fn test_cap_drops_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let history = store(&dir);
        for i in 0..(MAX_RECORDS + 5) {
            history.append(record(&format!("doc{i}.txt"), 10)).unwrap();
        }

        let records = history.all().unwrap();
        assert_eq!(records.len(), MAX_RECORDS);
        assert_eq!(records[0].file_name, format!("doc{}.txt", MAX_RECORDS + 4));
        // the five oldest are gone
        assert!(!records.iter().any(|r| r.file_name == "doc0.txt"));
    }

    #[test]
    fn test_recent_limit() {
        let dir = tempfile::tempdir().unwrap();
        let history = store(&dir);
        for i in 0..10 {
            history.append(record(&format!("doc{i}.txt"), 10)).unwrap();
        }
        let recent = history.recent(3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].file_name, "doc9.txt");
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let history = store(&dir);
        history.append(record("doc.txt", 50)).unwrap();
        history.clear().unwrap();
        assert!(history.all().unwrap().is_empty());
        // clearing an already-empty store is fine
        history.clear().unwrap();
    }

    #[test]
    fn test_statistics() {
        let dir = tempfile::tempdir().unwrap();
        let history = store(&dir);
        history.append(record("low.txt", 10)).unwrap();
        history.append(record("high.txt", 80)).unwrap();
        history.append(record("severe.txt", 90)).unwrap();

        let stats = history.statistics().unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.average_score, 60.0);
        assert_eq!(stats.high_risk_count, 2);
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let dir = tempfile::tempdir().unwrap();
        let history = store(&dir);
        let original = record("doc.txt", 42);
        history.append(original.clone()).unwrap();

        let loaded = &history.all().unwrap()[0];
        assert_eq!(loaded, &original);
        // the full analysis survives the file round trip
        assert_eq!(loaded.result.risk_score, 42);
        assert_eq!(loaded.result.recommendations, original.result.recommendations);
        assert_eq!(loaded.findings.len(), 1);
        assert_eq!(loaded.findings[0].value, "010-1234-5678");
        assert_eq!(loaded.findings[0].info_type, InfoType::Mobile);
        assert_eq!(loaded.document_text, "연락처: 010-1234-5678");
        assert_eq!(loaded.model, "rule-based");
    }
}
