//! The `Analyzer` facade
//!
//! One entry point over the detection passes, the scorer, the
//! recommendation engine and the optional remote model. The rule-based
//! result is always computed; a configured remote analyzer may replace it
//! wholesale (never field-merged), with the rule-based result kept as the
//! fallback when the remote attempt fails.

use crate::recommend::{
    MIN_RECOMMENDATIONS, RecommendationEngine, RuleBasedRecommendations,
};
use crate::scorer::RiskScorer;
use crate::summary::{CategorySummary, legal_summary};
use crate::Masker;
use async_trait::async_trait;
use docshield_core::{
    AnalysisResult, CancelFlag, Confidence, Error, Finding, InfoType, Method, Result,
    StatusSink, null_status_sink,
};
use docshield_detect::detector::CONTEXT_RADIUS;
use docshield_detect::window::normalized_window;
use docshield_detect::{KeywordClusterer, SpanDetector, merge_findings};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Model tag reported when no remote model contributed to the result
pub const RULE_BASED_MODEL: &str = "rule-based";

/// One item a remote model claims to have found, by label and value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFinding {
    #[serde(rename = "type")]
    pub type_label: String,
    pub value: String,
}

/// A remote model's complete verdict
#[derive(Debug, Clone)]
pub struct RemoteAnalysis {
    /// Name of the model that produced the verdict
    pub model: String,
    pub result: AnalysisResult,
    pub detected: Vec<RemoteFinding>,
}

/// Remote-model seam; implemented by the Ollama client and by test doubles
#[async_trait]
pub trait RemoteAnalyzer: Send + Sync {
    /// Analyze the text, given the rule-based findings as grounding
    async fn analyze(&self, text: &str, findings: &[Finding]) -> Result<RemoteAnalysis>;

    /// Cheap reachability probe
    async fn is_available(&self) -> bool;
}

/// Full analysis output for one document
#[derive(Debug, Clone, Serialize)]
pub struct DocumentAnalysis {
    pub findings: Vec<Finding>,
    pub result: AnalysisResult,
    /// `RULE_BASED_MODEL` or the remote model name
    pub model: String,
}

pub struct Analyzer {
    detector: SpanDetector,
    clusterer: KeywordClusterer,
    recommender: Box<dyn RecommendationEngine>,
    remote: Option<Arc<dyn RemoteAnalyzer>>,
    status: StatusSink,
    cancel: CancelFlag,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            detector: SpanDetector::new(),
            clusterer: KeywordClusterer::new(),
            recommender: Box::new(RuleBasedRecommendations),
            remote: None,
            status: null_status_sink(),
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_remote(mut self, remote: Arc<dyn RemoteAnalyzer>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_status(mut self, status: StatusSink) -> Self {
        self.status = status;
        self
    }

    pub fn with_recommender(mut self, recommender: Box<dyn RecommendationEngine>) -> Self {
        self.recommender = recommender;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Register a user-defined pattern under `name`
    pub fn add_custom_pattern(&self, name: &str, pattern: &str) -> Result<()> {
        self.detector.add_custom_pattern(name, pattern)
    }

    /// Pattern-matching pass only
    pub fn detect(&self, text: &str) -> Vec<Finding> {
        self.detector.detect(text)
    }

    /// Sensitive-keyword clustering pass only
    pub fn detect_keywords(&self, text: &str) -> Vec<Finding> {
        self.clusterer.detect(text)
    }

    /// Both passes, merged and sorted
    pub fn detect_all(&self, text: &str) -> Vec<Finding> {
        merge_findings(self.detector.detect(text), self.clusterer.detect(text))
    }

    /// Rule-based analysis: detect, score, recommend. The cancel flag is
    /// checked between detection and scoring.
    ///
    /// # Errors
    /// `Error::Cancelled` when the flag is raised.
    pub fn analyze_rules(&self, text: &str) -> Result<(Vec<Finding>, AnalysisResult)> {
        self.emit("패턴 분석 중...");
        let regex_findings = self.detector.detect(text);
        self.emit("민감정보 키워드 분석 중...");
        let keyword_findings = self.clusterer.detect(text);
        let findings = merge_findings(regex_findings, keyword_findings);
        self.checkpoint()?;

        self.emit("위험도 평가 중...");
        let mut result = RiskScorer::evaluate(&findings);
        result.recommendations = self.recommender.generate(&findings, &result);
        Ok((findings, result))
    }

    /// Full analysis. The rule-based result is always computed first; if a
    /// remote analyzer is configured and succeeds, its result replaces the
    /// rule-based one entirely and its detected items are merged into the
    /// finding list by value.
    pub async fn analyze(&self, text: &str) -> Result<DocumentAnalysis> {
        let (mut findings, mut result) = self.analyze_rules(text)?;
        let mut model = RULE_BASED_MODEL.to_string();

        if let Some(remote) = &self.remote {
            self.emit("AI 모델 분석 중...");
            match remote.analyze(text, &findings).await {
                Ok(remote_analysis) => {
                    info!(model = %remote_analysis.model, "remote analysis accepted");
                    self.merge_remote_findings(text, &mut findings, remote_analysis.detected);
                    result = remote_analysis.result;
                    self.top_up_recommendations(&findings, &mut result);
                    model = remote_analysis.model;
                }
                Err(err) => {
                    warn!(error = %err, "remote analysis failed, keeping rule-based result");
                    self.emit("AI 분석 실패 - 규칙 기반 결과를 사용합니다");
                }
            }
        }

        self.emit("분석 완료");
        Ok(DocumentAnalysis {
            findings,
            result,
            model,
        })
    }

    /// Masked copy of the text
    pub fn mask(&self, text: &str, findings: &[Finding]) -> String {
        Masker::mask(text, findings)
    }

    /// Per-statute summary of the findings
    pub fn legal_summary(&self, findings: &[Finding]) -> Vec<CategorySummary> {
        legal_summary(findings)
    }

    fn emit(&self, message: &str) {
        (self.status)(message);
    }

    fn checkpoint(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    /// Add remote-detected items the rule passes missed. Items are matched
    /// by value; anything not locatable in the text is dropped rather than
    /// given a fabricated span.
    fn merge_remote_findings(
        &self,
        text: &str,
        findings: &mut Vec<Finding>,
        detected: Vec<RemoteFinding>,
    ) {
        for item in detected {
            if item.value.is_empty() || findings.iter().any(|f| f.value == item.value) {
                continue;
            }
            let Some(start) = text.find(&item.value) else {
                debug!(value = %item.value, "remote item not present in text, dropped");
                continue;
            };
            let end = start + item.value.len();
            findings.push(Finding::new(
                InfoType::from_label(&item.type_label),
                item.value,
                start,
                end,
                normalized_window(text, start, end, CONTEXT_RADIUS),
                Method::RemoteModel,
                Confidence::Medium,
                false,
            ));
        }
        findings.sort_by_key(|f| f.start);
    }

    fn top_up_recommendations(&self, findings: &[Finding], result: &mut AnalysisResult) {
        if result.recommendations.len() >= MIN_RECOMMENDATIONS {
            return;
        }
        for rec in self.recommender.generate(findings, result) {
            if result.recommendations.len() >= MIN_RECOMMENDATIONS {
                break;
            }
            if !result.recommendations.contains(&rec) {
                result.recommendations.push(rec);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshield_core::{Error, RiskLevel};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    struct FakeRemote {
        response: Mutex<Option<Result<RemoteAnalysis>>>,
    }

    impl FakeRemote {
        fn ok(analysis: RemoteAnalysis) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(Ok(analysis))),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(Err(Error::Remote(
                    "connection refused".to_string(),
                )))),
            })
        }
    }

    #[async_trait]
    impl RemoteAnalyzer for FakeRemote {
        async fn analyze(
            &self,
            _text: &str,
            _findings: &[Finding],
        ) -> Result<RemoteAnalysis> {
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(Error::Remote("exhausted".to_string())))
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    fn remote_verdict(detected: Vec<RemoteFinding>) -> RemoteAnalysis {
        RemoteAnalysis {
            model: "llama3".to_string(),
            result: AnalysisResult {
                risk_level: RiskLevel::Severe,
                risk_score: 90,
                reasoning: "remote reasoning".to_string(),
                legal_violations: Vec::new(),
                category_summary: BTreeMap::new(),
                recommendations: vec!["remote rec".to_string()],
            },
            detected,
        }
    }

    const SAMPLE: &str = "주민등록번호: 900101-1234567, 연락처: 010-1234-5678";

    #[test]
    fn test_rule_based_analysis() {
        let analyzer = Analyzer::new();
        let (findings, result) = analyzer.analyze_rules(SAMPLE).unwrap();
        assert_eq!(findings.len(), 2);
        assert!(result.risk_score >= 25);
        assert!(result.recommendations.len() >= 3);
    }

    #[test]
    fn test_cancel_between_detection_and_scoring() {
        let cancel = CancelFlag::new();
        // raise the flag while the keyword pass is announced, before scoring
        let flag = cancel.clone();
        let messages: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let collected = Arc::clone(&messages);
        let sink: StatusSink = Arc::new(move |msg| {
            if msg.contains("키워드 분석") {
                flag.cancel();
            }
            collected.lock().unwrap().push(msg.to_string());
        });

        let analyzer = Analyzer::new().with_cancel(cancel).with_status(sink);
        let err = analyzer.analyze_rules(SAMPLE).unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        // scoring never started
        let messages = messages.lock().unwrap();
        assert!(!messages.iter().any(|m| m.contains("위험도 평가")));
    }

    #[tokio::test]
    async fn test_analyze_without_remote_uses_rules() {
        let analyzer = Analyzer::new();
        let analysis = analyzer.analyze(SAMPLE).await.unwrap();
        assert_eq!(analysis.model, RULE_BASED_MODEL);
        assert_eq!(analysis.findings.len(), 2);
    }

    #[tokio::test]
    async fn test_remote_result_replaces_wholesale() {
        let analyzer = Analyzer::new().with_remote(FakeRemote::ok(remote_verdict(vec![])));
        let analysis = analyzer.analyze(SAMPLE).await.unwrap();
        assert_eq!(analysis.model, "llama3");
        assert_eq!(analysis.result.risk_score, 90);
        assert_eq!(analysis.result.reasoning, "remote reasoning");
        // topped up to the minimum even though the remote sent one
        assert!(analysis.result.recommendations.len() >= 3);
        assert_eq!(analysis.result.recommendations[0], "remote rec");
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_rules() {
        let analyzer = Analyzer::new().with_remote(FakeRemote::failing());
        let analysis = analyzer.analyze(SAMPLE).await.unwrap();
        assert_eq!(analysis.model, RULE_BASED_MODEL);
        assert_eq!(analysis.findings.len(), 2);
        assert!(analysis.result.recommendations.len() >= 3);
    }

    #[tokio::test]
    async fn test_remote_detected_items_merged_by_value() {
        let text = "이름: 홍길동, 주민등록번호: 900101-1234567";
        let detected = vec![
            RemoteFinding {
                type_label: "이름".to_string(),
                value: "홍길동".to_string(),
            },
            // duplicate of a rule finding, must not double up
            RemoteFinding {
                type_label: "주민등록번호".to_string(),
                value: "900101-1234567".to_string(),
            },
            // not present in the text, must be dropped
            RemoteFinding {
                type_label: "이름".to_string(),
                value: "김철수".to_string(),
            },
        ];
        let analyzer = Analyzer::new().with_remote(FakeRemote::ok(remote_verdict(detected)));
        let analysis = analyzer.analyze(text).await.unwrap();

        let names: Vec<&Finding> = analysis
            .findings
            .iter()
            .filter(|f| f.method == Method::RemoteModel)
            .collect();
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].value, "홍길동");
        assert_eq!(names[0].info_type, InfoType::Custom("이름".to_string()));
        // rule finding kept exactly once
        assert_eq!(
            analysis
                .findings
                .iter()
                .filter(|f| f.value == "900101-1234567")
                .count(),
            1
        );
        // sorted by start after the merge
        assert!(analysis.findings.windows(2).all(|w| w[0].start <= w[1].start));
    }

    #[tokio::test]
    async fn test_status_messages_emitted() {
        let messages: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let collected = Arc::clone(&messages);
        let sink: StatusSink = Arc::new(move |msg| {
            collected.lock().unwrap().push(msg.to_string());
        });

        let analyzer = Analyzer::new().with_status(sink);
        analyzer.analyze(SAMPLE).await.unwrap();

        let messages = messages.lock().unwrap();
        assert!(messages.iter().any(|m| m.contains("패턴 분석")));
        assert!(messages.last().unwrap().contains("분석 완료"));
    }

    #[test]
    fn test_custom_pattern_through_facade() {
        let analyzer = Analyzer::new();
        analyzer.add_custom_pattern("사번", r"EMP-\d{6}").unwrap();
        let findings = analyzer.detect("사원번호 EMP-123456 확인");
        assert!(findings
            .iter()
            .any(|f| f.info_type == InfoType::Custom("사번".to_string())));
    }
}
