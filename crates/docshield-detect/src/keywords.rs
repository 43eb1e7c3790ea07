//! Sensitive-keyword clustering (art. 23)
//!
//! Raw keyword presence alone produces massive false positives: the statute
//! only covers information *about a specific individual*. The pass therefore
//! works in three steps:
//!
//! 1. Scan for every occurrence of the sensitive-category vocabulary.
//! 2. Cluster occurrences whose gap is at most [`CLUSTER_GAP`] bytes into a
//!    single candidate, so co-located keywords are not overcounted.
//! 3. Keep a cluster only when a tiered personal-connection test links it to
//!    an identifiable person: a direct textual pattern in the immediate
//!    context, an identifying pattern within [`INDIRECT_RADIUS`] bytes, or a
//!    document-type signal in the first [`DOC_HEADER_LEN`] bytes.

use crate::window::{context_window, head, normalized_window};
use aho_corasick::AhoCorasick;
use docshield_core::{Confidence, Finding, InfoType, Method, SensitiveCategory};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Maximum byte gap between keyword occurrences in one cluster. Models
/// "same sentence/context". Tunable; chosen empirically, not derived.
pub const CLUSTER_GAP: usize = 50;

/// Radius of the expanded context window around a cluster
pub const CLUSTER_CONTEXT_RADIUS: usize = 150;

/// Radius of the indirect-connection search around a cluster start
pub const INDIRECT_RADIUS: usize = 500;

/// Length of the document-header slice checked for document-type keywords
pub const DOC_HEADER_LEN: usize = 500;

/// Trigger vocabulary per sensitive sub-category
static SENSITIVE_KEYWORDS: &[(SensitiveCategory, &[&str])] = &[
    (
        SensitiveCategory::Health,
        &[
            "진단", "질병", "질환", "병력", "투병", "수술", "입원", "처방", "우울증",
            "정신과", "당뇨", "고혈압", "암진단", "장애등급", "HIV", "에이즈",
        ],
    ),
    (
        SensitiveCategory::CriminalRecord,
        &["전과", "범죄경력", "형사처벌", "벌금형", "징역", "기소", "수사 대상"],
    ),
    (
        SensitiveCategory::Belief,
        &["종교", "기독교", "불교", "천주교", "이슬람", "사상", "신념", "정치적 견해"],
    ),
    (
        SensitiveCategory::UnionParty,
        &["노동조합", "노조 가입", "정당 가입", "당원", "조합원"],
    ),
    (
        SensitiveCategory::SexualLife,
        &["성적 지향", "성생활", "동성애", "성소수자"],
    ),
];

/// Direct-connection patterns: the immediate context names a person
static DIRECT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Personal-info field labels
        r"(?:성명|이름|환자|회원|피보험자|가입자|신청인)\s*[:：]",
        r"(?i)(?:name|patient|member|policyholder|applicant)\s*:",
        // Possessive/relational phrasing
        r"[가-힣]{2,4}(?:씨|님|의|은|는|이|가)\s*(?:건강|진단|병력|종교|신앙|정당)",
        r"본인의?\s*(?:건강|진단|병력|종교|신앙|정당)",
        // Institutional document-type phrases
        r"진단서|소견서|처방전|의무기록|건강검진|가입신청",
        r"인사기록|신상명세|이력서|입사지원",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("direct-connection regex"))
    .collect()
});

/// Indirect-connection patterns: another directly identifying item nearby
static IDENTIFIER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\d{6}[-\s]?[1-4]\d{6}",
        r"01[016789][-\s]?\d{3,4}[-\s]?\d{4}",
        r"(?:성명|이름)\s*[:：]\s*[가-힣]{2,4}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("identifier regex"))
    .collect()
});

/// Document-type keywords checked against the document header
static DOCUMENT_TYPE_KEYWORDS: &[&str] = &[
    "인사기록", "신상명세", "이력서", "입사지원", "건강검진", "진단서", "소견서",
    "처방전", "의무기록", "가입신청", "개인정보", "회원정보", "환자정보", "고객정보",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connection {
    Direct,
    Indirect,
    None,
}

#[derive(Debug)]
struct RawMatch {
    category: SensitiveCategory,
    keyword: &'static str,
    start: usize,
    end: usize,
}

/// Keyword-pass detector. The automaton is built once per instance.
pub struct KeywordClusterer {
    automaton: AhoCorasick,
    entries: Vec<(SensitiveCategory, &'static str)>,
}

impl Default for KeywordClusterer {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordClusterer {
    pub fn new() -> Self {
        let entries: Vec<(SensitiveCategory, &'static str)> = SENSITIVE_KEYWORDS
            .iter()
            .flat_map(|(category, keywords)| keywords.iter().map(|kw| (*category, *kw)))
            .collect();
        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(entries.iter().map(|(_, kw)| *kw))
            .expect("keyword automaton");
        Self { automaton, entries }
    }

    /// Run the keyword pass; returns cluster findings sorted by start
    pub fn detect(&self, text: &str) -> Vec<Finding> {
        let mut raw: Vec<RawMatch> = self
            .automaton
            .find_overlapping_iter(text)
            .map(|m| {
                let (category, keyword) = self.entries[m.pattern().as_usize()];
                RawMatch {
                    category,
                    keyword,
                    start: m.start(),
                    end: m.end(),
                }
            })
            .collect();

        if raw.is_empty() {
            return Vec::new();
        }
        raw.sort_by_key(|m| m.start);

        let mut findings = Vec::new();
        for cluster in cluster_matches(&raw) {
            let start = cluster.iter().map(|m| m.start).min().unwrap_or(0);
            let end = cluster.iter().map(|m| m.end).max().unwrap_or(0);
            let context = normalized_window(text, start, end, CLUSTER_CONTEXT_RADIUS);

            let connection = self.personal_connection(&context, text, start);
            if connection == Connection::None {
                debug!(start, "discarded keyword cluster without personal connection");
                continue;
            }

            findings.push(cluster_finding(&cluster, connection, start, end, context));
        }
        findings
    }

    /// Tiered test that a cluster is about an identifiable individual
    fn personal_connection(&self, context: &str, text: &str, position: usize) -> Connection {
        if DIRECT_PATTERNS.iter().any(|p| p.is_match(context)) {
            return Connection::Direct;
        }

        let nearby = context_window(text, position, position, INDIRECT_RADIUS);
        if IDENTIFIER_PATTERNS.iter().any(|p| p.is_match(nearby)) {
            return Connection::Indirect;
        }

        let header = head(text, DOC_HEADER_LEN).to_lowercase();
        if DOCUMENT_TYPE_KEYWORDS.iter().any(|kw| header.contains(kw)) {
            return Connection::Indirect;
        }

        Connection::None
    }
}

/// Group sorted matches into clusters with gaps of at most [`CLUSTER_GAP`]
fn cluster_matches<'a>(raw: &'a [RawMatch]) -> Vec<Vec<&'a RawMatch>> {
    let mut clusters: Vec<Vec<&RawMatch>> = Vec::new();
    let mut current: Vec<&RawMatch> = vec![&raw[0]];

    for m in &raw[1..] {
        let last_end = current.last().map(|c| c.end).unwrap_or(0);
        if m.start.saturating_sub(last_end) <= CLUSTER_GAP {
            current.push(m);
        } else {
            clusters.push(std::mem::replace(&mut current, vec![m]));
        }
    }
    clusters.push(current);
    clusters
}

fn cluster_finding(
    cluster: &[&RawMatch],
    connection: Connection,
    start: usize,
    end: usize,
    context: String,
) -> Finding {
    // Representative sub-category by fixed priority
    let category = SensitiveCategory::PRIORITY
        .iter()
        .copied()
        .find(|p| cluster.iter().any(|m| m.category == *p))
        .unwrap_or(cluster[0].category);

    // Distinct keywords in first-occurrence order
    let mut keywords: Vec<&str> = Vec::new();
    for m in cluster {
        if !keywords.contains(&m.keyword) {
            keywords.push(m.keyword);
        }
    }
    let value = if keywords.len() == 1 {
        keywords[0].to_string()
    } else {
        format!("{} 외 {}개", keywords[0], keywords.len() - 1)
    };

    let confidence = if connection == Connection::Direct {
        Confidence::High
    } else {
        Confidence::Medium
    };

    Finding::new(
        InfoType::Sensitive(category),
        value,
        start,
        end,
        context,
        Method::KeywordCluster,
        confidence,
        true,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshield_core::LegalCategory;

    #[test]
    fn test_nearby_keywords_merge_into_one_cluster() {
        let clusterer = KeywordClusterer::new();
        // "진단" and "수술" are ~30 bytes apart, inside the cluster gap
        let text = "환자: 홍길동, 위암 진단 후 다음 주에 위 절제 수술 예정입니다.";
        let findings = clusterer.detect(text);

        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].info_type,
            InfoType::Sensitive(SensitiveCategory::Health)
        );
        assert_eq!(findings[0].legal_category, LegalCategory::Sensitive);
        assert_eq!(findings[0].confidence, Confidence::High);
        assert!(findings[0].value.contains("외 1개"));
    }

    #[test]
    fn test_distant_keywords_form_separate_clusters() {
        let clusterer = KeywordClusterer::new();
        let filler = "-".repeat(80);
        let text = format!("환자: 김철수 진단 결과입니다. {filler} 환자: 김철수 수술 예정입니다.");
        let findings = clusterer.detect(&text);

        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn test_generic_mention_discarded() {
        let clusterer = KeywordClusterer::new();
        // No labels, no nearby identifier, no document-type header
        let text = "우리 회사는 모든 종교를 존중하는 문화를 지향합니다.";
        let findings = clusterer.detect(text);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_document_header_signal_retains_cluster() {
        let clusterer = KeywordClusterer::new();
        let text = format!(
            "환자정보 관리 대장\n{}\n해당 항목에는 우울증 여부를 기재합니다.",
            "-".repeat(600)
        );
        let findings = clusterer.detect(&text);

        assert_eq!(findings.len(), 1);
        // Header signal is an indirect connection
        assert_eq!(findings[0].confidence, Confidence::Medium);
    }

    #[test]
    fn test_nearby_identifier_is_indirect_connection() {
        let clusterer = KeywordClusterer::new();
        let text = "대상자 연락처 010-1234-5678 관련 메모: 당뇨 판정 이력 있음";
        let findings = clusterer.detect(text);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].confidence, Confidence::Medium);
        assert_eq!(findings[0].method, Method::KeywordCluster);
    }

    #[test]
    fn test_direct_label_beats_indirect() {
        let clusterer = KeywordClusterer::new();
        let text = "성명: 이영희, 010-1234-5678, 불교 신자";
        let findings = clusterer.detect(text);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].confidence, Confidence::High);
        assert_eq!(
            findings[0].info_type,
            InfoType::Sensitive(SensitiveCategory::Belief)
        );
    }

    #[test]
    fn test_category_priority_health_first() {
        let clusterer = KeywordClusterer::new();
        // Belief and health keywords in one cluster; health wins
        let text = "환자: 박민수, 종교 활동 중 부상으로 수술 받음";
        let findings = clusterer.detect(text);

        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].info_type,
            InfoType::Sensitive(SensitiveCategory::Health)
        );
    }

    #[test]
    fn test_single_keyword_value_is_plain() {
        let clusterer = KeywordClusterer::new();
        let text = "환자: 정수진, 우울증 치료 중";
        let findings = clusterer.detect(text);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].value, "우울증");
    }
}
