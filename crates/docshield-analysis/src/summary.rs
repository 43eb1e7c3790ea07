//! Per-statute legal summary
//!
//! Groups findings by legal category and attaches the statutory basis and
//! handling requirement for each, with truncated sample values suitable
//! for display.

use docshield_core::{Finding, LegalCategory};
use serde::Serialize;

/// Sample values are cut to this many chars
const ITEM_VALUE_MAX_CHARS: usize = 20;

/// One legal category's slice of the findings, with its statute
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub category: LegalCategory,
    pub count: usize,
    pub statute: &'static str,
    pub requirement: &'static str,
    /// "type label: truncated value" per finding
    pub items: Vec<String>,
}

fn statute(category: LegalCategory) -> (&'static str, &'static str) {
    match category {
        LegalCategory::UniqueIdentifier => (
            "개인정보보호법 제24조",
            "원칙적 처리 제한, 법령 근거 필요, 암호화 의무",
        ),
        LegalCategory::Sensitive => (
            "개인정보보호법 제23조",
            "원칙적 처리 금지, 별도 동의 필요",
        ),
        LegalCategory::Financial => (
            "개인정보보호법 제34조의2",
            "노출 시 삭제·차단 조치 의무",
        ),
        LegalCategory::General => (
            "개인정보보호법 제2조",
            "수집 목적 내 처리, 안전성 확보 조치",
        ),
    }
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let cut: String = value.chars().take(max_chars).collect();
    format!("{cut}...")
}

/// Summarize findings per legal category, in statutory priority order.
/// Categories with no findings are omitted.
pub fn legal_summary(findings: &[Finding]) -> Vec<CategorySummary> {
    LegalCategory::ALL
        .iter()
        .filter_map(|category| {
            let items: Vec<String> = findings
                .iter()
                .filter(|f| f.legal_category == *category)
                .map(|f| {
                    format!(
                        "{}: {}",
                        f.info_type.label(),
                        truncate_chars(&f.value, ITEM_VALUE_MAX_CHARS)
                    )
                })
                .collect();
            if items.is_empty() {
                return None;
            }
            let (statute, requirement) = statute(*category);
            Some(CategorySummary {
                category: *category,
                count: items.len(),
                statute,
                requirement,
                items,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshield_core::{Confidence, InfoType, Method};

    fn finding(info_type: InfoType, value: &str) -> Finding {
        Finding::new(
            info_type,
            value,
            0,
            value.len(),
            "",
            Method::PatternMatch,
            Confidence::High,
            true,
        )
    }

    #[test]
    fn test_empty_categories_omitted() {
        let findings = vec![finding(InfoType::Mobile, "010-1234-5678")];
        let summary = legal_summary(&findings);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].category, LegalCategory::General);
        assert_eq!(summary[0].statute, "개인정보보호법 제2조");
    }

    #[test]
    fn test_category_ordering_and_counts() {
        let findings = vec![
            finding(InfoType::Mobile, "010-1234-5678"),
            finding(InfoType::ResidentId, "900101-1234567"),
            finding(InfoType::Account, "110-234-567890"),
            finding(InfoType::Email, "hong@example.com"),
        ];
        let summary = legal_summary(&findings);
        let categories: Vec<LegalCategory> = summary.iter().map(|s| s.category).collect();
        assert_eq!(
            categories,
            vec![
                LegalCategory::UniqueIdentifier,
                LegalCategory::Financial,
                LegalCategory::General,
            ]
        );
        assert_eq!(summary[2].count, 2);
    }

    #[test]
    fn test_long_value_truncated() {
        let long_address = "서울특별시 강남구 테헤란로 123 어느빌딩 45층 678호";
        let findings = vec![finding(InfoType::Address, long_address)];
        let summary = legal_summary(&findings);
        let item = &summary[0].items[0];
        assert!(item.starts_with("주소: "));
        assert!(item.ends_with("..."));
        let shown = item.trim_start_matches("주소: ").trim_end_matches("...");
        assert_eq!(shown.chars().count(), 20);
    }
}
