//! Remediation recommendations
//!
//! Strategy seam with a rule-based default. The engine sees the merged
//! finding set and the scored result and returns ordered Korean-language
//! action items; callers top the list up to at least three entries.

use docshield_core::{AnalysisResult, Finding, LegalCategory, RiskLevel};

/// Minimum number of recommendations every analysis ships with
pub const MIN_RECOMMENDATIONS: usize = 3;

/// Pluggable recommendation strategy
pub trait RecommendationEngine: Send + Sync {
    fn generate(&self, findings: &[Finding], result: &AnalysisResult) -> Vec<String>;
}

/// Default engine driven by category presence and the overall risk level
pub struct RuleBasedRecommendations;

impl RuleBasedRecommendations {
    fn has_category(findings: &[Finding], category: LegalCategory) -> bool {
        findings.iter().any(|f| f.legal_category == category)
    }
}

impl RecommendationEngine for RuleBasedRecommendations {
    fn generate(&self, findings: &[Finding], result: &AnalysisResult) -> Vec<String> {
        let mut recommendations = Vec::new();

        if Self::has_category(findings, LegalCategory::UniqueIdentifier) {
            recommendations.push(
                "고유식별정보(주민등록번호 등)는 즉시 마스킹하거나 삭제하세요. \
                 보관이 불가피하면 암호화가 법적 의무입니다(제24조)."
                    .to_string(),
            );
        }
        if Self::has_category(findings, LegalCategory::Financial) {
            recommendations.push(
                "계좌번호·카드번호는 노출 자체가 금지됩니다(제34조의2). \
                 즉시 삭제 또는 마스킹 조치하세요."
                    .to_string(),
            );
        }
        if Self::has_category(findings, LegalCategory::Sensitive) {
            recommendations.push(
                "민감정보는 원칙적으로 처리가 금지됩니다(제23조). \
                 별도 동의 확보 여부를 확인하세요."
                    .to_string(),
            );
        }
        if Self::has_category(findings, LegalCategory::General) {
            recommendations.push(
                "연락처·이메일 등 일반 개인정보는 수집 목적 달성 후 지체 없이 파기하세요."
                    .to_string(),
            );
        }

        match result.risk_level {
            RiskLevel::Severe | RiskLevel::High => {
                recommendations.push(
                    "문서 접근 권한을 최소 인원으로 제한하고 암호화 저장을 적용하세요."
                        .to_string(),
                );
            }
            RiskLevel::Moderate => {
                recommendations.push(
                    "문서 공유 전 마스킹 기능으로 개인정보를 가린 사본을 사용하세요."
                        .to_string(),
                );
            }
            RiskLevel::Low => {}
        }

        // Generic hygiene items guarantee the minimum list length
        let fillers = [
            "개인정보 처리방침과 보유 기간을 점검하세요.",
            "정기적으로 문서 내 개인정보 보유 현황을 점검하세요.",
            "불필요한 개인정보가 포함된 문서는 안전하게 파기하세요.",
        ];
        for filler in fillers {
            if recommendations.len() >= MIN_RECOMMENDATIONS {
                break;
            }
            recommendations.push(filler.to_string());
        }

        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshield_core::{Confidence, InfoType, Method};

    fn finding(info_type: InfoType) -> Finding {
        Finding::new(
            info_type,
            "value",
            0,
            5,
            "",
            Method::PatternMatch,
            Confidence::High,
            true,
        )
    }

    fn result_for(level: RiskLevel) -> AnalysisResult {
        AnalysisResult {
            risk_level: level,
            risk_score: 0,
            reasoning: String::new(),
            legal_violations: Vec::new(),
            category_summary: Default::default(),
            recommendations: Vec::new(),
        }
    }

    #[test]
    fn test_minimum_three_on_empty() {
        let engine = RuleBasedRecommendations;
        let recs = engine.generate(&[], &result_for(RiskLevel::Low));
        assert!(recs.len() >= MIN_RECOMMENDATIONS);
    }

    #[test]
    fn test_category_specific_items() {
        let engine = RuleBasedRecommendations;
        let findings = vec![finding(InfoType::ResidentId), finding(InfoType::Account)];
        let recs = engine.generate(&findings, &result_for(RiskLevel::High));
        assert!(recs.iter().any(|r| r.contains("고유식별정보")));
        assert!(recs.iter().any(|r| r.contains("제34조의2")));
        assert!(recs.iter().any(|r| r.contains("접근 권한")));
    }

    #[test]
    fn test_no_duplicate_fillers_when_specific_items_suffice() {
        let engine = RuleBasedRecommendations;
        let findings = vec![
            finding(InfoType::ResidentId),
            finding(InfoType::Account),
            finding(InfoType::Mobile),
        ];
        let recs = engine.generate(&findings, &result_for(RiskLevel::Severe));
        assert!(recs.len() >= MIN_RECOMMENDATIONS);
        assert!(!recs.iter().any(|r| r.contains("처리방침")));
    }
}
