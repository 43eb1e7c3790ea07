//! Deterministic risk scoring
//!
//! Weighted sum over legal-category counts, plus a category-diversity bonus
//! and a volume bonus, clamped to 100. Thresholds 25/50/75 map the score to
//! a risk level. The same finding set always produces the same result.

use docshield_core::{
    AnalysisResult, Finding, LegalCategory, LegalViolation, RiskLevel,
};
use std::collections::BTreeMap;
use tracing::debug;

const WEIGHT_UNIQUE_ID: u32 = 20;
const WEIGHT_FINANCIAL: u32 = 15;
const WEIGHT_SENSITIVE: u32 = 12;
const WEIGHT_GENERAL: u32 = 5;

pub struct RiskScorer;

impl RiskScorer {
    /// Score a merged finding set. Recommendations are filled in by the
    /// caller (they come from a separate strategy).
    pub fn evaluate(findings: &[Finding]) -> AnalysisResult {
        let mut category_summary: BTreeMap<LegalCategory, usize> =
            LegalCategory::ALL.iter().map(|c| (*c, 0)).collect();
        let mut exposure_prohibited_count = 0usize;

        for finding in findings {
            *category_summary.entry(finding.legal_category).or_insert(0) += 1;
            if finding.exposure_prohibited {
                exposure_prohibited_count += 1;
            }
        }

        let count = |category: LegalCategory| -> usize {
            category_summary.get(&category).copied().unwrap_or(0)
        };
        let unique_id_count = count(LegalCategory::UniqueIdentifier);
        let financial_count = count(LegalCategory::Financial);
        let sensitive_count = count(LegalCategory::Sensitive);
        let general_count = count(LegalCategory::General);

        let mut score = WEIGHT_UNIQUE_ID * unique_id_count as u32
            + WEIGHT_FINANCIAL * financial_count as u32
            + WEIGHT_SENSITIVE * sensitive_count as u32
            + WEIGHT_GENERAL * general_count as u32;

        // Category-diversity bonus: mixed exposure compounds legal risk
        let active_categories = category_summary.values().filter(|c| **c > 0).count();
        score += match active_categories {
            n if n >= 3 => 20,
            2 => 10,
            _ => 0,
        };

        // Volume bonus, highest applicable tier only
        let total = findings.len();
        score += match total {
            n if n >= 50 => 15,
            n if n >= 20 => 10,
            n if n >= 10 => 5,
            _ => 0,
        };

        let risk_score = score.min(100);
        let risk_level = RiskLevel::from_score(risk_score);

        let mut legal_violations = Vec::new();
        if unique_id_count > 0 {
            legal_violations.push(LegalViolation::UniqueIdentifierProcessing);
        }
        if sensitive_count > 0 {
            legal_violations.push(LegalViolation::SensitiveDataProcessing);
        }
        if exposure_prohibited_count > 0 {
            legal_violations.push(LegalViolation::ExposedFinancialData);
        }

        let reasoning = build_reasoning(
            total,
            unique_id_count,
            financial_count,
            sensitive_count,
            general_count,
            active_categories,
        );

        debug!(risk_score, ?risk_level, total, "scored finding set");

        AnalysisResult {
            risk_level,
            risk_score,
            reasoning,
            legal_violations,
            category_summary,
            recommendations: Vec::new(),
        }
    }
}

fn build_reasoning(
    total: usize,
    unique_id: usize,
    financial: usize,
    sensitive: usize,
    general: usize,
    active_categories: usize,
) -> String {
    let mut parts = vec![format!("총 {total}개의 개인정보가 탐지되었습니다.")];

    if unique_id > 0 {
        parts.push(format!(
            "고유식별정보 {unique_id}개 (제24조 - 처리제한, 암호화 의무)"
        ));
    }
    if financial > 0 {
        parts.push(format!("금융정보 {financial}개 (제34조의2 - 노출금지)"));
    }
    if sensitive > 0 {
        parts.push(format!("민감정보 {sensitive}개 (제23조 - 원칙적 처리금지)"));
    }
    if general > 0 {
        parts.push(format!("일반개인정보 {general}개 (제2조 - 기본 보호)"));
    }
    if active_categories >= 2 {
        parts.push(format!(
            "{active_categories}가지 법적 분류의 개인정보가 혼재되어 복합적 위험도가 높습니다."
        ));
    }

    parts.join("\n")
}
