//! End-to-end analysis over a realistic mixed document

use docshield_analysis::{Analyzer, Masker, legal_summary};
use docshield_core::{InfoType, LegalCategory, LegalViolation, RiskLevel};

const DOCUMENT: &str = "\
인사기록 카드

성명: 홍길동
주민등록번호: 900101-1234567
휴대전화: 010-1234-5678
이메일: hong.gildong@example.co.kr
주소: 서울특별시 강남구 테헤란로 123
급여 계좌번호: 110-234-567890 (신한은행)

비고: 2023년 건강검진에서 고혈압 진단을 받아 투약 치료 중임.
";

#[test]
fn analyzes_mixed_document() {
    let analyzer = Analyzer::new();
    let (findings, result) = analyzer.analyze_rules(DOCUMENT).unwrap();

    let types: Vec<String> = findings.iter().map(|f| f.info_type.label()).collect();
    assert!(types.iter().any(|t| t == "주민등록번호"));
    assert!(types.iter().any(|t| t == "휴대전화"));
    assert!(types.iter().any(|t| t == "이메일"));
    assert!(types.iter().any(|t| t == "주소"));
    assert!(types.iter().any(|t| t == "계좌번호"));
    // the health keywords cluster into one sensitive finding
    assert!(findings
        .iter()
        .any(|f| matches!(f.info_type, InfoType::Sensitive(_))));

    // unique id + financial + sensitive + general across one document
    assert!(result.risk_score >= 75);
    assert_eq!(result.risk_level, RiskLevel::Severe);
    assert!(result
        .legal_violations
        .contains(&LegalViolation::UniqueIdentifierProcessing));
    assert!(result
        .legal_violations
        .contains(&LegalViolation::ExposedFinancialData));
    assert!(result.recommendations.len() >= 3);

    // no two findings claim the same text
    for i in 0..findings.len() {
        for j in (i + 1)..findings.len() {
            assert!(!findings[i].overlaps(&findings[j]));
        }
    }
}

#[test]
fn masked_document_hides_every_value() {
    let analyzer = Analyzer::new();
    let findings = analyzer.detect(DOCUMENT);
    let masked = Masker::mask(DOCUMENT, &findings);

    assert!(!masked.contains("900101-1234567"));
    assert!(!masked.contains("010-1234-5678"));
    assert!(!masked.contains("hong.gildong@example.co.kr"));
    assert!(masked.contains("010-****-5678"));
    // local part "hong.gildong" keeps its first char, 11 masked
    assert!(masked.contains("h***********@example.co.kr"));
    // untouched text survives
    assert!(masked.contains("인사기록 카드"));
    assert_eq!(masked.chars().count(), DOCUMENT.chars().count());
}

#[test]
fn legal_summary_covers_all_present_categories() {
    let analyzer = Analyzer::new();
    let findings = analyzer.detect_all(DOCUMENT);
    let summary = legal_summary(&findings);

    let categories: Vec<LegalCategory> = summary.iter().map(|s| s.category).collect();
    assert!(categories.contains(&LegalCategory::UniqueIdentifier));
    assert!(categories.contains(&LegalCategory::Financial));
    assert!(categories.contains(&LegalCategory::Sensitive));
    assert!(categories.contains(&LegalCategory::General));
}
