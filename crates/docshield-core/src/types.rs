//! PII taxonomy and analysis result types
//!
//! The legal classification follows the Korean Personal Information
//! Protection Act (PIPA):
//! - Unique identifiers (art. 24): resident/foreigner registration numbers,
//!   passport and driver license numbers
//! - Sensitive information (art. 23): health, beliefs, union/party
//!   membership, criminal records, sexual life
//! - Financial information (art. 34-2): account and card numbers, whose mere
//!   exposure is prohibited
//! - General personal information (art. 2): phone numbers, email, address

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sub-categories of sensitive information under art. 23
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SensitiveCategory {
    Health,
    CriminalRecord,
    Belief,
    UnionParty,
    SexualLife,
}

impl SensitiveCategory {
    /// Representative-category priority when a cluster spans several
    /// sub-categories
    pub const PRIORITY: [SensitiveCategory; 5] = [
        SensitiveCategory::Health,
        SensitiveCategory::CriminalRecord,
        SensitiveCategory::Belief,
        SensitiveCategory::UnionParty,
        SensitiveCategory::SexualLife,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SensitiveCategory::Health => "건강정보",
            SensitiveCategory::CriminalRecord => "범죄경력",
            SensitiveCategory::Belief => "사상_신념",
            SensitiveCategory::UnionParty => "노동조합_정당",
            SensitiveCategory::SexualLife => "성생활",
        }
    }
}

/// Type of a detected piece of personal information
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoType {
    /// Resident registration number (주민등록번호)
    ResidentId,

    /// Foreigner registration number (외국인등록번호)
    ForeignerId,

    /// Passport number (여권번호)
    Passport,

    /// Driver license number (운전면허번호)
    DriverLicense,

    /// Credit/debit card number (카드번호)
    CreditCard,

    /// Mobile phone number (휴대전화)
    Mobile,

    /// Landline phone number (전화번호)
    Landline,

    /// Email address (이메일)
    Email,

    /// Bank account number (계좌번호)
    Account,

    /// Postal address (주소)
    Address,

    /// IP address (IP주소)
    IpAddress,

    /// Sensitive-category keyword cluster (민감정보)
    Sensitive(SensitiveCategory),

    /// User-registered custom pattern
    Custom(String),
}

impl InfoType {
    pub fn label(&self) -> String {
        match self {
            InfoType::ResidentId => "주민등록번호".to_string(),
            InfoType::ForeignerId => "외국인등록번호".to_string(),
            InfoType::Passport => "여권번호".to_string(),
            InfoType::DriverLicense => "운전면허번호".to_string(),
            InfoType::CreditCard => "카드번호".to_string(),
            InfoType::Mobile => "휴대전화".to_string(),
            InfoType::Landline => "전화번호".to_string(),
            InfoType::Email => "이메일".to_string(),
            InfoType::Account => "계좌번호".to_string(),
            InfoType::Address => "주소".to_string(),
            InfoType::IpAddress => "IP주소".to_string(),
            InfoType::Sensitive(cat) => cat.label().to_string(),
            InfoType::Custom(name) => name.clone(),
        }
    }

    /// Map a free-text type label (e.g. from a remote model response) back
    /// to a known type; unknown labels become `Custom`.
    pub fn from_label(label: &str) -> InfoType {
        match label {
            "주민등록번호" => InfoType::ResidentId,
            "외국인등록번호" => InfoType::ForeignerId,
            "여권번호" => InfoType::Passport,
            "운전면허번호" => InfoType::DriverLicense,
            "카드번호" => InfoType::CreditCard,
            "휴대전화" => InfoType::Mobile,
            "전화번호" => InfoType::Landline,
            "이메일" => InfoType::Email,
            "계좌번호" => InfoType::Account,
            "주소" => InfoType::Address,
            "IP주소" => InfoType::IpAddress,
            "건강정보" => InfoType::Sensitive(SensitiveCategory::Health),
            "범죄경력" => InfoType::Sensitive(SensitiveCategory::CriminalRecord),
            "사상_신념" => InfoType::Sensitive(SensitiveCategory::Belief),
            "노동조합_정당" => InfoType::Sensitive(SensitiveCategory::UnionParty),
            "성생활" => InfoType::Sensitive(SensitiveCategory::SexualLife),
            other => InfoType::Custom(other.to_string()),
        }
    }

    /// Legal classification under PIPA; anything without an explicit
    /// statutory bucket is general personal information.
    pub fn legal_category(&self) -> LegalCategory {
        match self {
            InfoType::ResidentId
            | InfoType::ForeignerId
            | InfoType::Passport
            | InfoType::DriverLicense => LegalCategory::UniqueIdentifier,
            InfoType::CreditCard | InfoType::Account => LegalCategory::Financial,
            InfoType::Sensitive(_) => LegalCategory::Sensitive,
            _ => LegalCategory::General,
        }
    }

    /// Financial data whose online exposure is itself a violation (art. 34-2)
    pub fn exposure_prohibited(&self) -> bool {
        matches!(self, InfoType::CreditCard | InfoType::Account)
    }
}

/// Statutory bucket driving the scoring weight
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LegalCategory {
    UniqueIdentifier,
    Sensitive,
    Financial,
    General,
}

impl LegalCategory {
    pub const ALL: [LegalCategory; 4] = [
        LegalCategory::UniqueIdentifier,
        LegalCategory::Sensitive,
        LegalCategory::Financial,
        LegalCategory::General,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LegalCategory::UniqueIdentifier => "고유식별정보",
            LegalCategory::Sensitive => "민감정보",
            LegalCategory::Financial => "금융정보",
            LegalCategory::General => "일반개인정보",
        }
    }
}

/// Reliability tier of a finding, based on format clarity and context
/// corroboration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Provenance of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    PatternMatch,
    KeywordCluster,
    RemoteModel,
}

/// Half-open interval overlap test over `[start, end)` spans
pub fn spans_overlap(start1: usize, end1: usize, start2: usize, end2: usize) -> bool {
    !(end1 <= start2 || end2 <= start1)
}

/// One detected PII occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Type of information detected
    pub info_type: InfoType,

    /// The matched substring, or a synthesized display value for keyword
    /// clusters
    pub value: String,

    /// Start byte offset in the source text (on a char boundary)
    pub start: usize,

    /// End byte offset, exclusive
    pub end: usize,

    /// Newline-normalized window of text surrounding the span
    pub context: String,

    /// How the finding was produced
    pub method: Method,

    /// Reliability tier
    pub confidence: Confidence,

    /// Statutory classification, derived from `info_type`
    pub legal_category: LegalCategory,

    /// True for financial types whose exposure is prohibited outright
    pub exposure_prohibited: bool,

    /// Whether surrounding context corroborated the detection
    pub has_context: bool,
}

impl Finding {
    /// Build a finding, deriving the legal classification from the type
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        info_type: InfoType,
        value: impl Into<String>,
        start: usize,
        end: usize,
        context: impl Into<String>,
        method: Method,
        confidence: Confidence,
        has_context: bool,
    ) -> Self {
        let legal_category = info_type.legal_category();
        let exposure_prohibited = info_type.exposure_prohibited();
        Self {
            info_type,
            value: value.into(),
            start,
            end,
            context: context.into(),
            method,
            confidence,
            legal_category,
            exposure_prohibited,
            has_context,
        }
    }

    pub fn overlaps(&self, other: &Finding) -> bool {
        spans_overlap(self.start, self.end, other.start, other.end)
    }
}

/// Overall disclosure-risk level, a pure function of the risk score
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Severe,
}

impl RiskLevel {
    /// Thresholds are inclusive lower bounds: 75 severe, 50 high, 25 moderate
    pub fn from_score(score: u32) -> RiskLevel {
        match score {
            75.. => RiskLevel::Severe,
            50.. => RiskLevel::High,
            25.. => RiskLevel::Moderate,
            _ => RiskLevel::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "낮음",
            RiskLevel::Moderate => "보통",
            RiskLevel::High => "높음",
            RiskLevel::Severe => "심각",
        }
    }

    pub fn from_label(label: &str) -> Option<RiskLevel> {
        match label.trim() {
            "낮음" => Some(RiskLevel::Low),
            "보통" => Some(RiskLevel::Moderate),
            "높음" => Some(RiskLevel::High),
            "심각" => Some(RiskLevel::Severe),
            _ => None,
        }
    }
}

/// Statute flags raised by the scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegalViolation {
    /// Art. 24, restriction on processing unique identifiers
    UniqueIdentifierProcessing,

    /// Art. 23, restriction on processing sensitive information
    SensitiveDataProcessing,

    /// Art. 34-2, deletion/blocking of exposed personal information
    ExposedFinancialData,
}

impl LegalViolation {
    pub fn label(&self) -> &'static str {
        match self {
            LegalViolation::UniqueIdentifierProcessing => {
                "제24조(고유식별정보 처리제한) 위반 가능성"
            }
            LegalViolation::SensitiveDataProcessing => {
                "제23조(민감정보 처리제한) 위반 가능성"
            }
            LegalViolation::ExposedFinancialData => {
                "제34조의2(노출된 개인정보 삭제·차단) 위반 가능성"
            }
        }
    }
}

/// Aggregate analysis result for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub risk_level: RiskLevel,

    /// Composite score, clamped to 0..=100
    pub risk_score: u32,

    /// Generated narrative explaining the score
    pub reasoning: String,

    /// Applicable-statute flags
    pub legal_violations: Vec<LegalViolation>,

    /// Finding count per legal category (all four keys always present)
    pub category_summary: BTreeMap<LegalCategory, usize>,

    /// Ordered remediation suggestions; at least 3 entries
    pub recommendations: Vec<String>,
}
