//! Context-window corroboration
//!
//! Given a detected span and its surrounding window, decide whether context
//! corroborates the detection and assign a confidence tier. The policy is
//! table-driven per type and is the authoritative source of confidence
//! semantics for the risk scorer:
//!
//! - Unique identifiers, card numbers, email: the format itself is proof.
//! - Account numbers: keyword corroboration is mandatory; the detector
//!   drops uncorroborated candidates outright.
//! - Addresses: kept either way, corroboration raises confidence.
//! - Phone numbers: format is trusted regardless; keywords only flip the
//!   `has_context` bit.

use docshield_core::{Confidence, InfoType};

const ACCOUNT_KEYWORDS: &[&str] = &[
    "계좌", "account", "입금", "예금", "은행", "bank", "송금", "적금",
];

const ADDRESS_KEYWORDS: &[&str] = &["주소", "거주지", "자택", "소재지", "address", "배송"];

const PHONE_KEYWORDS: &[&str] = &[
    "전화", "연락처", "휴대폰", "핸드폰", "tel", "phone", "mobile", "contact",
];

/// Digit-length bounds used by the account context re-check. Wider than the
/// format validator's 10-14 on purpose; see DESIGN.md.
const ACCOUNT_CONTEXT_DIGITS: std::ops::RangeInclusive<usize> = 10..=16;

#[derive(Debug, Default)]
pub struct ContextValidator;

impl ContextValidator {
    pub fn new() -> Self {
        Self
    }

    /// Returns `(has_context, confidence)` for a candidate and its window
    pub fn validate(
        &self,
        info_type: &InfoType,
        value: &str,
        window: &str,
    ) -> (bool, Confidence) {
        match info_type {
            InfoType::ResidentId
            | InfoType::ForeignerId
            | InfoType::Passport
            | InfoType::DriverLicense
            | InfoType::CreditCard
            | InfoType::Email => (true, Confidence::High),

            InfoType::Account => {
                let digit_count = value
                    .chars()
                    .filter(|c| *c != '-' && !c.is_whitespace())
                    .count();
                if !ACCOUNT_CONTEXT_DIGITS.contains(&digit_count) {
                    return (false, Confidence::Low);
                }
                if contains_keyword(window, ACCOUNT_KEYWORDS) {
                    (true, Confidence::High)
                } else {
                    (false, Confidence::Low)
                }
            }

            InfoType::Address => {
                if contains_keyword(window, ADDRESS_KEYWORDS) {
                    (true, Confidence::High)
                } else {
                    (false, Confidence::Medium)
                }
            }

            InfoType::Mobile | InfoType::Landline => {
                if contains_keyword(window, PHONE_KEYWORDS) {
                    (true, Confidence::High)
                } else {
                    // The number format itself is trusted
                    (false, Confidence::High)
                }
            }

            InfoType::IpAddress => (true, Confidence::Medium),

            _ => (false, Confidence::Medium),
        }
    }
}

fn contains_keyword(window: &str, keywords: &[&str]) -> bool {
    let window = window.to_lowercase();
    keywords.iter().any(|kw| window.contains(&kw.to_lowercase()))
}
