//! Static pattern library
//!
//! One authoritative matching rule per PII type, compiled once. Detection
//! runs in a fixed priority order: legally strictest and most
//! format-unambiguous types first, so that when two patterns could claim
//! overlapping text the more specific type wins (e.g. a mobile number is
//! never re-claimed as an account number).

use docshield_core::{Error, InfoType, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::RwLock;
use tracing::debug;

static RESIDENT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{6}[-\s]?[1-4]\d{6}\b").expect("resident id regex"));

static FOREIGNER_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{6}[-\s]?[5-8]\d{6}\b").expect("foreigner id regex"));

static PASSPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[MSRODG]\d{8}\b").expect("passport regex"));

static DRIVER_LICENSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{2}-\d{2}-\d{6}-\d{2}\b").expect("driver license regex"));

static CREDIT_CARD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{4}[- ]?\d{4}[- ]?\d{4}[- ]?\d{4}\b").expect("card regex")
});

static MOBILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b01[016789][- ]?\d{3,4}[- ]?\d{4}\b").expect("mobile regex"));

static LANDLINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b0(?:2|3[1-3]|4[1-4]|5[1-5]|6[1-4]|70)[- ]?\d{3,4}[- ]?\d{4}\b")
        .expect("landline regex")
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email regex")
});

// Deliberately loose; total digit count is enforced by the account
// validator and a context keyword is required to keep the finding
static ACCOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3,6}[- ]?\d{2,6}[- ]?\d{2,6}\b").expect("account regex"));

static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[가-힣]{1,8}(?:특별시|광역시|특별자치시|특별자치도|도|시)(?:\s*[가-힣]{1,8}(?:시|군|구)){1,2}\s*[가-힣0-9]{1,12}(?:로|길|동|읍|면)(?:\s*\d{1,4}(?:-\d{1,4})?(?:번지|호)?)?",
    )
    .expect("address regex")
});

static IP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\b")
        .expect("ip regex")
});

/// Built-in detection priority. The order is load-bearing: it decides which
/// type wins overlapping text (mobile before account, in particular).
static PRIORITY_ORDER: Lazy<Vec<InfoType>> = Lazy::new(|| {
    vec![
        InfoType::ResidentId,
        InfoType::ForeignerId,
        InfoType::Passport,
        InfoType::DriverLicense,
        InfoType::CreditCard,
        InfoType::Mobile,
        InfoType::Landline,
        InfoType::Email,
        InfoType::Account,
        InfoType::Address,
        InfoType::IpAddress,
    ]
});

fn builtin_pattern(info_type: &InfoType) -> Option<&'static Regex> {
    match info_type {
        InfoType::ResidentId => Some(&RESIDENT_ID_RE),
        InfoType::ForeignerId => Some(&FOREIGNER_ID_RE),
        InfoType::Passport => Some(&PASSPORT_RE),
        InfoType::DriverLicense => Some(&DRIVER_LICENSE_RE),
        InfoType::CreditCard => Some(&CREDIT_CARD_RE),
        InfoType::Mobile => Some(&MOBILE_RE),
        InfoType::Landline => Some(&LANDLINE_RE),
        InfoType::Email => Some(&EMAIL_RE),
        InfoType::Account => Some(&ACCOUNT_RE),
        InfoType::Address => Some(&ADDRESS_RE),
        InfoType::IpAddress => Some(&IP_RE),
        _ => None,
    }
}

/// Pattern table for one analyzer session
///
/// Built-in patterns are shared process-wide statics; custom patterns are
/// per-session state behind a lock so a session can be shared across
/// worker threads.
#[derive(Debug, Default)]
pub struct PatternLibrary {
    custom: RwLock<Vec<(String, Regex)>>,
}

impl PatternLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a runtime pattern. Invalid regexes are rejected here and
    /// never enter the detection set.
    pub fn add_custom_pattern(&self, name: &str, pattern: &str) -> Result<()> {
        let regex = Regex::new(pattern)
            .map_err(|e| Error::Config(format!("invalid custom pattern '{name}': {e}")))?;
        let mut custom = self
            .custom
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(entry) = custom.iter_mut().find(|(n, _)| n == name) {
            debug!(name, "replacing existing custom pattern");
            entry.1 = regex;
        } else {
            custom.push((name.to_string(), regex));
        }
        Ok(())
    }

    /// All types to run, in detection priority order: built-ins first, then
    /// custom patterns in registration order.
    pub fn detection_order(&self) -> Vec<InfoType> {
        let custom = self
            .custom
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        PRIORITY_ORDER
            .iter()
            .cloned()
            .chain(custom.iter().map(|(name, _)| InfoType::Custom(name.clone())))
            .collect()
    }

    /// All matches of one type's rule: `(start, end, matched_text)` with
    /// byte-offset spans and whitespace-trimmed values.
    pub fn match_all(&self, info_type: &InfoType, text: &str) -> Vec<(usize, usize, String)> {
        match info_type {
            InfoType::Custom(name) => {
                let custom = self
                    .custom
                    .read()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                match custom.iter().find(|(n, _)| n == name) {
                    Some((_, regex)) => collect_matches(regex, text),
                    None => Vec::new(),
                }
            }
            _ => match builtin_pattern(info_type) {
                Some(regex) => collect_matches(regex, text),
                None => Vec::new(),
            },
        }
    }
}

fn collect_matches(regex: &Regex, text: &str) -> Vec<(usize, usize, String)> {
    regex
        .find_iter(text)
        .map(|m| (m.start(), m.end(), m.as_str().trim().to_string()))
        .collect()
}
