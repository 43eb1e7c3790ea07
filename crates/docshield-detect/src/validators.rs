//! Per-type format validators
//!
//! Pure sanity checks over a candidate string: digit counts, prefix
//! whitelists, not-all-identical digits, basic date plausibility. Validators
//! never see document context; contextual corroboration lives in
//! [`crate::context`].

use docshield_core::InfoType;

/// Capability contract: does this candidate string satisfy the basic format
/// of its claimed type?
pub trait FormatValidator: Send + Sync {
    fn validate(&self, value: &str) -> bool;
}

/// Strip separators (hyphens and whitespace) before digit checks
fn digits_only(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

fn all_numeric(digits: &str) -> bool {
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn all_identical(digits: &str) -> bool {
    let mut chars = digits.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => false,
    }
}

/// 13 digits with a plausible MMDD birth date in positions 2..6
fn valid_registration_shape(digits: &str) -> bool {
    if digits.len() != 13 || !all_numeric(digits) {
        return false;
    }
    let month: u32 = digits[2..4].parse().unwrap_or(0);
    let day: u32 = digits[4..6].parse().unwrap_or(0);
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

/// Resident registration number: 13 digits with a plausible birth date and
/// a gender code of 1-4
pub struct RrnValidator;

impl FormatValidator for RrnValidator {
    fn validate(&self, value: &str) -> bool {
        let digits = digits_only(value);
        valid_registration_shape(&digits) && matches!(&digits[6..7], "1" | "2" | "3" | "4")
    }
}

/// Foreigner registration number: same shape as an RRN, gender code 5-8
pub struct ForeignerIdValidator;

impl FormatValidator for ForeignerIdValidator {
    fn validate(&self, value: &str) -> bool {
        let digits = digits_only(value);
        valid_registration_shape(&digits) && matches!(&digits[6..7], "5" | "6" | "7" | "8")
    }
}

/// Mobile number: 10-11 digits with a carrier prefix
pub struct MobileValidator;

impl MobileValidator {
    const PREFIXES: [&'static str; 6] = ["010", "011", "016", "017", "018", "019"];
}

impl FormatValidator for MobileValidator {
    fn validate(&self, value: &str) -> bool {
        let digits = digits_only(value);
        if !(10..=11).contains(&digits.len()) || !all_numeric(&digits) {
            return false;
        }
        Self::PREFIXES.iter().any(|p| digits.starts_with(p))
    }
}

/// Landline number: 9-11 digits with an area-code prefix
pub struct LandlineValidator;

impl LandlineValidator {
    const PREFIXES: [&'static str; 19] = [
        "02", "031", "032", "033", "041", "042", "043", "044", "051", "052", "053", "054",
        "055", "061", "062", "063", "064", "070", "0507",
    ];
}

impl FormatValidator for LandlineValidator {
    fn validate(&self, value: &str) -> bool {
        let digits = digits_only(value);
        if !(9..=11).contains(&digits.len()) || !all_numeric(&digits) {
            return false;
        }
        Self::PREFIXES.iter().any(|p| digits.starts_with(p))
    }
}

/// Card number: exactly 16 digits, not all identical. No Luhn check: real
/// documents truncate and mistype card numbers often enough that the
/// checksum rejects true positives.
pub struct CardValidator;

impl FormatValidator for CardValidator {
    fn validate(&self, value: &str) -> bool {
        let digits = digits_only(value);
        digits.len() == 16 && all_numeric(&digits) && !all_identical(&digits)
    }
}

/// Account number: 10-14 digits, not all identical.
///
/// Note: the context check in [`crate::context`] re-checks length against
/// 10-16. The two bounds disagree on purpose; see DESIGN.md.
pub struct AccountValidator;

impl FormatValidator for AccountValidator {
    fn validate(&self, value: &str) -> bool {
        let digits = digits_only(value);
        (10..=14).contains(&digits.len()) && all_numeric(&digits) && !all_identical(&digits)
    }
}

/// IPv4 address: four octets in range, and not 0.0.0.0
pub struct Ipv4Validator;

impl FormatValidator for Ipv4Validator {
    fn validate(&self, value: &str) -> bool {
        let octets: Vec<&str> = value.split('.').collect();
        if octets.len() != 4 {
            return false;
        }
        let mut parsed = [0u32; 4];
        for (i, octet) in octets.iter().enumerate() {
            match octet.parse::<u32>() {
                Ok(n) if n <= 255 => parsed[i] = n,
                _ => return false,
            }
        }
        parsed.iter().any(|n| *n != 0)
    }
}

/// The validator for a type, if one is defined. Types without a validator
/// (email, address, sensitive clusters, custom patterns) rely on the
/// matching rule and context alone.
pub fn validator_for(info_type: &InfoType) -> Option<&'static dyn FormatValidator> {
    static RRN: RrnValidator = RrnValidator;
    static FOREIGNER: ForeignerIdValidator = ForeignerIdValidator;
    static MOBILE: MobileValidator = MobileValidator;
    static LANDLINE: LandlineValidator = LandlineValidator;
    static CARD: CardValidator = CardValidator;
    static ACCOUNT: AccountValidator = AccountValidator;
    static IPV4: Ipv4Validator = Ipv4Validator;

    match info_type {
        InfoType::ResidentId => Some(&RRN),
        InfoType::ForeignerId => Some(&FOREIGNER),
        InfoType::Mobile => Some(&MOBILE),
        InfoType::Landline => Some(&LANDLINE),
        InfoType::CreditCard => Some(&CARD),
        InfoType::Account => Some(&ACCOUNT),
        InfoType::IpAddress => Some(&IPV4),
        _ => None,
    }
}
