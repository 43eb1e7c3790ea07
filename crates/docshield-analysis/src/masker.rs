//! Type-aware masking transform
//!
//! Rewrites the source text left to right, replacing each finding's span
//! with a char-count-preserving masked rendition. Spans are byte offsets
//! on char boundaries; overlapping or out-of-order spans are skipped so a
//! malformed finding can never corrupt the surrounding text.

use docshield_core::{Finding, InfoType, LegalCategory};
use tracing::debug;

pub struct Masker;

impl Masker {
    /// Produce a masked copy of `text`. Findings outside the text bounds
    /// or overlapping an already-masked span are ignored.
    pub fn mask(text: &str, findings: &[Finding]) -> String {
        let mut ordered: Vec<&Finding> = findings.iter().collect();
        ordered.sort_by_key(|f| f.start);

        let mut output = String::with_capacity(text.len());
        let mut cursor = 0usize;

        for finding in ordered {
            if finding.start < cursor
                || finding.end > text.len()
                || finding.start >= finding.end
                || !text.is_char_boundary(finding.start)
                || !text.is_char_boundary(finding.end)
            {
                debug!(start = finding.start, end = finding.end, "skipping unusable span");
                continue;
            }
            output.push_str(&text[cursor..finding.start]);
            output.push_str(&mask_value(
                &finding.info_type,
                &text[finding.start..finding.end],
            ));
            cursor = finding.end;
        }

        output.push_str(&text[cursor..]);
        output
    }
}

/// Mask one matched value according to its type. Always returns a string
/// with the same char count as the input.
fn mask_value(info_type: &InfoType, value: &str) -> String {
    match info_type {
        InfoType::Mobile | InfoType::Landline => mask_phone(value),
        InfoType::Email => mask_email(value),
        _ if first_four_visible(info_type) => mask_after_prefix(value, 4),
        _ => "*".repeat(value.chars().count()),
    }
}

fn first_four_visible(info_type: &InfoType) -> bool {
    matches!(
        info_type.legal_category(),
        LegalCategory::UniqueIdentifier | LegalCategory::Financial
    )
}

/// Keep the first `visible` chars, star the rest
fn mask_after_prefix(value: &str, visible: usize) -> String {
    value
        .chars()
        .enumerate()
        .map(|(i, c)| if i < visible { c } else { '*' })
        .collect()
}

/// 010-1234-5678 -> 010-****-5678; anything not 3-segment falls back to
/// a full mask
fn mask_phone(value: &str) -> String {
    let parts: Vec<&str> = value.split('-').collect();
    if parts.len() == 3 {
        format!(
            "{}-{}-{}",
            parts[0],
            "*".repeat(parts[1].chars().count()),
            parts[2]
        )
    } else {
        "*".repeat(value.chars().count())
    }
}

/// user@example.com -> u***@example.com
fn mask_email(value: &str) -> String {
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let mut chars = local.chars();
            let first = chars.next().unwrap_or('*');
            format!("{}{}@{}", first, "*".repeat(chars.count()), domain)
        }
        _ => "*".repeat(value.chars().count()),
    }
}
