//! Priority-ordered span detection
//!
//! Runs the pattern library over the text one type at a time, in detection
//! priority order. A candidate overlapping any previously accepted span is
//! dropped, never merged, so the priority order alone decides which type
//! wins contested text.

use crate::context::ContextValidator;
use crate::patterns::PatternLibrary;
use crate::validators::validator_for;
use crate::window::normalized_window;
use docshield_core::{Finding, InfoType, Method, Result, spans_overlap};
use tracing::debug;

/// Radius of the corroboration window around a span, in bytes
pub const CONTEXT_RADIUS: usize = 100;

/// Regex-pass detector over one pattern library session
#[derive(Debug, Default)]
pub struct SpanDetector {
    library: PatternLibrary,
    context: ContextValidator,
}

impl SpanDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a runtime pattern on this session's library
    pub fn add_custom_pattern(&self, name: &str, pattern: &str) -> Result<()> {
        self.library.add_custom_pattern(name, pattern)
    }

    /// Run the full regex pass. Output is sorted ascending by start and
    /// contains no overlapping spans.
    pub fn detect(&self, text: &str) -> Vec<Finding> {
        let mut findings: Vec<Finding> = Vec::new();
        let mut accepted: Vec<(usize, usize)> = Vec::new();

        for info_type in self.library.detection_order() {
            for (start, end, value) in self.library.match_all(&info_type, text) {
                if accepted
                    .iter()
                    .any(|&(s, e)| spans_overlap(start, end, s, e))
                {
                    debug!(info_type = %info_type.label(), %value, "dropped overlapping candidate");
                    continue;
                }

                if let Some(validator) = validator_for(&info_type)
                    && !validator.validate(&value)
                {
                    debug!(info_type = %info_type.label(), %value, "failed format validation");
                    continue;
                }

                let window = normalized_window(text, start, end, CONTEXT_RADIUS);
                let (has_context, confidence) =
                    self.context.validate(&info_type, &value, &window);

                // Uncorroborated account numbers are a common false
                // positive; context is gating for this type only
                if info_type == InfoType::Account && !has_context {
                    debug!(%value, "dropped account candidate without context");
                    continue;
                }

                accepted.push((start, end));
                findings.push(Finding::new(
                    info_type.clone(),
                    value,
                    start,
                    end,
                    window,
                    Method::PatternMatch,
                    confidence,
                    has_context,
                ));
            }
        }

        findings.sort_by_key(|f| f.start);
        findings
    }
}

/// Merge the keyword pass into the regex pass. Regex findings are the base
/// set and always win; a keyword finding is added only when its span is
/// disjoint from every accepted span.
pub fn merge_findings(regex: Vec<Finding>, keyword: Vec<Finding>) -> Vec<Finding> {
    let mut merged = regex;
    for candidate in keyword {
        let overlaps = merged.iter().any(|f| f.overlaps(&candidate));
        if !overlaps {
            merged.push(candidate);
        }
    }
    merged.sort_by_key(|f| f.start);
    merged
}
