//! DocShield PII Detection
//!
//! This crate provides the multi-pass PII detection engine:
//! - Pattern library with a fixed, legally-ordered detection priority
//! - Per-type format validators
//! - Context-window corroboration and confidence assignment
//! - Sensitive-keyword clustering with a personal-connection test
//! - Overlap resolution and merge of the two detection passes

pub mod context;
pub mod detector;
pub mod keywords;
pub mod patterns;
pub mod validators;
pub mod window;

pub use context::ContextValidator;
pub use detector::{SpanDetector, merge_findings};
pub use keywords::KeywordClusterer;
pub use patterns::PatternLibrary;
pub use validators::{FormatValidator, validator_for};
