//! DocShield Core Types
//!
//! This crate provides the fundamental types used throughout DocShield:
//! - The PII taxonomy (info types, legal categories, confidence tiers)
//! - Finding and AnalysisResult aggregates
//! - Core error types
//! - Cancellation and status-reporting primitives

pub mod error;
pub mod events;
pub mod types;

pub use error::{Error, Result};
pub use events::{CancelFlag, StatusSink, null_status_sink};
pub use types::{
    AnalysisResult, Confidence, Finding, InfoType, LegalCategory, LegalViolation, Method,
    RiskLevel, SensitiveCategory, spans_overlap,
};
