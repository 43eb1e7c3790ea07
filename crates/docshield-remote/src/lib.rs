//! DocShield Remote Model Client
//!
//! Optional deep-analysis path backed by a local Ollama endpoint:
//! - Connection health check against the tags endpoint
//! - Prompt construction grounded in the rule-based findings
//! - Tolerant JSON extraction from free-form model output
//! - Hard wall-clock timeout; any failure falls back to the rule-based
//!   result upstream

pub mod ollama;

use thiserror::Error;

pub use ollama::{OllamaClient, OllamaConfig};

/// Remote-model error taxonomy
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model endpoint returned {status_code}: {message}")]
    Status { status_code: u16, message: String },

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("failed to parse model output: {0}")]
    Parse(String),

    #[error("model endpoint unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, RemoteError>;
