//! Ollama connector
//!
//! Talks to a local Ollama server over its generate API. The model is
//! asked for a strict-JSON verdict; because local models routinely wrap
//! JSON in prose, extraction falls back to the outermost brace pair
//! before giving up.

use crate::{RemoteError, Result};
use async_trait::async_trait;
use docshield_analysis::{RemoteAnalysis, RemoteAnalyzer, RemoteFinding};
use docshield_core::{
    AnalysisResult, Finding, InfoType, LegalCategory, LegalViolation, RiskLevel,
};
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Document text sent to the model is cut to this many chars
const PROMPT_TEXT_MAX_CHARS: usize = 2000;

/// Ollama connector configuration
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server
    pub base_url: String,

    /// Model name passed to the generate endpoint
    pub model: String,

    /// Request timeout in seconds; local models can be slow to first token
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            timeout_secs: 120,
            connect_timeout_secs: 5,
            user_agent: format!("DocShield/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl OllamaConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

/// Ollama client implementing the analyzer's remote seam
pub struct OllamaClient {
    config: OllamaConfig,
    client: Client,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(&config.user_agent)
            .use_rustls_tls()
            .build()?;
        Ok(Self { config, client })
    }

    /// List the models the server has pulled. Doubles as the health check.
    pub async fn check_connection(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.config.base_url))
            .send()
            .await
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RemoteError::Status {
                status_code: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Run the full remote analysis: prompt, generate, parse
    #[instrument(skip(self, text, findings), fields(model = %self.config.model))]
    pub async fn analyze_document(
        &self,
        text: &str,
        findings: &[Finding],
    ) -> Result<RemoteAnalysis> {
        let prompt = build_prompt(text, findings);
        let raw = self.generate(&prompt).await?;
        debug!(chars = raw.chars().count(), "model output received");

        let value = extract_json(&raw)?;
        Ok(parse_verdict(&value, &self.config.model))
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            temperature: 0.2,
            top_p: 0.9,
            top_k: 40,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.config.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RemoteError::Timeout(self.config.timeout_secs)
                } else {
                    RemoteError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status_code,
                message,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))?;
        Ok(body.response)
    }
}

#[async_trait]
impl RemoteAnalyzer for OllamaClient {
    async fn analyze(
        &self,
        text: &str,
        findings: &[Finding],
    ) -> docshield_core::Result<RemoteAnalysis> {
        self.analyze_document(text, findings)
            .await
            .map_err(|e| docshield_core::Error::Remote(e.to_string()))
    }

    async fn is_available(&self) -> bool {
        match self.check_connection().await {
            Ok(models) => {
                debug!(count = models.len(), "ollama reachable");
                true
            }
            Err(err) => {
                warn!(error = %err, "ollama unreachable");
                false
            }
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}

/// Build the analysis prompt. The rule-based findings ground the model so
/// it judges risk instead of re-discovering spans from scratch.
fn build_prompt(text: &str, findings: &[Finding]) -> String {
    let mut prompt = String::from(
        "당신은 한국 개인정보보호법 전문가입니다. 아래 문서의 개인정보 노출 위험을 평가하세요.\n\n",
    );

    if !findings.is_empty() {
        prompt.push_str("사전 탐지된 개인정보:\n");
        for finding in findings {
            prompt.push_str(&format!(
                "- {} ({})\n",
                finding.info_type.label(),
                finding.legal_category.label()
            ));
        }
        prompt.push('\n');
    }

    prompt.push_str("문서 내용:\n");
    prompt.push_str(truncate_chars(text, PROMPT_TEXT_MAX_CHARS));
    prompt.push_str(
        "\n\n반드시 아래 JSON 형식으로만 답변하세요. 다른 텍스트를 덧붙이지 마세요.\n\
         {\n\
         \"risk_level\": \"심각|높음|보통|낮음\",\n\
         \"risk_score\": 0-100 사이 정수,\n\
         \"reasoning\": \"판단 근거\",\n\
         \"violations\": [\"관련 법조항\"],\n\
         \"recommendations\": [\"권고사항 3개 이상\"],\n\
         \"detected\": [{\"type\": \"정보유형\", \"value\": \"탐지된 값\"}]\n\
         }",
    );

    prompt
}

/// Parse model output as JSON; when direct parsing fails, retry on the
/// outermost `{..}` substring.
fn extract_json(raw: &str) -> Result<serde_json::Value> {
    if let Ok(value) = serde_json::from_str(raw.trim()) {
        return Ok(value);
    }

    let start = raw.find('{');
    let end = raw.rfind('}');
    if let (Some(start), Some(end)) = (start, end)
        && start < end
    {
        return serde_json::from_str(&raw[start..=end])
            .map_err(|e| RemoteError::Parse(e.to_string()));
    }

    Err(RemoteError::Parse("no JSON object in model output".to_string()))
}

/// Lenient mapping from the model's JSON verdict to an `AnalysisResult`.
/// Missing or malformed fields degrade to conservative defaults rather
/// than failing the whole remote attempt.
fn parse_verdict(value: &serde_json::Value, model: &str) -> RemoteAnalysis {
    let risk_score = value
        .get("risk_score")
        .and_then(|v| v.as_u64())
        .map(|s| (s as u32).min(100))
        .unwrap_or(0);

    let risk_level = value
        .get("risk_level")
        .and_then(|v| v.as_str())
        .and_then(RiskLevel::from_label)
        .unwrap_or_else(|| RiskLevel::from_score(risk_score));

    let reasoning = value
        .get("reasoning")
        .and_then(|v| v.as_str())
        .unwrap_or("AI 모델이 판단 근거를 제공하지 않았습니다.")
        .to_string();

    let legal_violations = value
        .get("violations")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .filter_map(violation_from_text)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let recommendations = value
        .get("recommendations")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let detected: Vec<RemoteFinding> = value
        .get("detected")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    serde_json::from_value::<RemoteFinding>(item.clone()).ok()
                })
                .collect()
        })
        .unwrap_or_default();

    let mut category_summary: BTreeMap<LegalCategory, usize> =
        LegalCategory::ALL.iter().map(|c| (*c, 0)).collect();
    for item in &detected {
        let category = InfoType::from_label(&item.type_label).legal_category();
        *category_summary.entry(category).or_insert(0) += 1;
    }

    RemoteAnalysis {
        model: model.to_string(),
        result: AnalysisResult {
            risk_level,
            risk_score,
            reasoning,
            legal_violations,
            category_summary,
            recommendations,
        },
        detected,
    }
}

/// Map a statute mention in free text onto a violation flag
fn violation_from_text(text: &str) -> Option<LegalViolation> {
    if text.contains("제24조") {
        Some(LegalViolation::UniqueIdentifierProcessing)
    } else if text.contains("제23조") {
        Some(LegalViolation::SensitiveDataProcessing)
    } else if text.contains("제34조") {
        Some(LegalViolation::ExposedFinancialData)
    } else {
        None
    }
}
