//! Analysis gateway: forward extracted text to a remote workflow endpoint.
//!
//! The gateway does no analysis of its own. It validates the content locally,
//! resolves the requested analysis type against the configured registry, makes
//! exactly one blocking-mode HTTP call, and normalises the response down to a
//! single plain-text result. Validation and configuration problems are caught
//! before any network I/O; network and remote failures surface as
//! [`ScanError::Analysis`] and are not retried.

use crate::config::{AnalysisConfig, AnalysisEndpoint};
use crate::error::ScanError;
use crate::output::{AnalysisOutcome, AnalysisTypeInfo};
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

/// Fallback when the remote response matches none of the known shapes.
const NO_RESULT_FALLBACK: &str = "AI分析完成，但未获取到具体结果";

pub struct AnalysisGateway {
    client: reqwest::Client,
    config: AnalysisConfig,
}

impl AnalysisGateway {
    /// Build the gateway, validating the registry up front so a missing
    /// credential fails at startup rather than on the first request.
    pub fn new(config: AnalysisConfig) -> Result<Self, ScanError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScanError::Internal(format!("HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// List the configured analysis types for the HTTP listing endpoint.
    pub fn analysis_types(&self) -> Vec<AnalysisTypeInfo> {
        self.config
            .registry
            .iter()
            .map(|(id, ep)| AnalysisTypeInfo {
                id: id.clone(),
                name: ep.name.clone(),
                description: ep.description.clone(),
            })
            .collect()
    }

    /// Analyse `content` with the workflow registered under `analysis_type`.
    pub async fn analyze(
        &self,
        content: &str,
        analysis_type: &str,
    ) -> Result<AnalysisOutcome, ScanError> {
        if content.trim().is_empty() {
            return Err(ScanError::Validation(
                "analysis content must not be empty".into(),
            ));
        }
        let content_chars = content.chars().count();
        if content_chars > self.config.max_content_chars {
            return Err(ScanError::Validation(format!(
                "content length exceeds the {} character limit",
                self.config.max_content_chars
            )));
        }

        let endpoint = self.resolve(analysis_type)?;
        let result = self.call_workflow(endpoint, content).await?;

        info!(
            "analysis complete: type={}, content length={}",
            analysis_type, content_chars
        );

        Ok(AnalysisOutcome {
            success: true,
            analysis_type: analysis_type.to_string(),
            result,
            original_content_length: content_chars,
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }

    fn resolve(&self, analysis_type: &str) -> Result<&AnalysisEndpoint, ScanError> {
        self.config.registry.get(analysis_type).ok_or_else(|| {
            let known: Vec<&str> = self.config.registry.keys().map(String::as_str).collect();
            ScanError::Validation(format!(
                "unknown analysis type '{}'; configured types: {}",
                analysis_type,
                known.join(", ")
            ))
        })
    }

    /// Exactly one blocking-mode workflow call.
    async fn call_workflow(
        &self,
        endpoint: &AnalysisEndpoint,
        content: &str,
    ) -> Result<String, ScanError> {
        let payload = serde_json::json!({
            "inputs": { "rec": content },
            "response_mode": "blocking",
            "user": self.config.user_tag,
        });

        let response = self
            .client
            .post(&endpoint.url)
            .bearer_auth(&endpoint.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ScanError::Analysis(format!("workflow request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScanError::Analysis(format!(
                "workflow returned HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ScanError::Analysis(format!("workflow response not JSON: {}", e)))?;

        Ok(resolve_result_text(&value).unwrap_or_else(|| {
            warn!("workflow response matched no known output shape");
            NO_RESULT_FALLBACK.to_string()
        }))
    }
}

/// Map the remote response's nested output down to one plain-text string.
///
/// Deployments differ in where they put the answer, so known key names are
/// tried in priority order: `data.outputs.{result,answer,output}`, then
/// top-level `answer`, then top-level `result`.
fn resolve_result_text(value: &Value) -> Option<String> {
    if let Some(outputs) = value.pointer("/data/outputs") {
        for key in ["result", "answer", "output"] {
            if let Some(text) = outputs.get(key).and_then(Value::as_str) {
                return Some(text.to_string());
            }
        }
    }
    for key in ["answer", "result"] {
        if let Some(text) = value.get(key).and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }
    None
}
