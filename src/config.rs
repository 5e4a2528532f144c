//! Configuration for the processing pipeline and the analysis gateway.
//!
//! Pipeline knobs live in one [`PipelineConfig`] built through its builder,
//! so callers set only what they care about and the rest keeps documented
//! defaults. The analysis-type registry is a strongly-typed mapping from an
//! enumerated key to its endpoint + credential, validated when loaded rather
//! than on every call.

use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Configuration for document processing.
///
/// Built via [`PipelineConfig::builder()`] or [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use scandoc::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .upload_dir("uploads")
///     .pdf_dpi(200)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory uploaded files are written into. Default: `uploads`.
    pub upload_dir: PathBuf,

    /// Maximum accepted upload size in bytes. Default: 16 MiB.
    pub max_file_size: u64,

    /// Rendering DPI for full-page OCR rasterisation. Range: 72–400. Default: 200.
    ///
    /// 200 DPI keeps small print legible for the recognition engine while
    /// staying well under typical per-image upload limits.
    pub pdf_dpi: u32,

    /// Rendering DPI for the first-page preview. Default: 150.
    ///
    /// Previews are shown, not read, so a lower resolution saves both render
    /// time and response size.
    pub preview_dpi: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            max_file_size: 16 * 1024 * 1024,
            pdf_dpi: 200,
            preview_dpi: 150,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Read configuration from the environment, falling back to defaults.
    ///
    /// Recognised variables: `UPLOAD_FOLDER`, `MAX_CONTENT_LENGTH`,
    /// `PDF_DPI`, `PREVIEW_DPI`.
    pub fn from_env() -> Result<Self, ScanError> {
        let mut builder = Self::builder();
        if let Ok(dir) = std::env::var("UPLOAD_FOLDER") {
            builder = builder.upload_dir(dir);
        }
        if let Some(max) = env_parse::<u64>("MAX_CONTENT_LENGTH") {
            builder = builder.max_file_size(max);
        }
        if let Some(dpi) = env_parse::<u32>("PDF_DPI") {
            builder = builder.pdf_dpi(dpi);
        }
        if let Some(dpi) = env_parse::<u32>("PREVIEW_DPI") {
            builder = builder.preview_dpi(dpi);
        }
        builder.build()
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.upload_dir = dir.into();
        self
    }

    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    pub fn pdf_dpi(mut self, dpi: u32) -> Self {
        self.config.pdf_dpi = dpi.clamp(72, 400);
        self
    }

    pub fn preview_dpi(mut self, dpi: u32) -> Self {
        self.config.preview_dpi = dpi.clamp(72, 400);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, ScanError> {
        let c = &self.config;
        if c.max_file_size == 0 {
            return Err(ScanError::InvalidConfig(
                "max_file_size must be greater than zero".into(),
            ));
        }
        if !(72..=400).contains(&c.pdf_dpi) || !(72..=400).contains(&c.preview_dpi) {
            return Err(ScanError::InvalidConfig(format!(
                "DPI must be 72–400, got pdf={} preview={}",
                c.pdf_dpi, c.preview_dpi
            )));
        }
        Ok(self.config)
    }
}

// ── Analysis configuration ───────────────────────────────────────────────

/// One configured remote workflow: where to send content and how to
/// authenticate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisEndpoint {
    pub url: String,
    pub token: String,
    /// Human-readable display name.
    pub name: String,
    pub description: String,
}

/// Settings for the analysis gateway: the type registry plus call limits.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Mapping from analysis-type key to its endpoint. `BTreeMap` keeps the
    /// listing endpoint output in a stable order.
    pub registry: BTreeMap<String, AnalysisEndpoint>,
    /// Maximum content length accepted for analysis, in characters.
    pub max_content_chars: usize,
    /// Outbound HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// `user` tag sent with every workflow request.
    pub user_tag: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            registry: BTreeMap::new(),
            max_content_chars: 50_000,
            timeout_secs: 30,
            user_tag: "scandoc".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// The analysis types every deployment carries by default.
    const BUILTIN_TYPES: [(&'static str, &'static str, &'static str); 4] = [
        ("general", "通用分析", "对文本内容进行全面的分析和理解"),
        ("summary", "内容摘要", "提取文本的核心内容和关键信息"),
        ("extract", "信息提取", "从文本中提取特定的数据和实体"),
        ("sentiment", "情感分析", "分析文本的情感倾向和态度"),
    ];

    /// Load the registry from `DIFY_{TYPE}_URL` / `DIFY_{TYPE}_TOKEN`
    /// environment variables. Types with no token configured are left out of
    /// the registry — requesting them later is a validation error, not a
    /// call-time surprise.
    pub fn from_env() -> Result<Self, ScanError> {
        let mut registry = BTreeMap::new();

        for (id, name, description) in Self::BUILTIN_TYPES {
            let upper = id.to_ascii_uppercase();
            let url = std::env::var(format!("DIFY_{upper}_URL"))
                .unwrap_or_else(|_| "https://api.dify.ai/v1/workflows/run".to_string());
            let token = match std::env::var(format!("DIFY_{upper}_TOKEN")) {
                Ok(t) if !t.trim().is_empty() => t,
                _ => continue,
            };
            registry.insert(
                id.to_string(),
                AnalysisEndpoint {
                    url,
                    token,
                    name: name.to_string(),
                    description: description.to_string(),
                },
            );
        }

        let config = Self {
            registry,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject entries with an empty URL or credential at load time.
    pub fn validate(&self) -> Result<(), ScanError> {
        for (id, endpoint) in &self.registry {
            if endpoint.url.trim().is_empty() || endpoint.token.trim().is_empty() {
                return Err(ScanError::InvalidConfig(format!(
                    "analysis type '{}' is missing an endpoint URL or credential",
                    id
                )));
            }
        }
        Ok(())
    }
}
