//! Server binary for scandoc.
//!
//! A thin shim over the library crate: maps CLI flags and environment
//! variables to configuration, wires the recognition engine and analysis
//! gateway, and serves the HTTP API.

use anyhow::{Context, Result};
use clap::Parser;
use scandoc::server::{self, AppState};
use scandoc::{
    AnalysisConfig, AnalysisGateway, DocumentPipeline, PipelineConfig, RemoteOcrEngine,
    TextRecognizer,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "scandoc-server",
    version,
    about = "Document OCR service: PDF/image text extraction with AI content analysis"
)]
struct Cli {
    /// Address to bind.
    #[arg(long, env = "SCANDOC_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, env = "SCANDOC_PORT", default_value_t = 20010)]
    port: u16,

    /// Recognition engine endpoint (receives base64 images as JSON).
    #[arg(long, env = "OCR_ENDPOINT", default_value = "http://127.0.0.1:8868/predict")]
    ocr_endpoint: String,

    /// Per-recognition-call timeout in seconds.
    #[arg(long, env = "OCR_TIMEOUT_SECS", default_value_t = 60)]
    ocr_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let pipeline_config =
        PipelineConfig::from_env().context("invalid pipeline configuration")?;
    let analysis_config = AnalysisConfig::from_env().context("invalid analysis configuration")?;

    let engine = Arc::new(
        RemoteOcrEngine::new(&cli.ocr_endpoint, cli.ocr_timeout_secs)
            .context("failed to build OCR engine client")?,
    );
    let recognizer = Arc::new(TextRecognizer::new(engine));

    let state = Arc::new(AppState {
        pipeline: DocumentPipeline::new(recognizer, pipeline_config)
            .context("failed to initialise document pipeline")?,
        gateway: AnalysisGateway::new(analysis_config)
            .context("failed to initialise analysis gateway")?,
    });

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", cli.host, cli.port))?;

    server::run(addr, state).await?;
    Ok(())
}
