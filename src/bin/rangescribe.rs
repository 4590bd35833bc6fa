//! Server binary for rangescribe.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to `ServiceConfig` and serves the HTTP API.

use anyhow::{Context, Result};
use clap::Parser;
use rangescribe::{api, Extractor, ServiceConfig};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on the default port (3000)
  rangescribe

  # Custom source document and port
  rangescribe --source-pdf books/physics.pdf --port 8080

  # Query the running server
  curl "http://localhost:3000/extract?ranges=2-8"

ENVIRONMENT VARIABLES:
  PORT                  Listening port (default 3000)
  SOURCE_PDF            PDF every request is split from
  ILOVEPDF_PUBLIC_KEY   iLovePDF project public key
  ILOVEPDF_SECRET_KEY   iLovePDF project secret key
  OPENAI_API_KEY        API key for the default vision provider
  EDGEQUAKE_PROVIDER    Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL       Override model ID
  RASTERIZER_BIN        pdftoppm-compatible executable
  RUST_LOG              Log filter, e.g. rangescribe=debug,tower_http=debug

Missing credentials do not stop the server from starting; the first
/extract request that needs them fails with a 500 instead.
"#;

/// Extract text from PDF page ranges with Vision LLMs over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "rangescribe",
    version,
    about = "Extract text from PDF page ranges with Vision LLMs over HTTP",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Source PDF that every request is split from.
    #[arg(long, env = "SOURCE_PDF", default_value = rangescribe::config::DEFAULT_SOURCE_PDF)]
    source_pdf: PathBuf,

    /// iLovePDF project public key.
    #[arg(long, env = "ILOVEPDF_PUBLIC_KEY", hide_env_values = true)]
    ilovepdf_public_key: Option<String>,

    /// iLovePDF project secret key.
    #[arg(long, env = "ILOVEPDF_SECRET_KEY", hide_env_values = true)]
    ilovepdf_secret_key: Option<String>,

    /// iLovePDF API base URL.
    #[arg(long, env = "ILOVEPDF_BASE_URL", default_value = rangescribe::config::DEFAULT_ILOVEPDF_BASE_URL)]
    ilovepdf_base_url: String,

    /// Rasteriser executable (pdftoppm-compatible).
    #[arg(long, env = "RASTERIZER_BIN", default_value = "pdftoppm")]
    rasterizer: String,

    /// Seconds before a running rasteriser is killed.
    #[arg(long, env = "RASTERIZE_TIMEOUT", default_value_t = 300)]
    rasterize_timeout: u64,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER", default_value = "openai")]
    provider: String,

    /// Vision model ID.
    #[arg(long, env = "EDGEQUAKE_MODEL", default_value = "gpt-4o-mini")]
    model: String,

    /// Max LLM output tokens per page.
    #[arg(long, env = "MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Pages sent to the model at once within one request (1 = sequential).
    #[arg(long, env = "PAGE_CONCURRENCY", default_value_t = 1)]
    page_concurrency: usize,

    /// Timeout in seconds for each call to the splitting service.
    #[arg(long, env = "HTTP_TIMEOUT", default_value_t = 120)]
    http_timeout: u64,

    /// Directory for per-request temp workspaces (default: OS temp dir).
    #[arg(long, env = "TEMP_ROOT")]
    temp_root: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "RANGESCRIBE_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;
    tracing::info!("Starting with {:?}", config);

    if !config.source_pdf.exists() {
        tracing::warn!(
            "Source PDF '{}' does not exist yet; requests will fail until it does",
            config.source_pdf.display()
        );
    }

    let extractor = Extractor::new(config).context("Failed to initialise extractor")?;

    // ── Serve ────────────────────────────────────────────────────────────
    api::serve(&cli.host, cli.port, Arc::new(extractor))
        .await
        .context("Server failed")?;

    Ok(())
}

fn build_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut builder = ServiceConfig::builder()
        .source_pdf(&cli.source_pdf)
        .ilovepdf_public_key(cli.ilovepdf_public_key.clone())
        .ilovepdf_secret_key(cli.ilovepdf_secret_key.clone())
        .ilovepdf_base_url(&cli.ilovepdf_base_url)
        .rasterizer(&cli.rasterizer)
        .rasterize_timeout_secs(cli.rasterize_timeout)
        .provider_name(&cli.provider)
        .model(&cli.model)
        .max_tokens(cli.max_tokens)
        .page_concurrency(cli.page_concurrency)
        .http_timeout_secs(cli.http_timeout);

    if let Some(ref dir) = cli.temp_root {
        builder = builder.temp_root(dir);
    }

    builder.build().context("Invalid configuration")
}
