//! Configuration types for the extraction service.
//!
//! All process-wide settings live in [`ServiceConfig`], built once at startup
//! via [`ServiceConfigBuilder`] and handed to [`crate::Extractor`]. Nothing in
//! the pipeline reads the environment directly, so tests can run the whole
//! request path against fake collaborators with a config built in code.

use crate::error::ExtractError;
use std::fmt;
use std::path::PathBuf;

/// Default source document, relative to the working directory.
pub const DEFAULT_SOURCE_PDF: &str = "Student Book.pdf";

/// Default base URL of the iLovePDF REST API.
pub const DEFAULT_ILOVEPDF_BASE_URL: &str = "https://api.ilovepdf.com";

/// Configuration for the extraction service.
///
/// # Example
/// ```rust
/// use rangescribe::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .source_pdf("book.pdf")
///     .ilovepdf_keys("project_public_xxx", "secret_key_xxx")
///     .model("gpt-4o-mini")
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 150);
/// ```
#[derive(Clone)]
pub struct ServiceConfig {
    /// PDF every request is split from. Default: `Student Book.pdf`.
    pub source_pdf: PathBuf,

    /// iLovePDF project public key. Checked lazily on the first split.
    pub ilovepdf_public_key: Option<String>,

    /// iLovePDF project secret key, used to sign the auth token.
    pub ilovepdf_secret_key: Option<String>,

    /// Base URL for the iLovePDF `start` call. Default: `https://api.ilovepdf.com`.
    pub ilovepdf_base_url: String,

    /// Rasteriser executable, looked up on `PATH`. Default: `pdftoppm`.
    pub rasterizer: String,

    /// Rasterisation resolution. Default: 150.
    pub dpi: u32,

    /// Kill the rasteriser after this many seconds. Default: 300.
    pub rasterize_timeout_secs: u64,

    /// LLM provider name passed to the provider factory. Default: `openai`.
    pub provider_name: String,

    /// Vision model identifier. Default: `gpt-4o-mini`.
    pub model: String,

    /// Maximum tokens the model may generate per page. Default: 4096.
    pub max_tokens: usize,

    /// Number of page completions in flight at once. Default: 1.
    ///
    /// 1 keeps the per-request pipeline strictly sequential. Larger values
    /// fan pages out but the assembled text is still ordered by page.
    pub page_concurrency: usize,

    /// Directory temp workspaces are created in. `None` = OS temp dir.
    pub temp_root: Option<PathBuf>,

    /// Timeout for each HTTP call to the splitting service. Default: 120.
    pub http_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            source_pdf: PathBuf::from(DEFAULT_SOURCE_PDF),
            ilovepdf_public_key: None,
            ilovepdf_secret_key: None,
            ilovepdf_base_url: DEFAULT_ILOVEPDF_BASE_URL.to_string(),
            rasterizer: "pdftoppm".to_string(),
            dpi: 150,
            rasterize_timeout_secs: 300,
            provider_name: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 4096,
            page_concurrency: 1,
            temp_root: None,
            http_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("ServiceConfig")
            .field("source_pdf", &self.source_pdf)
            .field("ilovepdf_public_key", &redact(&self.ilovepdf_public_key))
            .field("ilovepdf_secret_key", &redact(&self.ilovepdf_secret_key))
            .field("ilovepdf_base_url", &self.ilovepdf_base_url)
            .field("rasterizer", &self.rasterizer)
            .field("dpi", &self.dpi)
            .field("rasterize_timeout_secs", &self.rasterize_timeout_secs)
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("page_concurrency", &self.page_concurrency)
            .field("temp_root", &self.temp_root)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn source_pdf(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.source_pdf = path.into();
        self
    }

    pub fn ilovepdf_keys(mut self, public_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        self.config.ilovepdf_public_key = Some(public_key.into());
        self.config.ilovepdf_secret_key = Some(secret_key.into());
        self
    }

    pub fn ilovepdf_public_key(mut self, key: Option<String>) -> Self {
        self.config.ilovepdf_public_key = key.filter(|k| !k.is_empty());
        self
    }

    pub fn ilovepdf_secret_key(mut self, key: Option<String>) -> Self {
        self.config.ilovepdf_secret_key = key.filter(|k| !k.is_empty());
        self
    }

    pub fn ilovepdf_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.ilovepdf_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn rasterizer(mut self, program: impl Into<String>) -> Self {
        self.config.rasterizer = program.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn rasterize_timeout_secs(mut self, secs: u64) -> Self {
        self.config.rasterize_timeout_secs = secs;
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = name.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn page_concurrency(mut self, n: usize) -> Self {
        self.config.page_concurrency = n.max(1);
        self
    }

    pub fn temp_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_root = Some(dir.into());
        self
    }

    pub fn http_timeout_secs(mut self, secs: u64) -> Self {
        self.config.http_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// Credentials are deliberately not required here: a missing key only
    /// fails the first request that needs it.
    pub fn build(self) -> Result<ServiceConfig, ExtractError> {
        let c = &self.config;
        if c.rasterizer.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "Rasteriser program must not be empty".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(ExtractError::InvalidConfig("Model must not be empty".into()));
        }
        if c.max_tokens == 0 {
            return Err(ExtractError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if !c.ilovepdf_base_url.starts_with("http://") && !c.ilovepdf_base_url.starts_with("https://") {
            return Err(ExtractError::InvalidConfig(format!(
                "iLovePDF base URL must be http(s), got '{}'",
                c.ilovepdf_base_url
            )));
        }
        Ok(self.config)
    }
}
