//! Error types for the rangescribe library.
//!
//! Every stage of the pipeline is a hard dependency of the next one, so there
//! is a single fatal error type, [`ExtractError`]. The first failure aborts
//! the request and bubbles up unchanged to the HTTP layer, which is the only
//! place errors are turned into responses (see [`crate::api::ApiError`]).

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the extraction pipeline.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The page range was empty.
    #[error("Split range is required.")]
    MissingRanges,

    // ── Source document ───────────────────────────────────────────────────
    /// The configured source PDF does not exist.
    #[error("Source PDF not found: '{path}'")]
    SourceNotFound { path: PathBuf },

    /// The process cannot read the source PDF.
    #[error("Permission denied reading source PDF '{path}'")]
    PermissionDenied { path: PathBuf },

    /// A file that should be a PDF does not start with `%PDF`.
    #[error("'{path}' is not a valid PDF (first bytes: {magic:?})")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Splitting service ─────────────────────────────────────────────────
    /// Credentials for the splitting service are missing.
    #[error("Splitting service is not configured: {hint}")]
    SplitNotConfigured { hint: String },

    /// The HTTP request to the splitting service could not be completed.
    #[error("Splitting service request failed during {step}: {reason}")]
    SplitRequestFailed { step: &'static str, reason: String },

    /// The splitting service answered with a non-success status.
    #[error("Splitting service rejected {step} (HTTP {status}): {message}")]
    SplitRejected {
        step: &'static str,
        status: u16,
        message: String,
    },

    /// The split output is not a single PDF (e.g. a ZIP of several files).
    #[error("Splitting service returned an unexpected document (first bytes: {magic:?})")]
    UnexpectedSplitOutput { magic: [u8; 4] },

    // ── Workspace ─────────────────────────────────────────────────────────
    /// Creating, writing or listing the temporary workspace failed.
    #[error("Workspace I/O failed for '{path}': {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Rasteriser ────────────────────────────────────────────────────────
    /// The rasteriser executable could not be started.
    #[error("Failed to execute rasteriser '{program}': {source}")]
    RasterizerSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The rasteriser exited with a non-zero status.
    #[error("Rasteriser '{program}' exited with {status}: {stderr}")]
    RasterizerFailed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The rasteriser did not finish within the configured timeout.
    #[error("Rasteriser '{program}' timed out after {secs}s")]
    RasterizerTimeout { program: String, secs: u64 },

    /// The rasteriser succeeded but produced no page images.
    #[error("Rasteriser produced no page images in '{dir}'")]
    NoPagesRendered { dir: PathBuf },

    // ── Completion service ────────────────────────────────────────────────
    /// The vision provider could not be created (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured: {hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The completion call for a page failed.
    #[error("LLM API error on {page}: {message}")]
    LlmApiError { page: String, message: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Server errors ─────────────────────────────────────────────────────
    /// The listener could not bind its address.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    pub(crate) fn workspace(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExtractError::Workspace {
            path: path.into(),
            source,
        }
    }
}
