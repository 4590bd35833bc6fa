//! Result types returned by [`crate::Extractor::extract`].

use serde::{Deserialize, Serialize};

/// Text extracted from a single rasterised page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-based page number within the split document.
    pub page_num: usize,
    /// Image filename without extension, e.g. `page-03`.
    pub label: String,
    /// Text returned by the vision model.
    pub text: String,
    /// Wall-clock time of the completion call.
    pub duration_ms: u64,
}

/// Timing and size figures for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub page_count: usize,
    pub split_bytes: usize,
    pub split_duration_ms: u64,
    pub rasterize_duration_ms: u64,
    pub llm_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything produced by one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Assembled text, one `--- Page <label> ---` section per page.
    pub text: String,
    /// Per-page results in page order.
    pub pages: Vec<PageText>,
    pub stats: ExtractionStats,
}
