//! Request-scoped orchestration of the pipeline stages.
//!
//! [`Extractor`] owns the process-wide configuration and one instance of each
//! collaborator. [`Extractor::extract`] runs a single request end to end:
//!
//! ```text
//! load source ─▶ split ─▶ workspace ─▶ rasterise ─▶ list pages ─▶ VLM per page ─▶ assemble
//! ```
//!
//! Every stage propagates its error unchanged; nothing is retried and no
//! partial text is ever returned. The [`Workspace`] guard removes the temp
//! directory on every exit path.

use crate::config::ServiceConfig;
use crate::error::ExtractError;
use crate::output::{ExtractionOutput, ExtractionStats, PageText};
use crate::pipeline::encode;
use crate::pipeline::input;
use crate::pipeline::llm::{LlmVisionModel, VisionModel};
use crate::pipeline::render::{PdftoppmRasterizer, Rasterizer};
use crate::pipeline::split::{DocumentSplitter, ILovePdfSplitter};
use crate::pipeline::workspace::{PageImage, Workspace};
use crate::prompts::page_header;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs the split → rasterise → extract pipeline for each request.
pub struct Extractor {
    config: ServiceConfig,
    splitter: Arc<dyn DocumentSplitter>,
    rasterizer: Arc<dyn Rasterizer>,
    vision: Arc<dyn VisionModel>,
}

impl Extractor {
    /// Build an extractor with the production collaborators
    /// (iLovePDF, `pdftoppm`, `edgequake-llm`).
    pub fn new(config: ServiceConfig) -> Result<Self, ExtractError> {
        let splitter = Arc::new(ILovePdfSplitter::from_config(&config)?);
        let rasterizer = Arc::new(PdftoppmRasterizer::from_config(&config));
        let vision = Arc::new(LlmVisionModel::from_config(&config));
        Ok(Self::with_components(config, splitter, rasterizer, vision))
    }

    /// Build an extractor around caller-supplied collaborators.
    pub fn with_components(
        config: ServiceConfig,
        splitter: Arc<dyn DocumentSplitter>,
        rasterizer: Arc<dyn Rasterizer>,
        vision: Arc<dyn VisionModel>,
    ) -> Self {
        Self {
            config,
            splitter,
            rasterizer,
            vision,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Extract the text of the pages selected by `ranges`.
    ///
    /// # Errors
    /// The first failing stage's error; see [`ExtractError`].
    pub async fn extract(&self, ranges: &str) -> Result<ExtractionOutput, ExtractError> {
        let total_start = Instant::now();
        if ranges.is_empty() {
            return Err(ExtractError::MissingRanges);
        }

        // ── Split ────────────────────────────────────────────────────────
        let source_path = &self.config.source_pdf;
        let source = input::load_source(source_path).await?;
        let file_name = source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        let split_start = Instant::now();
        let split = self.splitter.split(&file_name, source, ranges).await?;
        let split_duration_ms = split_start.elapsed().as_millis() as u64;
        if let Some(magic) = input::bad_magic(&split) {
            return Err(ExtractError::UnexpectedSplitOutput { magic });
        }

        // ── Materialise ──────────────────────────────────────────────────
        let workspace = Workspace::create(self.config.temp_root.as_deref())?;
        let document = workspace.write_document(&split).await?;
        info!("PDF split for range \"{}\" completed.", ranges);

        // ── Rasterise ────────────────────────────────────────────────────
        let render_start = Instant::now();
        self.rasterizer
            .rasterize(&document, &workspace.page_prefix())
            .await?;
        let rasterize_duration_ms = render_start.elapsed().as_millis() as u64;

        let images = workspace.page_images().await?;
        if images.is_empty() {
            return Err(ExtractError::NoPagesRendered {
                dir: workspace.path().to_path_buf(),
            });
        }
        info!(
            "PDF converted to {} images in {}ms",
            images.len(),
            rasterize_duration_ms
        );

        // ── Extract ──────────────────────────────────────────────────────
        let llm_start = Instant::now();
        let pages = self.extract_pages(&images).await?;
        let llm_duration_ms = llm_start.elapsed().as_millis() as u64;

        let text = assemble_text(&pages);

        // ── Cleanup ──────────────────────────────────────────────────────
        if let Err(e) = workspace.close() {
            warn!("Failed to remove workspace: {}", e);
        }

        let stats = ExtractionStats {
            page_count: pages.len(),
            split_bytes: split.len(),
            split_duration_ms,
            rasterize_duration_ms,
            llm_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };
        info!(
            "Text extraction complete: {} pages, {}ms total. Cleanup finished.",
            stats.page_count, stats.total_duration_ms
        );

        Ok(ExtractionOutput { text, pages, stats })
    }

    /// Send every page to the vision model, at most `page_concurrency` at a
    /// time, and return the results ordered by page number.
    ///
    /// The first failure drops all in-flight calls and is returned as is.
    async fn extract_pages(&self, images: &[PageImage]) -> Result<Vec<PageText>, ExtractError> {
        // Each future owns its page so the stream stays `Send` inside handlers.
        let mut pages: Vec<PageText> = stream::iter(images.iter().cloned().map(|image| {
            let vision = Arc::clone(&self.vision);
            async move { extract_page(vision.as_ref(), &image).await }
        }))
        .buffer_unordered(self.config.page_concurrency.max(1))
        .try_collect()
        .await?;

        pages.sort_by_key(|p| p.page_num);
        Ok(pages)
    }
}

/// Encode one page image and ask the vision model for its text.
async fn extract_page(vision: &dyn VisionModel, image: &PageImage) -> Result<PageText, ExtractError> {
    let start = Instant::now();
    let data = encode::encode_page(&image.path).await?;
    let text = vision.extract_text(&image.label, data).await?;
    let duration_ms = start.elapsed().as_millis() as u64;
    debug!("{}: {} chars in {}ms", image.label, text.len(), duration_ms);

    Ok(PageText {
        page_num: image.page_num,
        label: image.label.clone(),
        text,
        duration_ms,
    })
}

/// Join pages as `\n--- Page <label> ---\n<text>\n` sections.
pub fn assemble_text(pages: &[PageText]) -> String {
    let mut out = String::new();
    for page in pages {
        out.push_str(&page_header(&page.label));
        out.push_str(&page.text);
        out.push('\n');
    }
    out
}
