//! Fake collaborators shared by the integration tests.
//!
//! Each fake counts its calls so tests can assert which stages ran.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use rangescribe::{
    DocumentSplitter, ExtractError, Extractor, Rasterizer, ServiceConfig, VisionModel,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub const SPLIT_PDF: &[u8] = b"%PDF-1.4\n% split output\n%%EOF";

// ── Splitter ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeSplitter {
    pub calls: AtomicUsize,
    pub ranges: Mutex<Vec<String>>,
    pub file_names: Mutex<Vec<String>>,
    /// Reject every request with this message.
    pub reject_with: Option<String>,
    /// Return these bytes instead of [`SPLIT_PDF`].
    pub output: Option<Vec<u8>>,
}

impl FakeSplitter {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn rejecting(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reject_with: Some(message.to_string()),
            ..Self::default()
        })
    }

    pub fn returning(bytes: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            output: Some(bytes.to_vec()),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentSplitter for FakeSplitter {
    async fn split(&self, file_name: &str, pdf: Vec<u8>, ranges: &str) -> Result<Vec<u8>, ExtractError> {
        assert!(pdf.starts_with(b"%PDF"), "splitter must receive the source PDF");
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.ranges.lock().unwrap().push(ranges.to_string());
        self.file_names.lock().unwrap().push(file_name.to_string());

        if let Some(ref message) = self.reject_with {
            return Err(ExtractError::SplitRejected {
                step: "process",
                status: 400,
                message: message.clone(),
            });
        }
        Ok(self.output.clone().unwrap_or_else(|| SPLIT_PDF.to_vec()))
    }
}

// ── Rasteriser ───────────────────────────────────────────────────────────

/// Writes `<prefix>-<n>.jpg` for `n in 1..=pages`, without zero padding, so
/// page 10 sorts before page 2 lexicographically.
#[derive(Default)]
pub struct FakeRasterizer {
    pub pages: usize,
    pub fail: bool,
    pub calls: AtomicUsize,
    pub workspaces: Mutex<Vec<PathBuf>>,
}

impl FakeRasterizer {
    pub fn pages(pages: usize) -> Arc<Self> {
        Arc::new(Self {
            pages,
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn workspaces(&self) -> Vec<PathBuf> {
        self.workspaces.lock().unwrap().clone()
    }
}

#[async_trait]
impl Rasterizer for FakeRasterizer {
    async fn rasterize(&self, document: &Path, output_prefix: &Path) -> Result<(), ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let dir = document.parent().expect("document inside workspace").to_path_buf();
        assert_eq!(std::fs::read(document).unwrap(), SPLIT_PDF);
        self.workspaces.lock().unwrap().push(dir);

        if self.fail {
            return Err(ExtractError::RasterizerFailed {
                program: "pdftoppm".into(),
                status: "exit status: 1".into(),
                stderr: "Syntax Error: Couldn't read xref table".into(),
            });
        }

        let prefix = output_prefix.to_string_lossy();
        for n in 1..=self.pages {
            std::fs::write(format!("{prefix}-{n}.jpg"), format!("jpeg-{n}")).unwrap();
        }
        Ok(())
    }
}

// ── Vision model ─────────────────────────────────────────────────────────

/// Answers `text of <decoded image bytes>`.
#[derive(Default)]
pub struct FakeVision {
    pub calls: AtomicUsize,
    /// Fail when asked for this label.
    pub fail_on: Option<String>,
    /// Delay earlier pages longer so concurrent calls finish out of order.
    pub stagger: bool,
}

impl FakeVision {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_on(label: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_on: Some(label.to_string()),
            ..Self::default()
        })
    }

    pub fn staggered() -> Arc<Self> {
        Arc::new(Self {
            stagger: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionModel for FakeVision {
    async fn extract_text(&self, label: &str, image: ImageData) -> Result<String, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(image.mime_type, "image/jpeg");

        if self.stagger {
            let page: u64 = label.trim_start_matches("page-").parse().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(60u64.saturating_sub(page * 5))).await;
        }

        if self.fail_on.as_deref() == Some(label) {
            return Err(ExtractError::LlmApiError {
                page: label.to_string(),
                message: "upstream model error".into(),
            });
        }

        let bytes = STANDARD.decode(&image.data).expect("valid base64");
        Ok(format!("text of {}", String::from_utf8_lossy(&bytes)))
    }
}

// ── Harness ──────────────────────────────────────────────────────────────

/// A source PDF and a private temp root whose emptiness proves cleanup.
pub struct Harness {
    pub source_dir: TempDir,
    pub temp_root: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let source_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            source_dir.path().join("Student Book.pdf"),
            b"%PDF-1.7\n% source\n%%EOF",
        )
        .unwrap();
        Self {
            source_dir,
            temp_root: tempfile::tempdir().unwrap(),
        }
    }

    pub fn config(&self) -> ServiceConfig {
        self.config_with_concurrency(1)
    }

    pub fn config_with_concurrency(&self, n: usize) -> ServiceConfig {
        ServiceConfig::builder()
            .source_pdf(self.source_dir.path().join("Student Book.pdf"))
            .temp_root(self.temp_root.path())
            .page_concurrency(n)
            .build()
            .unwrap()
    }

    pub fn extractor(
        &self,
        splitter: Arc<FakeSplitter>,
        rasterizer: Arc<FakeRasterizer>,
        vision: Arc<FakeVision>,
    ) -> Extractor {
        Extractor::with_components(self.config(), splitter, rasterizer, vision)
    }

    /// Number of entries left in the temp root.
    pub fn leftover_workspaces(&self) -> usize {
        std::fs::read_dir(self.temp_root.path()).unwrap().count()
    }
}

/// Expected section text for pages `1..=n` as produced by the fakes.
pub fn expected_text(n: usize) -> String {
    (1..=n)
        .map(|i| format!("\n--- Page page-{i} ---\ntext of jpeg-{i}\n"))
        .collect()
}
