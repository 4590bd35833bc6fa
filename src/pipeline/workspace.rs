//! Per-request temporary workspace.
//!
//! Each request gets its own `pdf-process-XXXXXX` directory holding the split
//! document and every rasterised page. The directory is owned by a
//! [`TempDir`], so it is removed when the [`Workspace`] is dropped, whichever
//! way the request ends. [`Workspace::close`] is the success path and
//! reports removal errors instead of swallowing them.

use crate::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Prefix of every workspace directory name.
pub const WORKSPACE_PREFIX: &str = "pdf-process-";

/// Filename the split document is written to.
pub const SPLIT_FILE_NAME: &str = "splitted.pdf";

/// Output prefix handed to the rasteriser.
pub const PAGE_PREFIX: &str = "page";

// pdftoppm zero-pads the page number to the width of the last page number,
// so `page-1.jpg` and `page-01.jpg` are both valid.
static RE_PAGE_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^page-(\d+)\.jpg$").expect("static regex"));

/// One rasterised page on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// Page number parsed from the filename.
    pub page_num: usize,
    /// Filename without extension, used as the section label.
    pub label: String,
    pub path: PathBuf,
}

/// A uniquely named directory that lives exactly as long as one request.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh workspace under `root`, or the OS temp dir.
    pub fn create(root: Option<&Path>) -> Result<Self, ExtractError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| {
            ExtractError::workspace(root.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir), e)
        })?;
        debug!("Created workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the split document lives.
    pub fn document_path(&self) -> PathBuf {
        self.dir.path().join(SPLIT_FILE_NAME)
    }

    /// Output prefix for the rasteriser (`<workspace>/page`).
    pub fn page_prefix(&self) -> PathBuf {
        self.dir.path().join(PAGE_PREFIX)
    }

    /// Write the split document and return its path.
    pub async fn write_document(&self, bytes: &[u8]) -> Result<PathBuf, ExtractError> {
        let path = self.document_path();
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ExtractError::workspace(&path, e))?;
        Ok(path)
    }

    /// List rasterised pages in numeric page order.
    ///
    /// Files that do not look like `page-<n>.jpg` are ignored.
    pub async fn page_images(&self) -> Result<Vec<PageImage>, ExtractError> {
        let mut entries = tokio::fs::read_dir(self.path())
            .await
            .map_err(|e| ExtractError::workspace(self.path(), e))?;

        let mut pages = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ExtractError::workspace(self.path(), e))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some((page_num, label)) = parse_page_image(name) {
                pages.push(PageImage {
                    page_num,
                    label,
                    path: entry.path(),
                });
            }
        }

        pages.sort_by(|a, b| a.page_num.cmp(&b.page_num).then_with(|| a.label.cmp(&b.label)));
        Ok(pages)
    }

    /// Remove the workspace now, surfacing any removal error.
    pub fn close(self) -> Result<(), ExtractError> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|e| ExtractError::workspace(path, e))
    }
}

/// Parse `page-<n>.jpg` into `(n, "page-<n>")`.
pub fn parse_page_image(file_name: &str) -> Option<(usize, String)> {
    let caps = RE_PAGE_IMAGE.captures(file_name)?;
    let page_num = caps[1].parse().ok()?;
    let label = file_name.strip_suffix(".jpg")?.to_string();
    Some((page_num, label))
}
